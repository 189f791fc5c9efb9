mod content;

pub use content::random_marker_content;

use crate::geo::{Bounds, LatLng};
use rand::Rng;

/// One randomly placed pin and the state of its popup
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub coords: LatLng,
    pub popup_content: String,
    pub is_open: bool,
    pub auto_close: bool,
}

impl MarkerRecord {
    /// A closed, auto-closing marker at `coords`
    pub fn new(coords: LatLng, popup_content: String) -> Self {
        Self {
            coords,
            popup_content,
            is_open: false,
            auto_close: true,
        }
    }
}

/// The four transitions the marker list supports
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerAction {
    Place(MarkerRecord),
    Remove(usize),
    SetContent { index: usize, content: String },
    SetOpen { index: usize, open: bool },
}

/// Apply one action to the list and hand back the new list.
///
/// Indices are positions in insertion order. An index past the end leaves the
/// list as it was.
pub fn reduce(mut markers: Vec<MarkerRecord>, action: MarkerAction) -> Vec<MarkerRecord> {
    match action {
        MarkerAction::Place(record) => markers.push(record),
        MarkerAction::Remove(index) => {
            if index < markers.len() {
                // Vec::remove shifts the tail left, so later indices stay dense
                markers.remove(index);
            }
        }
        MarkerAction::SetContent { index, content } => {
            if let Some(marker) = markers.get_mut(index) {
                marker.popup_content = content;
            }
        }
        MarkerAction::SetOpen { index, open } => {
            if let Some(marker) = markers.get_mut(index) {
                marker.is_open = open;
            }
        }
    }
    markers
}

/// Uniform point inside `bounds`
pub fn random_coords<R: Rng>(bounds: &Bounds, rng: &mut R) -> LatLng {
    let lat = lerp(bounds.south, bounds.north, rng.random::<f64>());
    let lng = lerp(bounds.west, bounds.east, rng.random::<f64>());
    LatLng::new(lat, lng)
}

#[inline(always)]
fn lerp(lo: f64, hi: f64, t: f64) -> f64 {
    (lo + (hi - lo) * t).clamp(lo, hi)
}

/// Ordered list of random markers owned by the app
#[derive(Debug, Default, Clone)]
pub struct MarkerStore {
    markers: Vec<MarkerRecord>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[MarkerRecord] {
        &self.markers
    }

    pub fn get(&self, index: usize) -> Option<&MarkerRecord> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Run `action` through the reducer and swap in the result
    pub fn dispatch(&mut self, action: MarkerAction) {
        let markers = std::mem::take(&mut self.markers);
        self.markers = reduce(markers, action);
    }

    /// Append a marker at a random spot inside `bounds`, returning its index
    pub fn place_random_marker<R: Rng>(&mut self, bounds: &Bounds, rng: &mut R) -> usize {
        let coords = random_coords(bounds, rng);
        let record = MarkerRecord::new(coords, random_marker_content(coords));
        self.dispatch(MarkerAction::Place(record));
        tracing::info!(lat = coords.lat, lng = coords.lng, count = self.len(), "marker placed");
        self.len() - 1
    }

    /// Drop the marker at `index`. Returns false for a stale index.
    pub fn remove_marker(&mut self, index: usize) -> bool {
        if index >= self.len() {
            tracing::debug!(index, len = self.len(), "remove ignored, no such marker");
            return false;
        }
        self.dispatch(MarkerAction::Remove(index));
        tracing::info!(index, count = self.len(), "marker removed");
        true
    }

    pub fn set_popup_content(&mut self, index: usize, content: String) -> bool {
        if index >= self.len() {
            tracing::debug!(index, "content save ignored, no such marker");
            return false;
        }
        self.dispatch(MarkerAction::SetContent { index, content });
        tracing::info!(index, "popup content saved");
        true
    }

    pub fn set_open_state(&mut self, index: usize, open: bool) -> bool {
        if index >= self.len() {
            tracing::debug!(index, open, "open state ignored, no such marker");
            return false;
        }
        self.dispatch(MarkerAction::SetOpen { index, open });
        tracing::debug!(index, open, "popup open state changed");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(lat: f64, text: &str) -> MarkerRecord {
        MarkerRecord::new(LatLng::new(lat, 0.0), text.to_string())
    }

    fn three() -> Vec<MarkerRecord> {
        vec![record(1.0, "a"), record(2.0, "b"), record(3.0, "c")]
    }

    #[test]
    fn test_remove_shifts_tail() {
        let out = reduce(three(), MarkerAction::Remove(1));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].popup_content, "a");
        assert_eq!(out[1].popup_content, "c");
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let out = reduce(three(), MarkerAction::Remove(3));
        assert_eq!(out, three());
    }

    #[test]
    fn test_set_content_touches_one_record() {
        let out = reduce(
            three(),
            MarkerAction::SetContent {
                index: 2,
                content: "edited".into(),
            },
        );
        let mut expected = three();
        expected[2].popup_content = "edited".into();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_set_open_leaves_others() {
        let mut start = three();
        start[2].is_open = true;
        let out = reduce(start, MarkerAction::SetOpen { index: 0, open: true });
        assert!(out[0].is_open);
        assert!(!out[1].is_open);
        assert!(out[2].is_open);
    }

    #[test]
    fn test_set_open_out_of_range_is_noop() {
        let out = reduce(three(), MarkerAction::SetOpen { index: 9, open: true });
        assert!(out.iter().all(|m| !m.is_open));
    }

    #[test]
    fn test_random_coords_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = Bounds::new(48.0, 25.0, -66.0, -125.0);
        for _ in 0..500 {
            assert!(bounds.contains(random_coords(&bounds, &mut rng)));
        }
    }

    #[test]
    fn test_random_coords_degenerate_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = Bounds::new(5.0, 5.0, 3.0, 3.0);
        assert_eq!(random_coords(&bounds, &mut rng), LatLng::new(5.0, 3.0));
    }

    #[test]
    fn test_place_appends_closed_marker() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut store = MarkerStore::new();
        let bounds = Bounds::new(10.0, 0.0, 10.0, 0.0);
        let idx = store.place_random_marker(&bounds, &mut rng);
        assert_eq!(idx, 0);
        let m = store.get(0).unwrap();
        assert!(!m.is_open);
        assert!(m.auto_close);
        assert!(bounds.contains(m.coords));
        assert!(m.popup_content.contains("latitude"));
    }

    #[test]
    fn test_store_stale_index_reports_false() {
        let mut store = MarkerStore::new();
        assert!(!store.remove_marker(0));
        assert!(!store.set_popup_content(0, "x".into()));
        assert!(!store.set_open_state(0, true));
        assert!(store.is_empty());
    }
}
