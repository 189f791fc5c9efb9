use crate::braille::BrailleCanvas;
use crate::geo::LatLng;
use crate::map::geometry::{draw_line, draw_ring};
use crate::map::projection::Viewport;

/// A geographic line as (lon, lat) pairs
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for map data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// Which background layers are drawn
#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub show_borders: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { show_borders: true }
    }
}

/// Braille layers produced for one frame
pub struct MapLayers {
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
    pub halo: BrailleCanvas,
}

/// Coastline and border data at several resolutions
#[derive(Default)]
pub struct MapRenderer {
    coastlines: [Vec<LineString>; 3],
    borders: [Vec<LineString>; 3],
    pub settings: DisplaySettings,
}

#[inline(always)]
fn slot(lod: Lod) -> usize {
    match lod {
        Lod::Low => 0,
        Lod::Medium => 1,
        Lod::High => 2,
    }
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finest loaded set at or below `lod`, falling back to coarser data
    fn pick(sets: &[Vec<LineString>; 3], lod: Lod) -> &[LineString] {
        sets[..=slot(lod)]
            .iter()
            .rev()
            .find(|set| !set.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Draw coastlines, borders and an optional selection halo.
    /// `width`/`height` are in characters.
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, selected: Option<LatLng>) -> MapLayers {
        let lod = Lod::from_zoom(viewport.zoom);

        let mut coastlines = BrailleCanvas::new(width, height);
        for line in Self::pick(&self.coastlines, lod) {
            draw_linestring(&mut coastlines, line, viewport);
        }

        let mut borders = BrailleCanvas::new(width, height);
        if self.settings.show_borders {
            // Borders at world scale are noise; start at Medium
            let lod = if lod == Lod::Low { Lod::Medium } else { lod };
            for line in Self::pick(&self.borders, lod) {
                draw_linestring(&mut borders, line, viewport);
            }
        }

        let mut halo = BrailleCanvas::new(width, height);
        if let Some(pos) = selected {
            let (px, py) = viewport.project(pos.lng, pos.lat);
            if viewport.is_visible(px, py) {
                draw_ring(&mut halo, px, py, 4);
            }
        }

        MapLayers {
            coastlines,
            borders,
            halo,
        }
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        self.coastlines[slot(lod)].push(line);
    }

    pub fn add_border(&mut self, line: LineString, lod: Lod) {
        self.borders[slot(lod)].push(line);
    }

    pub fn has_data(&self) -> bool {
        self.coastlines.iter().any(|set| !set.is_empty())
    }

    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }
}

/// Draw a linestring, skipping segments that wrap the antimeridian or sit off screen
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in line {
        let p = viewport.project(lon, lat);
        if let Some(q) = prev {
            let dist = ((p.0 - q.0).abs() + (p.1 - q.1).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible(q, p) {
                draw_line(canvas, q, p);
            }
        }
        prev = Some(p);
    }
}
