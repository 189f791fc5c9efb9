mod samples;

pub use samples::sample_pins;

use crate::geo::{Bounds, LatLng};
use crate::map::{pixel_to_cell, Viewport};
use crate::markers::MarkerStore;
use crate::popup::{PinRef, PopupFlags, PopupSource, PopupSpec};
use rand::Rng;

/// Icon variant, picked by what the pin's popup allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinStyle {
    /// Random marker
    Blue,
    Violet,
    Black,
    Green,
    SeaMonster,
}

impl PinStyle {
    pub fn glyph(self) -> char {
        match self {
            PinStyle::SeaMonster => '§',
            _ => '●',
        }
    }
}

/// Random markers are editable and removable
const RANDOM_FLAGS: PopupFlags = PopupFlags {
    editable: true,
    removable: true,
};

/// A hard-coded pin. Its popup state lives here, not in the marker list.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePin {
    pub coords: LatLng,
    pub style: PinStyle,
    pub flags: PopupFlags,
    pub nametag: Option<&'static str>,
    pub content: String,
    pub is_open: bool,
    pub auto_close: bool,
}

/// All pins on the map: the sample set plus the random marker list
#[derive(Debug, Default)]
pub struct Board {
    pub samples: Vec<SamplePin>,
    pub markers: MarkerStore,
}

impl Board {
    pub fn new() -> Self {
        Self {
            samples: sample_pins(),
            markers: MarkerStore::new(),
        }
    }

    /// Pins in drawing order: samples first, then random markers by index
    pub fn pins(&self) -> Vec<PinRef> {
        (0..self.samples.len())
            .map(PinRef::Sample)
            .chain((0..self.markers.len()).map(PinRef::Random))
            .collect()
    }

    pub fn contains(&self, pin: PinRef) -> bool {
        match pin {
            PinRef::Sample(i) => i < self.samples.len(),
            PinRef::Random(i) => i < self.markers.len(),
        }
    }

    pub fn coords(&self, pin: PinRef) -> Option<LatLng> {
        match pin {
            PinRef::Sample(i) => self.samples.get(i).map(|s| s.coords),
            PinRef::Random(i) => self.markers.get(i).map(|m| m.coords),
        }
    }

    pub fn style(&self, pin: PinRef) -> Option<PinStyle> {
        match pin {
            PinRef::Sample(i) => self.samples.get(i).map(|s| s.style),
            PinRef::Random(i) => self.markers.get(i).map(|_| PinStyle::Blue),
        }
    }

    pub fn place_random_marker<R: Rng>(&mut self, bounds: &Bounds, rng: &mut R) -> PinRef {
        PinRef::Random(self.markers.place_random_marker(bounds, rng))
    }

    pub fn set_open(&mut self, pin: PinRef, open: bool) -> bool {
        match pin {
            PinRef::Random(i) => self.markers.set_open_state(i, open),
            PinRef::Sample(i) => match self.samples.get_mut(i) {
                Some(sample) => {
                    sample.is_open = open;
                    true
                }
                None => false,
            },
        }
    }

    pub fn set_content(&mut self, pin: PinRef, content: String) -> bool {
        match pin {
            PinRef::Random(i) => self.markers.set_popup_content(i, content),
            PinRef::Sample(i) => match self.samples.get_mut(i) {
                Some(sample) => {
                    sample.content = content;
                    true
                }
                None => false,
            },
        }
    }

    pub fn remove(&mut self, pin: PinRef) -> bool {
        match pin {
            PinRef::Random(i) => self.markers.remove_marker(i),
            PinRef::Sample(i) if i < self.samples.len() => {
                self.samples.remove(i);
                true
            }
            PinRef::Sample(_) => false,
        }
    }

    /// Topmost pin drawn at character cell (col, row) of the map area.
    /// Random markers sit above samples.
    pub fn pin_at(&self, viewport: &Viewport, col: u16, row: u16) -> Option<PinRef> {
        self.pins().into_iter().rev().find(|&pin| {
            self.coords(pin).is_some_and(|pos| {
                let (px, py) = viewport.project(pos.lng, pos.lat);
                pixel_to_cell(px, py) == Some((col, row))
            })
        })
    }
}

impl PopupSource for Board {
    fn popup(&self, pin: PinRef) -> Option<PopupSpec<'_>> {
        match pin {
            PinRef::Sample(i) => self.samples.get(i).map(|s| PopupSpec {
                content: &s.content,
                flags: s.flags,
                open: s.is_open,
                auto_close: s.auto_close,
                nametag: s.nametag,
            }),
            PinRef::Random(i) => self.markers.get(i).map(|m| PopupSpec {
                content: &m.popup_content,
                flags: RANDOM_FLAGS,
                open: m.is_open,
                auto_close: m.auto_close,
                nametag: None,
            }),
        }
    }
}
