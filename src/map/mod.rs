mod geometry;
mod projection;
mod renderer;

pub use projection::{pixel_to_cell, Viewport, MAX_ZOOM, MIN_ZOOM};
pub use renderer::{DisplaySettings, LineString, Lod, MapLayers, MapRenderer};
