/// Highest latitude Web Mercator can represent
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// A geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Geographic rectangle currently visible on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Build bounds from any two opposite corners
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north: north.max(south),
            south: north.min(south),
            east: east.max(west),
            west: east.min(west),
        }
    }

    pub fn contains(&self, pos: LatLng) -> bool {
        pos.lat >= self.south && pos.lat <= self.north && pos.lng >= self.west && pos.lng <= self.east
    }
}

/// Round to a fixed number of decimal places (3 -> 0.001)
#[inline(always)]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
