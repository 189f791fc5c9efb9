//! Runtime configuration read from environment variables.

use crate::map::{MAX_ZOOM, MIN_ZOOM};
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CENTER_LAT: f64 = 33.852169;
pub const DEFAULT_CENTER_LON: f64 = -100.5322;
pub const DEFAULT_ZOOM: f64 = 4.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be within {min}..={max}, got {value}")]
    OutOfRange {
        var: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding Natural Earth GeoJSON files
    pub data_dir: PathBuf,
    /// Directory for the rolling log file
    pub log_dir: PathBuf,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_dir: default_log_dir(),
            center_lat: DEFAULT_CENTER_LAT,
            center_lon: DEFAULT_CENTER_LON,
            zoom: DEFAULT_ZOOM,
        }
    }
}

fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("tui-popup-map").join("logs")
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PMAP_DATA_DIR`: GeoJSON directory, default `data`
    /// - `PMAP_LOG_DIR`: log directory, default `<tmp>/tui-popup-map/logs`
    /// - `PMAP_CENTER_LAT` / `PMAP_CENTER_LON`: initial map center
    /// - `PMAP_ZOOM`: initial zoom
    ///
    /// Log verbosity is read separately from `PMAP_LOG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let data_dir = lookup("PMAP_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir);
        let log_dir = lookup("PMAP_LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log_dir);

        let center_lat = parse_f64(&lookup, "PMAP_CENTER_LAT", defaults.center_lat, -85.0, 85.0)?;
        let center_lon = parse_f64(&lookup, "PMAP_CENTER_LON", defaults.center_lon, -180.0, 180.0)?;
        // Zoom outside the viewport's range is pulled back in rather than rejected
        let zoom = parse_f64(&lookup, "PMAP_ZOOM", defaults.zoom, f64::NEG_INFINITY, f64::INFINITY)?
            .clamp(MIN_ZOOM, MAX_ZOOM);

        Ok(Self {
            data_dir,
            log_dir,
            center_lat,
            center_lon,
            zoom,
        })
    }
}

fn parse_f64<F>(lookup: &F, var: &'static str, default: f64, min: f64, max: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let value = raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.clone(),
    })?;
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange { var, value, min, max });
    }
    Ok(value)
}
