use crate::map::{LineString, Lod, MapRenderer};
use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

const COASTLINE_FILES: [(&str, Lod); 3] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

const BORDER_FILES: [(&str, Lod); 2] = [
    ("ne_50m_borders.json", Lod::Medium),
    ("ne_10m_borders.json", Lod::High),
];

/// Load whatever Natural Earth GeoJSON files exist in `data_dir`.
/// Returns how many files were read; a bad file is logged and skipped.
pub fn load_all_geojson(renderer: &mut MapRenderer, data_dir: &Path) -> usize {
    let mut loaded = 0;

    for (filename, lod) in COASTLINE_FILES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_lines(&path) {
            Ok(lines) => {
                tracing::info!(file = filename, lines = lines.len(), "coastlines loaded");
                lines.into_iter().for_each(|line| renderer.add_coastline(line, lod));
                loaded += 1;
            }
            Err(e) => tracing::warn!(file = filename, error = %e, "failed to load coastlines"),
        }
    }

    for (filename, lod) in BORDER_FILES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_lines(&path) {
            Ok(lines) => {
                tracing::info!(file = filename, lines = lines.len(), "borders loaded");
                lines.into_iter().for_each(|line| renderer.add_border(line, lod));
                loaded += 1;
            }
            Err(e) => tracing::warn!(file = filename, error = %e, "failed to load borders"),
        }
    }

    loaded
}

/// Parse a GeoJSON file into plain linestrings
fn read_lines(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_lines(&content)
}

/// Every line, ring exterior and multi-part piece in a GeoJSON document
pub fn parse_lines(content: &str) -> Result<Vec<LineString>> {
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();

    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                collect_lines(geometry, &mut lines);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                collect_lines(geometry, &mut lines);
            }
        }
        GeoJson::Geometry(geometry) => collect_lines(geometry, &mut lines),
    }

    Ok(lines)
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
}

fn collect_lines(geometry: &Geometry, out: &mut Vec<LineString>) {
    match &geometry.value {
        Value::LineString(coords) => out.push(to_line(coords)),
        Value::MultiLineString(parts) => out.extend(parts.iter().map(|c| to_line(c))),
        Value::Polygon(rings) => out.extend(rings.first().map(|c| to_line(c))),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| rings.first()).map(|c| to_line(c)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_lines(g, out);
            }
        }
        _ => {}
    }
}

/// Coarse outline of the Americas and the eastern Pacific, used when no data
/// directory is present
pub fn generate_simple_world(renderer: &mut MapRenderer) {
    let outlines: [&[(f64, f64)]; 4] = [
        // North America
        &[
            (-166.0, 68.5), (-164.0, 63.0), (-157.5, 58.5), (-152.0, 60.0),
            (-146.0, 60.8), (-137.5, 58.5), (-133.0, 55.0), (-130.0, 54.0),
            (-124.5, 48.3), (-124.0, 42.0), (-122.5, 37.8), (-120.5, 34.5),
            (-117.2, 32.7), (-114.8, 31.5), (-112.0, 29.0), (-109.5, 23.2),
            (-110.3, 24.3), (-114.0, 28.0), (-114.7, 31.7), (-112.5, 29.0),
            (-109.0, 25.8), (-105.7, 20.5), (-104.3, 19.1), (-100.0, 16.9),
            (-96.0, 15.7), (-94.5, 16.2), (-92.2, 14.5), (-89.0, 13.4),
            (-87.5, 13.0), (-85.7, 11.1), (-83.6, 8.5), (-79.5, 8.9),
            (-77.5, 8.6), (-79.0, 9.6), (-83.4, 10.4), (-83.7, 15.2),
            (-88.0, 15.8), (-88.3, 18.5), (-87.0, 21.5), (-90.3, 21.0),
            (-91.5, 18.6), (-94.5, 18.2), (-96.5, 19.9), (-97.8, 22.5),
            (-97.2, 25.9), (-97.4, 27.8), (-94.0, 29.7), (-89.6, 29.2),
            (-88.0, 30.6), (-84.3, 30.0), (-82.7, 27.5), (-81.1, 25.2),
            (-80.1, 26.8), (-81.3, 30.6), (-79.2, 33.2), (-75.5, 35.2),
            (-76.0, 37.0), (-74.0, 40.6), (-70.0, 41.6), (-70.7, 43.1),
            (-67.0, 44.8), (-64.5, 45.3), (-60.0, 46.2), (-64.8, 48.8),
            (-66.5, 50.2), (-59.0, 50.5), (-55.7, 52.0), (-58.0, 54.5),
            (-61.5, 56.5), (-64.5, 60.3), (-69.5, 58.8), (-77.5, 62.5),
            (-77.8, 58.0), (-76.7, 55.0), (-79.5, 51.5), (-82.3, 53.0),
            (-85.0, 55.3), (-92.5, 57.0), (-94.5, 59.0), (-93.0, 62.0),
            (-87.5, 66.5), (-95.5, 68.0), (-108.0, 68.3), (-116.0, 69.2),
            (-125.0, 70.0), (-134.5, 69.3), (-141.0, 69.7), (-156.5, 71.3),
            (-166.0, 68.5),
        ],
        // South America
        &[
            (-77.5, 8.6), (-75.5, 10.5), (-72.0, 12.0), (-71.0, 10.8),
            (-68.0, 10.5), (-62.5, 10.6), (-60.0, 8.5), (-57.0, 6.0),
            (-52.0, 4.5), (-50.0, 1.5), (-48.5, -1.0), (-44.0, -2.5),
            (-39.0, -3.5), (-35.0, -6.0), (-35.5, -9.5), (-38.5, -13.0),
            (-39.0, -17.5), (-41.0, -22.0), (-45.0, -23.8), (-48.5, -26.5),
            (-51.0, -31.0), (-53.5, -34.0), (-57.5, -38.0), (-62.0, -39.0),
            (-65.0, -42.0), (-67.5, -46.5), (-69.0, -51.5), (-68.5, -54.8),
            (-72.5, -53.5), (-75.0, -50.0), (-74.0, -44.0), (-73.5, -37.0),
            (-71.5, -30.0), (-70.5, -23.0), (-70.3, -18.5), (-76.0, -14.0),
            (-79.5, -7.0), (-81.0, -4.5), (-80.0, -2.0), (-80.0, 1.0),
            (-78.8, 2.0), (-77.5, 4.0), (-77.5, 8.6),
        ],
        // Cuba
        &[
            (-84.9, 21.9), (-81.5, 23.1), (-77.5, 22.0), (-74.2, 20.2),
            (-77.7, 19.9), (-80.5, 21.7), (-84.9, 21.9),
        ],
        // Hawaii (big island)
        &[
            (-155.9, 20.3), (-155.0, 19.7), (-155.7, 18.9), (-156.1, 19.7),
            (-155.9, 20.3),
        ],
    ];

    for outline in outlines {
        renderer.add_coastline(outline.to_vec(), Lod::Low);
    }
}
