use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use graticule::geo::LatLon;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Coastline files tried in order; the first one found wins.
const COASTLINE_FILES: [&str; 3] = ["ne_110m_coastline.json", "ne_50m_coastline.json", "natural-earth.json"];

/// Load the coastline backdrop from `data_dir`, empty when nothing is there.
pub fn load_coastlines(data_dir: &Path) -> Vec<Vec<LatLon>> {
    for filename in COASTLINE_FILES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_lines(&path) {
            Ok(lines) => {
                info!(path = %path.display(), lines = lines.len(), "loaded coastlines");
                return lines;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "cannot load coastlines"),
        }
    }
    Vec::new()
}

fn read_lines(path: &Path) -> Result<Vec<Vec<LatLon>>> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;
    let mut lines = Vec::new();
    process_geojson_lines(&geojson, |line| lines.push(line));
    Ok(lines)
}

/// Extract every line and polygon exterior ring
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(Vec<LatLon>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn to_line(coords: &[Vec<f64>]) -> Vec<LatLon> {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| LatLon::new(c[1], c[0]))
        .collect()
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<LatLon>),
{
    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_and_polygon_rings() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[10.0, 50.0], [11.0, 51.0]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]], [[0.2, 0.2], [0.3, 0.2], [0.2, 0.2]]]}}
            ]
        }"#;
        let geojson: GeoJson = text.parse().unwrap();
        let mut lines = Vec::new();
        process_geojson_lines(&geojson, |l| lines.push(l));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][1], LatLon::new(51.0, 11.0));
        assert_eq!(lines[1].len(), 4);
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(load_coastlines(Path::new("/nonexistent")).is_empty());
    }
}
