//! GeoJSON snapshot of a layer's current output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::error::{GraticuleError, Result};
use crate::grid::layer::{GraticuleLayer, GridSystem};
use crate::grid::params::GraticuleType;
use crate::shapes::{Shape, ShapeStore};

fn feature(geometry: Value, ty: GraticuleType, text: Option<&str>) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("type".into(), JsonValue::from(ty.name()));
    if let Some(text) = text {
        properties.insert("text".into(), JsonValue::from(text));
    }
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Lines become `LineString`s and labels `Point`s with a `text` property;
/// every feature carries its graticule type name. Handles missing from
/// `store` are skipped.
pub fn to_feature_collection<S: GridSystem>(layer: &GraticuleLayer<S>, store: &ShapeStore) -> FeatureCollection {
    let features = layer
        .renderables()
        .filter_map(|(handle, ty)| match store.get(handle)? {
            Shape::Line { positions, .. } => {
                let coords = positions.iter().map(|p| vec![p.lon, p.lat]).collect();
                Some(feature(Value::LineString(coords), ty, None))
            }
            Shape::Text { position, text, .. } => {
                Some(feature(Value::Point(vec![position.lon, position.lat]), ty, Some(text)))
            }
        })
        .collect();
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn write_geojson<S: GridSystem>(layer: &GraticuleLayer<S>, store: &ShapeStore, path: &Path) -> Result<usize> {
    let collection = to_feature_collection(layer, store);
    let io_err = |source| GraticuleError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer(&mut out, &collection)?;
    out.flush().map_err(io_err)?;
    Ok(collection.features.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::frame::DrawContext;
    use crate::grid::systems::LatLonGrid;
    use crate::view::{Camera, FlatTerrain, Globe};

    #[test]
    fn exports_lines_and_labels() {
        let mut store = ShapeStore::new();
        let mut layer = GraticuleLayer::new(LatLonGrid);
        let camera = Camera { lat: 20.0, lon: 20.0, altitude: 3_000_000.0, ..Camera::default() };
        let terrain = FlatTerrain::default();
        let dc = DrawContext { frame_id: 0, camera: &camera, globe: &Globe::default(), elevation: &terrain };
        layer.render(&dc, &mut store);

        let fc = to_feature_collection(&layer, &store);
        assert_eq!(fc.features.len(), layer.output().len());

        let mut lines = 0;
        let mut points = 0;
        for f in &fc.features {
            let props = f.properties.as_ref().unwrap();
            let ty = props["type"].as_str().unwrap();
            assert!(GraticuleType::from_name(ty).is_some(), "{ty}");
            match &f.geometry.as_ref().unwrap().value {
                Value::LineString(coords) => {
                    assert!(coords.len() >= 2);
                    lines += 1;
                }
                Value::Point(_) => {
                    assert!(props["text"].is_string());
                    points += 1;
                }
                other => panic!("unexpected geometry {other:?}"),
            }
        }
        assert!(lines > 0 && points > 0);

        let json = serde_json::to_string(&fc).unwrap();
        assert!(json.contains("\"FeatureCollection\""));
    }
}
