//! Global Area Reference System: 30′ cells named `001AA`, split into 15′
//! quadrants and 5′ keypad cells.

use crate::grid::config::{GarsThresholds, GraticuleConfig};
use crate::grid::element::{ElementKind, GridElement};
use crate::grid::frame::PassContext;
use crate::grid::layer::{GridSystem, NeighbourView};
use crate::grid::params::{Color, GraticuleType, RenderingParams};
use crate::grid::systems::{label, meridian, parallel, sector_height};
use crate::grid::tile::{GridKey, GridTile, TileKey};
use crate::grid::tiles_support::{GridTilesSupport, RootSlot};
use crate::sector::Sector;

/// Latitude letters; I and O are skipped.
const LETTERS: &[u8; 24] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Subdivisions per level: 10° → 30′ → 15′ → 5′ → 30″.
const DIVISIONS: [u32; 4] = [20, 2, 3, 10];

/// Five-character id of the 30′ cell holding a point: longitude band
/// `001..=720` eastward from 180°W, then two letters counting half degrees
/// north from 90°S.
pub fn cell_id(lat: f64, lon: f64) -> String {
    let band = (((lon + 180.0) / 0.5).floor() as i64).clamp(0, 719) + 1;
    let idx = (((lat + 90.0) / 0.5).floor() as i64).clamp(0, 359) as usize;
    format!(
        "{band:03}{}{}",
        LETTERS[idx / 24] as char,
        LETTERS[idx % 24] as char
    )
}

/// Full designator down to the 5′ cell: `cell_id` + quadrant + keypad.
pub fn designator(lat: f64, lon: f64) -> String {
    let minutes = |v: f64| ((v * 60.0).rem_euclid(30.0)).floor() as u32;
    let (lat_min, lon_min) = (minutes(lat + 90.0), minutes(lon + 180.0));
    let (r, c) = (lat_min / 15, lon_min / 15);
    let (kr, kc) = ((lat_min % 15) / 5, (lon_min % 15) / 5);
    format!("{}{}{}", cell_id(lat, lon), quadrant(r, c), keypad(kr, kc))
}

/// 15′ quadrant number for a row/column counted from the south-west:
/// 1 NW, 2 NE, 3 SW, 4 SE.
fn quadrant(row: u32, col: u32) -> u32 {
    if row == 1 {
        1 + col
    } else {
        3 + col
    }
}

/// 5′ keypad number, 1 at the north-west corner reading like a phone pad.
fn keypad(row: u32, col: u32) -> u32 {
    (2 - row) * 3 + col + 1
}

/// GARS types drawn at a camera altitude. The 10° frame is always on.
pub fn bands_for_altitude(altitude: f64, t: &GarsThresholds) -> Vec<GraticuleType> {
    let mut bands = vec![GraticuleType::Gars10Deg];
    if altitude <= t.thirty_minute {
        bands.push(GraticuleType::Gars30Min);
    }
    if altitude <= t.fifteen_minute {
        bands.push(GraticuleType::Gars15Min);
    }
    if altitude <= t.five_minute {
        bands.push(GraticuleType::Gars5Min);
    }
    bands
}

/// Style of the lines drawn inside a tile at `level`.
fn line_type(level: u8) -> GraticuleType {
    match level {
        0 => GraticuleType::Gars30Min,
        1 => GraticuleType::Gars15Min,
        2 => GraticuleType::Gars5Min,
        _ => GraticuleType::GarsFine,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GarsGrid;

impl GridSystem for GarsGrid {
    /// Cell designator, empty for the 10° roots.
    type Desc = String;

    fn name(&self) -> &'static str {
        "GARS"
    }

    fn types(&self) -> &'static [GraticuleType] {
        &GraticuleType::GARS
    }

    fn default_params(ty: GraticuleType) -> RenderingParams {
        match ty {
            GraticuleType::Gars10Deg => RenderingParams::new(Color::WHITE, 1.0, 16.0),
            GraticuleType::Gars30Min => RenderingParams::new(Color::rgb(255, 255, 0), 1.0, 14.0),
            GraticuleType::Gars15Min => RenderingParams::new(Color::rgb(0, 255, 0), 1.0, 12.0),
            GraticuleType::Gars5Min => RenderingParams::new(Color::rgb(0, 255, 255), 1.0, 12.0),
            _ => RenderingParams::new(Color::rgb(0, 153, 255), 1.0, 10.0),
        }
    }

    fn root_layout(&self) -> GridTilesSupport {
        GridTilesSupport::regular(18, 36, Sector::FULL, |row, col| {
            TileKey::new(GridKey::Cell { row: row as u32, col: col as u32 }, 0)
        })
    }

    fn make_root(&self, slot: &RootSlot, _config: &GraticuleConfig) -> Option<GridTile<String>> {
        Some(GridTile::new(slot.sector, DIVISIONS[0], 0, sector_height(&slot.sector), String::new()))
    }

    fn build_elements(&self, tile: &GridTile<String>, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        let s = tile.sector;
        let mut out = Vec::new();
        if tile.level == 0 {
            out.push(meridian(pass.factory, s.min_lon, s.min_lat, s.max_lat(), GraticuleType::Gars10Deg, ElementKind::LineWest));
            if s.min_lat > -90.0 {
                out.push(parallel(pass.factory, s.min_lat, s.min_lon, s.max_lon(), GraticuleType::Gars10Deg, ElementKind::LineSouth));
            }
        } else {
            let ty = line_type(tile.level - 1);
            out.push(label(
                pass.factory,
                s.centroid(),
                tile.desc.clone(),
                tile.size,
                ty,
                ElementKind::GridZoneLabel,
            ));
        }

        let ty = line_type(tile.level);
        let d = tile.divisions;
        for i in 1..d {
            let t = i as f64 / d as f64;
            out.push(meridian(pass.factory, s.min_lon + s.delta_lon * t, s.min_lat, s.max_lat(), ty, ElementKind::Line));
            out.push(parallel(pass.factory, s.min_lat + s.delta_lat * t, s.min_lon, s.max_lon(), ty, ElementKind::Line));
        }
        out
    }

    fn can_descend(&self, tile: &GridTile<String>, pass: &PassContext<'_>) -> bool {
        let bands = bands_for_altitude(pass.frame.view.camera.altitude, &pass.config.gars_thresholds);
        match tile.level {
            0 => bands.contains(&GraticuleType::Gars15Min),
            1 => bands.contains(&GraticuleType::Gars5Min),
            2 => true,
            _ => false,
        }
    }

    fn make_children(
        &self,
        key: &TileKey,
        tile: &GridTile<String>,
        _pass: &PassContext<'_>,
    ) -> Vec<(TileKey, GridTile<String>)> {
        let GridKey::Cell { row, col } = key.grid else {
            return Vec::new();
        };
        let level = tile.level + 1;
        let Some(&child_divisions) = DIVISIONS.get(level as usize) else {
            return Vec::new();
        };
        let d = tile.divisions;
        tile.sector
            .subdivide(d)
            .into_iter()
            .enumerate()
            .map(|(i, sector)| {
                let (r, c) = (i as u32 / d, i as u32 % d);
                let desc = match tile.level {
                    0 => {
                        let center = sector.centroid();
                        cell_id(center.lat, center.lon)
                    }
                    1 => format!("{}{}", tile.desc, quadrant(r, c)),
                    _ => format!("{}{}", tile.desc, keypad(r, c)),
                };
                let key = TileKey::new(GridKey::Cell { row: row * d + r, col: col * d + c }, level);
                (key, GridTile::new(sector, child_divisions, level, sector_height(&sector), desc))
            })
            .collect()
    }

    /// 30′ lines are altitude gated on top of the pixel test.
    fn accept(
        &self,
        _tile: &GridTile<String>,
        element: &GridElement,
        _neighbours: NeighbourView,
        pass: &PassContext<'_>,
    ) -> bool {
        if element.ty == GraticuleType::Gars30Min && element.kind == ElementKind::Line {
            return pass.frame.view.camera.altitude <= pass.config.gars_thresholds.thirty_minute;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::frame::DrawContext;
    use crate::grid::layer::GraticuleLayer;
    use crate::shapes::{Shape, ShapeStore};
    use crate::view::{Camera, FlatTerrain, Globe};

    fn render_at(altitude: f64) -> (GraticuleLayer<GarsGrid>, ShapeStore) {
        let mut store = ShapeStore::new();
        let mut layer = GraticuleLayer::new(GarsGrid);
        let camera = Camera { lat: 45.1, lon: 10.1, altitude, ..Camera::default() };
        let terrain = FlatTerrain::default();
        let dc = DrawContext { frame_id: 0, camera: &camera, globe: &Globe::default(), elevation: &terrain };
        layer.render(&dc, &mut store);
        (layer, store)
    }

    #[test]
    fn cell_ids() {
        assert_eq!(cell_id(-89.9, -179.9), "001AA");
        assert_eq!(cell_id(0.1, 0.1), "361HN");
        assert_eq!(cell_id(89.9, 179.9), "720QZ");
        assert_eq!(designator(0.2, 0.2), "361HN33");
        assert_eq!(designator(0.49, 0.01), "361HN11");
        assert_eq!(designator(0.01, 0.49), "361HN49");
    }

    #[test]
    fn bands_follow_thresholds() {
        let t = GarsThresholds::default();
        // The 30′ band alone: its frame, none of its interior lines.
        assert_eq!(bands_for_altitude(5_000_000.0, &t), vec![GraticuleType::Gars10Deg]);
        assert_eq!(
            bands_for_altitude(100_000.0, &t),
            vec![
                GraticuleType::Gars10Deg,
                GraticuleType::Gars30Min,
                GraticuleType::Gars15Min,
                GraticuleType::Gars5Min
            ]
        );
        assert_eq!(bands_for_altitude(600_000.0, &t).len(), 3);
    }

    /// At 5 000 km only the 30′ band is selected, and without its interior
    /// lines all it draws is the 10° frame it carries.
    #[test]
    fn thirty_minute_band_alone_at_5000_km_draws_the_10_degree_frame() {
        let (layer, _) = render_at(5_000_000.0);
        assert!(layer.output().count(GraticuleType::Gars10Deg) > 0);
        for ty in [GraticuleType::Gars30Min, GraticuleType::Gars15Min, GraticuleType::Gars5Min] {
            assert_eq!(layer.output().count(ty), 0, "{ty}");
        }
    }

    #[test]
    fn low_camera_draws_every_band() {
        let (layer, store) = render_at(100_000.0);
        for ty in [GraticuleType::Gars30Min, GraticuleType::Gars15Min, GraticuleType::Gars5Min] {
            assert!(layer.output().count(ty) > 0, "{ty}");
        }
        let labels: Vec<String> = layer
            .renderables()
            .filter_map(|(h, _)| match store.get(h) {
                Some(Shape::Text { text, .. }) => Some(text.clone()),
                _ => None,
            })
            .collect();
        let here = cell_id(45.1, 10.1);
        assert!(labels.iter().any(|t| *t == here));
        assert!(labels.iter().any(|t| t.len() == 6 && t.starts_with(&here)));
    }

    #[test]
    fn quadrant_and_keypad_numbering() {
        assert_eq!(quadrant(1, 0), 1);
        assert_eq!(quadrant(1, 1), 2);
        assert_eq!(quadrant(0, 0), 3);
        assert_eq!(quadrant(0, 1), 4);
        assert_eq!(keypad(2, 0), 1);
        assert_eq!(keypad(1, 1), 5);
        assert_eq!(keypad(0, 2), 9);
    }
}
