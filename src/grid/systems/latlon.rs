//! Plain latitude/longitude graticule, 10° down to 0.0001°.

use crate::geo::{LatLon, Position};
use crate::grid::config::GraticuleConfig;
use crate::grid::element::{ElementKind, GridElement};
use crate::grid::frame::PassContext;
use crate::grid::labels::{format_angle, AngleFormat, Axis};
use crate::grid::layer::GridSystem;
use crate::grid::params::{Color, GraticuleType, RenderingParams};
use crate::grid::systems::{meridian, parallel, sector_height};
use crate::grid::tile::{GridKey, GridTile, TileKey};
use crate::grid::tiles_support::{GridTilesSupport, RootSlot};
use crate::sector::Sector;

/// Deepest tile level; its interior lines are the finest type.
pub const MAX_LEVEL: u8 = 4;

/// Subdivisions of a tile at `level`. Sexagesimal formats cut degrees and
/// ten-minute cells into six so lines fall on whole minutes and seconds.
pub fn divisions(level: u8, format: AngleFormat) -> u32 {
    match level {
        1 | 3 if format.is_sexagesimal() => 6,
        _ => 10,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LatLonGrid;

impl GridSystem for LatLonGrid {
    type Desc = ();

    fn name(&self) -> &'static str {
        "lat/lon"
    }

    fn types(&self) -> &'static [GraticuleType] {
        &GraticuleType::LAT_LON
    }

    fn default_params(ty: GraticuleType) -> RenderingParams {
        match ty {
            GraticuleType::LatLon10Deg => RenderingParams::new(Color::WHITE, 1.0, 16.0),
            GraticuleType::LatLon1Deg => RenderingParams::new(Color::rgb(0, 255, 0), 1.0, 14.0),
            GraticuleType::LatLon0_1Deg => RenderingParams::new(Color::rgb(0, 255, 255), 1.0, 12.0),
            GraticuleType::LatLon0_01Deg => RenderingParams::new(Color::rgb(0, 153, 255), 1.0, 12.0),
            GraticuleType::LatLon0_001Deg => RenderingParams::new(Color::rgb(153, 153, 255), 1.0, 12.0),
            _ => RenderingParams::new(Color::rgb(204, 204, 255), 1.0, 12.0),
        }
    }

    fn root_layout(&self) -> GridTilesSupport {
        GridTilesSupport::regular(18, 36, Sector::FULL, |row, col| {
            TileKey::new(GridKey::Cell { row: row as u32, col: col as u32 }, 0)
        })
    }

    fn make_root(&self, slot: &RootSlot, config: &GraticuleConfig) -> Option<GridTile<()>> {
        Some(GridTile::new(
            slot.sector,
            divisions(0, config.angle_format),
            0,
            sector_height(&slot.sector),
            (),
        ))
    }

    fn build_elements(&self, tile: &GridTile<()>, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        let s = tile.sector;
        let mut out = Vec::with_capacity(2 * tile.divisions as usize);
        if tile.level == 0 {
            out.push(meridian(
                pass.factory,
                s.min_lon,
                s.min_lat,
                s.max_lat(),
                GraticuleType::LatLon10Deg,
                ElementKind::LineWest,
            ));
            // The south pole parallel is a point.
            if s.min_lat > -90.0 {
                out.push(parallel(
                    pass.factory,
                    s.min_lat,
                    s.min_lon,
                    s.max_lon(),
                    GraticuleType::LatLon10Deg,
                    ElementKind::LineSouth,
                ));
            }
        }

        let Some(ty) = GraticuleType::lat_lon_level(tile.level as usize + 1) else {
            return out;
        };
        let d = tile.divisions;
        for i in 1..d {
            let t = i as f64 / d as f64;
            let lon = s.min_lon + s.delta_lon * t;
            out.push(meridian(pass.factory, lon, s.min_lat, s.max_lat(), ty, ElementKind::Line));
            let lat = s.min_lat + s.delta_lat * t;
            out.push(parallel(pass.factory, lat, s.min_lon, s.max_lon(), ty, ElementKind::Line));
        }
        out
    }

    fn can_descend(&self, tile: &GridTile<()>, _pass: &PassContext<'_>) -> bool {
        tile.level < MAX_LEVEL
    }

    fn make_children(&self, key: &TileKey, tile: &GridTile<()>, pass: &PassContext<'_>) -> Vec<(TileKey, GridTile<()>)> {
        let GridKey::Cell { row, col } = key.grid else {
            return Vec::new();
        };
        let d = tile.divisions;
        let level = tile.level + 1;
        let child_divisions = divisions(level, pass.config.angle_format);
        tile.sector
            .subdivide(d)
            .into_iter()
            .enumerate()
            .map(|(i, sector)| {
                let (r, c) = (i as u32 / d, i as u32 % d);
                let key = TileKey::new(GridKey::Cell { row: row * d + r, col: col * d + c }, level);
                (key, GridTile::new(sector, child_divisions, level, sector_height(&sector), ()))
            })
            .collect()
    }

    /// Ruler label where the line crosses the label anchor, once per value.
    fn on_selected(&self, tile: &GridTile<()>, element: &GridElement, pass: &mut PassContext<'_>) {
        let Some(axis) = element.axis() else {
            return;
        };
        let resolution = match element.kind {
            ElementKind::Line => tile.sector.delta_lat / tile.divisions as f64,
            _ => tile.sector.delta_lat,
        };
        let anchor = pass.frame.label_anchor;
        let at = match axis {
            Axis::Latitude => LatLon::new(element.value, anchor.lon),
            Axis::Longitude => LatLon::new(anchor.lat, element.value),
        };
        if !element.sector.contains(at) || !pass.dedup.insert(axis, element.value) {
            return;
        }
        let text = format_angle(element.value, resolution, pass.config.angle_format, axis);
        let handle = pass
            .factory
            .create_text(Position::new(at.lat, at.lon, 0.0), text, resolution * 1e6);
        pass.output.add_transient(handle, element.ty);
    }
}
