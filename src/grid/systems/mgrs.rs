//! MGRS: a zone/band overview from far away, grid zones closer in, then
//! lettered 100 km squares and their metric subdivisions.

use std::collections::BTreeMap;

use crate::coords::mgrs::{band_extent, grid_zone_lon_extent, BANDS};
use crate::coords::{utm, Hemisphere, PolarCap, ZoneId};
use crate::geo::LatLon;
use crate::grid::config::GraticuleConfig;
use crate::grid::element::{ElementKind, GridElement};
use crate::grid::frame::PassContext;
use crate::grid::layer::{GridSystem, NeighbourView};
use crate::grid::params::{Color, GraticuleType, MetricFamily, RenderingParams};
use crate::grid::systems::projected::{zone_tile, Edges, ProjectedGrid, ProjectedTile, ZoneTile};
use crate::grid::systems::{label, meridian, parallel, sector_height};
use crate::grid::tile::{GridKey, GridTile, RootKey, TileKey};
use crate::grid::tiles_support::{GridTilesSupport, RootSlot};
use crate::sector::Sector;

const GRID: ProjectedGrid = ProjectedGrid {
    family: MetricFamily::Mgrs,
    zone_type: GraticuleType::MgrsGridZone,
    square_labels: true,
};

const ROWS: usize = 23;
const COLS: usize = 60;
const OVERVIEW_ROW: usize = 22;

/// Parallels carrying the overview's zone numbers.
const ZONE_LABEL_LATS: [f64; 3] = [-48.0, 0.0, 48.0];

pub const OVERVIEW_KEY: TileKey = TileKey::new(GridKey::Overview, 0);

pub fn grid_zone_key(zone: u8, band: u8) -> TileKey {
    TileKey::new(GridKey::Root(RootKey::GridZone { zone, band }), 0)
}

pub fn cap_key(cap: PolarCap) -> TileKey {
    TileKey::new(GridKey::Root(RootKey::Zone(ZoneId::Ups(cap))), 0)
}

/// Geographic extent of a grid zone, `None` where the zone does not exist.
pub fn grid_zone_sector(zone: u8, band: usize) -> Option<Sector> {
    let (west, width) = grid_zone_lon_extent(zone, band)?;
    let (south, height) = band_extent(band);
    Some(Sector::new(south, west, height, width))
}

/// West boundaries of every grid zone, merged into one latitude run per
/// unbroken stretch of meridian.
pub fn zone_meridians() -> Vec<(f64, f64, f64)> {
    // Keyed by millidegrees so equal meridians merge.
    let mut runs: BTreeMap<i64, Vec<(f64, f64)>> = BTreeMap::new();
    for band in 0..BANDS.len() {
        for zone in 1..=60u8 {
            let Some(s) = grid_zone_sector(zone, band) else {
                continue;
            };
            let spans = runs.entry((s.min_lon * 1000.0).round() as i64).or_default();
            match spans.last_mut() {
                Some(last) if (last.1 - s.min_lat).abs() < 1e-9 => last.1 = s.max_lat(),
                _ => spans.push((s.min_lat, s.max_lat())),
            }
        }
    }
    runs.into_iter()
        .flat_map(|(lon, spans)| {
            let lon = lon as f64 / 1000.0;
            spans.into_iter().map(move |(min, max)| (lon, min, max))
        })
        .collect()
}

/// Grid zones exist in the UTM band; the caps cover the rest.
fn mgrs_params(ty: GraticuleType) -> RenderingParams {
    match ty {
        GraticuleType::MgrsOverview => RenderingParams::new(Color::rgb(204, 204, 204), 1.0, 16.0),
        GraticuleType::MgrsGridZone => RenderingParams::new(Color::WHITE, 1.0, 16.0),
        GraticuleType::Mgrs100Km => RenderingParams::new(Color::rgb(0, 255, 0), 1.0, 14.0),
        GraticuleType::Mgrs10Km => RenderingParams::new(Color::rgb(0, 102, 255), 1.0, 14.0),
        GraticuleType::Mgrs1Km => RenderingParams::new(Color::rgb(0, 255, 255), 1.0, 12.0),
        GraticuleType::Mgrs100M => RenderingParams::new(Color::rgb(0, 153, 153), 1.0, 12.0),
        _ => RenderingParams::new(Color::rgb(102, 255, 204), 1.0, 10.0),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MgrsGrid;

impl MgrsGrid {
    fn overview_elements(&self, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        let ty = GraticuleType::MgrsOverview;
        let mut out = Vec::new();
        for (lon, min_lat, max_lat) in zone_meridians() {
            out.push(meridian(pass.factory, lon, min_lat, max_lat, ty, ElementKind::LineWest));
        }
        for band in 0..BANDS.len() {
            let (south, _) = band_extent(band);
            out.push(parallel(pass.factory, south, -180.0, 180.0, ty, ElementKind::LineSouth));
        }
        out.push(parallel(pass.factory, utm::MAX_LAT, -180.0, 180.0, ty, ElementKind::LineNorth));

        for zone in 1..=60u8 {
            let lon = utm::central_meridian(zone);
            for lat in ZONE_LABEL_LATS {
                out.push(label(pass.factory, LatLon::new(lat, lon), zone.to_string(), 6.0, ty, ElementKind::GridZoneLabel));
            }
            if zone % 10 != 1 {
                continue;
            }
            for (band, letter) in BANDS.iter().enumerate() {
                let (south, height) = band_extent(band);
                let at = LatLon::new(south + height / 2.0, lon);
                out.push(label(pass.factory, at, letter.to_string(), 8.0, ty, ElementKind::GridZoneLabel));
            }
        }
        out
    }
}

impl GridSystem for MgrsGrid {
    type Desc = ProjectedTile;

    fn name(&self) -> &'static str {
        "MGRS"
    }

    fn types(&self) -> &'static [GraticuleType] {
        &GraticuleType::MGRS
    }

    fn default_params(ty: GraticuleType) -> RenderingParams {
        mgrs_params(ty)
    }

    /// Row 0 holds caps A/B, rows 1..=20 the bands C..X by zone, row 21 the
    /// caps Y/Z and row 22 the overview.
    fn root_layout(&self) -> GridTilesSupport {
        let mut slots = Vec::new();
        for (i, cap) in PolarCap::ALL.into_iter().enumerate() {
            slots.push(RootSlot {
                row: if i < 2 { 0 } else { ROWS - 2 },
                col: i % 2,
                key: cap_key(cap),
                sector: cap.sector(),
            });
        }
        for band in 0..BANDS.len() {
            for zone in 1..=60u8 {
                let Some(sector) = grid_zone_sector(zone, band) else {
                    continue;
                };
                slots.push(RootSlot {
                    row: band + 1,
                    col: zone as usize - 1,
                    key: grid_zone_key(zone, band as u8),
                    sector,
                });
            }
        }
        slots.push(RootSlot { row: OVERVIEW_ROW, col: 0, key: OVERVIEW_KEY, sector: Sector::FULL });
        GridTilesSupport::new(ROWS, COLS, slots)
    }

    fn make_root(&self, slot: &RootSlot, _config: &GraticuleConfig) -> Option<GridTile<ProjectedTile>> {
        match slot.key.grid {
            GridKey::Overview => Some(GridTile::new(
                Sector::FULL,
                1,
                0,
                sector_height(&Sector::FULL),
                ProjectedTile::Overview,
            )),
            GridKey::Root(root @ RootKey::GridZone { zone, band }) => {
                let hemisphere = if band >= 10 { Hemisphere::North } else { Hemisphere::South };
                let letter = BANDS.get(band as usize)?;
                Some(zone_tile(ZoneTile {
                    id: ZoneId::Utm { zone, hemisphere },
                    root,
                    clip: slot.sector,
                    edges: Edges { west: true, south: true, north: band as usize == BANDS.len() - 1 },
                    label: Some(format!("{zone}{letter}")),
                }))
            }
            GridKey::Root(root @ RootKey::Zone(id @ ZoneId::Ups(cap))) => Some(zone_tile(ZoneTile {
                id,
                root,
                clip: slot.sector,
                // The ±80°/84° parallels belong to bands C and X.
                edges: Edges { west: true, south: false, north: false },
                label: Some(cap.letter().to_string()),
            })),
            _ => None,
        }
    }

    /// The overview and the grid zones take turns around the zone altitude.
    fn root_enabled(&self, key: &TileKey, pass: &PassContext<'_>) -> bool {
        let far = pass.frame.view.camera.altitude > pass.config.mgrs_zone_max_altitude;
        (key.grid == GridKey::Overview) == far
    }

    fn build_elements(&self, tile: &GridTile<ProjectedTile>, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        match tile.desc {
            ProjectedTile::Overview => self.overview_elements(pass),
            _ => GRID.build_elements(tile, pass),
        }
    }

    fn can_descend(&self, tile: &GridTile<ProjectedTile>, pass: &PassContext<'_>) -> bool {
        GRID.can_descend(tile, pass)
    }

    fn make_children(
        &self,
        _key: &TileKey,
        tile: &GridTile<ProjectedTile>,
        pass: &PassContext<'_>,
    ) -> Vec<(TileKey, GridTile<ProjectedTile>)> {
        GRID.make_children(tile, pass.coords)
    }

    fn neighbours(&self, tile: &GridTile<ProjectedTile>) -> [Option<TileKey>; 2] {
        GRID.neighbours(tile)
    }

    fn accept(
        &self,
        _tile: &GridTile<ProjectedTile>,
        element: &GridElement,
        neighbours: NeighbourView,
        _pass: &PassContext<'_>,
    ) -> bool {
        GRID.accept(element, neighbours)
    }

    fn on_selected(&self, tile: &GridTile<ProjectedTile>, element: &GridElement, pass: &mut PassContext<'_>) {
        GRID.observe(tile, element, pass);
    }

    fn metric_family(&self) -> Option<MetricFamily> {
        Some(MetricFamily::Mgrs)
    }
}
