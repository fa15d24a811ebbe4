//! Metric square grids shared by the UTM, UPS and MGRS layers.
//!
//! A zone tile (UTM zone, UPS cap or MGRS grid zone) owns its west and south
//! boundary and is cut into 100 km squares in the zone's own projection.
//! Squares recurse 10×10 down to 10 m. Every square line is densified,
//! unprojected and clipped to the zone so lines stop at the zone edge.

use std::collections::HashSet;

use crate::coords::{CoordinateService, ZoneId};
use crate::geo::LatLon;
use crate::grid::clip::clip_polyline;
use crate::grid::element::{ElementKind, GridElement};
use crate::grid::frame::PassContext;
use crate::grid::layer::NeighbourView;
use crate::grid::params::{GraticuleType, MetricFamily};
use crate::grid::systems::{label, meridian, parallel, polyline};
use crate::grid::tile::{GridKey, GridTile, RootKey, TileKey};
use crate::sector::Sector;

pub const SQUARE_100KM: f64 = 100_000.0;

/// Deepest square level (10 m squares).
pub const MAX_LEVEL: u8 = 5;

/// Longest unprojected segment of a square line.
const MAX_SEGMENT: f64 = 10_000.0;
const MAX_SEGMENTS: usize = 10;

/// Samples per zone edge when measuring the zone's projected extent.
const PERIMETER_SAMPLES: usize = 16;

/// Degrees; a clipped run this close to one zone edge is that edge.
const BOUNDARY_TOLERANCE: f64 = 1e-7;

/// UPS false origin; the pole.
const POLE: f64 = 2_000_000.0;

/// Which zone boundaries a zone tile draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edges {
    pub west: bool,
    pub south: bool,
    pub north: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoneTile {
    pub id: ZoneId,
    pub root: RootKey,
    /// Geographic extent that every square line is clipped to.
    pub clip: Sector,
    pub edges: Edges,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SquareTile {
    pub id: ZoneId,
    pub root: RootKey,
    pub clip: Sector,
    pub easting: f64,
    pub northing: f64,
    /// Side length in meters.
    pub size: f64,
    pub north: Option<TileKey>,
    pub east: Option<TileKey>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProjectedTile {
    Zone(ZoneTile),
    Square(SquareTile),
    /// MGRS zone/band overview.
    Overview,
}

/// East-west width of a sector at its middle latitude, in meters.
pub fn zone_width(sector: &Sector) -> f64 {
    let mid = sector.centroid().lat.to_radians();
    sector.delta_lon.to_radians() * crate::geo::EARTH_RADIUS * mid.cos()
}

/// A zone tile with divisions matching its 100 km squares.
pub fn zone_tile(zone: ZoneTile) -> GridTile<ProjectedTile> {
    let sector = zone.clip;
    let size = zone_width(&sector);
    let divisions = ((size / SQUARE_100KM).round() as u32).max(1);
    GridTile::new(sector, divisions, 0, size, ProjectedTile::Zone(zone))
}

/// Projected bounds of a geographic sector in a forced zone, snapped out to
/// multiples of `step`. `None` when no perimeter point projects.
pub fn projected_range(
    coords: &dyn CoordinateService,
    id: ZoneId,
    sector: &Sector,
    step: f64,
) -> Option<(f64, f64, f64, f64)> {
    let mut min_e = f64::MAX;
    let mut max_e = f64::MIN;
    let mut min_n = f64::MAX;
    let mut max_n = f64::MIN;
    let n = PERIMETER_SAMPLES;
    for i in 0..=n {
        let t = i as f64 / n as f64;
        let lat = sector.min_lat + sector.delta_lat * t;
        let lon = sector.min_lon + sector.delta_lon * t;
        for p in [
            LatLon::new(sector.min_lat, lon),
            LatLon::new(sector.max_lat(), lon),
            LatLon::new(lat, sector.min_lon),
            LatLon::new(lat, sector.max_lon()),
        ] {
            let Some((e, n)) = coords.zone_forward(id, p) else {
                continue;
            };
            if !e.is_finite() || !n.is_finite() {
                continue;
            }
            min_e = min_e.min(e);
            max_e = max_e.max(e);
            min_n = min_n.min(n);
            max_n = max_n.max(n);
        }
    }
    if min_e > max_e || min_n > max_n {
        return None;
    }
    Some((
        (min_e / step).floor() * step,
        (max_e / step).ceil() * step,
        (min_n / step).floor() * step,
        (max_n / step).ceil() * step,
    ))
}

/// Geographic cull sector of a square, or `None` when every corner falls
/// outside the zone or a corner does not unproject.
pub fn square_sector(
    coords: &dyn CoordinateService,
    id: ZoneId,
    clip: &Sector,
    easting: f64,
    northing: f64,
    size: f64,
) -> Option<Sector> {
    let at = |e: f64, n: f64| coords.zone_inverse(id, e, n);
    let corners = [
        at(easting, northing)?,
        at(easting + size, northing)?,
        at(easting + size, northing + size)?,
        at(easting, northing + size)?,
    ];
    if !corners.iter().any(|c| clip.contains(*c)) {
        return None;
    }
    let half = size / 2.0;
    let midpoints = [
        at(easting + half, northing)?,
        at(easting + size, northing + half)?,
        at(easting + half, northing + size)?,
        at(easting, northing + half)?,
    ];
    let mut bounds = Sector::bounding(corners.into_iter().chain(midpoints));

    // A square around a UPS pole spans every longitude of the cap.
    if matches!(id, ZoneId::Ups(_))
        && (easting..=easting + size).contains(&POLE)
        && (northing..=northing + size).contains(&POLE)
    {
        let (min_lat, max_lat) = if clip.max_lat() >= 90.0 {
            (bounds.min_lat, 90.0)
        } else {
            (-90.0, bounds.max_lat())
        };
        bounds = Sector::from_bounds(min_lat, max_lat, clip.min_lon, clip.max_lon());
    }
    let sector = bounds.intersection(clip);
    (!sector.is_empty()).then_some(sector)
}

/// True when every point hugs the same edge of `sector`.
fn on_one_edge(points: &[LatLon], sector: &Sector) -> bool {
    let t = BOUNDARY_TOLERANCE;
    let along = |f: &dyn Fn(&LatLon) -> bool| points.iter().all(f);
    along(&|p| (p.lat - sector.min_lat).abs() <= t)
        || along(&|p| (p.lat - sector.max_lat()).abs() <= t)
        || along(&|p| (p.lon - sector.min_lon).abs() <= t)
        || along(&|p| (p.lon - sector.max_lon()).abs() <= t)
}

/// The parts of a straight projected line inside the zone, as geographic
/// polylines.
pub fn clipped_line(
    coords: &dyn CoordinateService,
    id: ZoneId,
    clip: &Sector,
    from: (f64, f64),
    to: (f64, f64),
) -> Vec<Vec<LatLon>> {
    let length = (to.0 - from.0).hypot(to.1 - from.1);
    let segments = ((length / MAX_SEGMENT).ceil() as usize).clamp(1, MAX_SEGMENTS);
    let points: Vec<LatLon> = (0..=segments)
        .filter_map(|i| {
            let t = i as f64 / segments as f64;
            coords.zone_inverse(id, from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
        })
        .filter(|p| p.lat.is_finite() && p.lon.is_finite())
        .collect();
    clip_polyline(&points, clip)
        .into_iter()
        .filter(|run| !on_one_edge(run, clip))
        .collect()
}

/// Style and behavior shared by the projected systems.
#[derive(Clone, Copy, Debug)]
pub struct ProjectedGrid {
    pub family: MetricFamily,
    /// Type of zone boundary lines.
    pub zone_type: GraticuleType,
    /// Label 100 km squares with their MGRS letters.
    pub square_labels: bool,
}

impl ProjectedGrid {
    fn metric_type(&self, spacing: f64) -> Option<GraticuleType> {
        GraticuleType::metric(self.family, spacing)
    }

    /// A zone the coordinate service cannot project draws nothing.
    fn projects(zone: &ZoneTile, pass: &PassContext<'_>) -> bool {
        pass.coords.zone_forward(zone.id, zone.clip.centroid()).is_some()
    }

    pub fn zone_elements(&self, tile: &GridTile<ProjectedTile>, zone: &ZoneTile, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        let s = tile.sector;
        let ty = self.zone_type;
        let mut out = Vec::new();
        if zone.edges.west {
            out.push(meridian(pass.factory, s.min_lon, s.min_lat, s.max_lat(), ty, ElementKind::LineWest));
        }
        if zone.edges.south && s.min_lat > -90.0 {
            out.push(parallel(pass.factory, s.min_lat, s.min_lon, s.max_lon(), ty, ElementKind::LineSouth));
        }
        if zone.edges.north && s.max_lat() < 90.0 {
            out.push(parallel(pass.factory, s.max_lat(), s.min_lon, s.max_lon(), ty, ElementKind::LineNorth));
        }
        if let Some(text) = &zone.label {
            out.push(label(pass.factory, s.centroid(), text.clone(), tile.size, ty, ElementKind::GridZoneLabel));
        }
        out
    }

    pub fn square_elements(&self, square: &SquareTile, level: u8, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        let SquareTile { id, clip, easting: e, northing: n, size, .. } = *square;
        let mut out = Vec::new();

        if level == 1 {
            if let Some(ty) = self.metric_type(size) {
                let edges = [
                    (ElementKind::LineWest, e, (e, n), (e, n + size)),
                    (ElementKind::LineSouth, n, (e, n), (e + size, n)),
                    (ElementKind::LineEast, e + size, (e + size, n), (e + size, n + size)),
                    (ElementKind::LineNorth, n + size, (e, n + size), (e + size, n + size)),
                ];
                for (kind, value, from, to) in edges {
                    for run in clipped_line(pass.coords, id, &clip, from, to) {
                        out.extend(polyline(pass.factory, &run, ty, kind, value));
                    }
                }
            }
            if self.square_labels {
                let center = (e + size / 2.0, n + size / 2.0);
                let text = pass.coords.mgrs_square_id(id, center.0, center.1);
                let at = pass.coords.zone_inverse(id, center.0, center.1);
                if let (Some(text), Some(mut at)) = (text, at) {
                    if !clip.contains(at) {
                        at = square_sector(pass.coords, id, &clip, e, n, size).map_or(at, |s| s.centroid());
                    }
                    if let Some(ty) = self.metric_type(size) {
                        out.push(label(pass.factory, at, text, size, ty, ElementKind::GridZoneLabel));
                    }
                }
            }
        }

        let spacing = size / 10.0;
        if spacing < pass.config.max_resolution {
            return out;
        }
        let Some(ty) = self.metric_type(spacing) else {
            return out;
        };
        for i in 1..10 {
            let x = e + spacing * i as f64;
            for run in clipped_line(pass.coords, id, &clip, (x, n), (x, n + size)) {
                out.extend(polyline(pass.factory, &run, ty, ElementKind::LineEasting, x));
            }
            let y = n + spacing * i as f64;
            for run in clipped_line(pass.coords, id, &clip, (e, y), (e + size, y)) {
                out.extend(polyline(pass.factory, &run, ty, ElementKind::LineNorthing, y));
            }
        }
        out
    }

    /// 100 km squares covering a zone, each knowing its north and east
    /// neighbours.
    pub fn make_squares(&self, zone: &ZoneTile, coords: &dyn CoordinateService) -> Vec<(TileKey, GridTile<ProjectedTile>)> {
        let size = SQUARE_100KM;
        let Some((e0, e1, n0, n1)) = projected_range(coords, zone.id, &zone.clip, size) else {
            return Vec::new();
        };
        let key = |e: f64, n: f64| {
            TileKey::new(
                GridKey::Square { root: zone.root, easting: e as i64, northing: n as i64 },
                1,
            )
        };

        let mut kept = Vec::new();
        let mut n = n0;
        while n < n1 {
            let mut e = e0;
            while e < e1 {
                if let Some(sector) = square_sector(coords, zone.id, &zone.clip, e, n, size) {
                    kept.push((e, n, sector));
                }
                e += size;
            }
            n += size;
        }

        let present: HashSet<TileKey> = kept.iter().map(|&(e, n, _)| key(e, n)).collect();
        kept.into_iter()
            .map(|(e, n, sector)| {
                let north = Some(key(e, n + size)).filter(|k| present.contains(k));
                let east = Some(key(e + size, n)).filter(|k| present.contains(k));
                let desc = ProjectedTile::Square(SquareTile {
                    id: zone.id,
                    root: zone.root,
                    clip: zone.clip,
                    easting: e,
                    northing: n,
                    size,
                    north,
                    east,
                });
                (key(e, n), GridTile::new(sector, 10, 1, size, desc))
            })
            .collect()
    }

    /// The 10×10 squares inside a square.
    pub fn make_sub_squares(
        &self,
        square: &SquareTile,
        level: u8,
        coords: &dyn CoordinateService,
    ) -> Vec<(TileKey, GridTile<ProjectedTile>)> {
        let size = square.size / 10.0;
        let mut out = Vec::new();
        for row in 0..10 {
            for col in 0..10 {
                let e = square.easting + size * col as f64;
                let n = square.northing + size * row as f64;
                let Some(sector) = square_sector(coords, square.id, &square.clip, e, n, size) else {
                    continue;
                };
                let key = TileKey::new(
                    GridKey::Square { root: square.root, easting: e.round() as i64, northing: n.round() as i64 },
                    level + 1,
                );
                let desc = ProjectedTile::Square(SquareTile {
                    easting: e,
                    northing: n,
                    size,
                    north: None,
                    east: None,
                    ..square.clone()
                });
                out.push((key, GridTile::new(sector, 10, level + 1, size, desc)));
            }
        }
        out
    }

    pub fn build_elements(&self, tile: &GridTile<ProjectedTile>, pass: &mut PassContext<'_>) -> Vec<GridElement> {
        match &tile.desc {
            ProjectedTile::Zone(zone) if Self::projects(zone, pass) => self.zone_elements(tile, zone, pass),
            ProjectedTile::Zone(_) => Vec::new(),
            ProjectedTile::Square(square) => self.square_elements(square, tile.level, pass),
            ProjectedTile::Overview => Vec::new(),
        }
    }

    pub fn can_descend(&self, tile: &GridTile<ProjectedTile>, pass: &PassContext<'_>) -> bool {
        match &tile.desc {
            ProjectedTile::Zone(zone) => Self::projects(zone, pass),
            ProjectedTile::Square(square) => {
                tile.level < MAX_LEVEL && square.size / 100.0 >= pass.config.max_resolution
            }
            ProjectedTile::Overview => false,
        }
    }

    pub fn make_children(
        &self,
        tile: &GridTile<ProjectedTile>,
        coords: &dyn CoordinateService,
    ) -> Vec<(TileKey, GridTile<ProjectedTile>)> {
        match &tile.desc {
            ProjectedTile::Zone(zone) => self.make_squares(zone, coords),
            ProjectedTile::Square(square) => self.make_sub_squares(square, tile.level, coords),
            ProjectedTile::Overview => Vec::new(),
        }
    }

    pub fn neighbours(&self, tile: &GridTile<ProjectedTile>) -> [Option<TileKey>; 2] {
        match &tile.desc {
            ProjectedTile::Square(square) => [square.north, square.east],
            _ => [None, None],
        }
    }

    /// A square leaves a shared edge to the neighbour that draws it as its
    /// south or west edge.
    pub fn accept(&self, element: &GridElement, neighbours: NeighbourView) -> bool {
        match element.kind {
            ElementKind::LineNorth => !neighbours.north,
            ElementKind::LineEast => !neighbours.east,
            _ => true,
        }
    }

    /// Feed interior square lines of the active zone to the ruler labels.
    pub fn observe(&self, tile: &GridTile<ProjectedTile>, element: &GridElement, pass: &mut PassContext<'_>) {
        let ProjectedTile::Square(square) = &tile.desc else {
            return;
        };
        let ZoneId::Utm { zone, hemisphere } = square.id else {
            return;
        };
        if let Some(scale) = pass.scale.as_deref_mut() {
            scale.observe(zone, hemisphere, element.kind, element.value, square.size);
        }
    }
}
