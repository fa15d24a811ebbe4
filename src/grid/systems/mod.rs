//! Grid system strategies and the element builders they share.

pub mod gars;
pub mod latlon;
pub mod mgrs;
pub mod projected;
pub mod ups;
pub mod utm;

pub use gars::GarsGrid;
pub use latlon::LatLonGrid;
pub use mgrs::MgrsGrid;
pub use ups::UpsGrid;
pub use utm::UtmGrid;

use crate::geo::{LatLon, Position, EARTH_RADIUS};
use crate::grid::element::{ElementKind, GridElement};
use crate::grid::params::GraticuleType;
use crate::sector::Sector;
use crate::shapes::{PathType, ShapeFactory};

/// North-south extent of a sector in meters.
#[inline(always)]
pub(crate) fn sector_height(sector: &Sector) -> f64 {
    sector.delta_lat.to_radians() * EARTH_RADIUS
}

pub(crate) fn meridian(
    factory: &mut dyn ShapeFactory,
    lon: f64,
    min_lat: f64,
    max_lat: f64,
    ty: GraticuleType,
    kind: ElementKind,
) -> GridElement {
    let positions = vec![Position::new(min_lat, lon, 0.0), Position::new(max_lat, lon, 0.0)];
    let handle = factory.create_line(positions, PathType::GreatCircle);
    GridElement::new(Sector::from_bounds(min_lat, max_lat, lon, lon), handle, kind, ty, lon)
}

pub(crate) fn parallel(
    factory: &mut dyn ShapeFactory,
    lat: f64,
    min_lon: f64,
    max_lon: f64,
    ty: GraticuleType,
    kind: ElementKind,
) -> GridElement {
    let positions = vec![Position::new(lat, min_lon, 0.0), Position::new(lat, max_lon, 0.0)];
    let handle = factory.create_line(positions, PathType::Linear);
    GridElement::new(Sector::from_bounds(lat, lat, min_lon, max_lon), handle, kind, ty, lat)
}

/// Polyline through `points`, culled by their bounding sector. `None` for
/// fewer than two points.
pub(crate) fn polyline(
    factory: &mut dyn ShapeFactory,
    points: &[LatLon],
    ty: GraticuleType,
    kind: ElementKind,
    value: f64,
) -> Option<GridElement> {
    if points.len() < 2 {
        return None;
    }
    let positions = points.iter().map(|p| Position::new(p.lat, p.lon, 0.0)).collect();
    let handle = factory.create_line(positions, PathType::GreatCircle);
    Some(GridElement::new(Sector::bounding(points.iter().copied()), handle, kind, ty, value))
}

pub(crate) fn label(
    factory: &mut dyn ShapeFactory,
    at: LatLon,
    text: String,
    priority: f64,
    ty: GraticuleType,
    kind: ElementKind,
) -> GridElement {
    let handle = factory.create_text(Position::new(at.lat, at.lon, 0.0), text, priority);
    GridElement::new(Sector::from_bounds(at.lat, at.lat, at.lon, at.lon), handle, kind, ty, 0.0)
}
