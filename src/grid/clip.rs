//! Where a great circle segment crosses a meridian or parallel, and clipping
//! of polylines against a sector.

use crate::geo::{self, great_circle_midpoint, LatLon, EARTH_RADIUS};
use crate::sector::Sector;

/// One meter of arc on the Earth, in radians.
pub const PRECISION: f64 = 1.0 / EARTH_RADIUS;

pub const MAX_ITERATIONS: u32 = 20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    /// Snapped exactly onto the target meridian or parallel.
    pub point: LatLon,
    pub iterations: u32,
    /// False when the iteration cap was hit; `point` is then the best
    /// midpoint found.
    pub converged: bool,
}

#[derive(Clone, Copy)]
enum Target {
    Meridian(f64),
    Parallel(f64),
}

impl Target {
    /// Angular gap in radians between `p` and the target line.
    fn gap(self, p: LatLon) -> f64 {
        match self {
            Target::Meridian(lon) => geo::delta_lon(p.lon, lon).to_radians(),
            Target::Parallel(lat) => (p.lat - lat).abs().to_radians(),
        }
    }

    fn snap(self, p: LatLon) -> LatLon {
        match self {
            Target::Meridian(lon) => LatLon::new(p.lat, lon),
            Target::Parallel(lat) => LatLon::new(lat, p.lon),
        }
    }
}

fn bisect(a: LatLon, b: LatLon, target: Target) -> Crossing {
    if target.gap(a) == 0.0 {
        return Crossing { point: target.snap(a), iterations: 0, converged: true };
    }
    if target.gap(b) == 0.0 {
        return Crossing { point: target.snap(b), iterations: 0, converged: true };
    }

    let (mut lo, mut hi) = (a, b);
    let mut best = great_circle_midpoint(lo, hi);
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let mid = great_circle_midpoint(lo, hi);
        best = mid;
        if target.gap(mid) < PRECISION {
            return Crossing { point: target.snap(mid), iterations, converged: true };
        }
        // Keep the half on the side of the endpoint nearer the target.
        if target.gap(lo) < target.gap(hi) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Crossing { point: target.snap(best), iterations, converged: false }
}

/// Crossing of segment `a`–`b` with meridian `lon`, or `None` when the
/// meridian does not lie between the endpoints going the short way round.
pub fn meridian_crossing(a: LatLon, b: LatLon, lon: f64) -> Option<Crossing> {
    let span = geo::delta_lon(a.lon, b.lon);
    let via = geo::delta_lon(a.lon, lon) + geo::delta_lon(lon, b.lon);
    if via > span + 1e-9 {
        return None;
    }
    Some(bisect(a, b, Target::Meridian(lon)))
}

/// Crossing of segment `a`–`b` with parallel `lat`, or `None` when the
/// parallel is not between the endpoint latitudes.
pub fn parallel_crossing(a: LatLon, b: LatLon, lat: f64) -> Option<Crossing> {
    if lat < a.lat.min(b.lat) || lat > a.lat.max(b.lat) {
        return None;
    }
    Some(bisect(a, b, Target::Parallel(lat)))
}

/// Entry/exit point of a segment with one inside and one outside endpoint.
fn boundary_crossing(inside: LatLon, outside: LatLon, sector: &Sector) -> Option<LatLon> {
    let mut candidates = Vec::with_capacity(2);
    if outside.lon < sector.min_lon {
        candidates.push(meridian_crossing(inside, outside, sector.min_lon));
    } else if outside.lon > sector.max_lon() {
        candidates.push(meridian_crossing(inside, outside, sector.max_lon()));
    }
    if outside.lat < sector.min_lat {
        candidates.push(parallel_crossing(inside, outside, sector.min_lat));
    } else if outside.lat > sector.max_lat() {
        candidates.push(parallel_crossing(inside, outside, sector.max_lat()));
    }
    candidates
        .into_iter()
        .flatten()
        .map(|c| c.point)
        .find(|p| sector.contains(*p))
}

/// Split a polyline into the runs lying inside `sector`, cutting each
/// leaving or entering segment at the boundary.
pub fn clip_polyline(points: &[LatLon], sector: &Sector) -> Vec<Vec<LatLon>> {
    let mut runs = Vec::new();
    let mut current: Vec<LatLon> = Vec::new();

    for (i, &p) in points.iter().enumerate() {
        let inside = sector.contains(p);
        let prev = if i > 0 { Some(points[i - 1]) } else { None };
        match (prev, inside) {
            (None, true) => current.push(p),
            (None, false) => {}
            (Some(q), true) => {
                if !sector.contains(q) {
                    if let Some(entry) = boundary_crossing(p, q, sector) {
                        current.push(entry);
                    }
                }
                current.push(p);
            }
            (Some(q), false) => {
                if sector.contains(q) {
                    if let Some(exit) = boundary_crossing(q, p, sector) {
                        current.push(exit);
                    }
                    if current.len() >= 2 {
                        runs.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
        }
    }
    if current.len() >= 2 {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meridian_crossing_snaps_and_converges() {
        let a = LatLon::new(10.0, 2.0);
        let b = LatLon::new(12.0, 8.0);
        let c = meridian_crossing(a, b, 6.0).unwrap();
        assert!((c.point.lon - 6.0).abs() < 1e-9);
        assert!(c.iterations <= MAX_ITERATIONS);
        assert!(c.point.lat > 10.0 && c.point.lat < 12.0);
    }

    #[test]
    fn crossing_lies_on_the_great_circle() {
        let a = LatLon::new(-20.0, -5.0);
        let b = LatLon::new(30.0, 4.0);
        let c = meridian_crossing(a, b, 0.0).unwrap();
        let n = a.to_unit().cross(b.to_unit()).normalize();
        // Distance off the great circle plane, in radians.
        assert!(n.dot(c.point.to_unit()).abs() < 1e-6);
    }

    #[test]
    fn parallel_crossing_snaps() {
        let a = LatLon::new(55.0, 3.0);
        let b = LatLon::new(57.5, 3.5);
        let c = parallel_crossing(a, b, 56.0).unwrap();
        assert_eq!(c.point.lat, 56.0);
        assert!(c.iterations <= MAX_ITERATIONS);
        assert!(parallel_crossing(a, b, 60.0).is_none());
    }

    #[test]
    fn antimeridian_wrap_is_not_a_crossing() {
        // Short way from 179 to -179 passes 180, not 0.
        let a = LatLon::new(0.0, 179.0);
        let b = LatLon::new(1.0, -179.0);
        assert!(meridian_crossing(a, b, 0.0).is_none());
        let c = meridian_crossing(a, b, 180.0).unwrap();
        assert_eq!(c.point.lon, 180.0);
    }

    #[test]
    fn endpoint_on_target_returns_immediately() {
        let a = LatLon::new(1.0, 3.0);
        let b = LatLon::new(2.0, 5.0);
        let c = meridian_crossing(a, b, 3.0).unwrap();
        assert_eq!(c.iterations, 0);
        assert_eq!(c.point, a);
    }

    #[test]
    fn polyline_is_cut_at_the_boundary() {
        let sector = Sector::from_bounds(0.0, 10.0, 0.0, 6.0);
        let line = [LatLon::new(5.0, -2.0), LatLon::new(5.0, 2.0), LatLon::new(5.0, 8.0)];
        let runs = clip_polyline(&line, &sector);
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.first().unwrap().lon, 0.0);
        assert_eq!(run.last().unwrap().lon, 6.0);
    }

    #[test]
    fn polyline_outside_is_dropped() {
        let sector = Sector::from_bounds(0.0, 10.0, 0.0, 6.0);
        let line = [LatLon::new(20.0, 1.0), LatLon::new(20.0, 5.0)];
        assert!(clip_polyline(&line, &sector).is_empty());
    }
}
