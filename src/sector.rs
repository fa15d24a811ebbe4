use crate::geo::LatLon;

/// Tolerance in degrees used by boundary predicates.
const EPSILON: f64 = 1e-9;

/// Axis-aligned geographic bounding box in degrees.
///
/// Deltas are non-negative for real sectors. A sector with a zero delta is a
/// degenerate line (meridian or parallel) and still contains points; negative
/// deltas mark [`Sector::EMPTY`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sector {
    pub min_lat: f64,
    pub min_lon: f64,
    pub delta_lat: f64,
    pub delta_lon: f64,
}

impl Sector {
    pub const EMPTY: Sector = Sector {
        min_lat: 0.0,
        min_lon: 0.0,
        delta_lat: -1.0,
        delta_lon: -1.0,
    };

    pub const FULL: Sector = Sector {
        min_lat: -90.0,
        min_lon: -180.0,
        delta_lat: 180.0,
        delta_lon: 360.0,
    };

    pub const fn new(min_lat: f64, min_lon: f64, delta_lat: f64, delta_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            delta_lat,
            delta_lon,
        }
    }

    /// Build from bounds; inverted bounds give [`Sector::EMPTY`].
    pub fn from_bounds(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        if !(max_lat >= min_lat && max_lon >= min_lon) {
            return Self::EMPTY;
        }
        Self::new(min_lat, min_lon, max_lat - min_lat, max_lon - min_lon)
    }

    /// Smallest sector containing every point, or EMPTY for no points.
    pub fn bounding(points: impl IntoIterator<Item = LatLon>) -> Self {
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lon = f64::MAX;
        let mut max_lon = f64::MIN;
        for p in points {
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
            min_lon = min_lon.min(p.lon);
            max_lon = max_lon.max(p.lon);
        }
        Self::from_bounds(min_lat, max_lat, min_lon, max_lon)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        !(self.delta_lat >= 0.0 && self.delta_lon >= 0.0)
    }

    #[inline(always)]
    pub fn max_lat(&self) -> f64 {
        self.min_lat + self.delta_lat
    }

    #[inline(always)]
    pub fn max_lon(&self) -> f64 {
        self.min_lon + self.delta_lon
    }

    pub fn centroid(&self) -> LatLon {
        LatLon::new(
            self.min_lat + self.delta_lat / 2.0,
            self.min_lon + self.delta_lon / 2.0,
        )
    }

    /// South-west, south-east, north-east, north-west.
    pub fn corners(&self) -> [LatLon; 4] {
        [
            LatLon::new(self.min_lat, self.min_lon),
            LatLon::new(self.min_lat, self.max_lon()),
            LatLon::new(self.max_lat(), self.max_lon()),
            LatLon::new(self.max_lat(), self.min_lon),
        ]
    }

    /// Inclusive containment.
    pub fn contains(&self, p: LatLon) -> bool {
        !self.is_empty()
            && p.lat >= self.min_lat - EPSILON
            && p.lat <= self.max_lat() + EPSILON
            && p.lon >= self.min_lon - EPSILON
            && p.lon <= self.max_lon() + EPSILON
    }

    /// Inclusive overlap test; touching edges intersect.
    pub fn intersects(&self, other: &Sector) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        !(other.max_lon() < self.min_lon
            || other.min_lon > self.max_lon()
            || other.max_lat() < self.min_lat
            || other.min_lat > self.max_lat())
    }

    pub fn union(&self, other: &Sector) -> Sector {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Sector::from_bounds(
            self.min_lat.min(other.min_lat),
            self.max_lat().max(other.max_lat()),
            self.min_lon.min(other.min_lon),
            self.max_lon().max(other.max_lon()),
        )
    }

    pub fn intersection(&self, other: &Sector) -> Sector {
        if !self.intersects(other) {
            return Sector::EMPTY;
        }
        Sector::from_bounds(
            self.min_lat.max(other.min_lat),
            self.max_lat().min(other.max_lat()),
            self.min_lon.max(other.min_lon),
            self.max_lon().min(other.max_lon()),
        )
    }

    /// Split into `divisions` × `divisions` children, row-major from the
    /// south-west corner. Shared edges are computed once so the children
    /// tile the parent exactly.
    pub fn subdivide(&self, divisions: u32) -> Vec<Sector> {
        if self.is_empty() || divisions == 0 {
            return Vec::new();
        }
        let n = divisions as usize;
        let lat_edges = edges(self.min_lat, self.delta_lat, n);
        let lon_edges = edges(self.min_lon, self.delta_lon, n);

        let mut children = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                children.push(Sector::new(
                    lat_edges[row],
                    lon_edges[col],
                    lat_edges[row + 1] - lat_edges[row],
                    lon_edges[col + 1] - lon_edges[col],
                ));
            }
        }
        children
    }

    /// True if the point lies on one of the four edges.
    pub fn on_boundary(&self, p: LatLon, tolerance: f64) -> bool {
        (p.lat - self.min_lat).abs() <= tolerance
            || (p.lat - self.max_lat()).abs() <= tolerance
            || (p.lon - self.min_lon).abs() <= tolerance
            || (p.lon - self.max_lon()).abs() <= tolerance
    }
}

fn edges(min: f64, delta: f64, n: usize) -> Vec<f64> {
    let mut out: Vec<f64> = (0..=n)
        .map(|i| min + delta * i as f64 / n as f64)
        .collect();
    out[n] = min + delta;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_is_contained() {
        let sectors = [
            Sector::new(10.0, 10.0, 10.0, 10.0),
            Sector::new(-90.0, -180.0, 180.0, 360.0),
            Sector::new(84.0, -180.0, 6.0, 180.0),
            Sector::new(0.0, 5.0, 0.0, 3.0),
            Sector::new(-0.000_01, 179.999_99, 0.000_01, 0.000_01),
        ];
        for s in sectors {
            assert!(s.contains(s.centroid()), "{s:?}");
        }
    }

    #[test]
    fn subdivide_scenario() {
        let parent = Sector::new(10.0, 10.0, 10.0, 10.0);
        let children = parent.subdivide(10);
        assert_eq!(children.len(), 100);
        assert_eq!(children[0], Sector::new(10.0, 10.0, 1.0, 1.0));
        assert_eq!(children[99], Sector::new(19.0, 19.0, 1.0, 1.0));
        for c in &children {
            assert!((c.delta_lat - 1.0).abs() < 1e-12);
            assert!((c.delta_lon - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn subdivide_tiles_parent_exactly() {
        let parent = Sector::new(-33.3, 151.1, 7.7, 3.1);
        let n = 7;
        let children = parent.subdivide(n);

        let union = children
            .iter()
            .fold(Sector::EMPTY, |acc, c| acc.union(c));
        assert_eq!(union.min_lat, parent.min_lat);
        assert_eq!(union.min_lon, parent.min_lon);
        assert!((union.max_lat() - parent.max_lat()).abs() < 1e-12);
        assert!((union.max_lon() - parent.max_lon()).abs() < 1e-12);

        // Neighbours share edges bit-for-bit, so interiors never overlap.
        let n = n as usize;
        for row in 0..n {
            for col in 0..n {
                let c = children[row * n + col];
                if col + 1 < n {
                    assert_eq!(c.max_lon(), children[row * n + col + 1].min_lon);
                }
                if row + 1 < n {
                    assert_eq!(c.max_lat(), children[(row + 1) * n + col].min_lat);
                }
            }
        }
        let area: f64 = children.iter().map(|c| c.delta_lat * c.delta_lon).sum();
        assert!((area - parent.delta_lat * parent.delta_lon).abs() < 1e-9);
    }

    #[test]
    fn empty_sector_is_inert() {
        assert!(Sector::EMPTY.is_empty());
        assert!(!Sector::EMPTY.contains(LatLon::new(0.0, 0.0)));
        assert!(!Sector::EMPTY.intersects(&Sector::FULL));
        assert!(Sector::EMPTY.subdivide(4).is_empty());
        assert_eq!(Sector::EMPTY.union(&Sector::FULL), Sector::FULL);
        assert!(Sector::from_bounds(5.0, 4.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn degenerate_lines_intersect() {
        let meridian = Sector::from_bounds(0.0, 10.0, 5.0, 5.0);
        let view = Sector::from_bounds(2.0, 3.0, 4.0, 6.0);
        assert!(!meridian.is_empty());
        assert!(view.intersects(&meridian));
    }
}
