use glam::DVec3;

/// WGS84 equatorial radius in meters; the globe is modelled as a sphere of this radius.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// A geographic location in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[inline(always)]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Unit vector on the sphere pointing at this location.
    #[inline(always)]
    pub fn to_unit(self) -> DVec3 {
        latlon_to_vec3(self.lat, self.lon)
    }

    /// Angular distance to `other` in radians.
    pub fn angular_distance(self, other: LatLon) -> f64 {
        self.to_unit().dot(other.to_unit()).clamp(-1.0, 1.0).acos()
    }
}

/// A geographic location with an altitude in meters above the globe surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl Position {
    pub const fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    pub fn latlon(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// Normalize longitude into [-180, 180]
#[inline(always)]
pub fn normalize_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Clamp latitude into [-90, 90]
#[inline(always)]
pub fn clamp_lat(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

/// Shortest longitude difference in degrees, in [0, 180].
#[inline(always)]
pub fn delta_lon(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Convert lat/lon (degrees) to a unit sphere vector.
#[inline(always)]
pub fn latlon_to_vec3(lat: f64, lon: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// Convert a (not necessarily unit) cartesian vector back to lat/lon.
#[inline(always)]
pub fn vec3_to_latlon(p: DVec3) -> LatLon {
    let r = p.length();
    if r == 0.0 {
        return LatLon::default();
    }
    let lat = (p.z / r).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p.y.atan2(p.x).to_degrees();
    LatLon::new(lat, lon)
}

/// Cartesian point in meters for a geographic position on a sphere of `radius`.
#[inline(always)]
pub fn surface_point(lat: f64, lon: f64, height: f64, radius: f64) -> DVec3 {
    latlon_to_vec3(lat, lon) * (radius + height)
}

/// Geographic position of a cartesian point in meters.
pub fn point_position(p: DVec3, radius: f64) -> Position {
    let ll = vec3_to_latlon(p);
    Position::new(ll.lat, ll.lon, p.length() - radius)
}

/// Midpoint of the great circle arc between `a` and `b`.
/// Antipodal inputs have no unique midpoint; `a` is returned.
#[inline]
pub fn great_circle_midpoint(a: LatLon, b: LatLon) -> LatLon {
    let sum = a.to_unit() + b.to_unit();
    if sum.length_squared() < 1e-24 {
        return a;
    }
    vec3_to_latlon(sum)
}

/// Upper bound on the points one walk emits.
pub const MAX_WALK_STEPS: usize = 1 << 16;

/// Interpolate along a great circle arc and call a visitor for each subdivision point.
/// `max_step_deg` bounds the angular length of each emitted segment; a
/// non-positive or NaN step falls back to [`MAX_WALK_STEPS`] segments.
#[inline]
pub fn walk_great_circle(a: LatLon, b: LatLon, max_step_deg: f64, mut visitor: impl FnMut(LatLon)) {
    let va = a.to_unit();
    let vb = b.to_unit();

    let angle = va.dot(vb).clamp(-1.0, 1.0).acos();
    let step = max_step_deg.max(f64::EPSILON);
    let steps = ((angle.to_degrees() / step).ceil() as usize).clamp(1, MAX_WALK_STEPS);

    let sin_angle = angle.sin();
    if steps == 1 || sin_angle.abs() < 1e-10 {
        visitor(b);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        visitor(vec3_to_latlon(va * sa + vb * sb));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_range() {
        assert_eq!(normalize_lon(190.0), -170.0);
        assert_eq!(normalize_lon(-190.0), 170.0);
        assert_eq!(normalize_lon(180.0), 180.0);
        assert_eq!(normalize_lon(540.0), 180.0);
    }

    #[test]
    fn delta_lon_takes_short_way() {
        assert!((delta_lon(170.0, -170.0) - 20.0).abs() < 1e-12);
        assert!((delta_lon(-10.0, 10.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn midpoint_across_antimeridian() {
        let m = great_circle_midpoint(LatLon::new(0.0, 170.0), LatLon::new(0.0, -170.0));
        assert!(m.lat.abs() < 1e-9);
        assert!((m.lon.abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn vector_round_trip() {
        let p = vec3_to_latlon(latlon_to_vec3(45.5, -120.25));
        assert!((p.lat - 45.5).abs() < 1e-12);
        assert!((p.lon + 120.25).abs() < 1e-12);
    }

    #[test]
    fn walk_emits_end_point_last() {
        let mut points = Vec::new();
        walk_great_circle(LatLon::new(0.0, 0.0), LatLon::new(0.0, 10.0), 2.0, |p| points.push(p));
        assert_eq!(points.len(), 5);
        let last = points[points.len() - 1];
        assert!((last.lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_step_is_bounded() {
        let a = LatLon::new(0.0, 0.0);
        let b = LatLon::new(0.0, 10.0);
        for step in [0.0, -1.0, f64::NAN] {
            let mut count = 0;
            walk_great_circle(a, b, step, |_| count += 1);
            assert_eq!(count, MAX_WALK_STEPS);
        }
    }
}
