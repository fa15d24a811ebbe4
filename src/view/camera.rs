use glam::DVec3;

use crate::geo::{self, LatLon};
use crate::sector::Sector;
use crate::view::frustum::{Frustum, Plane};
use crate::view::{horizon_distance, Camera};

/// Where the view axis meets the globe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookAt {
    pub position: LatLon,
    /// Eye to look-at distance in meters.
    pub range: f64,
    /// False when the view axis misses the globe and the eye position and
    /// horizon distance stand in.
    pub hit: bool,
}

/// Camera basis, frustum and screen mapping for one frame.
/// Orientation stored as three column vectors like an orthonormal rotation.
#[derive(Clone, Debug)]
pub struct FrameView {
    pub camera: Camera,
    pub radius: f64,
    /// Eye position in meters, globe centred at the origin.
    pub eye: DVec3,
    /// View direction
    pub forward: DVec3,
    /// Screen right
    pub right: DVec3,
    /// Screen up
    pub up: DVec3,
    pub frustum: Frustum,
    pub near: f64,
    pub far: f64,
    tan_h: f64,
    tan_v: f64,
}

impl FrameView {
    pub fn new(camera: &Camera, radius: f64) -> Self {
        let altitude = camera.altitude.max(1.0);
        let lat = camera.lat.to_radians();
        let lon = camera.lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        // Local frame at the eye: outward normal, east and north.
        let normal = geo::latlon_to_vec3(camera.lat, camera.lon);
        let east = DVec3::new(-sin_lon, cos_lon, 0.0);
        let north = DVec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);

        let (sin_h, cos_h) = camera.heading.to_radians().sin_cos();
        let heading_dir = north * cos_h + east * sin_h;
        let right = (east * cos_h - north * sin_h).normalize();

        let (sin_t, cos_t) = camera.tilt.clamp(0.0, 89.9).to_radians().sin_cos();
        let forward = (-normal * cos_t + heading_dir * sin_t).normalize();
        let up = (normal * sin_t + heading_dir * cos_t).normalize();

        let eye = normal * (radius + altitude);
        let tan_h = (camera.fov.clamp(1.0, 170.0).to_radians() / 2.0).tan();
        let tan_v = tan_h * camera.viewport_height / camera.viewport_width.max(1.0);

        let near = 1.0;
        let far = horizon_distance(radius, altitude) + horizon_distance(radius, 10_000.0);

        let frustum = Frustum {
            planes: [
                Plane::through(eye, forward * tan_h + right),
                Plane::through(eye, forward * tan_h - right),
                Plane::through(eye, forward * tan_v + up),
                Plane::through(eye, forward * tan_v - up),
                Plane::through(eye + forward * near, forward),
                Plane::through(eye + forward * far, -forward),
            ],
        };

        Self {
            camera: *camera,
            radius,
            eye,
            forward,
            right,
            up,
            frustum,
            near,
            far,
            tan_h,
            tan_v,
        }
    }

    /// Size in meters of one screen pixel at distance `d` from the eye.
    #[inline(always)]
    pub fn pixel_size_at_distance(&self, d: f64) -> f64 {
        2.0 * d.abs() * self.tan_h / self.camera.viewport_width.max(1.0)
    }

    /// Eye altitude above the sphere in meters.
    pub fn altitude(&self) -> f64 {
        self.eye.length() - self.radius
    }

    /// Ray direction through a normalized screen position, x and y in [-1, 1].
    pub fn ray(&self, x: f64, y: f64) -> DVec3 {
        (self.forward + self.right * (x * self.tan_h) + self.up * (y * self.tan_v)).normalize()
    }

    /// First intersection of a ray from the eye with the globe.
    pub fn intersect_globe(&self, dir: DVec3) -> Option<(DVec3, f64)> {
        let b = self.eye.dot(dir);
        let c = self.eye.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let t = -b - disc.sqrt();
        if t < 0.0 {
            return None;
        }
        Some((self.eye + dir * t, t))
    }

    /// Point on the horizon circle in the azimuth of `dir`.
    pub fn horizon_point(&self, dir: DVec3) -> DVec3 {
        let n = self.eye.normalize();
        let mut perp = dir - n * dir.dot(n);
        if perp.length_squared() < 1e-24 {
            perp = self.up - n * self.up.dot(n);
        }
        let perp = perp.normalize();
        let cos_theta = (self.radius / self.eye.length()).clamp(-1.0, 1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        (n * cos_theta + perp * sin_theta) * self.radius
    }

    pub fn look_at(&self) -> LookAt {
        match self.intersect_globe(self.forward) {
            Some((p, range)) => LookAt {
                position: geo::vec3_to_latlon(p),
                range,
                hit: true,
            },
            None => LookAt {
                position: self.camera.position(),
                range: horizon_distance(self.radius, self.altitude()),
                hit: false,
            },
        }
    }

    /// Screen pixel of a point, `None` when it is behind the eye.
    pub fn project(&self, p: DVec3) -> Option<(f64, f64)> {
        let d = p - self.eye;
        let z = d.dot(self.forward);
        if z < self.near {
            return None;
        }
        let x = d.dot(self.right) / (z * self.tan_h);
        let y = d.dot(self.up) / (z * self.tan_v);
        let w = self.camera.viewport_width;
        let h = self.camera.viewport_height;
        Some(((x + 1.0) / 2.0 * w, (1.0 - y) / 2.0 * h))
    }

    /// True when the globe hides `p` from the eye.
    pub fn is_occluded(&self, p: DVec3) -> bool {
        let to = p - self.eye;
        let len = to.length();
        if len == 0.0 {
            return false;
        }
        match self.intersect_globe(to / len) {
            Some((_, t)) => t < len - 1.0,
            None => false,
        }
    }

    /// Inside the frustum and in front of the globe.
    pub fn is_visible(&self, p: DVec3) -> bool {
        self.frustum.contains(p) && !self.is_occluded(p)
    }

    /// Conservative lat/lon box of the visible surface. Samples rays around
    /// the viewport edge, substituting horizon points where rays miss.
    pub fn visible_sector(&self) -> Sector {
        const SAMPLES: usize = 8;

        let mut points = Vec::with_capacity(4 * SAMPLES + 2);
        let mut sample = |x: f64, y: f64| {
            let dir = self.ray(x, y);
            let p = match self.intersect_globe(dir) {
                Some((p, _)) => p,
                None => self.horizon_point(dir),
            };
            points.push(geo::vec3_to_latlon(p));
        };

        sample(0.0, 0.0);
        for i in 0..SAMPLES {
            let t = -1.0 + 2.0 * i as f64 / SAMPLES as f64;
            sample(t, -1.0);
            sample(1.0, t);
            sample(-t, 1.0);
            sample(-1.0, -t);
        }

        let nadir = self.eye.normalize() * self.radius;
        if self.frustum.contains(nadir) {
            points.push(geo::vec3_to_latlon(nadir));
        }

        let mut bounds = Sector::bounding(points);
        if bounds.is_empty() {
            return bounds;
        }

        // Wide longitude spans probably wrap; take the whole range.
        if bounds.delta_lon > 180.0 {
            bounds.min_lon = -180.0;
            bounds.delta_lon = 360.0;
        }

        let north_pole = DVec3::Z * self.radius;
        if self.is_visible(north_pole) {
            bounds = Sector::from_bounds(bounds.min_lat, 90.0, -180.0, 180.0);
        }
        let south_pole = DVec3::NEG_Z * self.radius;
        if self.is_visible(south_pole) {
            bounds = Sector::from_bounds(-90.0, bounds.max_lat(), -180.0, 180.0);
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS;

    fn camera(lat: f64, lon: f64, altitude: f64) -> Camera {
        Camera {
            lat,
            lon,
            altitude,
            ..Camera::default()
        }
    }

    #[test]
    fn nadir_view_looks_at_the_ground_below() {
        let view = FrameView::new(&camera(45.0, 7.0, 1_000_000.0), EARTH_RADIUS);
        let look = view.look_at();
        assert!(look.hit);
        assert!((look.position.lat - 45.0).abs() < 1e-6);
        assert!((look.position.lon - 7.0).abs() < 1e-6);
        assert!((look.range - 1_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn look_at_misses_above_the_horizon() {
        let cam = Camera {
            tilt: 89.9,
            ..camera(0.0, 0.0, 100.0)
        };
        let view = FrameView::new(&cam, EARTH_RADIUS);
        let look = view.look_at();
        if !look.hit {
            assert_eq!(look.position, cam.position());
            assert!((look.range - horizon_distance(EARTH_RADIUS, 100.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn pixel_size_scales_with_distance() {
        let view = FrameView::new(&camera(0.0, 0.0, 1_000.0), EARTH_RADIUS);
        let a = view.pixel_size_at_distance(1_000.0);
        let b = view.pixel_size_at_distance(2_000.0);
        assert!((b - 2.0 * a).abs() < 1e-12);
    }

    #[test]
    fn look_at_projects_to_screen_centre() {
        let cam = Camera {
            heading: 30.0,
            tilt: 40.0,
            ..camera(10.0, 20.0, 500_000.0)
        };
        let view = FrameView::new(&cam, EARTH_RADIUS);
        let look = view.look_at();
        let p = geo::surface_point(look.position.lat, look.position.lon, 0.0, EARTH_RADIUS);
        let (x, y) = view.project(p).unwrap();
        assert!((x - cam.viewport_width / 2.0).abs() < 1e-3);
        assert!((y - cam.viewport_height / 2.0).abs() < 1e-3);
        assert!(view.is_visible(p));
    }

    #[test]
    fn far_side_is_occluded() {
        let view = FrameView::new(&camera(0.0, 0.0, 1_000_000.0), EARTH_RADIUS);
        assert!(view.is_occluded(geo::surface_point(0.0, 180.0, 0.0, EARTH_RADIUS)));
        assert!(!view.is_occluded(geo::surface_point(0.0, 0.0, 0.0, EARTH_RADIUS)));
    }

    #[test]
    fn visible_sector_surrounds_the_camera() {
        let view = FrameView::new(&camera(30.0, 40.0, 2_000_000.0), EARTH_RADIUS);
        let s = view.visible_sector();
        assert!(s.contains(LatLon::new(30.0, 40.0)));
        assert!(s.delta_lat < 90.0);
    }

    #[test]
    fn visible_sector_takes_pole_when_in_view() {
        let view = FrameView::new(&camera(88.0, 0.0, 3_000_000.0), EARTH_RADIUS);
        let s = view.visible_sector();
        assert_eq!(s.max_lat(), 90.0);
        assert_eq!(s.delta_lon, 360.0);
    }
}
