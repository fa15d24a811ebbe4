use glam::DVec3;

/// Plane with unit normal pointing into the frustum: `normal·p + d ≥ 0` inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub d: f64,
}

impl Plane {
    /// Plane through `point` with the (not necessarily unit) inward normal.
    pub fn through(point: DVec3, normal: DVec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    #[inline(always)]
    pub fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) + self.d
    }
}

/// Six-plane view volume: left, right, bottom, top, near, far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// A sphere intersects unless it lies entirely behind one plane.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance(sphere.center) >= -sphere.radius)
    }

    pub fn contains(&self, p: DVec3) -> bool {
        self.planes.iter().all(|plane| plane.distance(p) >= 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    /// Smallest sphere around `center` holding every point.
    pub fn around(center: DVec3, points: impl IntoIterator<Item = DVec3>) -> Self {
        let radius = points
            .into_iter()
            .map(|p| p.distance(center))
            .fold(0.0, f64::max);
        Self { center, radius }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Frustum {
        // Axis-aligned box [-1, 1]^3 expressed as six inward planes.
        let axes = [DVec3::X, DVec3::NEG_X, DVec3::Y, DVec3::NEG_Y, DVec3::Z, DVec3::NEG_Z];
        let planes = axes.map(|a| Plane::through(-a, a));
        Frustum { planes }
    }

    #[test]
    fn sphere_straddling_plane_intersects() {
        let f = unit_box();
        let s = BoundingSphere { center: DVec3::new(1.5, 0.0, 0.0), radius: 0.6 };
        assert!(f.intersects_sphere(&s));
        let s = BoundingSphere { center: DVec3::new(1.5, 0.0, 0.0), radius: 0.4 };
        assert!(!f.intersects_sphere(&s));
    }

    #[test]
    fn point_containment() {
        let f = unit_box();
        assert!(f.contains(DVec3::ZERO));
        assert!(!f.contains(DVec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn sphere_around_points() {
        let s = BoundingSphere::around(DVec3::ZERO, [DVec3::X, DVec3::new(0.0, 3.0, 0.0)]);
        assert_eq!(s.radius, 3.0);
    }
}
