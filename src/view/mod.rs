//! Camera, frustum and terrain collaborators consumed by the grid engine.

pub mod camera;
pub mod elevation;
pub mod frustum;

pub use camera::{FrameView, LookAt};
pub use elevation::{ElevationModel, FlatTerrain};
pub use frustum::{BoundingSphere, Frustum};

use serde::{Deserialize, Serialize};

use crate::geo::{LatLon, EARTH_RADIUS};

/// Perspective camera hovering over the globe.
///
/// `tilt` is measured from nadir: 0 looks straight down, 90 looks at the
/// horizon. `heading` is clockwise from north. `fov` is the horizontal field
/// of view. All angles in degrees, altitude in meters above the sphere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub heading: f64,
    pub tilt: f64,
    pub fov: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            lat: 0.0,
            lon: 0.0,
            altitude: 10_000_000.0,
            heading: 0.0,
            tilt: 0.0,
            fov: 45.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl Camera {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }
}

/// The globe being viewed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Globe {
    pub radius: f64,
    pub vertical_exaggeration: f64,
}

impl Default for Globe {
    fn default() -> Self {
        Self {
            radius: EARTH_RADIUS,
            vertical_exaggeration: 1.0,
        }
    }
}

/// Distance from a point `altitude` meters above the sphere to its horizon.
#[inline(always)]
pub fn horizon_distance(radius: f64, altitude: f64) -> f64 {
    let alt = altitude.max(0.0);
    (alt * (2.0 * radius + alt)).sqrt()
}
