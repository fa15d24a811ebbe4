//! Per-frame view state shared by every tile during one pass.

use crate::coords::CoordinateService;
use crate::geo::{self, LatLon};
use crate::grid::config::GraticuleConfig;
use crate::grid::labels::LabelDedup;
use crate::grid::output::RenderableSet;
use crate::grid::scale::MetricScaleSupport;
use crate::sector::Sector;
use crate::shapes::ShapeFactory;
use crate::view::{Camera, ElevationModel, FrameView, Globe, LookAt};

/// What the caller hands the layer each frame.
pub struct DrawContext<'a> {
    /// Increments once per rendered frame.
    pub frame_id: u64,
    pub camera: &'a Camera,
    pub globe: &'a Globe,
    pub elevation: &'a dyn ElevationModel,
}

/// View-derived values computed once per frame.
#[derive(Clone, Debug)]
pub struct FrameState {
    pub frame_id: u64,
    pub view: FrameView,
    pub look_at: LookAt,
    /// Meters per pixel at the look-at range.
    pub pixel_size: f64,
    /// A quarter of the viewport width at the look-at range, in degrees.
    pub label_offset: f64,
    /// Where latitude/longitude ruler labels are placed.
    pub label_anchor: LatLon,
    pub visible: Sector,
    /// Eye distance to the terrain point directly beneath it.
    pub altitude_above_ground: f64,
    pub vertical_exaggeration: f64,
    pub elevation_timestamp: u64,
}

impl FrameState {
    pub fn compute(dc: &DrawContext<'_>) -> Self {
        let view = FrameView::new(dc.camera, dc.globe.radius);
        let look_at = view.look_at();
        let pixel_size = view.pixel_size_at_distance(look_at.range);

        let quarter_width = pixel_size * dc.camera.viewport_width / 4.0;
        let label_offset = (quarter_width / dc.globe.radius).to_degrees();
        let label_anchor = LatLon::new(
            (look_at.position.lat - label_offset).clamp(-70.0, 70.0),
            geo::normalize_lon(look_at.position.lon - label_offset),
        );

        let ground = dc.elevation.height_at(dc.camera.lat, dc.camera.lon)
            * dc.globe.vertical_exaggeration;
        let altitude_above_ground = (dc.camera.altitude - ground).max(1.0);

        Self {
            frame_id: dc.frame_id,
            visible: view.visible_sector(),
            view,
            look_at,
            pixel_size,
            label_offset,
            label_anchor,
            altitude_above_ground,
            vertical_exaggeration: dc.globe.vertical_exaggeration,
            elevation_timestamp: dc.elevation.timestamp(),
        }
    }

    /// UTM zone under the look-at point; `None` where `coords` has no UTM
    /// (outside −80..84).
    pub fn active_zone(&self, coords: &dyn CoordinateService) -> Option<u8> {
        let look = self.look_at.position;
        coords.geo_to_utm(look.lat, look.lon).map(|c| c.zone)
    }

    /// Screen size in pixels of `size` meters seen at the surface point
    /// under `at`.
    pub fn size_in_pixels(&self, size: f64, at: LatLon) -> f64 {
        let p = geo::surface_point(at.lat, at.lon, 0.0, self.view.radius);
        let d = self.view.eye.distance(p);
        let px = self.view.pixel_size_at_distance(d);
        if px <= 0.0 {
            return f64::MAX;
        }
        size / px
    }
}

/// [`FrameState`] memoized on the caller's frame id.
#[derive(Debug, Default)]
pub struct FrameMemo {
    state: Option<FrameState>,
}

impl FrameMemo {
    pub fn get(&mut self, dc: &DrawContext<'_>) -> &FrameState {
        let stale = self
            .state
            .as_ref()
            .map_or(true, |s| s.frame_id != dc.frame_id);
        if stale {
            self.state = Some(FrameState::compute(dc));
        }
        self.state.get_or_insert_with(|| FrameState::compute(dc))
    }

    pub fn clear(&mut self) {
        self.state = None;
    }
}

/// Everything a grid system reads or writes while a pass runs.
pub struct PassContext<'p> {
    pub frame: &'p FrameState,
    pub config: &'p GraticuleConfig,
    pub coords: &'p dyn CoordinateService,
    pub elevation: &'p dyn ElevationModel,
    pub factory: &'p mut dyn ShapeFactory,
    pub output: &'p mut RenderableSet,
    pub dedup: &'p mut LabelDedup,
    pub scale: Option<&'p mut MetricScaleSupport>,
}
