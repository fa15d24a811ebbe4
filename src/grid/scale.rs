//! Ruler labels along the metric grid lines of the active UTM zone.

use crate::coords::{utm, CoordinateService, Hemisphere, ZoneId};
use crate::geo::{self, Position};
use crate::grid::element::ElementKind;
use crate::grid::frame::FrameState;
use crate::grid::params::{GraticuleType, MetricFamily};

/// Square sizes 10 m ..= 1000 km. The top level holds the 100 km square
/// edges, seen as the lines inside a notional 1000 km square.
pub const LEVELS: usize = 6;

const SOUTH_OFFSET: i64 = utm::FALSE_NORTHING_SOUTH as i64;

/// Level index for a square size in meters: `log10(size) - 1`.
pub fn level_index(size: f64) -> Option<usize> {
    if !(10.0..=1_000_000.0).contains(&size) {
        return None;
    }
    Some(size.log10().round() as usize - 1)
}

/// Running extremes of the grid lines seen at one level. Northings are
/// continuous across the equator: southern values are stored as
/// `N - 10 000 000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleExtremes {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
    pub min_y_hemisphere: Hemisphere,
    pub max_y_hemisphere: Hemisphere,
}

impl ScaleExtremes {
    pub const EMPTY: ScaleExtremes = ScaleExtremes {
        min_x: i64::MAX,
        max_x: i64::MIN,
        min_y: i64::MAX,
        max_y: i64::MIN,
        min_y_hemisphere: Hemisphere::North,
        max_y_hemisphere: Hemisphere::North,
    };

    pub fn has_x(&self) -> bool {
        self.min_x <= self.max_x
    }

    pub fn has_y(&self) -> bool {
        self.min_y <= self.max_y
    }

    pub fn is_empty(&self) -> bool {
        !self.has_x() && !self.has_y()
    }
}

/// A label to be created for this pass only.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleLabel {
    pub position: Position,
    pub text: String,
    pub ty: GraticuleType,
    pub priority: f64,
}

#[derive(Debug)]
pub struct MetricScaleSupport {
    family: MetricFamily,
    zone: Option<u8>,
    levels: [ScaleExtremes; LEVELS],
}

impl MetricScaleSupport {
    pub fn new(family: MetricFamily) -> Self {
        Self {
            family,
            zone: None,
            levels: [ScaleExtremes::EMPTY; LEVELS],
        }
    }

    /// Reset for a new pass tracking `zone` only.
    pub fn begin(&mut self, zone: Option<u8>) {
        self.zone = zone;
        self.levels = [ScaleExtremes::EMPTY; LEVELS];
    }

    pub fn zone(&self) -> Option<u8> {
        self.zone
    }

    pub fn level(&self, index: usize) -> Option<&ScaleExtremes> {
        self.levels.get(index)
    }

    /// Record a grid line drawn by a square of `size` meters: its interior
    /// lines or its own edges.
    pub fn observe(&mut self, zone: u8, hemisphere: Hemisphere, kind: ElementKind, value: f64, size: f64) {
        if self.zone != Some(zone) {
            return;
        }
        // Edges are spaced a whole square apart, like the interior lines of
        // a square ten times the size.
        let spacing_of = match kind {
            ElementKind::LineWest | ElementKind::LineEast | ElementKind::LineSouth | ElementKind::LineNorth => {
                size * 10.0
            }
            _ => size,
        };
        let Some(index) = level_index(spacing_of) else {
            return;
        };
        let level = &mut self.levels[index];
        let v = value.round() as i64;
        match kind {
            ElementKind::LineEasting | ElementKind::LineWest | ElementKind::LineEast => {
                level.min_x = level.min_x.min(v);
                level.max_x = level.max_x.max(v);
            }
            ElementKind::LineNorthing | ElementKind::LineSouth | ElementKind::LineNorth => {
                let y = match hemisphere {
                    Hemisphere::North => v,
                    Hemisphere::South => v - SOUTH_OFFSET,
                };
                if y < level.min_y {
                    level.min_y = y;
                    level.min_y_hemisphere = hemisphere;
                }
                if y > level.max_y {
                    level.max_y = y;
                    level.max_y_hemisphere = hemisphere;
                }
            }
            _ => {}
        }
    }

    /// Labels for every recorded line, anchored near the look-at point and
    /// shifted by `offset` viewport fractions.
    pub fn labels(&self, frame: &FrameState, offset: (f64, f64), coords: &dyn CoordinateService) -> Vec<ScaleLabel> {
        let Some(zone) = self.zone else {
            return Vec::new();
        };
        let look = frame.look_at.position;
        let look_hemi = Hemisphere::of(look.lat);
        let Some((e0, n0)) = coords.zone_forward(ZoneId::Utm { zone, hemisphere: look_hemi }, look) else {
            return Vec::new();
        };
        let n0 = match look_hemi {
            Hemisphere::North => n0,
            Hemisphere::South => n0 - utm::FALSE_NORTHING_SOUTH,
        };

        let camera = &frame.view.camera;
        let label_northing = n0 + offset.1 * frame.pixel_size * camera.viewport_height;
        let label_easting = e0 + offset.0 * frame.pixel_size * camera.viewport_width;
        let max_distance = 10.0 * frame.altitude_above_ground;

        let place = |easting: f64, signed_northing: f64| -> Option<Position> {
            let (hemi, n) = if signed_northing < 0.0 {
                (Hemisphere::South, signed_northing + utm::FALSE_NORTHING_SOUTH)
            } else {
                (Hemisphere::North, signed_northing)
            };
            let p = coords.zone_inverse(ZoneId::Utm { zone, hemisphere: hemi }, easting, n)?;
            let point = geo::surface_point(p.lat, p.lon, 0.0, frame.view.radius);
            if !frame.view.is_visible(point) || point.distance(frame.view.eye) > max_distance {
                return None;
            }
            Some(Position::new(p.lat, p.lon, 0.0))
        };

        let mut out = Vec::new();
        for (index, level) in self.levels.iter().enumerate() {
            if level.is_empty() {
                continue;
            }
            let step = 10i64.pow(index as u32);
            let Some(ty) = GraticuleType::metric(self.family, step as f64) else {
                continue;
            };
            // Multiples of the next spacing up are labelled at that level.
            let coarser = self
                .levels
                .get(index + 1)
                .map_or(false, |l| !l.is_empty());
            let skip = |v: i64| coarser && v % (step * 10) == 0;

            if level.has_x() {
                let mut x = level.min_x.div_euclid(step) * step;
                if x < level.min_x {
                    x += step;
                }
                while x <= level.max_x {
                    if !skip(x) {
                        if let Some(position) = place(x as f64, label_northing) {
                            out.push(ScaleLabel {
                                position,
                                text: x.to_string(),
                                ty,
                                priority: step as f64,
                            });
                        }
                    }
                    x += step;
                }
            }
            if level.has_y() {
                let mut y = level.min_y.div_euclid(step) * step;
                if y < level.min_y {
                    y += step;
                }
                while y <= level.max_y {
                    if !skip(y) {
                        if let Some(position) = place(label_easting, y as f64) {
                            let northing = if y < 0 { y + SOUTH_OFFSET } else { y };
                            out.push(ScaleLabel {
                                position,
                                text: northing.to_string(),
                                ty,
                                priority: step as f64,
                            });
                        }
                    }
                    y += step;
                }
            }
        }
        out
    }
}
