use std::fmt;

use glam::DVec3;

use crate::grid::frame::FrameState;

/// Angle change, in degrees, that forces a rebuild.
const ANGLE_THRESHOLD: f64 = 1.0;

/// Eye movement, as a fraction of the altitude above ground, that forces a
/// rebuild.
const MOVE_THRESHOLD: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerReason {
    FirstPass,
    Invalidated,
    Exaggeration,
    Heading,
    Tilt,
    FieldOfView,
    Moved,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerReason::FirstPass => "first pass",
            TriggerReason::Invalidated => "invalidated",
            TriggerReason::Exaggeration => "vertical exaggeration changed",
            TriggerReason::Heading => "heading changed",
            TriggerReason::Tilt => "tilt changed",
            TriggerReason::FieldOfView => "field of view changed",
            TriggerReason::Moved => "camera moved",
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct Snapshot {
    eye: DVec3,
    heading: f64,
    tilt: f64,
    fov: f64,
    exaggeration: f64,
}

impl Snapshot {
    fn of(frame: &FrameState) -> Self {
        let camera = &frame.view.camera;
        Self {
            eye: frame.view.eye,
            heading: camera.heading,
            tilt: camera.tilt,
            fov: camera.fov,
            exaggeration: frame.vertical_exaggeration,
        }
    }
}

fn angle_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Decides when the layer's output must be rebuilt.
#[derive(Debug, Default)]
pub struct UpdateTrigger {
    last: Option<Snapshot>,
    forced: bool,
}

impl UpdateTrigger {
    /// Reason to rebuild, if any. A firing check snapshots the camera so the
    /// same state does not fire twice.
    pub fn check(&mut self, frame: &FrameState) -> Option<TriggerReason> {
        let now = Snapshot::of(frame);
        let reason = match self.last {
            None => Some(TriggerReason::FirstPass),
            Some(_) if self.forced => Some(TriggerReason::Invalidated),
            Some(last) => {
                if now.exaggeration != last.exaggeration {
                    Some(TriggerReason::Exaggeration)
                } else if angle_delta(now.heading, last.heading) > ANGLE_THRESHOLD {
                    Some(TriggerReason::Heading)
                } else if (now.tilt - last.tilt).abs() > ANGLE_THRESHOLD {
                    Some(TriggerReason::Tilt)
                } else if (now.fov - last.fov).abs() > ANGLE_THRESHOLD {
                    Some(TriggerReason::FieldOfView)
                } else if now.eye.distance(last.eye) > frame.altitude_above_ground * MOVE_THRESHOLD {
                    Some(TriggerReason::Moved)
                } else {
                    None
                }
            }
        };
        if reason.is_some() {
            self.last = Some(now);
            self.forced = false;
        }
        reason
    }

    /// Force the next check to fire.
    pub fn invalidate(&mut self) {
        self.forced = true;
    }
}
