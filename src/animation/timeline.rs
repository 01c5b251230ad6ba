use crate::animation::camera::{CameraState, interpolate};
use crate::animation::ease::Ease;
use crate::foundation::error::{MaptrailError, MaptrailResult};

/// Continuous camera timeline evaluated against global export time.
///
/// This is the contract the export pipeline uses in timeline mode: given a timestamp in seconds,
/// produce the camera pose for that instant.
pub trait CameraTimeline {
    /// Total length of the timeline in seconds.
    fn duration_secs(&self) -> f64;

    /// Pose at `time_secs` (seconds from export start).
    fn camera_at(&self, time_secs: f64) -> MaptrailResult<CameraState>;
}

/// Timeline built from an ordered list of poses with a fixed duration per leg.
#[derive(Clone, Debug)]
pub struct WaypointTimeline {
    poses: Vec<CameraState>,
    leg_secs: f64,
    ease: Ease,
}

impl WaypointTimeline {
    /// Build a timeline; needs at least two poses and a positive, finite leg duration.
    pub fn new(poses: Vec<CameraState>, leg_secs: f64, ease: Ease) -> MaptrailResult<Self> {
        if poses.len() < 2 {
            return Err(MaptrailError::validation(
                "timeline needs at least 2 waypoints",
            ));
        }
        if !leg_secs.is_finite() || leg_secs <= 0.0 {
            return Err(MaptrailError::validation(
                "timeline leg duration must be positive",
            ));
        }
        Ok(Self {
            poses,
            leg_secs,
            ease,
        })
    }

    fn leg_count(&self) -> usize {
        self.poses.len() - 1
    }
}

impl CameraTimeline for WaypointTimeline {
    fn duration_secs(&self) -> f64 {
        self.leg_secs * self.leg_count() as f64
    }

    fn camera_at(&self, time_secs: f64) -> MaptrailResult<CameraState> {
        if !time_secs.is_finite() {
            return Err(MaptrailError::validation("timeline time must be finite"));
        }
        let pos = (time_secs / self.leg_secs).max(0.0);
        let last_leg = self.leg_count() - 1;
        let leg = (pos.floor() as usize).min(last_leg);
        let t = (pos - leg as f64).clamp(0.0, 1.0);
        Ok(interpolate(
            &self.poses[leg],
            &self.poses[leg + 1],
            t,
            self.ease,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
