use crate::animation::camera::CameraState;
use crate::foundation::core::{EntityId, Point};
use crate::foundation::error::{MaptrailError, MaptrailResult};

/// Screen position of one waypoint at capture time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntityProjection {
    /// Waypoint id.
    pub id: EntityId,
    /// Screen x in pixels.
    pub x: f64,
    /// Screen y in pixels.
    pub y: f64,
}

impl EntityProjection {
    pub(crate) fn new(id: EntityId, p: Point) -> Self {
        Self { id, x: p.x, y: p.y }
    }
}

/// Screen position of one pin at capture time, with its label for correlation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PinProjection {
    /// Pin id.
    pub id: EntityId,
    /// Pin label at capture time.
    pub text: String,
    /// Screen x in pixels.
    pub x: f64,
    /// Screen y in pixels.
    pub y: f64,
}

/// Metadata captured alongside one exported frame.
///
/// `time` is `index / fps` of the frame it belongs to, so it strictly increases with capture
/// order and can be written to keyframe scripts verbatim.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    /// Seconds from export start.
    pub time: f64,
    /// Pose the renderer painted.
    #[serde(flatten)]
    pub camera: CameraState,
    /// Path reveal progress in `[0, 1]` (eased; may overshoot for overshooting easings).
    pub path_progress: f64,
    /// Projected waypoints in project order.
    pub waypoints: Vec<EntityProjection>,
    /// Projected pins in project order.
    pub pins: Vec<PinProjection>,
}

/// Serialize records as a JSON array.
pub fn records_to_json(records: &[FrameRecord]) -> MaptrailResult<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| MaptrailError::encoding(format!("serialize frame records: {e}")))
}
