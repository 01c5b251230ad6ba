use std::sync::mpsc;

use crate::animation::camera::CameraState;
use crate::foundation::core::{EntityId, LngLat, Point, Resolution};
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::pins::icon::PinIcon;
use crate::project::model::AnimationSettings;
use crate::render::frame::FrameRGBA;

/// Monotonic identifier of one requested repaint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepaintId(pub u64);

/// Completion signal sent by a renderer after a repaint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    /// The repaint with this id (and everything before it) reached the surface.
    Idle(RepaintId),
    /// The renderer could not paint; fatal to a running export.
    Failed(String),
}

/// Sending half of a render-complete subscription.
#[derive(Clone, Debug)]
pub struct RenderNotifier {
    tx: mpsc::Sender<RenderEvent>,
}

impl RenderNotifier {
    /// Create a subscription pair.
    pub fn channel() -> (Self, mpsc::Receiver<RenderEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Report a completed repaint. Returns `false` once nobody is listening.
    pub fn idle(&self, id: RepaintId) -> bool {
        self.tx.send(RenderEvent::Idle(id)).is_ok()
    }

    /// Report a failed repaint. Returns `false` once nobody is listening.
    pub fn failed(&self, msg: impl Into<String>) -> bool {
        self.tx.send(RenderEvent::Failed(msg.into())).is_ok()
    }
}

/// Styling of the drawn path line as the renderer paints it.
#[derive(Clone, Debug, PartialEq)]
pub struct PathLineStyle {
    /// Stroke colour.
    pub color: String,
    /// Stroke width in pixels.
    pub width: f64,
    /// Dash pattern in multiples of `width`.
    pub dash: Option<[f64; 2]>,
}

impl PathLineStyle {
    /// Line style configured by `settings`.
    pub fn from_settings(settings: &AnimationSettings) -> Self {
        Self {
            color: settings.path_color.clone(),
            width: settings.path_width,
            dash: settings.path_style.dash_array(),
        }
    }
}

impl Default for PathLineStyle {
    fn default() -> Self {
        Self::from_settings(&AnimationSettings::default())
    }
}

/// The map renderer the export pipeline drives.
///
/// One renderer is one shared mutable surface: one camera, one path layer, one marker set.
/// Pose and path commands are applied immediately without animation; a completed paint is
/// announced through the [`RenderNotifier`] registered with
/// [`on_render_complete`](MapRenderer::on_render_complete).
pub trait MapRenderer: Send {
    /// Current camera pose.
    fn camera(&self) -> CameraState;

    /// Jump to `camera` without tweening.
    fn jump_to(&mut self, camera: &CameraState) -> MaptrailResult<()>;

    /// Replace the path layer's coordinates.
    fn set_path_data(&mut self, coords: &[LngLat]) -> MaptrailResult<()>;

    /// Restyle the path layer.
    fn set_path_style(&mut self, style: &PathLineStyle) -> MaptrailResult<()>;

    /// Create or replace the marker for pin `id`.
    fn upsert_marker(&mut self, id: EntityId, icon: &PinIcon, at: LngLat) -> MaptrailResult<()>;

    /// Remove the marker for pin `id`. Unknown ids are ignored.
    fn remove_marker(&mut self, id: EntityId);

    /// Register the render-complete subscription, replacing any previous one.
    fn on_render_complete(&mut self, notifier: RenderNotifier);

    /// Ask for a repaint of the current state. Ids increase with every call.
    fn request_repaint(&mut self) -> MaptrailResult<RepaintId>;

    /// Screen position of `at` under the current pose.
    fn project(&self, at: LngLat) -> Point;

    /// Read back the most recently completed paint.
    fn read_pixels(&self) -> MaptrailResult<FrameRGBA>;
}

/// Frame grabber reading the renderer's surface.
pub trait FrameCapture: Send {
    /// Capture exactly what was last painted at `resolution`.
    fn capture_frame(
        &mut self,
        renderer: &dyn MapRenderer,
        resolution: Resolution,
    ) -> MaptrailResult<FrameRGBA>;
}

/// Capture by surface read-back, resampling when the surface size differs from the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReadbackCapture;

impl FrameCapture for ReadbackCapture {
    fn capture_frame(
        &mut self,
        renderer: &dyn MapRenderer,
        resolution: Resolution,
    ) -> MaptrailResult<FrameRGBA> {
        let frame = renderer.read_pixels()?;
        frame.validate()?;
        if frame.resolution() == resolution {
            return Ok(frame);
        }

        tracing::debug!(
            from = %frame.resolution(),
            to = %resolution,
            "resampling captured surface"
        );
        let img = frame.to_straight_image()?;
        let resized = image::imageops::resize(
            &img,
            resolution.width,
            resolution.height,
            image::imageops::FilterType::Triangle,
        );
        let out = FrameRGBA::from_straight_image(resized);
        if out.resolution() != resolution {
            return Err(MaptrailError::renderer("resampled frame has the wrong size"));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
