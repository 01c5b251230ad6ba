use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::animation::camera::CameraState;
use crate::foundation::core::{LngLat, Point, Resolution};
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::render::frame::FrameRGBA;
use crate::render::renderer::{
    FrameCapture, MapRenderer, ReadbackCapture, RenderEvent, RenderNotifier, RepaintId,
};

/// Owned handle to the renderer and its frame grabber.
///
/// Whoever holds the session holds the only right to change the pose and the path layer. The
/// editing facade owns it while idle and lends it to the export pipeline for the duration of an
/// export.
pub struct RendererSession {
    renderer: Box<dyn MapRenderer>,
    capture: Box<dyn FrameCapture>,
    events: mpsc::Receiver<RenderEvent>,
}

impl RendererSession {
    /// Wrap `renderer`, capturing by surface read-back.
    pub fn new(renderer: Box<dyn MapRenderer>) -> Self {
        Self::with_capture(renderer, Box::new(ReadbackCapture))
    }

    /// Wrap `renderer` with a custom frame grabber.
    pub fn with_capture(mut renderer: Box<dyn MapRenderer>, capture: Box<dyn FrameCapture>) -> Self {
        let (notifier, events) = RenderNotifier::channel();
        renderer.on_render_complete(notifier);
        Self {
            renderer,
            capture,
            events,
        }
    }

    /// Borrow the renderer.
    pub fn renderer(&self) -> &dyn MapRenderer {
        self.renderer.as_ref()
    }

    /// Borrow the renderer mutably.
    pub fn renderer_mut(&mut self) -> &mut dyn MapRenderer {
        self.renderer.as_mut()
    }

    /// Apply a pose, optionally replacing the path layer first.
    pub fn show_pose(&mut self, camera: &CameraState, path: Option<&[LngLat]>) -> MaptrailResult<()> {
        if let Some(coords) = path {
            self.renderer.set_path_data(coords)?;
        }
        self.renderer.jump_to(camera)
    }

    /// Request a repaint and block until the renderer reports it complete.
    ///
    /// Completion events for older repaints are skipped, so at most one pose is ever in flight.
    /// A failure the renderer reported since the last wait fails this call before repainting.
    /// A silent renderer surfaces as a [`MaptrailError::Renderer`] after `timeout`.
    pub fn repaint_and_wait(&mut self, timeout: Duration) -> MaptrailResult<RepaintId> {
        self.drain_stale_events()?;
        let want = self.renderer.request_repaint()?;
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(RenderEvent::Idle(got)) if got >= want => return Ok(want),
                Ok(RenderEvent::Idle(stale)) => {
                    tracing::trace!(stale = stale.0, want = want.0, "skipping stale render event");
                }
                Ok(RenderEvent::Failed(msg)) => {
                    return Err(MaptrailError::renderer(format!("repaint failed: {msg}")));
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(MaptrailError::renderer(format!(
                        "renderer did not finish repaint {} within {:?}",
                        want.0, timeout
                    )));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(MaptrailError::renderer(
                        "renderer dropped its render-complete subscription",
                    ));
                }
            }
        }
    }

    /// Capture what was last painted.
    pub fn capture(&mut self, resolution: Resolution) -> MaptrailResult<FrameRGBA> {
        let frame = self
            .capture
            .capture_frame(self.renderer.as_ref(), resolution)?;
        frame.validate()?;
        Ok(frame)
    }

    /// Screen position of `at` under the current pose.
    pub fn project(&self, at: LngLat) -> Point {
        self.renderer.project(at)
    }

    /// Put the path layer back to `coords`.
    pub fn reset_path(&mut self, coords: &[LngLat]) -> MaptrailResult<()> {
        self.renderer.set_path_data(coords)
    }

    /// Drop leftover idle events; a pending failure is reported, not discarded.
    fn drain_stale_events(&mut self) -> MaptrailResult<()> {
        while let Ok(event) = self.events.try_recv() {
            if let RenderEvent::Failed(msg) = event {
                return Err(MaptrailError::renderer(format!("repaint failed: {msg}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
