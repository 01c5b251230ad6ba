use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::MaptrailResult;
use crate::render::frame::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when an export starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second, equal to the capture rate.
    pub fps: Fps,
}

/// Sink contract for consuming captured frames in export order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order, one
/// call per captured frame. Frames are handed over as soon as they are captured, so a sink
/// never holds more than it chooses to buffer. An export that stops early calls `abort`
/// instead of `end`, and the sink must leave no artifact behind.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> MaptrailResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MaptrailResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> MaptrailResult<()>;
    /// Discard everything pushed since `begin`. Safe to call on a sink that was never started.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if the sink was started.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MaptrailResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MaptrailResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MaptrailResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        *self = Self::default();
    }
}

/// Sink that discards frames; used when only frame records are wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink {
    frames: u64,
}

impl NullSink {
    /// Frames received since the last `begin`.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for NullSink {
    fn begin(&mut self, _cfg: SinkConfig) -> MaptrailResult<()> {
        self.frames = 0;
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> MaptrailResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> MaptrailResult<()> {
        Ok(())
    }

    fn abort(&mut self) {
        self.frames = 0;
    }
}
