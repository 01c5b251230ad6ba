use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use crate::animation::camera::{CameraState, interpolate};
use crate::animation::timeline::CameraTimeline;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::export::record::{EntityProjection, FrameRecord, PinProjection};
use crate::foundation::core::{Fps, FrameIndex, LngLat};
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::geometry::path::truncate;
use crate::project::model::{AnimationSettings, Pin, Waypoint};
use crate::render::session::RendererSession;

/// Lifecycle of the single export slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExportState {
    /// No export running.
    Idle = 0,
    /// Frames are being captured and streamed to the sink.
    Exporting = 1,
    /// Every frame was captured; the sink is finishing its output.
    Finalizing = 2,
    /// The export failed or was cancelled; cleanup is running.
    Aborted = 3,
}

impl ExportState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Exporting,
            2 => Self::Finalizing,
            3 => Self::Aborted,
            _ => Self::Idle,
        }
    }
}

/// Export progress as captured frames over total frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportProgress {
    /// Frames captured so far.
    pub frame: u64,
    /// Frames the export will capture.
    pub total: u64,
}

impl ExportProgress {
    /// Completion in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.frame as f64 / self.total as f64
        }
    }

    /// Completion as a rounded percentage.
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

impl std::fmt::Display for ExportProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rendering: {}%", self.percent())
    }
}

#[derive(Debug, Default)]
struct MonitorInner {
    state: AtomicU8,
    cancel: AtomicBool,
    frame: AtomicU64,
    total: AtomicU64,
}

/// Shared view of the export slot: state, progress and the cancel signal.
///
/// Clones observe the same export, so a UI thread can poll progress and request cancellation
/// while the export runs elsewhere.
#[derive(Clone, Debug, Default)]
pub struct ExportMonitor {
    inner: Arc<MonitorInner>,
}

impl ExportMonitor {
    /// Fresh monitor in [`ExportState::Idle`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ExportState {
        ExportState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    /// `true` unless the slot is idle.
    pub fn is_busy(&self) -> bool {
        self.state() != ExportState::Idle
    }

    /// Progress of the running (or last) export.
    pub fn progress(&self) -> ExportProgress {
        ExportProgress {
            frame: self.inner.frame.load(Ordering::Relaxed),
            total: self.inner.total.load(Ordering::Relaxed),
        }
    }

    /// Ask the running export to stop before its next frame. No effect while idle.
    pub fn cancel(&self) {
        if self.is_busy() {
            self.inner.cancel.store(true, Ordering::Release);
        }
    }

    /// `true` once cancellation has been requested for the running export.
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel.load(Ordering::Acquire)
    }

    fn try_begin(&self, total: u64) -> MaptrailResult<ExportSlot<'_>> {
        self.inner
            .state
            .compare_exchange(
                ExportState::Idle as u8,
                ExportState::Exporting as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| MaptrailError::validation("an export is already running"))?;
        self.inner.cancel.store(false, Ordering::Release);
        self.inner.frame.store(0, Ordering::Relaxed);
        self.inner.total.store(total, Ordering::Relaxed);
        Ok(ExportSlot { monitor: self })
    }
}

/// Holds the export slot; returns it to idle on drop, whatever path the export took.
struct ExportSlot<'a> {
    monitor: &'a ExportMonitor,
}

impl ExportSlot<'_> {
    fn set(&self, state: ExportState) {
        tracing::debug!(?state, "export state");
        self.monitor.inner.state.store(state as u8, Ordering::Release);
    }

    fn report(&self, frame: u64) {
        self.monitor.inner.frame.store(frame, Ordering::Relaxed);
    }
}

impl Drop for ExportSlot<'_> {
    fn drop(&mut self) {
        self.monitor.inner.cancel.store(false, Ordering::Release);
        self.set(ExportState::Idle);
    }
}

/// Pipeline tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// Longest wait for the renderer to report a repaint complete.
    pub render_timeout: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            render_timeout: Duration::from_secs(10),
        }
    }
}

/// How camera poses are sampled.
#[derive(Clone, Copy)]
pub enum FramePlan<'a> {
    /// Walk consecutive waypoint pairs; each leg lasts `settings.duration` seconds and is eased
    /// with `settings.easing`. Total frames: `ceil(duration * fps) * (waypoints - 1)`.
    Legs,
    /// Sample a continuous timeline at `index / fps`. Total frames:
    /// `ceil(timeline.duration_secs() * fps)`.
    Timeline(&'a dyn CameraTimeline),
}

impl std::fmt::Debug for FramePlan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legs => f.write_str("Legs"),
            Self::Timeline(t) => write!(f, "Timeline({}s)", t.duration_secs()),
        }
    }
}

/// Project content an export reads.
#[derive(Clone, Copy, Debug)]
pub struct ExportInput<'a> {
    /// Settings, validated once at export start.
    pub settings: &'a AnimationSettings,
    /// Waypoints: the legs in [`FramePlan::Legs`] mode and the tracked positions in both modes.
    pub waypoints: &'a [Waypoint],
    /// Pins whose positions are tracked.
    pub pins: &'a [Pin],
    /// Full drawn path; revealed progressively and restored afterwards.
    pub path: &'a [LngLat],
}

/// Result of a finished export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    /// Frames captured and handed to the sink.
    pub frames: u64,
    /// Metadata of every frame, in capture order.
    pub records: Vec<FrameRecord>,
}

struct Schedule<'a> {
    fps: Fps,
    total: u64,
    kind: ScheduleKind<'a>,
}

enum ScheduleKind<'a> {
    Legs {
        waypoints: &'a [Waypoint],
        frames_per_leg: u64,
        settings: &'a AnimationSettings,
    },
    Timeline(&'a dyn CameraTimeline),
}

impl<'a> Schedule<'a> {
    fn build(input: &ExportInput<'a>, plan: FramePlan<'a>) -> MaptrailResult<Self> {
        input.settings.validate()?;
        let fps = input.settings.fps()?;

        let (total, kind) = match plan {
            FramePlan::Legs => {
                if input.waypoints.len() < 2 {
                    return Err(MaptrailError::validation(
                        "at least 2 waypoints are required to export",
                    ));
                }
                let frames_per_leg = fps.secs_to_frames_ceil(input.settings.duration);
                let legs = (input.waypoints.len() - 1) as u64;
                (
                    frames_per_leg * legs,
                    ScheduleKind::Legs {
                        waypoints: input.waypoints,
                        frames_per_leg,
                        settings: input.settings,
                    },
                )
            }
            FramePlan::Timeline(timeline) => {
                let secs = timeline.duration_secs();
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(MaptrailError::validation(
                        "timeline duration must be positive",
                    ));
                }
                (fps.secs_to_frames_ceil(secs), ScheduleKind::Timeline(timeline))
            }
        };

        if total == 0 {
            return Err(MaptrailError::validation("export would produce no frames"));
        }
        Ok(Self { fps, total, kind })
    }

    fn camera_at(&self, idx: u64, time: f64) -> MaptrailResult<CameraState> {
        match &self.kind {
            ScheduleKind::Legs {
                waypoints,
                frames_per_leg,
                settings,
            } => {
                let leg = (idx / frames_per_leg) as usize;
                let i = idx % frames_per_leg;
                let t = i as f64 / *frames_per_leg as f64;
                Ok(interpolate(
                    &waypoints[leg].camera,
                    &waypoints[leg + 1].camera,
                    t,
                    settings.easing,
                ))
            }
            ScheduleKind::Timeline(timeline) => timeline.camera_at(time),
        }
    }
}

/// Drives the renderer through every frame of an export and hands the frames to a sink.
///
/// Only one export runs per monitor: a second request while one is running is rejected with a
/// validation error and never queued.
#[derive(Clone, Debug, Default)]
pub struct Exporter {
    monitor: ExportMonitor,
    options: ExportOptions,
}

impl Exporter {
    /// Exporter with its own monitor.
    pub fn new(options: ExportOptions) -> Self {
        Self::with_monitor(ExportMonitor::new(), options)
    }

    /// Exporter sharing `monitor` with other holders.
    pub fn with_monitor(monitor: ExportMonitor, options: ExportOptions) -> Self {
        Self { monitor, options }
    }

    /// Monitor observing this exporter.
    pub fn monitor(&self) -> &ExportMonitor {
        &self.monitor
    }

    /// Options in effect.
    pub fn options(&self) -> ExportOptions {
        self.options
    }

    /// Run one export.
    ///
    /// Frames are produced strictly in order: apply pose and path, wait for the repaint, record
    /// projections, capture. The next pose is only issued after the current capture returned.
    /// Each frame goes to `sink` as soon as it is captured, so memory use does not grow with the
    /// frame count. The path layer is restored to `input.path` on every exit. On error or
    /// cancellation the sink is aborted instead of ended and no output is produced.
    #[tracing::instrument(skip_all, fields(plan = ?plan))]
    pub fn run(
        &self,
        session: &mut RendererSession,
        input: &ExportInput<'_>,
        plan: FramePlan<'_>,
        sink: &mut dyn FrameSink,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> MaptrailResult<ExportReport> {
        let schedule = Schedule::build(input, plan)?;
        let slot = self.monitor.try_begin(schedule.total)?;
        tracing::info!(
            frames = schedule.total,
            fps = schedule.fps.as_f64(),
            resolution = %input.settings.resolution,
            "export started"
        );

        let cfg = SinkConfig {
            width: input.settings.resolution.width,
            height: input.settings.resolution.height,
            fps: schedule.fps,
        };
        let streamed = sink
            .begin(cfg)
            .map_err(as_encoding_error)
            .and_then(|()| self.capture_all(session, input, &schedule, &slot, sink, progress));
        let restored = session.reset_path(input.path);

        let records = match (streamed, restored) {
            (Ok(records), Ok(())) => records,
            (Err(e), restored) => {
                slot.set(ExportState::Aborted);
                sink.abort();
                if let Err(reset_err) = restored {
                    tracing::warn!(error = %reset_err, "failed to restore path layer");
                }
                if matches!(e, MaptrailError::Cancelled { .. }) {
                    tracing::warn!(error = %e, "export cancelled");
                } else {
                    tracing::warn!(error = %e, "export aborted");
                }
                return Err(e);
            }
            (Ok(_), Err(e)) => {
                slot.set(ExportState::Aborted);
                sink.abort();
                tracing::warn!(error = %e, "export aborted while restoring path layer");
                return Err(e);
            }
        };

        slot.set(ExportState::Finalizing);
        tracing::info!(frames = records.len(), "finalizing export");
        if let Err(e) = sink.end() {
            slot.set(ExportState::Aborted);
            sink.abort();
            tracing::warn!(error = %e, "encoding failed");
            return Err(as_encoding_error(e));
        }

        tracing::info!("export finished");
        Ok(ExportReport {
            frames: records.len() as u64,
            records,
        })
    }

    fn capture_all(
        &self,
        session: &mut RendererSession,
        input: &ExportInput<'_>,
        schedule: &Schedule<'_>,
        slot: &ExportSlot<'_>,
        sink: &mut dyn FrameSink,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> MaptrailResult<Vec<FrameRecord>> {
        let reveal = input.settings.path_reveal();
        let resolution = input.settings.resolution;
        let animate_path = input.path.len() >= 2;

        let mut records = Vec::with_capacity(schedule.total.min(4096) as usize);

        for idx in 0..schedule.total {
            if self.monitor.is_cancel_requested() {
                return Err(MaptrailError::Cancelled { frames: idx });
            }

            let time = schedule.fps.frame_time_secs(FrameIndex(idx));
            let camera = schedule.camera_at(idx, time)?;
            let path_progress = reveal.progress_at(time);

            let partial;
            let path = if animate_path {
                partial = truncate(input.path, path_progress);
                Some(partial.as_slice())
            } else {
                None
            };
            session.show_pose(&camera, path)?;
            session.repaint_and_wait(self.options.render_timeout)?;

            records.push(FrameRecord {
                time,
                camera: session.renderer().camera(),
                path_progress,
                waypoints: input
                    .waypoints
                    .iter()
                    .map(|w| EntityProjection::new(w.id, session.project(w.camera.center())))
                    .collect(),
                pins: input
                    .pins
                    .iter()
                    .map(|p| {
                        let at = session.project(p.position());
                        PinProjection {
                            id: p.id,
                            text: p.text.clone(),
                            x: at.x,
                            y: at.y,
                        }
                    })
                    .collect(),
            });

            let frame = session.capture(resolution)?;
            sink.push_frame(FrameIndex(idx), &frame).map_err(as_encoding_error)?;

            tracing::debug!(frame = idx, time, zoom = camera.zoom, path_progress, "frame streamed");
            slot.report(idx + 1);
            progress(ExportProgress {
                frame: idx + 1,
                total: schedule.total,
            });
        }

        Ok(records)
    }
}

fn as_encoding_error(e: MaptrailError) -> MaptrailError {
    match e {
        MaptrailError::Encoding(_) => e,
        other => MaptrailError::encoding(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
