//! Maptrail turns a list of map camera waypoints into a frame-accurate animation.
//!
//! The crate is renderer-agnostic: anything implementing [`MapRenderer`] can be driven. A
//! headless [`PreviewRenderer`] ships for tests and the CLI.
//!
//! - Edit a [`Project`] through a [`Studio`] (waypoints, pins, drawn path)
//! - Export frames into a [`FrameSink`] ([`ZipSink`], [`FfmpegSink`], [`InMemorySink`])
//! - Emit a compositor keyframe script from the recorded [`FrameRecord`]s
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod encode;
mod export;
mod foundation;
mod geometry;
mod pins;
mod project;
mod render;
mod studio;

pub use crate::foundation::core::{
    Affine, EntityId, Fps, FrameIndex, IdAllocator, LngLat, Point, Resolution, Vec2,
};
pub use crate::foundation::error::{MaptrailError, MaptrailResult};

pub use crate::animation::camera::{CameraState, interpolate};
pub use crate::animation::ease::Ease;
pub use crate::animation::reveal::PathReveal;
pub use crate::animation::timeline::{CameraTimeline, WaypointTimeline};
pub use crate::geometry::path::{FULL_PROGRESS_EPSILON, total_length, truncate};

pub use crate::project::model::{AnimationSettings, PathStyle, Pin, PinStyle, Project, Waypoint};

pub use crate::pins::icon::{MarkerAnchor, PinIcon, PinIconCache, pin_svg};

pub use crate::render::frame::{FrameRGBA, SvgRasterizer};
pub use crate::render::preview::{PreviewRenderer, world_point};
pub use crate::render::renderer::{
    FrameCapture, MapRenderer, PathLineStyle, ReadbackCapture, RenderEvent, RenderNotifier,
    RepaintId,
};
pub use crate::render::session::RendererSession;

pub use crate::export::pipeline::{
    ExportInput, ExportMonitor, ExportOptions, ExportProgress, ExportReport, ExportState,
    Exporter, FramePlan,
};
pub use crate::export::record::{EntityProjection, FrameRecord, PinProjection, records_to_json};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use crate::encode::script::{
    SCRIPT_FILE_NAME, ScriptInput, escape_string_literal, keyframe_script, write_keyframe_script,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, NullSink, SinkConfig};
pub use crate::encode::zip::{ZipSink, frame_file_name};

pub use crate::studio::{PinEdit, Studio};
