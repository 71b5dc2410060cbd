//! `stillcast` turns a still image, an audio track and a title into an MP4 whose caption is
//! animated on a schedule derived from the audio duration.
//!
//! The pipeline is:
//! - probe the audio duration with `ffprobe`
//! - shuffle the effect catalog and tile the timeline with caption placements
//! - decode and resize the image, lay out the title
//! - render every frame on the CPU and stream it into `ffmpeg` together with the audio
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assets;
pub mod config;
pub mod effects;
pub mod encode;
mod foundation;
pub mod render;
pub mod scene;
pub mod schedule;
pub mod session;

pub use assets::decode::{fit_to_height, load_base_image};
pub use assets::media::{AudioSourceInfo, probe_audio};
pub use assets::path::{clean_path, ensure_file};
pub use assets::tools::MediaTools;
pub use config::{
    AnimationConfig, CaptionMode, CaptionStyle, HAlign, OutputConfig, StillcastConfig, VAlign,
};
pub use effects::catalog::{Effect, EffectCatalog, OverlayState, apply_named};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Canvas, Fps, FrameIndex};
pub use foundation::error::{StillcastError, StillcastResult};
pub use render::caption::Caption;
pub use render::frame::FrameRGBA;
pub use render::pipeline::{RenderPlan, RenderStats, render_plan};
pub use scene::timeline::Timeline;
pub use schedule::scheduler::{
    AnimationTiming, Placement, ScheduledRun, full_length, plan_run, schedule,
};
pub use session::{VideoReport, VideoRequest, make_video, plan_video, schedule_captions};
