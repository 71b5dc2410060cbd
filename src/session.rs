//! One end-to-end run: inputs in, MP4 out.

use std::path::PathBuf;

use rand::Rng;

use crate::assets::decode::load_base_image;
use crate::assets::media::{AudioSourceInfo, probe_audio};
use crate::assets::path::ensure_file;
use crate::config::{AnimationConfig, CaptionMode, StillcastConfig, VAlign};
use crate::effects::catalog::{Effect, EffectCatalog};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::StillcastResult;
use crate::render::caption::Caption;
use crate::render::pipeline::{RenderPlan, RenderStats, render_plan};
use crate::scene::timeline::Timeline;
use crate::schedule::scheduler::{ScheduledRun, full_length, plan_run};

/// The three user inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRequest {
    /// Still image shown on every frame.
    pub image: PathBuf,
    /// Soundtrack; its duration sets the video duration.
    pub audio: PathBuf,
    /// Caption text; `\n` starts a new line.
    pub title: String,
}

/// What a finished run produced.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoReport {
    /// Written MP4.
    pub output: PathBuf,
    /// Audio duration, which is also the video duration.
    pub duration_secs: f64,
    /// Frame size after resizing the image.
    pub canvas: Canvas,
    /// Frame counters from the render loop.
    pub stats: RenderStats,
    /// Shuffled order, drawn duration and placements used for the captions.
    pub run: ScheduledRun,
}

/// Decide the caption placements for `total_secs` of audio.
///
/// Animated mode shuffles the catalog and tiles the timeline; drift mode shows one drifting
/// caption for the whole clip.
pub fn schedule_captions<R: Rng + ?Sized>(
    animation: &AnimationConfig,
    total_secs: f64,
    rng: &mut R,
) -> StillcastResult<ScheduledRun> {
    match animation.mode {
        CaptionMode::Animated => {
            plan_run(total_secs, &animation.catalog()?, &animation.timing(), rng)
        }
        CaptionMode::Drift => {
            let placements = full_length(total_secs, Effect::Drift)?;
            tracing::info!(duration = total_secs, "static drifting caption");
            Ok(ScheduledRun {
                order: EffectCatalog::new(vec![Effect::Drift]),
                animation_secs: total_secs,
                gap_secs: 0.0,
                placements,
            })
        }
    }
}

/// Validate, probe the audio and schedule, without decoding the image or encoding.
pub fn plan_video<R: Rng + ?Sized>(
    request: &VideoRequest,
    config: &StillcastConfig,
    rng: &mut R,
) -> StillcastResult<(AudioSourceInfo, ScheduledRun)> {
    config.validate()?;
    ensure_file(&request.image)?;
    ensure_file(&request.audio)?;

    let audio = probe_audio(&config.tools, &request.audio)?;
    let run = schedule_captions(&config.animation, audio.duration_secs, rng)?;
    Ok((audio, run))
}

/// Produce the captioned video described by `request` and `config`.
///
/// Configuration is checked before any file is read or written.
#[tracing::instrument(
    skip_all,
    fields(image = %request.image.display(), audio = %request.audio.display())
)]
pub fn make_video<R: Rng + ?Sized>(
    request: &VideoRequest,
    config: &StillcastConfig,
    rng: &mut R,
) -> StillcastResult<VideoReport> {
    let (audio, run) = plan_video(request, config, rng)?;

    let base = load_base_image(&request.image, config.output.target_height)?;
    let canvas = base.canvas();
    tracing::info!(width = canvas.width, height = canvas.height, "canvas");

    let mut style = config.caption.clone();
    if config.animation.mode == CaptionMode::Drift {
        style.vertical = VAlign::Top;
    }
    let caption = Caption::new(&request.title, &style, canvas)?;
    if !caption.has_text() {
        tracing::warn!("title is empty; the video will carry no caption");
    }

    let plan = RenderPlan {
        canvas,
        fps: config.output.fps()?,
        base,
        caption,
        timeline: Timeline::new(audio.duration_secs, run.placements.clone())?,
        audio: Some(AudioInputConfig {
            path: audio.path.clone(),
            codec: config.output.audio_codec.clone(),
        }),
    };

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::from_config(&config.output, &config.tools));
    let stats = render_plan(&plan, &mut sink)?;
    tracing::info!(
        output = %config.output.path.display(),
        frames = stats.frames_total,
        "video written"
    );

    Ok(VideoReport {
        output: config.output.path.clone(),
        duration_secs: audio.duration_secs,
        canvas,
        stats,
        run,
    })
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
