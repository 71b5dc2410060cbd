use crate::effects::catalog::OverlayState;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{StillcastError, StillcastResult};
use crate::render::caption::Caption;
use crate::render::composite::over_in_place;
use crate::render::frame::FrameRGBA;
use crate::scene::timeline::Timeline;

/// Everything needed to produce the frames of one video.
#[derive(Debug)]
pub struct RenderPlan {
    /// Output canvas; equals the base image size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Base image, premultiplied, shown on every frame.
    pub base: FrameRGBA,
    /// Title laid out on the canvas.
    pub caption: Caption,
    /// When and how the caption is shown.
    pub timeline: Timeline,
    /// Soundtrack handed to the sink.
    pub audio: Option<AudioInputConfig>,
}

impl RenderPlan {
    /// Check that the parts agree with each other.
    pub fn validate(&self) -> StillcastResult<()> {
        self.canvas.validate()?;
        if self.base.canvas() != self.canvas {
            return Err(StillcastError::invalid_config(format!(
                "base image is {}x{}, canvas is {}x{}",
                self.base.width, self.base.height, self.canvas.width, self.canvas.height
            )));
        }
        if self.base.data.len() != self.canvas.rgba_len() {
            return Err(StillcastError::invalid_config(
                "base image data size mismatch with width*height*4",
            ));
        }
        if self.caption.canvas() != self.canvas {
            return Err(StillcastError::invalid_config(
                "caption was laid out for a different canvas",
            ));
        }
        Ok(())
    }

    /// Number of frames needed to cover the whole timeline.
    pub fn frame_count(&self) -> u64 {
        self.fps.secs_to_frames_ceil(self.timeline.duration_secs())
    }

    /// Sink configuration for this plan.
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
            audio: self.audio.clone(),
        }
    }
}

/// Counters reported after a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames with a visible caption.
    pub frames_captioned: u64,
    /// Caption rasterizations performed; lower than `frames_captioned` when states repeat.
    pub caption_rasters: u64,
}

/// Render every frame of `plan` into `sink`.
///
/// On any error after `begin`, the sink is aborted so it can discard partial output.
#[tracing::instrument(skip_all, fields(width = plan.canvas.width, height = plan.canvas.height))]
pub fn render_plan(plan: &RenderPlan, sink: &mut dyn FrameSink) -> StillcastResult<RenderStats> {
    plan.validate()?;
    let total = plan.frame_count();
    tracing::info!(
        frames = total,
        fps = plan.fps.as_f64(),
        placements = plan.timeline.placements().len(),
        "rendering"
    );

    sink.begin(plan.sink_config())?;
    match render_frames(plan, total, sink) {
        Ok(stats) => {
            if let Err(e) = sink.end() {
                sink.abort();
                return Err(e);
            }
            tracing::info!(
                frames = stats.frames_total,
                captioned = stats.frames_captioned,
                rasters = stats.caption_rasters,
                "render finished"
            );
            Ok(stats)
        }
        Err(e) => {
            sink.abort();
            Err(e)
        }
    }
}

fn render_frames(
    plan: &RenderPlan,
    total: u64,
    sink: &mut dyn FrameSink,
) -> StillcastResult<RenderStats> {
    let mut stats = RenderStats::default();
    let mut cache = CaptionCache::default();
    let mut frame = plan.base.clone();

    for f in 0..total {
        let idx = FrameIndex(f);
        let t = plan.fps.frame_to_secs(idx);
        frame.data.copy_from_slice(&plan.base.data);

        if let Some(state) = plan.timeline.overlay_at(t)
            && !state.is_invisible()
        {
            let raster = cache.get(&plan.caption, &state, &mut stats)?;
            over_in_place(&mut frame.data, raster, state.opacity as f32)?;
            stats.frames_captioned += 1;
        }

        sink.push_frame(idx, &frame)?;
        stats.frames_total += 1;
    }
    Ok(stats)
}

/// Keeps the most recent caption raster; a held caption or a pure opacity effect reuses it.
#[derive(Default)]
struct CaptionCache {
    key: Option<(i64, i64)>,
    raster: Vec<u8>,
}

impl CaptionCache {
    fn get(
        &mut self,
        caption: &Caption,
        state: &OverlayState,
        stats: &mut RenderStats,
    ) -> StillcastResult<&[u8]> {
        // Sub-1/1000 scale and sub-1/100 pixel changes are not visible.
        let key = (
            (state.scale * 1000.0).round() as i64,
            (state.offset_y * 100.0).round() as i64,
        );
        if self.key != Some(key) {
            self.raster = caption.rasterize(state)?;
            self.key = Some(key);
            stats.caption_rasters += 1;
        }
        Ok(&self.raster)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
