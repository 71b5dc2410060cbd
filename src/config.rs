//! Run configuration: caption style, animation timing, output encoding and tool paths.
//!
//! Every field has a default matching the classic behavior (Times New Roman 70px black caption,
//! 5-15s animations every 60s, 24fps MP4 with AAC audio). A JSON file may override any subset.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::path::ensure_file;
use crate::assets::tools::MediaTools;
use crate::effects::catalog::{Effect, EffectCatalog};
use crate::foundation::core::Fps;
use crate::foundation::error::{StillcastError, StillcastResult};
use crate::schedule::scheduler::AnimationTiming;

/// Horizontal anchoring of the caption block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    /// Lines start at `margin` from the left edge.
    Left,
    /// Lines are centered on the canvas.
    #[default]
    Center,
    /// Lines end at `margin` from the right edge.
    Right,
}

/// Vertical anchoring of the caption block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    /// Block top sits `margin` below the top edge.
    Top,
    /// Block is vertically centered.
    #[default]
    Center,
    /// Block bottom sits `margin` above the bottom edge.
    Bottom,
}

/// How the caption is animated over the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionMode {
    /// Shuffled catalog effects in windows separated by gaps.
    #[default]
    Animated,
    /// One caption for the whole clip, drifting down from the top at reduced opacity.
    Drift,
}

/// Caption look.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    /// Preferred font family; generic `serif` is used as a fallback.
    pub font_family: String,
    /// Font size in output pixels.
    pub font_size: f32,
    /// Any SVG color (`black`, `#ffcc00`, `rgb(...)`).
    pub color: String,
    /// Horizontal anchoring.
    pub align: HAlign,
    /// Vertical anchoring.
    pub vertical: VAlign,
    /// Distance from the anchored edge(s) in pixels.
    pub margin: f32,
    /// Extra directory scanned for `.ttf`/`.otf`/`.ttc` fonts.
    pub font_dir: Option<PathBuf>,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "Times New Roman".to_string(),
            font_size: 70.0,
            color: "black".to_string(),
            align: HAlign::Center,
            vertical: VAlign::Center,
            margin: 50.0,
            font_dir: None,
        }
    }
}

impl CaptionStyle {
    fn validate(&self) -> StillcastResult<()> {
        if self.font_family.trim().is_empty() {
            return Err(StillcastError::invalid_config("caption font_family is empty"));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(StillcastError::invalid_config(format!(
                "caption font_size must be positive, got {}",
                self.font_size
            )));
        }
        if self.color.trim().is_empty() {
            return Err(StillcastError::invalid_config("caption color is empty"));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(StillcastError::invalid_config(format!(
                "caption margin must be non-negative, got {}",
                self.margin
            )));
        }
        Ok(())
    }
}

/// Which effects run and how long they last.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Caption mode.
    pub mode: CaptionMode,
    /// Effect names making up the catalog (animated mode).
    pub effects: Vec<String>,
    /// Lower bound for the per-run animation duration.
    pub min_secs: f64,
    /// Upper bound for the per-run animation duration.
    pub max_secs: f64,
    /// Gap between consecutive animations.
    pub gap_secs: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let timing = AnimationTiming::default();
        Self {
            mode: CaptionMode::Animated,
            effects: Effect::CATALOG.iter().map(|e| e.name().to_string()).collect(),
            min_secs: timing.min_secs,
            max_secs: timing.max_secs,
            gap_secs: timing.gap_secs,
        }
    }
}

impl AnimationConfig {
    /// Resolve the configured effect names.
    pub fn catalog(&self) -> StillcastResult<EffectCatalog> {
        EffectCatalog::from_names(&self.effects)
    }

    /// Duration range and gap.
    pub fn timing(&self) -> AnimationTiming {
        AnimationTiming {
            min_secs: self.min_secs,
            max_secs: self.max_secs,
            gap_secs: self.gap_secs,
        }
    }

    fn validate(&self) -> StillcastResult<()> {
        if self.mode == CaptionMode::Drift {
            return Ok(());
        }
        let catalog = self.catalog()?;
        if catalog.is_empty() {
            return Err(StillcastError::invalid_config("effect catalog must not be empty"));
        }
        self.timing().validate()
    }
}

/// Output file and encoder settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output video path.
    pub path: PathBuf,
    /// Output frame rate (integer fps).
    pub fps: u32,
    /// Height the base image is resized to; width follows the aspect ratio.
    pub target_height: u32,
    /// ffmpeg video codec.
    pub video_codec: String,
    /// ffmpeg audio codec.
    pub audio_codec: String,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output_video.mp4"),
            fps: 24,
            target_height: 720,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            overwrite: true,
        }
    }
}

impl OutputConfig {
    /// Output frame rate as a rational.
    pub fn fps(&self) -> StillcastResult<Fps> {
        Fps::new(self.fps, 1)
    }

    fn validate(&self) -> StillcastResult<()> {
        self.fps()?;
        if self.target_height < 2 || !self.target_height.is_multiple_of(2) {
            return Err(StillcastError::invalid_config(format!(
                "output target_height must be even and at least 2, got {}",
                self.target_height
            )));
        }
        if self.path.as_os_str().is_empty() {
            return Err(StillcastError::invalid_config("output path is empty"));
        }
        if self.video_codec.trim().is_empty() || self.audio_codec.trim().is_empty() {
            return Err(StillcastError::invalid_config(
                "output video_codec/audio_codec must not be empty",
            ));
        }
        Ok(())
    }
}

/// Complete run configuration.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StillcastConfig {
    /// Caption look.
    pub caption: CaptionStyle,
    /// Scheduling knobs.
    pub animation: AnimationConfig,
    /// Encoder settings.
    pub output: OutputConfig,
    /// External binaries.
    pub tools: MediaTools,
}

impl StillcastConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> StillcastResult<Self> {
        serde_json::from_str(s).map_err(|e| StillcastError::serde(e.to_string()))
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> StillcastResult<Self> {
        ensure_file(path)?;
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Check every section. Runs before any file is touched.
    pub fn validate(&self) -> StillcastResult<()> {
        self.caption.validate()?;
        self.animation.validate()?;
        self.output.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
