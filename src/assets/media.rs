use std::path::{Path, PathBuf};

use crate::assets::path::ensure_file;
use crate::assets::tools::MediaTools;
use crate::foundation::error::{StillcastError, StillcastResult};

#[derive(Clone, Debug, PartialEq)]
/// Basic metadata about the audio track.
pub struct AudioSourceInfo {
    /// Source path handed to the encoder as-is.
    pub path: PathBuf,
    /// Duration in seconds; drives the whole timeline.
    pub duration_secs: f64,
    /// Sample rate of the first audio stream, when reported.
    pub sample_rate: Option<u32>,
    /// Channel count of the first audio stream, when reported.
    pub channels: Option<u16>,
}

/// Probe audio metadata through `ffprobe`.
#[tracing::instrument(skip(tools))]
pub fn probe_audio(tools: &MediaTools, path: &Path) -> StillcastResult<AudioSourceInfo> {
    ensure_file(path)?;

    let out = std::process::Command::new(&tools.ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            StillcastError::media(format!(
                "failed to run ffprobe '{}': {e}",
                tools.ffprobe.display()
            ))
        })?;
    if !out.status.success() {
        return Err(StillcastError::media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let info = parse_probe_json(path, &out.stdout)?;
    tracing::info!(
        duration_secs = info.duration_secs,
        sample_rate = info.sample_rate,
        channels = info.channels,
        "probed audio"
    );
    Ok(info)
}

/// Interpret `ffprobe -print_format json -show_streams -show_format` output.
pub(crate) fn parse_probe_json(path: &Path, json: &[u8]) -> StillcastResult<AudioSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        sample_rate: Option<String>,
        channels: Option<u16>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| StillcastError::media(format!("ffprobe json parse failed: {e}")))?;
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| {
            StillcastError::media(format!("no audio stream found in '{}'", path.display()))
        })?;

    // Container duration first; some raw streams only report it per stream.
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(audio.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            StillcastError::media(format!(
                "ffprobe reported no usable duration for '{}'",
                path.display()
            ))
        })?;

    Ok(AudioSourceInfo {
        path: path.to_path_buf(),
        duration_secs,
        sample_rate: audio
            .sample_rate
            .as_deref()
            .and_then(|s| s.trim().parse().ok()),
        channels: audio.channels,
    })
}
