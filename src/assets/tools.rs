use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Paths of the external media binaries, passed explicitly instead of through the environment.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MediaTools {
    /// `ffmpeg` binary used for encoding.
    pub ffmpeg: PathBuf,
    /// `ffprobe` binary used for audio probing.
    pub ffprobe: PathBuf,
}

impl Default for MediaTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl MediaTools {
    /// Return `true` when the configured `ffmpeg` runs.
    pub fn ffmpeg_available(&self) -> bool {
        runs_with_version_flag(&self.ffmpeg)
    }

    /// Return `true` when the configured `ffprobe` runs.
    pub fn ffprobe_available(&self) -> bool {
        runs_with_version_flag(&self.ffprobe)
    }
}

fn runs_with_version_flag(bin: &Path) -> bool {
    Command::new(bin)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
