use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::assets::tools::MediaTools;
use crate::config::OutputConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StillcastError, StillcastResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// `ffmpeg` binary.
    pub ffmpeg: PathBuf,
    /// Video codec passed to `-c:v`.
    pub video_codec: String,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            ffmpeg: PathBuf::from("ffmpeg"),
            video_codec: "libx264".to_string(),
        }
    }

    /// Options derived from the output section of the run configuration.
    pub fn from_config(output: &OutputConfig, tools: &MediaTools) -> Self {
        Self {
            out_path: output.path.clone(),
            overwrite: output.overwrite,
            bg_rgba: [0, 0, 0, 255],
            ffmpeg: tools.ffmpeg.clone(),
            video_codec: output.video_codec.clone(),
        }
    }
}

/// Sink that spawns `ffmpeg` and streams raw frames to its stdin.
///
/// Audio is optional and provided through `SinkConfig.audio`. On failure the partially written
/// output file is removed.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Output path this sink writes to.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn build_command(&self, cfg: &SinkConfig) -> StillcastResult<Command> {
        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input 0: raw RGBA8 frames, flattened to opaque in push_frame.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.codec.trim().is_empty() {
                return Err(StillcastError::invalid_config(
                    "audio codec must be set when audio is enabled",
                ));
            }
            cmd.arg("-i")
                .arg(&audio.path)
                .args([
                    "-map",
                    "0:v:0",
                    "-map",
                    "1:a:0",
                    "-c:v",
                    &self.opts.video_codec,
                    "-pix_fmt",
                    "yuv420p",
                    "-c:a",
                    &audio.codec,
                    "-shortest",
                    "-movflags",
                    "+faststart",
                ]);
        } else {
            cmd.args([
                "-an",
                "-c:v",
                &self.opts.video_codec,
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ]);
        }
        cmd.arg(&self.opts.out_path);
        Ok(cmd)
    }

    /// Tear down the child process and return whatever it wrote to stderr.
    fn shutdown(&mut self, kill: bool) -> (Option<std::process::ExitStatus>, String) {
        drop(self.stdin.take());
        let status = self.child.take().and_then(|mut child| {
            if kill {
                let _ = child.kill();
            }
            child.wait().ok()
        });
        let stderr = self
            .stderr_drain
            .take()
            .and_then(|h| h.join().ok())
            .and_then(|r| r.ok())
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
            .unwrap_or_default();
        self.cfg = None;
        (status, stderr)
    }

    fn remove_partial_output(&self) {
        if self.opts.out_path.exists() {
            match std::fs::remove_file(&self.opts.out_path) {
                Ok(()) => tracing::warn!(
                    path = %self.opts.out_path.display(),
                    "removed incomplete output"
                ),
                Err(e) => tracing::error!(
                    path = %self.opts.out_path.display(),
                    error = %e,
                    "failed to remove incomplete output"
                ),
            }
        }
    }

    fn fail(&mut self, msg: String) -> StillcastError {
        let (_, stderr) = self.shutdown(true);
        self.remove_partial_output();
        if stderr.is_empty() {
            StillcastError::encoding(msg)
        } else {
            StillcastError::encoding(format!("{msg}: {stderr}"))
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> StillcastResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(StillcastError::invalid_config("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(StillcastError::invalid_config(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(StillcastError::invalid_config(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(StillcastError::invalid_config(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let mut cmd = self.build_command(&cfg)?;
        tracing::debug!(?cmd, "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            StillcastError::encoding(format!(
                "failed to spawn ffmpeg '{}' (is it installed?): {e}",
                self.opts.ffmpeg.display()
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StillcastError::encoding("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| StillcastError::encoding("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> StillcastResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StillcastError::encoding("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(StillcastError::encoding(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(StillcastError::invalid_config(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(StillcastError::invalid_config(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StillcastError::encoding("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&self.scratch) {
            return Err(self.fail(format!("failed to write frame {} to ffmpeg: {e}", idx.0)));
        }
        Ok(())
    }

    fn end(&mut self) -> StillcastResult<()> {
        if self.child.is_none() {
            return Err(StillcastError::encoding("ffmpeg sink not started"));
        }
        let (status, stderr) = self.shutdown(false);
        match status {
            Some(s) if s.success() => Ok(()),
            Some(s) => {
                self.remove_partial_output();
                Err(StillcastError::encoding(format!(
                    "ffmpeg exited with status {s}: {stderr}"
                )))
            }
            None => {
                self.remove_partial_output();
                Err(StillcastError::encoding(
                    "failed to wait for ffmpeg to finish",
                ))
            }
        }
    }

    fn abort(&mut self) {
        if self.child.is_none() {
            return;
        }
        let (_, stderr) = self.shutdown(true);
        if !stderr.is_empty() {
            tracing::warn!(%stderr, "ffmpeg aborted");
        }
        self.remove_partial_output();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> StillcastResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(StillcastError::invalid_config(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StillcastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
