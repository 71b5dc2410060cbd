use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use rand::SeedableRng as _;
use rand::rngs::StdRng;

use stillcast::{CaptionMode, StillcastConfig, VideoRequest, clean_path};

#[derive(Parser, Debug)]
#[command(name = "stillcast", version)]
/// Turn a still image, an audio track and a title into an MP4 with an animated caption.
struct Cli {
    /// Still image shown for the whole video.
    #[arg(long)]
    image: Option<String>,

    /// Audio track; its duration is the video duration.
    #[arg(long)]
    audio: Option<String>,

    /// Caption text. Use `\n` for line breaks.
    #[arg(long)]
    title: Option<String>,

    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Seconds between caption animations.
    #[arg(long)]
    gap: Option<f64>,

    /// Shortest animation duration in seconds.
    #[arg(long)]
    min_anim: Option<f64>,

    /// Longest animation duration in seconds.
    #[arg(long)]
    max_anim: Option<f64>,

    /// Comma-separated effect names to cycle through.
    #[arg(long, value_delimiter = ',')]
    effects: Option<Vec<String>>,

    /// Seed for the shuffle and duration draw.
    #[arg(long)]
    seed: Option<u64>,

    /// `ffmpeg` binary.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// `ffprobe` binary.
    #[arg(long)]
    ffprobe: Option<PathBuf>,

    /// Print the caption schedule as JSON and exit without rendering.
    #[arg(long)]
    plan_only: bool,

    /// Show one caption drifting down for the whole clip instead of animations.
    #[arg(long)]
    static_caption: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let request = VideoRequest {
        image: clean_path(&value_or_prompt(cli.image.as_deref(), "Image path")?),
        audio: clean_path(&value_or_prompt(cli.audio.as_deref(), "Audio path")?),
        title: value_or_prompt(cli.title.as_deref(), "Video title")?.replace("\\n", "\n"),
    };

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if cli.plan_only {
        let (_, run) = stillcast::plan_video(&request, &config, &mut rng)?;
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    let report = stillcast::make_video(&request, &config, &mut rng)?;
    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        report.output.display(),
        report.stats.frames_total,
        report.duration_secs
    );
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<StillcastConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => StillcastConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => StillcastConfig::default(),
    };

    if let Some(out) = &cli.out {
        config.output.path = out.clone();
    }
    if let Some(fps) = cli.fps {
        config.output.fps = fps;
    }
    if let Some(gap) = cli.gap {
        config.animation.gap_secs = gap;
    }
    if let Some(min) = cli.min_anim {
        config.animation.min_secs = min;
    }
    if let Some(max) = cli.max_anim {
        config.animation.max_secs = max;
    }
    if let Some(effects) = &cli.effects {
        config.animation.effects = effects.clone();
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.tools.ffmpeg = ffmpeg.clone();
    }
    if let Some(ffprobe) = &cli.ffprobe {
        config.tools.ffprobe = ffprobe.clone();
    }
    if cli.static_caption {
        config.animation.mode = CaptionMode::Drift;
    }
    Ok(config)
}

fn value_or_prompt(value: Option<&str>, prompt: &str) -> anyhow::Result<String> {
    if let Some(v) = value {
        return Ok(v.to_string());
    }
    let answer: String = dialoguer::Input::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("read {prompt}"))?;
    Ok(answer)
}
