use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Synthesize a short liveness video from a still portrait (requires `ffmpeg` on PATH).
#[derive(Parser, Debug)]
#[command(name = "stillmotion", version)]
struct Cli {
    /// Input portrait image (PNG, JPEG, ...).
    input: PathBuf,

    /// Output MP4 path.
    output: PathBuf,

    /// JSON run settings; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed noise seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// How the face region is found.
    #[arg(long, value_enum, default_value_t = LocatorChoice::Auto)]
    locator: LocatorChoice,

    /// Face annotation JSON (defaults to `<INPUT>.face.json`).
    #[arg(long)]
    face_json: Option<PathBuf>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LocatorChoice {
    /// Annotation file if present, otherwise the skin-tone heuristic.
    Auto,
    /// Skin-tone heuristic only.
    Skin,
    /// Annotation file only.
    Sidecar,
    /// Skip face location; global effects only.
    None,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => stillmotion::PipelineConfig::from_path(path)?,
        None => stillmotion::PipelineConfig::default(),
    };
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    if cli.parallel {
        cfg.threading.parallel = true;
    }
    if cli.threads.is_some() {
        cfg.threading.threads = cli.threads;
    }

    let locator = make_locator(cli.locator, &cli.input, cli.face_json.as_deref());
    let mut driver = stillmotion::PipelineDriver::new(cfg, locator)?;

    let mut sink = stillmotion::FfmpegSink::new(stillmotion::FfmpegSinkOpts {
        overwrite: !cli.no_overwrite,
        ..stillmotion::FfmpegSinkOpts::default()
    });

    let report = driver
        .run(&cli.input, &cli.output, &mut sink)
        .with_context(|| format!("synthesize '{}'", cli.input.display()))?;

    eprintln!(
        "wrote {} ({} frames, seed {})",
        report.out_path.display(),
        report.frames_written,
        report.seed
    );
    Ok(())
}

fn make_locator(
    choice: LocatorChoice,
    input: &Path,
    face_json: Option<&Path>,
) -> Box<dyn stillmotion::FaceLocator> {
    let sidecar = || match face_json {
        Some(p) => stillmotion::SidecarLocator::new(p),
        None => stillmotion::SidecarLocator::for_image(input),
    };
    match choice {
        LocatorChoice::Auto => {
            let s = sidecar();
            if s.path().is_file() {
                tracing::info!(path = %s.path().display(), "using face annotation");
                Box::new(s)
            } else {
                Box::new(stillmotion::SkinToneLocator::default())
            }
        }
        LocatorChoice::Skin => Box::new(stillmotion::SkinToneLocator::default()),
        LocatorChoice::Sidecar => Box::new(sidecar()),
        LocatorChoice::None => Box::new(stillmotion::NoFaceLocator),
    }
}
