use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{ArgGroup, Parser};
use mangareel::narration::{EdgeTts, NarrationSynth, DEFAULT_RATE, DEFAULT_VOICE};
use mangareel::source::{read_script, DEFAULT_NARRATION};
use mangareel::{Canvas, ErrorCode, FitPolicy, Pan, RenderJob, Source};

/// Manga/Comic to video (images/CBZ -> TTS -> MP4)
#[derive(Parser, Debug)]
#[command(name = "mangareel", version)]
#[command(group(ArgGroup::new("input").required(true).args(["images", "cbz"])))]
struct Cli {
    /// Input folder containing images (jpg/png/webp)
    #[arg(long)]
    images: Option<PathBuf>,

    /// Input .cbz file
    #[arg(long)]
    cbz: Option<PathBuf>,

    /// Text file for narration (UTF-8); a default narration is used if omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// Output MP4 path
    #[arg(long, default_value = "output.mp4")]
    out: PathBuf,

    /// Edge TTS voice, e.g. en-US-AriaNeural, fr-FR-DeniseNeural
    #[arg(long, default_value = DEFAULT_VOICE)]
    voice: String,

    /// TTS rate, e.g. -10%, +10%
    #[arg(long, default_value = DEFAULT_RATE, allow_hyphen_values = true)]
    rate: String,

    /// Video FPS
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Seconds each page stays on screen
    #[arg(long, default_value_t = 3.0)]
    seconds_per_image: f64,

    /// Target width (must be even)
    #[arg(long = "w", default_value_t = 1080)]
    width: u32,

    /// Target height (must be even)
    #[arg(long = "h", default_value_t = 1920)]
    height: u32,

    /// Resize behavior: contain (letterbox) or cover (crop)
    #[arg(long, default_value_t = FitPolicy::Contain)]
    fit: FitPolicy,

    /// Target zoom factor per image (e.g. 1.08 to 1.20)
    #[arg(long, default_value_t = 1.12)]
    zoom: f64,

    /// Pan direction: center, left, right, up or down
    #[arg(long, default_value_t = Pan::Center)]
    pan: Pan,

    /// x264 quality (lower=better, typical 18-23)
    #[arg(long, default_value_t = 20)]
    crf: u8,

    /// Worker threads for frame normalization
    #[arg(long)]
    threads: Option<usize>,

    /// Path to the ffmpeg executable (ffprobe is expected beside it)
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Path to the edge-tts executable
    #[arg(long, default_value = "edge-tts")]
    tts: PathBuf,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn source(&self) -> anyhow::Result<Source> {
        match (&self.images, &self.cbz) {
            (Some(dir), None) => Ok(Source::Folder(dir.clone())),
            (None, Some(cbz)) => Ok(Source::Cbz(cbz.clone())),
            _ => Err(mangareel::Error::Config(
                "exactly one of --images or --cbz is required".to_string(),
            )
            .into()),
        }
    }

    fn job(&self) -> anyhow::Result<RenderJob> {
        let job = RenderJob {
            canvas: Canvas::new(self.width, self.height)?,
            fit: self.fit,
            fps: self.fps,
            seconds_per_image: self.seconds_per_image,
            zoom: self.zoom,
            pan: self.pan,
            crf: self.crf,
            output_path: self.out.clone(),
            threads: self.threads,
        };
        job.validate()?;
        Ok(job)
    }

    fn log_level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::WARN,
            (false, 0) => tracing::Level::INFO,
            (false, 1) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            let code = err
                .downcast_ref::<mangareel::Error>()
                .map(ErrorCode::from)
                .unwrap_or(ErrorCode::Other);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Configuration first, then capabilities, before any stage runs.
    let job = cli.job()?;
    let source = cli.source()?;
    let text = read_script(cli.script.as_deref(), DEFAULT_NARRATION)?;

    let tools = mangareel::available(cli.ffmpeg.as_deref())?;
    let tts = EdgeTts {
        program: cli.tts.clone(),
        voice: cli.voice.clone(),
        rate: cli.rate.clone(),
    };
    tts.check_available()?;

    tracing::info!(
        canvas = %job.canvas,
        fit = %job.fit,
        fps = job.fps,
        seconds_per_image = job.seconds_per_image,
        zoom = job.zoom,
        pan = %job.pan,
        crf = job.crf,
        "starting"
    );

    let report = mangareel::slideshow(&source, &text, &tts, &tools, &job)
        .with_context(|| format!("create video '{}'", job.output_path.display()))?;

    eprintln!(
        "wrote {} ({} pages, narration {:.1}s)",
        report.output_path.display(),
        report.pages,
        report.narration_secs
    );
    Ok(())
}
