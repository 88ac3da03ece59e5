//! Slideshow pipeline: pages + narration to a finished video

use crate::encoder::{render, EncoderConfig};
use crate::frames::build_frames;
use crate::muxer::mux;
use crate::narration::NarrationSynth;
use crate::probe::probe_duration;
use crate::{RenderJob, Result, Source, Toolchain};
use std::path::PathBuf;

/// Synthesized narration and its probed duration
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationAudio {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowReport {
    /// Number of pages turned into frames
    pub pages: usize,
    /// Narration duration in seconds
    pub narration_secs: f64,
    /// Final video path
    pub output_path: PathBuf,
}

/// Create a narrated Ken Burns slideshow
///
/// Stages run strictly in order: validate, acquire pages, build frames,
/// synthesize and probe narration, render the silent video, mux. All
/// intermediate files live in a temporary workspace owned by this call and
/// removed when it returns, whether it succeeded or not. Any failure aborts
/// the run and no final video is left behind.
pub fn slideshow(
    source: &Source,
    script: &str,
    synth: &dyn NarrationSynth,
    tools: &Toolchain,
    job: &RenderJob,
) -> Result<SlideshowReport> {
    // Validate options before touching the file system
    job.validate()?;

    if let Some(parent) = job.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let workspace = tempfile::Builder::new().prefix("mangareel-").tempdir()?;
    tracing::debug!(workspace = %workspace.path().display(), "workspace created");

    let images = source.images(workspace.path())?;

    let frames_dir = workspace.path().join("frames");
    build_frames(&images, &frames_dir, job.canvas, job.fit, job.threads)?;

    let audio_path = workspace.path().join("narration.mp3");
    synth.synthesize(script, &audio_path)?;
    let narration = NarrationAudio {
        duration_secs: probe_duration(tools, &audio_path)?,
        path: audio_path,
    };

    let config = EncoderConfig::from_job(job);
    let video_secs =
        images.len() as f64 * config.motion.hold_frames as f64 / config.fps as f64;
    tracing::info!(
        narration_secs = narration.duration_secs,
        video_secs,
        "output is cut to the shorter stream"
    );

    let silent = workspace.path().join("silent.mp4");
    render(tools, &frames_dir, &config, &silent)?;
    mux(tools, &silent, &narration.path, &job.output_path)?;

    if let Err(e) = std::fs::remove_file(&silent) {
        tracing::debug!(error = %e, "silent video already gone");
    }

    tracing::info!(output = %job.output_path.display(), "video created");
    Ok(SlideshowReport {
        pages: images.len(),
        narration_secs: narration.duration_secs,
        output_path: job.output_path.clone(),
    })
}
