//! Render step: numbered frames to a silent Ken Burns video

use crate::frames::FRAME_PATTERN;
use crate::motion::{zoompan_filter, MotionSpec};
use crate::process::{run, Toolchain};
use crate::{Canvas, Error, RenderJob, Result, MAX_CRF};
use std::ffi::OsString;
use std::path::Path;

/// x264 preset balancing speed and quality
pub const PRESET: &str = "medium";

/// Video codec for the render step
pub const VIDEO_CODEC: &str = "libx264";

/// Encoder configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderConfig {
    /// Output frame size, equal to the frame sequence size
    pub canvas: Canvas,
    /// Frame rate of the image sequence and of the output
    pub fps: u32,
    /// Constant rate factor (0-51, lower is better)
    pub crf: u8,
    /// Motion applied to every page
    pub motion: MotionSpec,
}

impl EncoderConfig {
    pub fn from_job(job: &RenderJob) -> Self {
        Self {
            canvas: job.canvas,
            fps: job.fps,
            crf: job.crf,
            motion: job.motion_spec(),
        }
    }
}

/// ffmpeg arguments for rendering `frames_dir` into `output`
pub fn render_args(frames_dir: &Path, config: &EncoderConfig, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-framerate".into(),
        config.fps.to_string().into(),
        "-i".into(),
        frames_dir.join(FRAME_PATTERN).into_os_string(),
        "-vf".into(),
        zoompan_filter(&config.motion, config.fps, config.canvas).into(),
        "-c:v".into(),
        VIDEO_CODEC.into(),
        "-crf".into(),
        config.crf.min(MAX_CRF).to_string().into(),
        "-preset".into(),
        PRESET.into(),
    ];
    args.push(output.as_os_str().to_os_string());
    args
}

/// Render the frame sequence into a silent video at `output`
#[tracing::instrument(skip(tools, config))]
pub fn render(
    tools: &Toolchain,
    frames_dir: &Path,
    config: &EncoderConfig,
    output: &Path,
) -> Result<()> {
    if config.fps == 0 {
        return Err(Error::config("fps must be a positive integer"));
    }

    let mut cmd = tools.ffmpeg();
    cmd.args(render_args(frames_dir, config, output));
    run(&mut cmd)?;

    tracing::info!(
        output = %output.display(),
        hold_frames = config.motion.hold_frames,
        "silent video rendered"
    );
    Ok(())
}
