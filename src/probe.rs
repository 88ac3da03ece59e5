//! Media duration probing with ffprobe

use crate::process::{run, Toolchain};
use crate::{Error, Result};
use std::path::Path;

/// Probe the container duration of a media file in seconds
///
/// The duration is read from ffprobe rather than trusted from file metadata.
pub fn probe_duration(tools: &Toolchain, path: &Path) -> Result<f64> {
    let mut cmd = tools.ffprobe();
    cmd.args([
        "-v",
        "error",
        "-show_entries",
        "format=duration",
        "-of",
        "default=noprint_wrappers=1:nokey=1",
    ])
    .arg(path);

    let output = run(&mut cmd)?;
    parse_duration(&output.stdout).ok_or_else(|| Error::ExternalTool {
        command: crate::process::command_line(&cmd),
        status: Some(0),
        output: format!(
            "could not parse duration from ffprobe output: {:?}",
            output.stdout.trim()
        ),
    })
}

/// Parse ffprobe's bare duration output (e.g. `12.400000`)
pub fn parse_duration(stdout: &str) -> Option<f64> {
    let value: f64 = stdout.lines().next()?.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
