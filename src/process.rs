//! External tool invocation
//!
//! Every external process (ffmpeg, ffprobe, the narration synthesizer) goes
//! through [`run`]: log the command line, spawn, capture stdout and stderr,
//! and turn a non-zero exit into [`Error::ExternalTool`] carrying the output.

use crate::{Error, Result};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captured output of a successful command
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        combine(&self.stdout, &self.stderr)
    }
}

fn combine(stdout: &str, stderr: &str) -> String {
    match (stdout.trim_end().is_empty(), stderr.trim_end().is_empty()) {
        (true, _) => stderr.trim_end().to_string(),
        (false, true) => stdout.trim_end().to_string(),
        (false, false) => format!("{}\n{}", stdout.trim_end(), stderr.trim_end()),
    }
}

/// Render a command as a copy-pasteable shell line
pub fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(shell_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_word(arg: &OsStr) -> String {
    let s = arg.to_string_lossy();
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=%+,@".contains(c))
    {
        s.into_owned()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Run a command to completion, failing on a non-zero exit
pub fn run(cmd: &mut Command) -> Result<ToolOutput> {
    let line = command_line(cmd);
    tracing::info!(command = %line, "running external tool");

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| spawn_error(cmd.get_program(), e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(Error::ExternalTool {
            command: line,
            status: output.status.code(),
            output: combine(&stdout, &stderr),
        });
    }

    tracing::debug!(command = %line, "external tool finished");
    Ok(ToolOutput { stdout, stderr })
}

fn spawn_error(program: &OsStr, err: std::io::Error) -> Error {
    if err.kind() == ErrorKind::NotFound {
        Error::ToolNotFound(format!("{} ({})", program.to_string_lossy(), err))
    } else {
        Error::Io(err)
    }
}

/// Check that `program` can be started with the given probe arguments
pub fn probe_program(program: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| spawn_error(program.as_os_str(), e))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::ToolNotFound(format!(
            "{} is not usable ({} {} exited with {})",
            program.display(),
            program.display(),
            args.join(" "),
            status
        )))
    }
}

/// Resolved ffmpeg and ffprobe executables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Toolchain {
    /// Locate ffmpeg (explicit path or search) and the ffprobe next to it
    pub fn locate(ffmpeg_path: Option<&Path>) -> Result<Self> {
        let ffmpeg = find_ffmpeg(ffmpeg_path)?;
        let ffprobe = ffprobe_beside(&ffmpeg);
        Ok(Self { ffmpeg, ffprobe })
    }

    /// Check that ffmpeg has libx264 and ffprobe runs
    pub fn check_available(&self) -> Result<()> {
        let encoders = run(Command::new(&self.ffmpeg).args(["-hide_banner", "-encoders"]))?;
        if !encoders.stdout.contains("libx264") {
            return Err(Error::ToolNotFound(format!(
                "{} does not have libx264 support",
                self.ffmpeg.display()
            )));
        }

        probe_program(&self.ffprobe, &["-version"])?;
        tracing::debug!(
            ffmpeg = %self.ffmpeg.display(),
            ffprobe = %self.ffprobe.display(),
            "toolchain available"
        );
        Ok(())
    }

    /// A fresh ffmpeg command
    pub fn ffmpeg(&self) -> Command {
        Command::new(&self.ffmpeg)
    }

    /// A fresh ffprobe command
    pub fn ffprobe(&self) -> Command {
        Command::new(&self.ffprobe)
    }
}

/// Find ffmpeg executable
fn find_ffmpeg(custom_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = custom_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::ToolNotFound(format!(
            "ffmpeg not found at: {}",
            path.display()
        )));
    }

    // Try PATH first, then common install locations
    let paths = [
        "ffmpeg",
        "/usr/bin/ffmpeg",
        "/usr/local/bin/ffmpeg",
        "/opt/homebrew/bin/ffmpeg",
    ];

    for path in paths {
        if probe_program(Path::new(path), &["-version"]).is_ok() {
            return Ok(PathBuf::from(path));
        }
    }

    Err(Error::ToolNotFound(
        "ffmpeg not found. Install ffmpeg and make sure it's in PATH".to_string(),
    ))
}

/// Derive the ffprobe path from the ffmpeg path
fn ffprobe_beside(ffmpeg: &Path) -> PathBuf {
    match ffmpeg.file_name().and_then(|n| n.to_str()) {
        Some(name) if name.starts_with("ffmpeg") => {
            ffmpeg.with_file_name(name.replacen("ffmpeg", "ffprobe", 1))
        }
        _ => PathBuf::from("ffprobe"),
    }
}
