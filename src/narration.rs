//! Narration synthesis

use crate::process::{probe_program, run};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default narration voice
pub const DEFAULT_VOICE: &str = "en-US-AriaNeural";

/// Default speaking rate
pub const DEFAULT_RATE: &str = "+0%";

/// Turns narration text into an audio file
pub trait NarrationSynth {
    /// Check once, before any stage runs, that synthesis can work
    fn check_available(&self) -> Result<()>;

    /// Write spoken `text` to `output`
    fn synthesize(&self, text: &str, output: &Path) -> Result<()>;
}

/// Text-to-speech through the `edge-tts` command line tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeTts {
    /// Path or name of the `edge-tts` executable
    pub program: PathBuf,
    /// Voice identifier, e.g. `fr-FR-DeniseNeural`
    pub voice: String,
    /// Rate adjustment, e.g. `-10%`
    pub rate: String,
}

impl Default for EdgeTts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("edge-tts"),
            voice: DEFAULT_VOICE.to_string(),
            rate: DEFAULT_RATE.to_string(),
        }
    }
}

impl EdgeTts {
    /// Arguments for reading `text_file` and writing `output`
    pub fn args(&self, text_file: &Path, output: &Path) -> Vec<std::ffi::OsString> {
        vec![
            "--voice".into(),
            self.voice.clone().into(),
            // `=` keeps a leading '-' in the rate from parsing as a flag
            format!("--rate={}", self.rate).into(),
            "--file".into(),
            text_file.as_os_str().to_os_string(),
            "--write-media".into(),
            output.as_os_str().to_os_string(),
        ]
    }
}

impl NarrationSynth for EdgeTts {
    fn check_available(&self) -> Result<()> {
        probe_program(&self.program, &["--help"]).map_err(|e| match e {
            Error::ToolNotFound(msg) => Error::ToolNotFound(format!(
                "{}; install it with `pip install edge-tts`",
                msg
            )),
            other => other,
        })
    }

    #[tracing::instrument(skip(self, text), fields(voice = %self.voice, rate = %self.rate, chars = text.len()))]
    fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        let text_file = output.with_extension("txt");
        std::fs::write(&text_file, text)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(&text_file, output));
        run(&mut cmd)?;

        if !output.is_file() {
            return Err(Error::ExternalTool {
                command: crate::process::command_line(&cmd),
                status: Some(0),
                output: format!("no audio written to {}", output.display()),
            });
        }
        tracing::info!(output = %output.display(), "narration synthesized");
        Ok(())
    }
}
