//! Mux step: silent video + narration audio into the final container

use crate::process::{run, Toolchain};
use crate::Result;
use std::ffi::OsString;
use std::path::Path;

/// Audio codec for the narration track
pub const AUDIO_CODEC: &str = "aac";

/// Narration bitrate
pub const AUDIO_BITRATE: &str = "192k";

/// ffmpeg arguments for muxing `video` and `audio` into `output`
///
/// The picture stream is copied unchanged, the audio is re-encoded, and the
/// output stops at the end of the shorter stream (`-shortest`).
pub fn mux_args(video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        video.as_os_str().to_os_string(),
        "-i".into(),
        audio.as_os_str().to_os_string(),
        "-c:v".into(),
        "copy".into(),
        "-c:a".into(),
        AUDIO_CODEC.into(),
        "-b:a".into(),
        AUDIO_BITRATE.into(),
        "-shortest".into(),
        output.as_os_str().to_os_string(),
    ]
}

/// Mux the silent video with the narration into `output`
///
/// On failure any partially written `output` is removed so it cannot be
/// mistaken for a finished video.
#[tracing::instrument(skip(tools))]
pub fn mux(tools: &Toolchain, video: &Path, audio: &Path, output: &Path) -> Result<()> {
    let mut cmd = tools.ffmpeg();
    cmd.args(mux_args(video, audio, output));

    if let Err(err) = run(&mut cmd) {
        if let Err(rm) = std::fs::remove_file(output) {
            if rm.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(output = %output.display(), error = %rm, "could not remove partial output");
            }
        }
        return Err(err);
    }

    tracing::info!(output = %output.display(), "video muxed");
    Ok(())
}
