//! Integration tests for the full slideshow pipeline

mod common;

use common::*;
use mangareel::narration::NarrationSynth;
use mangareel::probe::probe_duration;
use mangareel::{slideshow, Canvas, Error, FitPolicy, Pan, RenderJob, Result, Source, Toolchain};
use std::path::Path;
use tempfile::TempDir;

/// Narration stand-in: a tone of fixed length instead of speech
struct ToneSynth {
    tools: Toolchain,
    seconds: f64,
}

impl NarrationSynth for ToneSynth {
    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        assert!(!text.is_empty());
        write_tone(&self.tools, output, self.seconds);
        Ok(())
    }
}

struct FailingSynth;

impl NarrationSynth for FailingSynth {
    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    fn synthesize(&self, _text: &str, _output: &Path) -> Result<()> {
        Err(Error::ToolNotFound("edge-tts (test)".to_string()))
    }
}

/// Stages under test fail before any tool runs
fn unused_tools() -> Toolchain {
    Toolchain {
        ffmpeg: "/nonexistent/ffmpeg".into(),
        ffprobe: "/nonexistent/ffprobe".into(),
    }
}

fn small_job(output: &Path) -> RenderJob {
    RenderJob {
        canvas: Canvas::new(64, 64).unwrap(),
        fps: 10,
        seconds_per_image: 2.0,
        zoom: 1.2,
        pan: Pan::Up,
        output_path: output.to_path_buf(),
        ..Default::default()
    }
}

/// Folder input, narration longer than the pictures
#[test]
fn test_slideshow_from_folder() {
    let Some(tools) = toolchain_or_skip("test_slideshow_from_folder") else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    let pages_dir = temp_dir.path().join("pages");
    write_pages(&pages_dir, &[(64, 48), (40, 90), (64, 64), (100, 30), (7, 9)]);

    let output = temp_dir.path().join("out").join("video.mp4");
    let synth = ToneSynth {
        tools: tools.clone(),
        seconds: 12.4,
    };
    let report = slideshow(
        &Source::Folder(pages_dir),
        "Some narration.",
        &synth,
        &tools,
        &small_job(&output),
    )
    .unwrap();

    assert_eq!(report.pages, 5);
    assert_eq!(report.output_path, output);
    assert!((report.narration_secs - 12.4).abs() <= 0.2);
    assert!(verify_mp4_header(&output));

    let secs = probe_duration(&tools, &output).unwrap();
    assert!((secs - 10.0).abs() <= 0.3, "video is {}s", secs);
}

/// CBZ input, narration shorter than the pictures
#[test]
fn test_slideshow_from_cbz() {
    let Some(tools) = toolchain_or_skip("test_slideshow_from_cbz") else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    let pages = write_pages(&temp_dir.path().join("pages"), &[(30, 40), (40, 30), (32, 32)]);
    let cbz = temp_dir.path().join("book.cbz");
    write_cbz(
        &cbz,
        &[
            ("ch1/10.png", pages[2].as_path()),
            ("ch1/2.png", pages[1].as_path()),
            ("ch1/1.png", pages[0].as_path()),
        ],
    );

    let output = temp_dir.path().join("video.mp4");
    let job = RenderJob {
        fit: FitPolicy::Cover,
        ..small_job(&output)
    };
    let synth = ToneSynth {
        tools: tools.clone(),
        seconds: 3.0,
    };
    let report = slideshow(&Source::Cbz(cbz), "Hi.", &synth, &tools, &job).unwrap();

    assert_eq!(report.pages, 3);
    // Copied video packets may run a little past the audio, never past the pictures
    let secs = probe_duration(&tools, &output).unwrap();
    assert!((2.7..=6.3).contains(&secs), "video is {}s", secs);
}

/// A narration failure aborts the run without a final video
#[test]
fn test_narration_failure_leaves_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let pages_dir = temp_dir.path().join("pages");
    write_pages(&pages_dir, &[(16, 16)]);

    let output = temp_dir.path().join("video.mp4");
    let result = slideshow(
        &Source::Folder(pages_dir),
        "text",
        &FailingSynth,
        &unused_tools(),
        &small_job(&output),
    );
    assert!(matches!(result, Err(Error::ToolNotFound(_))));
    assert!(!output.exists());
}

/// Odd canvas heights are rejected before anything is written
#[test]
fn test_odd_canvas_rejected() {
    let result = Canvas::new(1080, 1921);
    match result {
        Err(Error::Config(message)) => assert!(message.contains("even")),
        other => panic!("expected config error, got {:?}", other),
    }
}

/// Missing input folder is a source error, reported before synthesis
#[test]
fn test_missing_folder() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("video.mp4");

    let result = slideshow(
        &Source::Folder(temp_dir.path().join("nope")),
        "text",
        &FailingSynth,
        &unused_tools(),
        &small_job(&output),
    );
    assert!(matches!(result, Err(Error::Source { .. })));
    assert!(!output.exists());
}
