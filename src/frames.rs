//! Frame sequencing: normalize the ordered pages into a numbered PNG sequence

use crate::image_loader::{normalize, SourceImage};
use crate::{Canvas, Error, FitPolicy, Result};
use image::ImageFormat;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// printf-style pattern ffmpeg uses to read the sequence back
pub const FRAME_PATTERN: &str = "frame_%05d.png";

/// Largest index the five-digit frame name can hold
pub const MAX_FRAMES: usize = 99_999;

/// File name of the frame at 1-based `index`
pub fn frame_file_name(index: usize) -> String {
    format!("frame_{:05}.png", index)
}

/// Build the frame sequence for `images` inside `frames_dir`
///
/// Output order follows input order: page `i` (0-based) becomes
/// `frame_{i+1:05}.png`. Normalization runs on a rayon pool of `threads`
/// workers (rayon's default when `None`); the first failure aborts the
/// whole sequence and the directory must then be discarded by the caller.
#[tracing::instrument(skip(images), fields(count = images.len()))]
pub fn build_frames(
    images: &[PathBuf],
    frames_dir: &Path,
    canvas: Canvas,
    fit: FitPolicy,
    threads: Option<usize>,
) -> Result<Vec<PathBuf>> {
    if images.is_empty() {
        return Err(Error::config("no images to turn into frames"));
    }

    std::fs::create_dir_all(frames_dir)?;
    let pool = build_thread_pool(threads)?;

    let frames = pool.install(|| {
        images
            .par_iter()
            .enumerate()
            .map(|(i, path)| {
                let out = frames_dir.join(frame_file_name(i + 1));
                write_frame(path, &out, canvas, fit)?;
                Ok(out)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    tracing::info!(
        frames = frames.len(),
        dir = %frames_dir.display(),
        "frames created"
    );
    Ok(frames)
}

fn write_frame(path: &Path, out: &Path, canvas: Canvas, fit: FitPolicy) -> Result<()> {
    let source = SourceImage::open(path)?;
    let frame = normalize(&source, canvas, fit)?;
    frame
        .save_with_format(out, ImageFormat::Png)
        .map_err(|e| Error::decode(path, format!("cannot write {}: {}", out.display(), e)))?;
    tracing::debug!(
        source = %path.display(),
        frame = %out.display(),
        width = source.width,
        height = source.height,
        "frame written"
    );
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> Result<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(Error::config("threads must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| Error::config(format!("cannot start frame worker pool: {e}")))
}
