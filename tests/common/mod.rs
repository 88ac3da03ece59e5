//! Common test utilities

#![allow(dead_code)]

use image::{ImageBuffer, Rgba, RgbaImage};
use mangareel::Toolchain;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Generate a test image with a solid color and a subtle gradient
pub fn generate_test_image(width: u32, height: u32, base_color: [u8; 4]) -> RgbaImage {
    let mut img = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        // Gradient keeps pages distinguishable
        let r = base_color[0].saturating_add((x % 50) as u8);
        let g = base_color[1].saturating_add((y % 50) as u8);
        let b = base_color[2];
        let a = base_color[3];
        *pixel = Rgba([r, g, b, a]);
    }

    img
}

/// Generate a numbered page (useful for ordering tests)
pub fn generate_numbered_image(width: u32, height: u32, number: u32) -> RgbaImage {
    let colors = [
        [255, 100, 100, 255], // Red-ish
        [100, 255, 100, 255], // Green-ish
        [100, 100, 255, 255], // Blue-ish
        [255, 255, 100, 255], // Yellow-ish
        [255, 100, 255, 255], // Magenta-ish
        [100, 255, 255, 255], // Cyan-ish
    ];

    let color = colors[(number as usize) % colors.len()];
    generate_test_image(width, height, color)
}

/// Save a test image as JPEG
pub fn save_jpeg<P: AsRef<Path>>(img: &RgbaImage, path: P, quality: u8) -> std::io::Result<()> {
    // JPEG has no alpha
    let rgb_img: image::RgbImage = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();

    let file = std::fs::File::create(path)?;
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, quality);
    encoder
        .encode_image(&rgb_img)
        .map_err(std::io::Error::other)?;

    Ok(())
}

/// Save a test image as PNG
pub fn save_png<P: AsRef<Path>>(img: &RgbaImage, path: P) -> std::io::Result<()> {
    img.save(path).map_err(std::io::Error::other)
}

/// Write numbered PNG pages of the given sizes as `page_<i>.png` (1-based)
pub fn write_pages(dir: &Path, sizes: &[(u32, u32)]) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).unwrap();
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let path = dir.join(format!("page_{}.png", i + 1));
            save_png(&generate_numbered_image(w, h, i as u32), &path).unwrap();
            path
        })
        .collect()
}

/// Pack files into a zip archive under the given entry names
pub fn write_cbz(path: &Path, entries: &[(&str, &Path)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, source) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(&std::fs::read(source).unwrap()).unwrap();
    }
    zip.finish().unwrap();
}

/// Verify that a file exists and has non-zero size
pub fn verify_file_exists_with_size<P: AsRef<Path>>(path: P) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.len() > 0,
        Err(_) => false,
    }
}

/// Parse MP4 header to verify it's a valid MP4 file
pub fn verify_mp4_header<P: AsRef<Path>>(path: P) -> bool {
    use std::io::Read;

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut header = [0u8; 12];
    if file.read_exact(&mut header).is_err() {
        return false;
    }

    // MP4 files have 'ftyp' box at offset 4
    &header[4..8] == b"ftyp"
}

/// List the file names in a directory, sorted
pub fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Locate a working ffmpeg/ffprobe, or `None` (with a note) when absent
pub fn toolchain_or_skip(test: &str) -> Option<Toolchain> {
    match mangareel::available(None) {
        Ok(tools) => Some(tools),
        Err(e) => {
            println!("skipping {}: {}", test, e);
            None
        }
    }
}

/// Write a sine tone of `seconds` length with ffmpeg's lavfi source
///
/// Always WAV content whatever the extension, so no optional encoder is needed.
pub fn write_tone(tools: &Toolchain, path: &Path, seconds: f64) {
    let mut cmd = tools.ffmpeg();
    cmd.args(["-y", "-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=440:duration={}", seconds))
        .args(["-f", "wav"])
        .arg(path);
    mangareel::process::run(&mut cmd).unwrap();
}

/// Decode the first video frame at or after `seconds`
pub fn extract_frame(tools: &Toolchain, video: &Path, seconds: f64, out: &Path) -> image::RgbImage {
    let mut cmd = tools.ffmpeg();
    cmd.args(["-y", "-i"])
        .arg(video)
        .arg("-ss")
        .arg(seconds.to_string())
        .args(["-frames:v", "1"])
        .arg(out);
    mangareel::process::run(&mut cmd).unwrap();
    image::open(out).unwrap().to_rgb8()
}

/// A black page with a white frame `border` pixels wide
pub fn framed_page(width: u32, height: u32, border: u32) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let edge = x < border || y < border || x >= width - border || y >= height - border;
        if edge {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_test_image() {
        let img = generate_test_image(100, 100, [255, 0, 0, 255]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 100);
    }

    #[test]
    fn test_save_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.jpg");

        let img = generate_test_image(100, 100, [255, 0, 0, 255]);
        save_jpeg(&img, &path, 85).unwrap();

        assert!(verify_file_exists_with_size(&path));
    }

    #[test]
    fn test_write_pages() {
        let temp_dir = TempDir::new().unwrap();
        let pages = write_pages(temp_dir.path(), &[(10, 20), (30, 40)]);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| verify_file_exists_with_size(p)));
    }
}
