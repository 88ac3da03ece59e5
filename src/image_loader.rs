//! Image loading and canvas normalization

use crate::{Canvas, Error, FitPolicy, Result};
use image::imageops::{self, FilterType};
use image::{ImageReader, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// A page image on disk with its intrinsic size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Path to the image file
    pub path: PathBuf,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl SourceImage {
    /// Read the image header to learn its dimensions
    ///
    /// The format is sniffed from the content, so a JPEG named `.png` still opens.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (width, height) = ImageReader::open(path)
            .map_err(|e| Error::decode(path, e))?
            .with_guessed_format()
            .map_err(|e| Error::decode(path, e))?
            .into_dimensions()
            .map_err(|e| Error::decode(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
        })
    }

    /// Decode the full raster as plain RGB
    ///
    /// Alpha and colour profile information are dropped; the encoder takes no alpha.
    pub fn decode_rgb(&self) -> Result<RgbImage> {
        let img = ImageReader::open(&self.path)
            .map_err(|e| Error::decode(&self.path, e))?
            .with_guessed_format()
            .map_err(|e| Error::decode(&self.path, e))?
            .decode()
            .map_err(|e| Error::decode(&self.path, e))?;

        Ok(img.to_rgb8())
    }
}

/// Where the scaled page lands relative to the canvas
///
/// For `Contain`, `left`/`top` are the paste offsets into the canvas.
/// For `Cover`, they are the crop offsets into the scaled image; the pixels
/// are produced from [`Placement::source_crop`] without materializing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Scaled page width
    pub scaled_width: u32,
    /// Scaled page height
    pub scaled_height: u32,
    pub left: u32,
    pub top: u32,
}

impl Placement {
    /// Compute the isotropic scale and centered offsets for a `width`x`height` source
    pub fn compute(width: u32, height: u32, canvas: Canvas, fit: FitPolicy) -> Self {
        let (tw, th) = (canvas.width(), canvas.height());
        let scale_x = tw as f64 / width.max(1) as f64;
        let scale_y = th as f64 / height.max(1) as f64;

        match fit {
            FitPolicy::Contain => {
                let scale = scale_x.min(scale_y);
                let scaled_width = scaled_dim(width, scale).min(tw);
                let scaled_height = scaled_dim(height, scale).min(th);
                Self {
                    scaled_width,
                    scaled_height,
                    left: (tw - scaled_width) / 2,
                    top: (th - scaled_height) / 2,
                }
            }
            FitPolicy::Cover => {
                let scale = scale_x.max(scale_y);
                let scaled_width = scaled_dim(width, scale).max(tw);
                let scaled_height = scaled_dim(height, scale).max(th);
                Self {
                    scaled_width,
                    scaled_height,
                    left: (scaled_width - tw) / 2,
                    top: (scaled_height - th) / 2,
                }
            }
        }
    }

    /// Source region `(x, y, width, height)` that ends up visible under `Cover`
    ///
    /// Centered, at least 1x1 and never larger than the source.
    pub fn source_crop(&self, width: u32, height: u32, canvas: Canvas) -> (u32, u32, u32, u32) {
        let scale_x = self.scaled_width as f64 / width.max(1) as f64;
        let scale_y = self.scaled_height as f64 / height.max(1) as f64;
        let crop_w = source_extent(canvas.width(), scale_x, width);
        let crop_h = source_extent(canvas.height(), scale_y, height);
        ((width - crop_w) / 2, (height - crop_h) / 2, crop_w, crop_h)
    }
}

fn source_extent(target: u32, scale: f64, available: u32) -> u32 {
    let extent = (target as f64 / scale - 1e-9).ceil();
    (extent.max(1.0) as u32).min(available.max(1))
}

/// Floor a scaled dimension, snapping values a hair below an integer up to it
fn scaled_dim(dim: u32, scale: f64) -> u32 {
    ((dim as f64 * scale + 1e-9).floor() as u32).max(1)
}

/// Normalize one page onto the canvas
pub fn normalize(source: &SourceImage, canvas: Canvas, fit: FitPolicy) -> Result<RgbImage> {
    let rgb = source.decode_rgb()?;
    Ok(normalize_rgb(&rgb, canvas, fit))
}

/// Normalize an already decoded RGB raster onto the canvas
pub fn normalize_rgb(img: &RgbImage, canvas: Canvas, fit: FitPolicy) -> RgbImage {
    let placement = Placement::compute(img.width(), img.height(), canvas, fit);

    let framed = match fit {
        FitPolicy::Contain => {
            let resized = resize_to(img, placement.scaled_width, placement.scaled_height);
            let mut output = RgbImage::from_pixel(canvas.width(), canvas.height(), Rgb([0, 0, 0]));
            imageops::replace(
                &mut output,
                &resized,
                placement.left as i64,
                placement.top as i64,
            );
            output
        }
        FitPolicy::Cover => {
            // Crop in source space first; the full scaled page can be huge for
            // strips with an extreme aspect ratio.
            let (x, y, w, h) = placement.source_crop(img.width(), img.height(), canvas);
            let visible = imageops::crop_imm(img, x, y, w, h).to_image();
            resize_to(&visible, canvas.width(), canvas.height())
        }
    };

    force_even(framed)
}

fn resize_to(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        img.clone()
    } else {
        imageops::resize(img, width, height, FilterType::Lanczos3)
    }
}

/// Crop one trailing row/column when a dimension is odd
///
/// With an even canvas this never triggers; it guards the encoder requirement.
pub fn force_even(img: RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let (ew, eh) = ((w / 2) * 2, (h / 2) * 2);
    if (ew, eh) == (w, h) {
        return img;
    }
    imageops::crop_imm(&img, 0, 0, ew, eh).to_image()
}
