//! mangareel - Manga/comic pages to narrated video
//!
//! The library turns an ordered set of page images into a video:
//! - `frames`: normalize every page onto a fixed, even-sized canvas
//! - `motion`: synthesize the Ken Burns zoom/pan expressions for ffmpeg's `zoompan`
//! - `encoder` / `muxer`: render the silent video, then mux it with the narration
//! - `slideshow`: run the whole pipeline over a private temporary workspace

pub mod encoder;
pub mod error;
pub mod frames;
pub mod image_loader;
pub mod motion;
pub mod muxer;
pub mod narration;
pub mod probe;
pub mod process;
pub mod source;

mod slideshow;

pub use error::{Error, ErrorCode, Result};
pub use motion::MotionSpec;
pub use process::Toolchain;
pub use slideshow::{slideshow, NarrationAudio, SlideshowReport};
pub use source::Source;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Target frame size
///
/// Both dimensions are non-zero and even, as required by yuv420p H.264 output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero or odd dimensions
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::config(format!(
                "canvas must be non-empty, got {}x{}",
                width, height
            )));
        }
        if width % 2 != 0 || height % 2 != 0 {
            return Err(Error::config(format!(
                "target width/height must be even numbers, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Default for Canvas {
    /// Vertical 1080x1920
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How a page is mapped onto the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitPolicy {
    /// Scale to fit, letterbox with black
    #[default]
    Contain,
    /// Scale to fill, crop the overflowing axis
    Cover,
}

impl FromStr for FitPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "contain" => Ok(FitPolicy::Contain),
            "cover" => Ok(FitPolicy::Cover),
            other => Err(Error::config(format!(
                "unknown fit policy '{}' (expected contain or cover)",
                other
            ))),
        }
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FitPolicy::Contain => "contain",
            FitPolicy::Cover => "cover",
        })
    }
}

/// Ken Burns pan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pan {
    #[default]
    Center,
    Left,
    Right,
    Up,
    Down,
}

impl FromStr for Pan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "center" => Ok(Pan::Center),
            "left" => Ok(Pan::Left),
            "right" => Ok(Pan::Right),
            "up" => Ok(Pan::Up),
            "down" => Ok(Pan::Down),
            other => Err(Error::config(format!(
                "unknown pan direction '{}' (expected center, left, right, up or down)",
                other
            ))),
        }
    }
}

impl fmt::Display for Pan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pan::Center => "center",
            Pan::Left => "left",
            Pan::Right => "right",
            Pan::Up => "up",
            Pan::Down => "down",
        })
    }
}

/// Everything that determines the render and mux invocations of one run
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Output frame size
    pub canvas: Canvas,
    /// Page fit policy
    pub fit: FitPolicy,
    /// Output frame rate
    pub fps: u32,
    /// How long each page stays on screen
    pub seconds_per_image: f64,
    /// Zoom factor reached at the end of each page's hold
    pub zoom: f64,
    /// Pan direction applied to every page
    pub pan: Pan,
    /// x264 constant rate factor (lower is better, 0-51)
    pub crf: u8,
    /// Final video path
    pub output_path: PathBuf,
    /// Worker threads for frame normalization (`None` = rayon default)
    pub threads: Option<usize>,
}

impl Default for RenderJob {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fit: FitPolicy::Contain,
            fps: 30,
            seconds_per_image: 3.0,
            zoom: 1.12,
            pan: Pan::Center,
            crf: 20,
            output_path: PathBuf::from("output.mp4"),
            threads: None,
        }
    }
}

/// Highest CRF libx264 accepts for 8-bit output
pub const MAX_CRF: u8 = 51;

impl RenderJob {
    /// Validate the job
    pub fn validate(&self) -> Result<()> {
        // Canvas evenness is enforced by `Canvas::new`.
        if self.fps == 0 {
            return Err(Error::config("fps must be a positive integer"));
        }
        if !self.seconds_per_image.is_finite() || self.seconds_per_image <= 0.0 {
            return Err(Error::config(format!(
                "seconds per image must be positive, got {}",
                self.seconds_per_image
            )));
        }
        if !self.zoom.is_finite() || self.zoom < 1.0 {
            return Err(Error::config(format!(
                "zoom must be >= 1.0, got {}",
                self.zoom
            )));
        }
        if self.crf > MAX_CRF {
            return Err(Error::config(format!(
                "crf must be within 0-{}, got {}",
                MAX_CRF, self.crf
            )));
        }
        if self.threads == Some(0) {
            return Err(Error::config("threads must be >= 1 when set"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(Error::config("output path must not be empty"));
        }
        Ok(())
    }

    /// Motion parameters for every page of this job
    pub fn motion_spec(&self) -> MotionSpec {
        MotionSpec {
            zoom_target: self.zoom,
            pan: self.pan,
            hold_frames: motion::hold_frames(self.seconds_per_image, self.fps),
        }
    }
}

/// Check that ffmpeg (with libx264) and ffprobe are usable
///
/// Returns the located toolchain so callers resolve binaries only once.
pub fn available(ffmpeg_path: Option<&Path>) -> Result<Toolchain> {
    let tools = Toolchain::locate(ffmpeg_path)?;
    tools.check_available()?;
    Ok(tools)
}
