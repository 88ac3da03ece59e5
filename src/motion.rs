//! Ken Burns motion: zoom curve and pan trajectory as ffmpeg `zoompan` expressions
//!
//! The expressions are evaluated by ffmpeg per output frame. zoompan's `on`
//! counts output frames over the whole sequence, so the expressions work on
//! the page-local index `mod(on,d)`, where `d` is the number of frames each
//! page is held. The zoom ramps linearly from 1 to the target over `[0, d]` and
//! then holds; the visible window stays centered and is offset along the pan
//! axis by at most 10% of the zoomed extent.

use crate::{Canvas, Pan};

/// Fraction of the zoomed visible extent covered by a full pan
pub const PAN_FRACTION: f64 = 0.10;

/// Per-page motion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSpec {
    /// Zoom reached at local frame `d` (>= 1.0)
    pub zoom_target: f64,
    /// Pan direction
    pub pan: Pan,
    /// Output frames per page (`d`, >= 1)
    pub hold_frames: u32,
}

/// Frames one page is held for: `round(seconds * fps)`, at least 1
///
/// Rounds half to even.
pub fn hold_frames(seconds_per_image: f64, fps: u32) -> u32 {
    let frames = (seconds_per_image * fps as f64).round_ties_even();
    if frames.is_finite() && frames >= 1.0 {
        frames.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// The three `zoompan` expressions for one motion spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionExpr {
    pub zoom: String,
    pub x: String,
    pub y: String,
}

/// Build the zoom/x/y expressions
pub fn build_motion(spec: &MotionSpec) -> MotionExpr {
    let d = spec.hold_frames.max(1);
    let z = spec.zoom_target;
    let t = format!("mod(on,{d})");

    let zoom = format!("if(lte({t},{d}),1+({z}-1)*{t}/{d},{z})");

    let x_center = "iw/2-(iw/zoom)/2";
    let y_center = "ih/2-(ih/zoom)/2";
    let progress = format!("min({t}/{d},1)");
    let x_offset = format!("(iw/zoom)*{PAN_FRACTION:.2}*{progress}");
    let y_offset = format!("(ih/zoom)*{PAN_FRACTION:.2}*{progress}");

    let (x, y) = match spec.pan {
        Pan::Center => (x_center.to_string(), y_center.to_string()),
        Pan::Left => (format!("{x_center}-{x_offset}"), y_center.to_string()),
        Pan::Right => (format!("{x_center}+{x_offset}"), y_center.to_string()),
        Pan::Up => (x_center.to_string(), format!("{y_center}-{y_offset}")),
        Pan::Down => (x_center.to_string(), format!("{y_center}+{y_offset}")),
    };

    MotionExpr { zoom, x, y }
}

/// Full `-vf` filter chain: zoompan at `fps` and canvas size, then yuv420p conversion
///
/// The output size is always given; zoompan would otherwise default to 1280x720.
pub fn zoompan_filter(spec: &MotionSpec, fps: u32, canvas: Canvas) -> String {
    let expr = build_motion(spec);
    format!(
        "zoompan=z='{}':x='{}':y='{}':d={}:s={}:fps={},format=yuv420p",
        expr.zoom,
        expr.x,
        expr.y,
        spec.hold_frames.max(1),
        canvas,
        fps
    )
}

impl MotionSpec {
    /// Page-local frame index for zoompan's sequence-wide output frame `on`
    ///
    /// Mirrors `mod(on,d)` in the emitted expressions.
    pub fn local_frame(&self, on: u64) -> u32 {
        (on % u64::from(self.hold_frames.max(1))) as u32
    }

    /// Progress through the hold at local frame `t`, clamped to `[0, 1]`
    pub fn progress_at(&self, t: u32) -> f64 {
        let d = self.hold_frames.max(1) as f64;
        (t as f64 / d).min(1.0)
    }

    /// Zoom at local frame `t`, mirroring the emitted zoom expression
    pub fn zoom_at(&self, t: u32) -> f64 {
        let d = self.hold_frames.max(1);
        if t >= d {
            self.zoom_target
        } else {
            1.0 + (self.zoom_target - 1.0) * t as f64 / d as f64
        }
    }

    /// Signed window offset from center at local frame `t` for an input of `extent_w`x`extent_h`
    pub fn offset_at(&self, t: u32, extent_w: f64, extent_h: f64) -> (f64, f64) {
        let zoom = self.zoom_at(t);
        let p = self.progress_at(t);
        let dx = extent_w / zoom * PAN_FRACTION * p;
        let dy = extent_h / zoom * PAN_FRACTION * p;
        match self.pan {
            Pan::Center => (0.0, 0.0),
            Pan::Left => (-dx, 0.0),
            Pan::Right => (dx, 0.0),
            Pan::Up => (0.0, -dy),
            Pan::Down => (0.0, dy),
        }
    }

    /// Top-left corner of the visible window at local frame `t`, mirroring the x/y expressions
    pub fn window_at(&self, t: u32, extent_w: f64, extent_h: f64) -> (f64, f64) {
        let zoom = self.zoom_at(t);
        let (dx, dy) = self.offset_at(t, extent_w, extent_h);
        (
            extent_w / 2.0 - (extent_w / zoom) / 2.0 + dx,
            extent_h / 2.0 - (extent_h / zoom) / 2.0 + dy,
        )
    }
}
