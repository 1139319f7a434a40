//! Edge strip extraction from the offscreen copy of the current frame.

use image::RgbaImage;
use image::imageops::crop_imm;
use tracing::debug;

use crate::color::{Rgb, average_color};

/// Pixel strips along the four edges of a frame.
#[derive(Debug, Clone)]
pub struct EdgeStrips {
    pub top: RgbaImage,
    pub bottom: RgbaImage,
    pub left: RgbaImage,
    pub right: RgbaImage,
}

/// Averaged color of each edge strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeColors {
    pub top: Rgb,
    pub bottom: Rgb,
    pub left: Rgb,
    pub right: Rgb,
}

impl EdgeStrips {
    /// Cut `depth`-pixel strips spanning the full width (top/bottom) and
    /// full height (left/right) of `frame`.
    ///
    /// Returns `None` for a zero-sized frame so the caller can defer until
    /// metadata is loaded.
    pub fn extract(frame: &RgbaImage, depth: u32) -> Option<Self> {
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let dy = depth.clamp(1, h);
        let dx = depth.clamp(1, w);
        Some(Self {
            top: crop_imm(frame, 0, 0, w, dy).to_image(),
            bottom: crop_imm(frame, 0, h - dy, w, dy).to_image(),
            left: crop_imm(frame, 0, 0, dx, h).to_image(),
            right: crop_imm(frame, w - dx, 0, dx, h).to_image(),
        })
    }

    pub fn average(&self) -> EdgeColors {
        EdgeColors {
            top: average_color(&self.top),
            bottom: average_color(&self.bottom),
            left: average_color(&self.left),
            right: average_color(&self.right),
        }
    }
}

/// Make sure `buffer` matches `(width, height)`, reallocating only when the
/// dimensions changed. Returns `true` when a reallocation happened.
pub fn fit_buffer(buffer: &mut RgbaImage, width: u32, height: u32) -> bool {
    if buffer.dimensions() == (width, height) {
        return false;
    }
    debug!(
        from_w = buffer.width(),
        from_h = buffer.height(),
        to_w = width,
        to_h = height,
        "resizing offscreen buffer"
    );
    *buffer = RgbaImage::new(width, height);
    true
}
