//! Per-channel color averaging of edge strips.

use std::fmt;

use image::RgbaImage;

/// Opaque 8-bit color; alpha is never carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);

    pub const fn r(&self) -> u8 {
        self.0[0]
    }
    pub const fn g(&self) -> u8 {
        self.0[1]
    }
    pub const fn b(&self) -> u8 {
        self.0[2]
    }
}

/// CSS functional notation, e.g. `rgb(12, 34, 56)`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r(), self.g(), self.b())
    }
}

/// Arithmetic mean of each channel over every pixel of `strip`.
///
/// Alpha is ignored. An empty strip averages to black.
pub fn average_color(strip: &RgbaImage) -> Rgb {
    let mut accum = [0u64; 3];
    let mut count = 0u64;
    for pixel in strip.pixels() {
        for c in 0..3 {
            accum[c] += pixel[c] as u64;
        }
        count += 1;
    }
    if count == 0 {
        return Rgb::BLACK;
    }
    let n = count as f64;
    Rgb([
        (accum[0] as f64 / n).round().clamp(0.0, 255.0) as u8,
        (accum[1] as f64 / n).round().clamp(0.0, 255.0) as u8,
        (accum[2] as f64 / n).round().clamp(0.0, 255.0) as u8,
    ])
}
