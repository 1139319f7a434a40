//! Frame brightness and its mapping to halo opacity.

use image::RgbaImage;

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Mean Rec. 601 luma of every pixel in `frame`, in `[0, 255]`.
pub fn mean_luma(frame: &RgbaImage) -> f32 {
    let count = (frame.width() as u64) * (frame.height() as u64);
    if count == 0 {
        return 0.0;
    }
    let total: f64 = frame
        .pixels()
        .map(|p| LUMA_R * p[0] as f64 + LUMA_G * p[1] as f64 + LUMA_B * p[2] as f64)
        .sum();
    (total / count as f64).clamp(0.0, 255.0) as f32
}

/// Mean luma normalized to `[0, 1]`.
pub fn brightness(frame: &RgbaImage) -> f32 {
    mean_luma(frame) / 255.0
}

/// Linear mapping from brightness to halo opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityRange {
    pub min: f32,
    pub max: f32,
}

impl OpacityRange {
    pub const DEFAULT_MIN: f32 = 0.2;
    pub const DEFAULT_MAX: f32 = 1.0;

    pub fn opacity_for(&self, brightness: f32) -> f32 {
        self.min + brightness.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

impl Default for OpacityRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn black_frame_maps_to_min_opacity() {
        let img = RgbaImage::from_pixel(16, 9, Rgba([0, 0, 0, 255]));
        let range = OpacityRange::default();
        assert_eq!(range.opacity_for(brightness(&img)), range.min);
    }

    #[test]
    fn white_frame_maps_to_max_opacity() {
        let img = RgbaImage::from_pixel(16, 9, Rgba([255, 255, 255, 255]));
        let range = OpacityRange::default();
        assert!((range.opacity_for(brightness(&img)) - range.max).abs() < 1e-5);
    }

    #[test]
    fn luma_weights_favour_green() {
        let red = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let green = RgbaImage::from_pixel(1, 1, Rgba([0, 255, 0, 255]));
        let blue = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 255]));
        assert!((mean_luma(&red) - 76.245).abs() < 1e-3);
        assert!((mean_luma(&green) - 149.685).abs() < 1e-3);
        assert!((mean_luma(&blue) - 29.07).abs() < 1e-3);
    }

    #[test]
    fn half_grey_lands_midway() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([51, 51, 51, 255]));
        let range = OpacityRange::default();
        assert!((range.opacity_for(brightness(&img)) - 0.36).abs() < 1e-4);
    }

    #[test]
    fn empty_frame_is_dark() {
        assert_eq!(mean_luma(&RgbaImage::new(0, 0)), 0.0);
    }
}
