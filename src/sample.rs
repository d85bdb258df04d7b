//! Brightness sampling - mean perceptual luma of a pixel region.

use crate::grid::Rect;
use crate::{Result, WeaverError};
use image::{GenericImageView, Rgba, RgbaImage};

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// BT.601 luma of an sRGB pixel, alpha ignored.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Mean luma over every pixel of `view`.
pub fn mean_luminance<V>(view: &V) -> Result<f32>
where
    V: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = view.dimensions();
    let count = width as u64 * height as u64;
    if count == 0 {
        return Err(WeaverError::EmptyRegion { x: 0, y: 0, width, height });
    }

    // f64 accumulator so large regions don't drift
    let total: f64 = view
        .pixels()
        .map(|(_, _, Rgba([r, g, b, _]))| luma(r, g, b) as f64)
        .sum();
    Ok((total / count as f64).clamp(0.0, 255.0) as f32)
}

/// Mean luma of `region`, clamped to the image first.
pub fn sample_region(image: &RgbaImage, region: Rect) -> Result<f32> {
    let clamped = region.clamp_to(image.width(), image.height());
    if clamped.area() == 0 {
        return Err(WeaverError::EmptyRegion {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        });
    }
    let view = image.view(clamped.x, clamped.y, clamped.width, clamped.height);
    mean_luminance(&*view)
}
