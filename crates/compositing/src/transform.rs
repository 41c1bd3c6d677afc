use std::ops::Range;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rand::Rng;

use crate::error::{CompositeError, Result};

/// Applies randomized rotation, scale and brightness to a single cutout.
///
/// The steps run in that order, each feeding the next; the input raster is
/// never mutated. A cutout must carry an alpha channel with at least one
/// fully transparent pixel, otherwise it is a rectangle with no silhouette
/// and the transform refuses it.
#[derive(Debug, Clone)]
pub struct ForegroundTransformer {
    /// Rotation angle in degrees.
    pub rotation: Range<f64>,
    /// Uniform scale factor applied to both dimensions.
    pub scale: Range<f64>,
    /// Per-pixel brightness multiplier; the alpha channel is untouched.
    pub brightness: Range<f64>,
}

impl Default for ForegroundTransformer {
    fn default() -> Self {
        Self {
            rotation: 0.0..360.0,
            scale: 0.5..1.0,
            brightness: 0.7..1.1,
        }
    }
}

impl ForegroundTransformer {
    /// Transforms `cutout`, drawing the random pose from `rng`.
    ///
    /// `source` is only used for error reporting.
    pub fn transform<R: Rng>(
        &self,
        cutout: &RgbaImage,
        source: &Path,
        rng: &mut R,
    ) -> Result<RgbaImage> {
        if !has_transparency(cutout) {
            return Err(CompositeError::MalformedForeground {
                path: source.to_path_buf(),
            });
        }

        let angle = rng.gen_range(self.rotation.clone());
        let scale = rng.gen_range(self.scale.clone());
        let brightness = rng.gen_range(self.brightness.clone());

        let rotated = rotate_expanded(cutout, angle);
        let scaled = scale_uniform(&rotated, scale);
        Ok(adjust_brightness(&scaled, brightness))
    }
}

/// Whether the raster carries at least one fully transparent pixel.
pub fn has_transparency(image: &RgbaImage) -> bool {
    image.pixels().any(|pixel| pixel.0[3] == 0)
}

/// Rotates by `degrees` around the center, expanding the canvas so the whole
/// rotated silhouette fits (no cropping of rotated corners). Samples are
/// bilinear; anything outside the source is transparent.
pub fn rotate_expanded(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();

    let (src_w, src_h) = (src.width() as f64, src.height() as f64);
    let out_w = expanded_extent(src_w * cos.abs() + src_h * sin.abs());
    let out_h = expanded_extent(src_w * sin.abs() + src_h * cos.abs());

    let (src_cx, src_cy) = (src_w / 2.0, src_h / 2.0);
    let (out_cx, out_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let dx = x as f64 + 0.5 - out_cx;
        let dy = y as f64 + 0.5 - out_cy;
        // Inverse rotation back into source pixel-center coordinates
        let sx = cos * dx + sin * dy + src_cx - 0.5;
        let sy = -sin * dx + cos * dy + src_cy - 0.5;
        *pixel = sample_bilinear(src, sx, sy);
    }
    out
}

// ceil with a guard so exact extents (e.g. a 90 degree turn) don't gain a
// row from floating point noise
fn expanded_extent(extent: f64) -> u32 {
    (extent - 1e-9).ceil().max(1.0) as u32
}

fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let mut accum = [0.0f64; 4];
    for (ix, iy, weight) in [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ] {
        if ix < 0 || iy < 0 || ix >= src.width() as i64 || iy >= src.height() as i64 {
            // Outside the source counts as transparent black
            continue;
        }
        let pixel = src.get_pixel(ix as u32, iy as u32);
        for channel in 0..4 {
            accum[channel] += weight * pixel.0[channel] as f64;
        }
    }

    Rgba([
        accum[0].round().clamp(0.0, 255.0) as u8,
        accum[1].round().clamp(0.0, 255.0) as u8,
        accum[2].round().clamp(0.0, 255.0) as u8,
        accum[3].round().clamp(0.0, 255.0) as u8,
    ])
}

/// Scales both dimensions by a single factor (bilinear resampling).
pub fn scale_uniform(src: &RgbaImage, factor: f64) -> RgbaImage {
    let width = ((src.width() as f64 * factor).round() as u32).max(1);
    let height = ((src.height() as f64 * factor).round() as u32).max(1);
    imageops::resize(src, width, height, FilterType::Triangle)
}

/// Multiplies RGB by `factor`, clamped to the channel range; alpha untouched.
pub fn adjust_brightness(src: &RgbaImage, factor: f64) -> RgbaImage {
    let mut out = src.clone();
    for pixel in out.pixels_mut() {
        for channel in 0..3 {
            let scaled = pixel.0[channel] as f64 * factor;
            pixel.0[channel] = scaled.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
