use image::{Rgb, RgbImage, RgbaImage, imageops};
use rand::Rng;

use synth_common::ColorKey;

use crate::error::{CompositeError, Result};

/// Opacity at or above which a layer pixel is stamped into the instance
/// mask. The composite itself blends with continuous alpha; the mask makes a
/// hard keep/discard decision. This asymmetry is deliberate.
pub const OPACITY_THRESHOLD: u8 = 200;

/// A transformed foreground raster tagged with its mask color and category
/// labels. Created per composite and consumed once.
#[derive(Debug, Clone)]
pub struct Layer {
    pub image: RgbaImage,
    pub color: ColorKey,
    pub category: String,
    pub super_category: String,
}

/// The output of one composition: the flattened RGB composite and its
/// color-coded instance mask, built in lock-step.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: RgbImage,
    pub mask: RgbImage,
}

/// Layers transformed foreground cutouts onto a random crop of a background,
/// accreting the instance mask as each layer is blended in.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    pub width: u32,
    pub height: u32,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Composes `layers` (in placement order) onto a random crop of
    /// `background`.
    ///
    /// Later layers occlude earlier ones identically in the composite and in
    /// the mask: a pixel's final mask color always matches the layer that is
    /// visually topmost there.
    pub fn compose<R: Rng>(
        &self,
        background: &RgbImage,
        layers: &[Layer],
        rng: &mut R,
    ) -> Result<Composite> {
        if background.width() < self.width || background.height() < self.height {
            return Err(CompositeError::BackgroundTooSmall {
                width: background.width(),
                height: background.height(),
                target_width: self.width,
                target_height: self.height,
            });
        }

        let crop_x = rng.gen_range(0..=background.width() - self.width);
        let crop_y = rng.gen_range(0..=background.height() - self.height);
        let mut image =
            imageops::crop_imm(background, crop_x, crop_y, self.width, self.height).to_image();
        let mut mask = RgbImage::new(self.width, self.height);

        for layer in layers {
            let (layer_w, layer_h) = layer.image.dimensions();
            if layer_w > self.width || layer_h > self.height {
                return Err(CompositeError::ForegroundTooLarge {
                    width: layer_w,
                    height: layer_h,
                    target_width: self.width,
                    target_height: self.height,
                });
            }

            let paste_x = rng.gen_range(0..=self.width - layer_w);
            let paste_y = rng.gen_range(0..=self.height - layer_h);
            self.blend_layer(&mut image, &mut mask, layer, paste_x, paste_y);
        }

        Ok(Composite { image, mask })
    }

    fn blend_layer(
        &self,
        image: &mut RgbImage,
        mask: &mut RgbImage,
        layer: &Layer,
        paste_x: u32,
        paste_y: u32,
    ) {
        for (x, y, fg) in layer.image.enumerate_pixels() {
            let alpha = fg.0[3];
            if alpha == 0 {
                continue;
            }

            let (dst_x, dst_y) = (paste_x + x, paste_y + y);

            // "over" compositing with continuous alpha
            let weight = alpha as f64 / 255.0;
            let bg = image.get_pixel_mut(dst_x, dst_y);
            for channel in 0..3 {
                let blended =
                    fg.0[channel] as f64 * weight + bg.0[channel] as f64 * (1.0 - weight);
                bg.0[channel] = blended.round().clamp(0.0, 255.0) as u8;
            }

            // mask accretion is hard-thresholded, overwriting earlier layers
            if alpha >= OPACITY_THRESHOLD {
                mask.put_pixel(dst_x, dst_y, Rgb(layer.color.rgb()));
            }
        }
    }
}
