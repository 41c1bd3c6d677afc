use std::collections::{BTreeMap, BTreeSet};

use image::{GrayImage, Luma, RgbImage};
use tracing::warn;

use synth_common::ColorKey;

/// Padding added on every side of an isolated mask so the contour tracer can
/// close loops for silhouettes that touch the raster edge.
pub const PADDING: u32 = 1;

/// Splits a multi-colored instance mask into one padded binary mask per
/// color key.
///
/// A single pass over the pixels: background-black is ignored, every other
/// color accretes into a `(width + 2) x (height + 2)` canvas shifted by
/// [`PADDING`]. The map is ordered by color key so downstream iteration is
/// deterministic.
pub fn decompose(instance_mask: &RgbImage) -> BTreeMap<ColorKey, GrayImage> {
    let (width, height) = instance_mask.dimensions();
    let mut isolated: BTreeMap<ColorKey, GrayImage> = BTreeMap::new();

    for (x, y, pixel) in instance_mask.enumerate_pixels() {
        if pixel.0 == [0, 0, 0] {
            continue;
        }
        let key = ColorKey::from(pixel.0);
        let canvas = isolated
            .entry(key)
            .or_insert_with(|| GrayImage::new(width + 2 * PADDING, height + 2 * PADDING));
        canvas.put_pixel(x + PADDING, y + PADDING, Luma([255u8]));
    }

    isolated
}

/// Checks that the decomposed color keys are a subset of the keys assigned
/// during composition. A mismatch indicates an upstream blending bug; it is
/// logged, not fatal.
pub fn verify_color_keys(
    isolated: &BTreeMap<ColorKey, GrayImage>,
    assigned: &BTreeSet<ColorKey>,
    image_label: &str,
) {
    for key in isolated.keys() {
        if !assigned.contains(key) {
            warn!(
                "mask color {key} of {image_label} was never assigned to a layer; \
                 upstream compositing likely leaked a blend color"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_black_only_mask_decomposes_to_nothing() {
        let mask = RgbImage::new(12, 12);
        assert!(decompose(&mask).is_empty());
    }

    #[test]
    fn test_each_color_gets_a_padded_canvas() {
        let mut mask = RgbImage::new(10, 6);
        mask.put_pixel(0, 0, Rgb([255, 0, 0]));
        mask.put_pixel(9, 5, Rgb([0, 255, 0]));
        mask.put_pixel(4, 3, Rgb([0, 255, 0]));

        let isolated = decompose(&mask);
        assert_eq!(isolated.len(), 2);

        let red = &isolated[&ColorKey::new(255, 0, 0)];
        assert_eq!(red.dimensions(), (12, 8));
        // shifted by the padding
        assert_eq!(red.get_pixel(1, 1).0, [255]);
        assert_eq!(red.get_pixel(0, 0).0, [0]);

        let green = &isolated[&ColorKey::new(0, 255, 0)];
        assert_eq!(green.get_pixel(10, 6).0, [255]);
        assert_eq!(green.get_pixel(5, 4).0, [255]);
    }

    #[test]
    fn test_pixel_counts_survive_decomposition() {
        let mut mask = RgbImage::new(20, 20);
        for y in 3..9 {
            for x in 5..12 {
                mask.put_pixel(x, y, Rgb([0, 0, 255]));
            }
        }

        let isolated = decompose(&mask);
        let blue = &isolated[&ColorKey::new(0, 0, 255)];
        let set = blue.pixels().filter(|p| p.0[0] > 0).count();
        assert_eq!(set, 6 * 7);
    }
}
