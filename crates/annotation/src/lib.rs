//! # Annotation - Mask to Polygon Extraction
//!
//! Recovers COCO-style polygon annotations from color-coded instance masks:
//! the mask is decomposed into one padded binary raster per color key, each
//! raster is traced at the 0.5 iso-level, and the resulting rings are
//! simplified, filtered and assembled into annotation records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use annotation::{AnnotationBuilder, AnnotationCounter, decompose};
//! use std::collections::BTreeMap;
//!
//! let mask = image::open("masks/00000000.png")?.to_rgb8();
//! let isolated = decompose::decompose(&mask);
//!
//! let categories = BTreeMap::new(); // color key -> category id
//! let mut counter = AnnotationCounter::new();
//! let records =
//!     AnnotationBuilder::default().build_annotations(&isolated, 0, &categories, &mut counter)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod algorithms;
pub mod builder;
pub mod coco;
pub mod decompose;
pub mod error;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use algorithms::{DouglasPeuckerSimplifier, MarchingSquaresTracer};
pub use builder::{AnnotationBuilder, AnnotationCounter, MIN_POLYGON_AREA, SIMPLIFY_TOLERANCE};
pub use coco::{Annotation, Category, CocoDocument, ImageRecord, build_categories};
pub use decompose::{PADDING, decompose, verify_color_keys};
pub use error::{AnnotationError, Result};
pub use traits::{ContourTracer, RingSimplifier};
pub use types::Ring;

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::collections::BTreeMap;
    use synth_common::ColorKey;

    fn paint_square(mask: &mut RgbImage, x0: u32, y0: u32, side: u32, color: ColorKey) {
        let [r, g, b] = color.rgb();
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.put_pixel(x, y, Rgb([r, g, b]));
            }
        }
    }

    #[test]
    fn test_n_disjoint_squares_round_trip_to_n_records() {
        let keys = [
            ColorKey::new(255, 0, 0),
            ColorKey::new(0, 255, 0),
            ColorKey::new(0, 0, 255),
        ];
        let mut mask = RgbImage::new(100, 100);
        paint_square(&mut mask, 5, 5, 20, keys[0]);
        paint_square(&mut mask, 40, 10, 20, keys[1]);
        paint_square(&mut mask, 70, 60, 20, keys[2]);

        let isolated = decompose::decompose(&mask);
        assert_eq!(isolated.len(), 3);

        let categories: BTreeMap<ColorKey, u32> = keys
            .iter()
            .enumerate()
            .map(|(index, &key)| (key, index as u32 + 1))
            .collect();
        let mut counter = AnnotationCounter::new();
        let records = AnnotationBuilder::default()
            .build_annotations(&isolated, 0, &categories, &mut counter)
            .unwrap();

        assert_eq!(records.len(), 3, "one record per color key");
        for record in &records {
            assert_eq!(record.iscrowd, 0);
            assert!((record.area - 400.0).abs() < 25.0);
        }
        let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_edge_touching_silhouette_yields_a_closed_polygon() {
        let key = ColorKey::new(255, 0, 0);
        let mut mask = RgbImage::new(60, 60);
        // flush against the top-left corner of the raster
        paint_square(&mut mask, 0, 0, 25, key);

        let isolated = decompose::decompose(&mask);
        let mut categories = BTreeMap::new();
        categories.insert(key, 1);
        let mut counter = AnnotationCounter::new();

        let records = AnnotationBuilder::default()
            .build_annotations(&isolated, 0, &categories, &mut counter)
            .unwrap();
        assert_eq!(records.len(), 1);

        let segmentation = &records[0].segmentation[0];
        assert!(segmentation.len() >= 8, "at least a quadrilateral");
        // flattened ring closes on itself
        let n = segmentation.len();
        assert_eq!(segmentation[0], segmentation[n - 2]);
        assert_eq!(segmentation[1], segmentation[n - 1]);
        assert!((records[0].area - 625.0).abs() < 30.0);
    }

    #[test]
    fn test_leaked_color_is_diagnosed_not_fatal() {
        let declared = ColorKey::new(255, 0, 0);
        let leaked = ColorKey::new(137, 42, 7);
        let mut mask = RgbImage::new(80, 80);
        paint_square(&mut mask, 10, 10, 20, declared);
        paint_square(&mut mask, 50, 50, 20, leaked);

        let isolated = decompose::decompose(&mask);
        let assigned = std::iter::once(declared).collect();
        verify_color_keys(&isolated, &assigned, "images/00000000.jpg");

        let mut categories = BTreeMap::new();
        categories.insert(declared, 1);
        let mut counter = AnnotationCounter::new();
        let records = AnnotationBuilder::default()
            .build_annotations(&isolated, 0, &categories, &mut counter)
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category_id, 1);
    }
}
