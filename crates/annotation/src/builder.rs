use std::collections::BTreeMap;

use image::GrayImage;
use tracing::warn;

use synth_common::ColorKey;

use crate::algorithms::{
    DouglasPeuckerSimplifier, MarchingSquaresTracer, convex_hull_ring, has_true_area,
    is_self_intersecting, ring_area,
};
use crate::coco::Annotation;
use crate::decompose::PADDING;
use crate::error::Result;
use crate::traits::{ContourTracer, RingSimplifier};
use crate::types::Ring;

/// Maximum deviation between a simplified polygon and its source ring, in
/// image-coordinate units.
pub const SIMPLIFY_TOLERANCE: f64 = 1.0;

/// Simplified rings at or below this area are treated as raster noise.
pub const MIN_POLYGON_AREA: f64 = 16.0;

/// Process-wide monotonic annotation-id source.
///
/// Owned by the orchestrator and threaded through every build call; it must
/// survive across all images of one dataset-generation run and never reset
/// mid-run. A parallel implementation would hand each worker a pre-sized
/// range via [`AnnotationCounter::starting_at`].
#[derive(Debug, Clone, Default)]
pub struct AnnotationCounter {
    next: u32,
}

impl AnnotationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next annotation will receive.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// Converts isolated binary masks into COCO annotation records.
pub struct AnnotationBuilder {
    tracer: Box<dyn ContourTracer>,
    simplifier: Box<dyn RingSimplifier>,
    pub tolerance: f64,
    pub min_area: f64,
}

impl Default for AnnotationBuilder {
    fn default() -> Self {
        Self {
            tracer: Box::new(MarchingSquaresTracer),
            simplifier: Box::new(DouglasPeuckerSimplifier),
            tolerance: SIMPLIFY_TOLERANCE,
            min_area: MIN_POLYGON_AREA,
        }
    }
}

impl AnnotationBuilder {
    pub fn new(
        tracer: Box<dyn ContourTracer>,
        simplifier: Box<dyn RingSimplifier>,
        tolerance: f64,
        min_area: f64,
    ) -> Self {
        Self {
            tracer,
            simplifier,
            tolerance,
            min_area,
        }
    }

    /// Builds zero or more annotation records for one image's isolated
    /// masks.
    ///
    /// A color key missing from `categories` is a data-authoring error, not
    /// a crash condition: the mask is skipped with a diagnostic naming the
    /// image. Masks whose every ring degenerates under filtering produce no
    /// record. Ids are drawn from `counter` only for surviving annotations,
    /// so the emitted ids stay contiguous.
    pub fn build_annotations(
        &self,
        isolated_masks: &BTreeMap<ColorKey, GrayImage>,
        image_id: u32,
        categories: &BTreeMap<ColorKey, u32>,
        counter: &mut AnnotationCounter,
    ) -> Result<Vec<Annotation>> {
        let mut annotations = Vec::new();

        for (color, mask) in isolated_masks {
            let Some(&category_id) = categories.get(color) else {
                warn!(
                    "category color not found: {color}; check that the mask definition \
                     and the image mask declare the same colors. image id: {image_id}"
                );
                continue;
            };

            let polygons = self.polygons_for_mask(mask)?;
            if polygons.is_empty() {
                continue;
            }

            annotations.push(self.assemble(polygons, image_id, category_id, counter));
        }

        Ok(annotations)
    }

    /// Traces, simplifies and filters the rings of one isolated mask.
    fn polygons_for_mask(&self, mask: &GrayImage) -> Result<Vec<Ring>> {
        let contours = self.tracer.trace(mask)?;
        let mut accepted = Vec::new();

        for contour in contours {
            // (row, col) -> (x, y), with the isolation padding subtracted
            let pad = PADDING as f64;
            let ring: Ring = contour
                .iter()
                .map(|&[row, col]| [col - pad, row - pad])
                .collect();

            let mut ring = self.simplifier.simplify(&ring, self.tolerance);
            if ring_area(&ring) <= self.min_area {
                continue;
            }
            if is_self_intersecting(&ring) {
                // simplification broke the ring apart; prefer one connected
                // convex region over exact multi-part fidelity
                ring = convex_hull_ring(&ring);
            }
            if !has_true_area(&ring) {
                continue;
            }
            accepted.push(ring);
        }

        Ok(accepted)
    }

    fn assemble(
        &self,
        polygons: Vec<Ring>,
        image_id: u32,
        category_id: u32,
        counter: &mut AnnotationCounter,
    ) -> Annotation {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut area = 0.0;
        let mut segmentation = Vec::with_capacity(polygons.len());

        for ring in &polygons {
            for &[x, y] in ring {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
            area += ring_area(ring);
            segmentation.push(ring.iter().flat_map(|&[x, y]| [x, y]).collect());
        }

        Annotation {
            segmentation,
            iscrowd: 0,
            image_id,
            category_id,
            id: counter.next_id(),
            bbox: [min_x, min_y, max_x - min_x, max_y - min_y],
            area,
        }
    }
}
