use image::GrayImage;

use crate::error::Result;
use crate::types::Ring;

/// Trait for contour tracing algorithms.
pub trait ContourTracer: Send + Sync {
    /// Recovers the closed boundary rings of a binary raster, in (row, col)
    /// coordinates.
    fn trace(&self, mask: &GrayImage) -> Result<Vec<Ring>>;
}

/// Trait for polygon-ring simplification algorithms.
///
/// Implementations maximize vertex reduction while keeping every retained
/// vertex within `tolerance` of the source ring. Topology does not need to
/// be preserved; the builder handles rings that degrade under
/// simplification.
pub trait RingSimplifier: Send + Sync {
    fn simplify(&self, ring: &Ring, tolerance: f64) -> Ring;
}
