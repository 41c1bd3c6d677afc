pub mod contours;
pub mod rings;

pub use contours::MarchingSquaresTracer;
pub use rings::{
    DouglasPeuckerSimplifier, convex_hull_ring, has_true_area, is_self_intersecting, ring_area,
    ring_bounds,
};
