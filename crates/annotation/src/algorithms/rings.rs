use geo_types::{Coord, Line, LineString, Polygon};

use crate::traits::RingSimplifier;
use crate::types::Ring;

/// Douglas-Peucker simplifier using geo crate's implementation
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl RingSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, ring: &Ring, tolerance: f64) -> Ring {
        use geo::Simplify;

        let simplified = to_line_string(ring).simplify(&tolerance);
        simplified
            .coords()
            .map(|coord| [coord.x, coord.y])
            .collect()
    }
}

pub fn to_line_string(ring: &Ring) -> LineString<f64> {
    let coords: Vec<Coord<f64>> = ring.iter().map(|&[x, y]| Coord { x, y }).collect();
    LineString::new(coords)
}

pub fn to_polygon(ring: &Ring) -> Polygon<f64> {
    Polygon::new(to_line_string(ring), vec![])
}

/// Unsigned shoelace area of the ring. Self-intersecting rings report their
/// net area, which is what the noise filter wants.
pub fn ring_area(ring: &Ring) -> f64 {
    use geo::Area;
    to_polygon(ring).unsigned_area()
}

/// Tight axis-aligned bounds as `[x, y, width, height]`.
pub fn ring_bounds(ring: &Ring) -> Option<[f64; 4]> {
    use geo::BoundingRect;
    let rect = to_polygon(ring).bounding_rect()?;
    Some([rect.min().x, rect.min().y, rect.width(), rect.height()])
}

/// The smallest convex ring containing all of `ring`'s points, closed.
pub fn convex_hull_ring(ring: &Ring) -> Ring {
    use geo::ConvexHull;

    let hull = to_line_string(ring).convex_hull();
    hull.exterior()
        .coords()
        .map(|coord| [coord.x, coord.y])
        .collect()
}

/// Whether any two non-adjacent edges of the closed ring cross.
///
/// A ring that self-intersects after simplification is the raster analogue
/// of a simplification resolving to multiple disjoint polygons; the builder
/// swaps such rings for their convex hull.
pub fn is_self_intersecting(ring: &Ring) -> bool {
    use geo::Intersects;

    if ring.len() < 4 {
        return false;
    }
    // drop the closing duplicate; edge i runs pts[i] -> pts[(i + 1) % n]
    let pts = &ring[..ring.len() - 1];
    let n = pts.len();
    if n < 4 {
        return false;
    }

    let edge = |i: usize| {
        let [ax, ay] = pts[i];
        let [bx, by] = pts[(i + 1) % n];
        Line::new(Coord { x: ax, y: ay }, Coord { x: bx, y: by })
    };

    for i in 0..n {
        for j in i + 1..n {
            // adjacent edges share a vertex and always "intersect"
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            if edge(i).intersects(&edge(j)) {
                return true;
            }
        }
    }
    false
}

/// A ring describes a true-area polygon (not a point or line degenerate).
pub fn has_true_area(ring: &Ring) -> bool {
    ring.len() >= 4 && ring_area(ring) > 0.0
}
