use std::collections::{HashMap, HashSet};

use image::GrayImage;

use crate::error::Result;
use crate::traits::ContourTracer;
use crate::types::Ring;

/// Lattice point on the half-unit grid, doubled so it stays integral:
/// `(2 * row, 2 * col)`. Pixel centers are even/even; the iso-crossings sit
/// on edge midpoints, which have exactly one odd coordinate.
type GridPoint = (i64, i64);
type Segment = (GridPoint, GridPoint);

/// Marching-squares contour tracer at the 0.5 iso-level.
///
/// Walks every 2x2 cell of pixel centers, emits the boundary crossing
/// segments between edge midpoints, and chains them into closed rings.
/// Cells reaching one pixel beyond the raster treat the outside as zero, so
/// every ring closes even when a silhouette touches the raster edge. Saddle
/// cells (two diagonal high corners) resolve to the disconnected-high
/// pairing, deterministically.
#[derive(Debug, Clone, Default)]
pub struct MarchingSquaresTracer;

impl ContourTracer for MarchingSquaresTracer {
    fn trace(&self, mask: &GrayImage) -> Result<Vec<Ring>> {
        let segments = collect_segments(mask);
        Ok(chain_segments(&segments))
    }
}

fn collect_segments(mask: &GrayImage) -> Vec<Segment> {
    let (width, height) = (mask.width() as i64, mask.height() as i64);
    let inside = |row: i64, col: i64| -> bool {
        row >= 0
            && col >= 0
            && row < height
            && col < width
            && mask.get_pixel(col as u32, row as u32).0[0] > 0
    };

    let mut segments = Vec::new();
    for row in -1..height {
        for col in -1..width {
            // corners of the cell whose top-left pixel center is (row, col)
            let ul = inside(row, col) as u8;
            let ur = inside(row, col + 1) as u8;
            let ll = inside(row + 1, col) as u8;
            let lr = inside(row + 1, col + 1) as u8;
            let case = ul | (ur << 1) | (ll << 2) | (lr << 3);

            let top = (2 * row, 2 * col + 1);
            let bottom = (2 * row + 2, 2 * col + 1);
            let left = (2 * row + 1, 2 * col);
            let right = (2 * row + 1, 2 * col + 2);

            match case {
                0 | 15 => {}
                1 => segments.push((left, top)),
                2 => segments.push((top, right)),
                3 => segments.push((left, right)),
                4 => segments.push((bottom, left)),
                5 => segments.push((top, bottom)),
                6 => {
                    // saddle: isolate each high corner
                    segments.push((top, right));
                    segments.push((bottom, left));
                }
                7 => segments.push((right, bottom)),
                8 => segments.push((right, bottom)),
                9 => {
                    segments.push((left, top));
                    segments.push((right, bottom));
                }
                10 => segments.push((top, bottom)),
                11 => segments.push((bottom, left)),
                12 => segments.push((left, right)),
                13 => segments.push((top, right)),
                14 => segments.push((left, top)),
                _ => unreachable!("4-bit marching squares case"),
            }
        }
    }
    segments
}

/// Links crossing segments into closed rings.
///
/// Every crossing point has exactly two incident segments (one per adjacent
/// cell), so the segment set decomposes into disjoint loops. Seeds are taken
/// in scan order, which keeps the output deterministic.
fn chain_segments(segments: &[Segment]) -> Vec<Ring> {
    let mut adjacency: HashMap<GridPoint, Vec<GridPoint>> = HashMap::new();
    for &(a, b) in segments {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut rings = Vec::new();
    let mut visited: HashSet<Segment> = HashSet::new();

    for &(start, next) in segments {
        if visited.contains(&ordered(start, next)) {
            continue;
        }
        visited.insert(ordered(start, next));

        let mut points = vec![start, next];
        let (mut prev, mut current) = (start, next);
        while current != start {
            let Some(&follow) = adjacency[&current].iter().find(|&&p| p != prev) else {
                break;
            };
            visited.insert(ordered(current, follow));
            points.push(follow);
            prev = current;
            current = follow;
        }

        rings.push(
            points
                .into_iter()
                .map(|(row2, col2)| [row2 as f64 / 2.0, col2 as f64 / 2.0])
                .collect(),
        );
    }

    rings
}

fn ordered(a: GridPoint, b: GridPoint) -> Segment {
    if a <= b { (a, b) } else { (b, a) }
}
