/// One simple closed contour: an ordered sequence of vertices with the
/// first vertex repeated as the last.
///
/// Tracers emit rings in (row, col) order straight off the raster grid; the
/// annotation builder converts them to (x, y) image coordinates (origin
/// top-left, y increasing downward) with the isolation padding subtracted.
pub type Ring = Vec<[f64; 2]>;
