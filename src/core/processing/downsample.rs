use ndarray::Array2;
use tracing::{trace, warn};

/// Reduced-resolution depth grid, indexed `[(row, col)]`.
pub type DepthGrid = Array2<f32>;

/// Strides `buffer` by `factor` in both dimensions.
///
/// The grid is `(height / factor) x (width / factor)` (truncating); cell `(x, y)` reads the
/// source at `(x * factor, y * factor)`. Source indices past `width * height`, or past the
/// end of a short buffer, read as `0.0`. A zero factor or a frame smaller than one stride
/// yields an empty grid.
pub fn downsample(buffer: &[f32], width: usize, height: usize, factor: usize) -> DepthGrid {
    if factor == 0 {
        warn!("Downsample factor is zero; producing an empty grid");
        return Array2::zeros((0, 0));
    }

    let out_cols = width / factor;
    let out_rows = height / factor;
    let limit = (width * height).min(buffer.len());
    trace!(
        "Downsampling {}x{} by {} -> {}x{}",
        width, height, factor, out_cols, out_rows
    );

    Array2::from_shape_fn((out_rows, out_cols), |(y, x)| {
        let src = (y * factor) * width + x * factor;
        if src < limit { buffer[src] } else { 0.0 }
    })
}
