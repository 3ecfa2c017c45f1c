use ndarray::{Array3, Axis, Zip};
use tracing::trace;

use crate::core::frame::ColorImage;
use crate::core::processing::downsample::DepthGrid;
use crate::core::processing::thresholds::ThresholdSet;
use crate::types::Band;

pub const WATER_RGBA: [u8; 4] = [0, 0, 255, 255];
pub const SNOW_RGBA: [u8; 4] = [255, 255, 255, 255];
/// Full-strength endpoint of the grass gradient
const GRASS_PEAK: [f32; 3] = [0.0, 255.0, 0.0];
/// Full-strength endpoint of the mountain gradient (0.6, 0.4, 0.2 of 255)
const MOUNTAIN_PEAK: [f32; 3] = [153.0, 102.0, 51.0];

/// Classifies `depth` against `thresholds`, first match wins:
/// water above ground, then grass, then mountain, then snow.
///
/// The returned fraction is the position inside the band, in `[0, 1]`; it is `1.0` for
/// the solid bands and for a zero-width gradient band. NaN depth fails every comparison
/// and lands in snow.
#[inline]
pub fn classify(depth: f32, thresholds: &ThresholdSet) -> (Band, f32) {
    let grass_floor = thresholds.grass_floor();
    let mountain_floor = thresholds.mountain_floor();
    if depth > thresholds.ground_level {
        (Band::Water, 1.0)
    } else if depth > grass_floor {
        (
            Band::Grass,
            band_fraction(depth, grass_floor, thresholds.range_below),
        )
    } else if depth > mountain_floor {
        (
            Band::Mountain,
            band_fraction(depth, mountain_floor, thresholds.range_above),
        )
    } else {
        (Band::Snow, 1.0)
    }
}

#[inline]
fn band_fraction(depth: f32, floor: f32, width: f32) -> f32 {
    if width == 0.0 {
        return 1.0;
    }
    let t = (depth - floor) / width;
    if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) }
}

#[inline]
fn scale(peak: [f32; 3], t: f32) -> [u8; 4] {
    [
        (peak[0] * t) as u8,
        (peak[1] * t) as u8,
        (peak[2] * t) as u8,
        255,
    ]
}

/// RGBA color for a single depth value.
#[inline]
pub fn terrain_color(depth: f32, thresholds: &ThresholdSet) -> [u8; 4] {
    match classify(depth, thresholds) {
        (Band::Water, _) => WATER_RGBA,
        (Band::Grass, t) => scale(GRASS_PEAK, t),
        (Band::Mountain, t) => scale(MOUNTAIN_PEAK, t),
        (Band::Snow, _) => SNOW_RGBA,
    }
}

/// Maps every cell of `grid` to its terrain color. Rows are colored in parallel; the
/// result depends only on the inputs.
pub fn colorize(grid: &DepthGrid, thresholds: &ThresholdSet) -> ColorImage {
    let (rows, cols) = grid.dim();
    if rows == 0 || cols == 0 {
        return ColorImage::empty();
    }
    trace!("Colorizing {}x{} grid with {:?}", cols, rows, thresholds);

    let thresholds = *thresholds;
    let mut rgba = Array3::<u8>::zeros((rows, cols, 4));
    Zip::from(rgba.lanes_mut(Axis(2)))
        .and(grid)
        .par_for_each(|mut px, &depth| {
            for (dst, src) in px.iter_mut().zip(terrain_color(depth, &thresholds)) {
                *dst = src;
            }
        });

    ColorImage {
        width: cols,
        height: rows,
        pixels: rgba.into_raw_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn reference() -> ThresholdSet {
        ThresholdSet::new(5.0, 2.0, 3.0)
    }

    #[test]
    fn band_priority_examples() {
        let th = reference();
        assert_eq!(terrain_color(6.0, &th), [0, 0, 255, 255]);
        assert_eq!(terrain_color(4.0, &th), [0, 170, 0, 255]);
        assert_eq!(terrain_color(1.0, &th), [76, 51, 25, 255]);
        assert_eq!(terrain_color(-1.0, &th), [255, 255, 255, 255]);
    }

    #[test]
    fn boundaries_belong_to_lower_band() {
        let th = reference();
        // Equal to ground is not water.
        assert_eq!(classify(5.0, &th), (Band::Grass, 1.0));
        assert_eq!(classify(2.0, &th).0, Band::Mountain);
        assert_eq!(classify(0.0, &th).0, Band::Snow);
    }

    #[test]
    fn gradients_start_dark() {
        let th = reference();
        let (band, t) = classify(2.0 + 1e-4, &th);
        assert_eq!(band, Band::Grass);
        assert!(t < 0.001);
        assert_eq!(terrain_color(2.0 + 1e-4, &th), [0, 0, 0, 255]);
    }

    #[test]
    fn zero_width_bands_are_solid() {
        let th = ThresholdSet::new(5.0, 0.0, 0.0);
        // Both gradient bands collapse; only water and snow remain reachable.
        assert_eq!(terrain_color(5.0, &th), SNOW_RGBA);
        assert_eq!(band_fraction(1.0, 1.0, 0.0), 1.0);

        let grass_only = ThresholdSet::new(5.0, 0.0, 3.0);
        assert_eq!(terrain_color(2.0, &grass_only), SNOW_RGBA);

        // With no grass band, everything just below ground is mountain.
        let mountain_only = ThresholdSet::new(5.0, 2.0, 0.0);
        assert_eq!(classify(4.0, &mountain_only), (Band::Mountain, 0.5));
        assert_eq!(terrain_color(5.0, &mountain_only), [153, 102, 51, 255]);
    }

    #[test]
    fn non_finite_depths() {
        let th = reference();
        assert_eq!(terrain_color(f32::NAN, &th), SNOW_RGBA);
        assert_eq!(terrain_color(f32::INFINITY, &th), WATER_RGBA);
        assert_eq!(terrain_color(f32::NEG_INFINITY, &th), SNOW_RGBA);
    }

    #[test]
    fn colorize_is_row_major_and_opaque() {
        let grid = array![[6.0_f32, 4.0], [1.0, -1.0], [5.5, 0.0]];
        let image = colorize(&grid, &reference());
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(image.pixels.len(), 2 * 3 * 4);
        assert_eq!(image.pixel(0, 0), Some(WATER_RGBA));
        assert_eq!(image.pixel(1, 0), Some([0, 170, 0, 255]));
        assert_eq!(image.pixel(0, 1), Some([76, 51, 25, 255]));
        assert_eq!(image.pixel(1, 1), Some(SNOW_RGBA));
        assert_eq!(image.pixel(0, 2), Some(WATER_RGBA));
        assert!(image.pixels.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn colorize_is_idempotent() {
        let grid = DepthGrid::from_shape_fn((48, 64), |(y, x)| (x as f32 * 0.1) - (y as f32 * 0.05));
        let th = reference();
        assert_eq!(colorize(&grid, &th).pixels, colorize(&grid, &th).pixels);
    }

    #[test]
    fn empty_grid_gives_empty_image() {
        let grid = DepthGrid::zeros((0, 5));
        assert!(colorize(&grid, &reference()).is_empty());
    }
}
