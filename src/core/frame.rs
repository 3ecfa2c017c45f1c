use crate::error::{Error, Result};

/// `width * height`, or an error when the product does not fit in `usize`.
pub(crate) fn cell_count(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or_else(|| Error::invalid("dimensions", format!("{}x{}", width, height)))
}

/// One dense depth map as delivered by the sensor: row-major, meters, one value per pixel.
/// Values may be NaN or infinite where the sensor could not measure.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl DepthFrame {
    /// Checked constructor; `data` must hold exactly `width * height` values.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        let expected = cell_count(width, height)?;
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// RGBA8 image produced by a colorization pass. Alpha is always 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    /// Interleaved RGBA, row-major
    pub pixels: Vec<u8>,
}

impl ColorImage {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        self.pixels
            .get(i..i + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Drops the alpha channel, e.g. for JPEG output.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for px in self.pixels.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        rgb
    }
}
