use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};

use crate::core::frame::DepthFrame;
use crate::error::{Error, Result};

/// Writes a frame as a single-channel 32-bit float TIFF (meters).
pub fn write_tiff_f32(output: &Path, frame: &DepthFrame) -> Result<()> {
    let width = u32::try_from(frame.width).map_err(|_| Error::invalid("width", frame.width))?;
    let height = u32::try_from(frame.height).map_err(|_| Error::invalid("height", frame.height))?;
    let file = File::create(output)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    encoder.write_image::<colortype::Gray32Float>(width, height, &frame.data)?;
    Ok(())
}
