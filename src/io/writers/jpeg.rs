use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

use crate::core::frame::ColorImage;
use crate::error::{Error, Result};

fn jpeg_dim(arg: &'static str, value: usize) -> Result<u16> {
    if value == 0 {
        return Err(Error::ZeroSize { size: value });
    }
    u16::try_from(value).map_err(|_| Error::invalid(arg, value))
}

/// Writes a terrain render as an RGB JPEG; the alpha channel is dropped.
pub fn write_rgba_jpeg(output: &Path, image: &ColorImage, quality: u8) -> Result<()> {
    let width = jpeg_dim("jpeg width", image.width)?;
    let height = jpeg_dim("jpeg height", image.height)?;

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality);
    encoder.encode(&image.to_rgb(), width, height, ColorType::Rgb)?;
    debug!("Wrote {}x{} JPEG {:?}", width, height, output);
    Ok(())
}
