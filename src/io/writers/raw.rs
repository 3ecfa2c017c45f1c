use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::frame::DepthFrame;
use crate::error::Result;

/// Writes a frame as headerless little-endian `f32`, row-major.
pub fn write_raw_f32(output: &Path, frame: &DepthFrame) -> Result<()> {
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    for v in &frame.data {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}
