use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::{debug, info};

use crate::core::frame::{DepthFrame, cell_count};
use crate::error::{Error, Result};

/// Extensions treated as headerless little-endian `f32` frames
pub const RAW_EXTENSIONS: [&str; 3] = ["f32", "bin", "raw"];
pub const TIFF_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

pub fn is_depth_frame_path(path: &Path) -> bool {
    match extension(path) {
        Some(ext) => {
            RAW_EXTENSIONS.contains(&ext.as_str()) || TIFF_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Reads a headerless little-endian `f32` frame of the given dimensions.
pub fn read_raw_f32(path: &Path, width: usize, height: usize) -> Result<DepthFrame> {
    let expected = cell_count(width, height)?
        .checked_mul(4)
        .ok_or_else(|| Error::invalid("dimensions", format!("{}x{}", width, height)))?;
    let bytes = fs::read(path)?;
    if bytes.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: bytes.len(),
        });
    }
    let data = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    debug!("Read raw depth frame {:?} ({}x{})", path, width, height);
    DepthFrame::new(width, height, data)
}

/// Reads a single-channel TIFF depth map.
///
/// 32/64-bit float samples are taken as meters. 16-bit integer samples are taken as
/// millimeters, with `0` meaning "no measurement" (read as NaN).
pub fn read_tiff_depth(path: &Path) -> Result<DepthFrame> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;
    let (width, height) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    if !matches!(color, ColorType::Gray(_)) {
        return Err(Error::invalid("tiff colortype", format!("{color:?}")));
    }

    let data: Vec<f32> = match decoder.read_image()? {
        DecodingResult::F32(values) => values,
        DecodingResult::F64(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(values) => values
            .into_iter()
            .map(|mm| if mm == 0 { f32::NAN } else { mm as f32 / 1000.0 })
            .collect(),
        _ => return Err(Error::invalid("tiff sample format", format!("{color:?}"))),
    };

    debug!("Read TIFF depth frame {:?} ({}x{})", path, width, height);
    DepthFrame::new(width as usize, height as usize, data)
}

/// Reads a depth frame, choosing the decoder by file extension. Raw frames need `dims`.
pub fn read_depth_frame(path: &Path, dims: Option<(usize, usize)>) -> Result<DepthFrame> {
    match extension(path).as_deref() {
        Some(ext) if TIFF_EXTENSIONS.contains(&ext) => read_tiff_depth(path),
        Some(ext) if RAW_EXTENSIONS.contains(&ext) => {
            let (width, height) = dims.ok_or(Error::MissingArgument {
                arg: "--width/--height".to_string(),
            })?;
            read_raw_f32(path, width, height)
        }
        other => Err(Error::invalid(
            "depth frame extension",
            other.unwrap_or("<none>"),
        )),
    }
}

/// Lists depth frame files in `dir`, sorted by file name.
pub fn list_depth_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_depth_frame_path(&path) {
            frames.push(path);
        }
    }
    frames.sort();
    info!("Found {} depth frames in {:?}", frames.len(), dir);
    Ok(frames)
}
