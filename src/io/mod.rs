//! I/O layer for recorded depth frames.
//! Provides `depth` readers (raw `f32` and float TIFF) and `writers`
//! for raw/TIFF depth frames, JPEG terrain renders and JSON sidecars.
pub mod depth;
pub use depth::{list_depth_frames, read_depth_frame, read_raw_f32, read_tiff_depth};

pub mod writers;
