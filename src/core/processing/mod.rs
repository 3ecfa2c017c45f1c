//! Depth-to-terrain processing primitives.
pub mod calibration;
pub mod colormap;
pub mod debounce;
pub mod downsample;
pub mod pipeline;
pub mod thresholds;
