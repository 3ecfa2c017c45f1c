//! Core processing building blocks: frame containers, calibration, the
//! downsample/colormap pass, threshold state, debouncing, and the per-frame
//! pipeline that ties them together. The high-level `api` module builds on these.
pub mod frame;
pub mod params;
pub mod processing;
