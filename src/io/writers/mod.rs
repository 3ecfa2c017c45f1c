pub mod jpeg;
pub mod metadata;
pub mod raw;
pub mod tiff;
