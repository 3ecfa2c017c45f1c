use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("--width and --height must be given together")]
    IncompleteDimensions,

    #[error("Downsample factor must be greater than 0, got: {factor}")]
    ZeroFactor { factor: usize },

    #[error("Frame rate must be a positive number, got: {fps}")]
    InvalidFrameRate { fps: f64 },

    #[error(transparent)]
    Library(#[from] lidarterrain::Error),
}
