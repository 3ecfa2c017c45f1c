use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lidarterrain", version, about = "LiDAR depth to terrain colormap renderer")]
pub struct CliArgs {
    /// Input depth frame (single frame mode): .tif/.tiff or raw little-endian .f32/.bin/.raw
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory of depth frames (sequence mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output JPEG (single frame mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory (sequence mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Frame width for raw frames
    #[arg(long)]
    pub width: Option<usize>,

    /// Frame height for raw frames
    #[arg(long)]
    pub height: Option<usize>,

    /// JSON pipeline preset (downsample factor, calibration window, band fractions)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the downsample factor from the preset
    #[arg(long)]
    pub factor: Option<usize>,

    /// Ground level in meters (skips calibration of this threshold)
    #[arg(long, allow_hyphen_values = true)]
    pub ground: Option<f32>,

    /// Mountain band height in meters
    #[arg(long)]
    pub above: Option<f32>,

    /// Grass band depth in meters
    #[arg(long)]
    pub below: Option<f32>,

    /// Recording frame rate, used to size the calibration window in frames
    #[arg(long, default_value_t = 30.0)]
    pub fps: f64,

    /// Drop NaN/inf samples before calibrating
    #[arg(long, default_value_t = false)]
    pub ignore_invalid: bool,

    /// Sequence mode: continue with other frames when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,

    /// Enable logging (honors RUST_LOG)
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
