use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::params::PipelineParams;
use crate::core::processing::calibration::{Calibration, DepthStats};
use crate::core::processing::thresholds::ThresholdSet;
use crate::error::Result;

/// JSON sidecar written next to terrain renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSidecar {
    pub generator: String,
    /// RFC 3339 creation time
    pub created_at: String,
    pub source: String,
    pub frame_count: usize,
    pub grid_width: usize,
    pub grid_height: usize,
    pub downsample_factor: usize,
    pub thresholds: ThresholdSet,
    pub calibration: Option<DepthStats>,
}

impl RenderSidecar {
    pub fn new(
        source: &Path,
        frame_count: usize,
        grid: (usize, usize),
        params: &PipelineParams,
        thresholds: ThresholdSet,
        calibration: Option<&Calibration>,
    ) -> Self {
        Self {
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            created_at: chrono::Utc::now().to_rfc3339(),
            source: source.display().to_string(),
            frame_count,
            grid_width: grid.0,
            grid_height: grid.1,
            downsample_factor: params.downsample_factor,
            thresholds,
            calibration: calibration.map(|c| c.stats),
        }
    }
}

/// `render.jpg` -> `render.json`
pub fn sidecar_path(output: &Path) -> PathBuf {
    output.with_extension("json")
}

pub fn write_render_sidecar(path: &Path, sidecar: &RenderSidecar) -> Result<()> {
    let json = serde_json::to_string_pretty(sidecar)?;
    std::fs::write(path, json)?;
    info!("Wrote render sidecar {:?}", path);
    Ok(())
}
