//! High-level, ergonomic library API: render single frames, calibrate on recorded
//! frames, and batch-render a directory of frames to JPEG. Prefer these entry points
//! over the low-level processing modules when working with files; use
//! [`TerrainPipeline`](crate::TerrainPipeline) for live sensor streams.
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::core::frame::{ColorImage, DepthFrame};
use crate::core::params::{PipelineParams, SequenceOptions, ThresholdOverrides};
use crate::core::processing::calibration::{Calibration, DepthSampleCollector, calibrate};
use crate::core::processing::colormap::colorize;
use crate::core::processing::downsample::downsample;
use crate::core::processing::thresholds::ThresholdSet;
use crate::error::{Error, Result};
use crate::io::depth::{list_depth_frames, read_depth_frame};
use crate::io::writers::jpeg::write_rgba_jpeg;
use crate::io::writers::metadata::{RenderSidecar, sidecar_path, write_render_sidecar};

pub const JPEG_QUALITY: u8 = 95;

/// One downsample + colorize pass over a frame.
pub fn render_depth_frame(
    frame: &DepthFrame,
    thresholds: &ThresholdSet,
    params: &PipelineParams,
) -> ColorImage {
    let grid = downsample(&frame.data, frame.width, frame.height, params.downsample_factor);
    colorize(&grid, thresholds)
}

/// Runs every frame through a sample collector, then calibrates on the result.
/// Returns `None` when no samples were collected.
pub fn calibrate_frames<'a, I>(frames: I, params: &PipelineParams) -> Option<Calibration>
where
    I: IntoIterator<Item = &'a DepthFrame>,
{
    let mut collector =
        DepthSampleCollector::new(params.downsample_factor, params.calibration_window);
    collector.reset(Instant::now());
    for frame in frames {
        collector.ingest(&frame.data, frame.width, frame.height);
    }
    calibrate(&collector.finish(), params)
}

/// Picks the thresholds to render with: calibrated values (when usable) with overrides
/// applied on top. Fails on non-finite overrides, and when neither source provides a
/// complete, finite set.
pub fn resolve_thresholds(
    calibration: Option<&Calibration>,
    overrides: &ThresholdOverrides,
) -> Result<ThresholdSet> {
    overrides.validate()?;
    if overrides.is_complete() {
        return Ok(overrides.apply(ThresholdSet::default()));
    }
    match calibration {
        Some(cal) if cal.is_usable() => Ok(overrides.apply(cal.thresholds)),
        Some(cal) => Err(Error::Processing(format!(
            "calibration produced non-finite thresholds (min={}, max={}); pass explicit thresholds",
            cal.stats.min, cal.stats.max
        ))),
        None => Err(Error::Processing(
            "no depth samples to calibrate on; pass explicit thresholds".to_string(),
        )),
    }
}

/// Renders one depth file to a JPEG plus JSON sidecar. Calibrates on the frame itself
/// unless every threshold is overridden. Returns the thresholds used.
pub fn process_depth_file_to_path(
    input: &Path,
    output: &Path,
    dims: Option<(usize, usize)>,
    overrides: &ThresholdOverrides,
    params: &PipelineParams,
) -> Result<ThresholdSet> {
    params.validate()?;
    let frame = read_depth_frame(input, dims)?;

    let calibration = if overrides.is_complete() {
        None
    } else {
        calibrate_frames([&frame], params)
    };
    let thresholds = resolve_thresholds(calibration.as_ref(), overrides)?;

    let image = render_depth_frame(&frame, &thresholds, params);
    write_rgba_jpeg(output, &image, JPEG_QUALITY)?;

    let sidecar = RenderSidecar::new(
        input,
        1,
        (image.width, image.height),
        params,
        thresholds,
        calibration.as_ref(),
    );
    write_render_sidecar(&sidecar_path(output), &sidecar)?;

    info!("Rendered {:?} -> {:?} with {:?}", input, output, thresholds);
    Ok(thresholds)
}

/// Outcome of a directory run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Renders every depth frame in `input_dir` to `output_dir/<stem>.jpg`.
///
/// Thresholds are calibrated once on the frames that fall inside the calibration window
/// at `options.frame_rate`, then shared by the whole sequence. A `sequence.json` sidecar
/// records the result. With `continue_on_error`, unreadable frames are counted in the
/// report instead of aborting the run.
pub fn process_sequence_to_dir(
    input_dir: &Path,
    output_dir: &Path,
    options: &SequenceOptions,
    params: &PipelineParams,
) -> Result<BatchReport> {
    params.validate()?;
    fs::create_dir_all(output_dir)?;

    let paths = list_depth_frames(input_dir)?;
    let mut report = BatchReport::default();
    if paths.is_empty() {
        warn!("No depth frames found in {:?}", input_dir);
        return Ok(report);
    }

    let calibration = if options.overrides.is_complete() {
        None
    } else {
        let window = options.calibration_frames(params.calibration_window);
        let mut frames = Vec::with_capacity(window.min(paths.len()));
        for path in paths.iter().take(window) {
            match read_depth_frame(path, options.dims) {
                Ok(frame) => frames.push(frame),
                Err(e) if options.continue_on_error => {
                    warn!("Skipping unreadable calibration frame {:?}: {}", path, e)
                }
                Err(e) => return Err(e),
            }
        }
        info!("Calibrating on {} of {} frames", frames.len(), paths.len());
        calibrate_frames(&frames, params)
    };
    let thresholds = resolve_thresholds(calibration.as_ref(), &options.overrides)?;

    let mut grid = (0, 0);
    for path in &paths {
        let Some(stem) = path.file_stem() else {
            report.skipped += 1;
            continue;
        };
        let output = output_dir.join(format!("{}.jpg", stem.to_string_lossy()));

        let rendered = read_depth_frame(path, options.dims).and_then(|frame| {
            let image = render_depth_frame(&frame, &thresholds, params);
            write_rgba_jpeg(&output, &image, JPEG_QUALITY)?;
            Ok((image.width, image.height))
        });

        match rendered {
            Ok(size) => {
                grid = size;
                report.processed += 1;
            }
            Err(e) if options.continue_on_error => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let sidecar = RenderSidecar::new(
        input_dir,
        report.processed,
        grid,
        params,
        thresholds,
        calibration.as_ref(),
    );
    write_render_sidecar(&output_dir.join("sequence.json"), &sidecar)?;

    info!(
        "Sequence complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
