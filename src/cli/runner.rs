use tracing::info;
use tracing_subscriber::EnvFilter;

use lidarterrain::{
    PipelineParams, SequenceOptions, ThresholdOverrides, process_depth_file_to_path,
    process_sequence_to_dir,
};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_params(args: &CliArgs) -> Result<PipelineParams, AppError> {
    let mut params = match &args.config {
        Some(path) => PipelineParams::load(path)?,
        None => PipelineParams::default(),
    };
    if let Some(factor) = args.factor {
        if factor == 0 {
            return Err(AppError::ZeroFactor { factor });
        }
        params.downsample_factor = factor;
    }
    if args.ignore_invalid {
        params.ignore_non_finite_samples = true;
    }
    Ok(params)
}

fn frame_dims(args: &CliArgs) -> Result<Option<(usize, usize)>, AppError> {
    match (args.width, args.height) {
        (Some(w), Some(h)) => Ok(Some((w, h))),
        (None, None) => Ok(None),
        _ => Err(AppError::IncompleteDimensions),
    }
}

fn overrides(args: &CliArgs) -> ThresholdOverrides {
    ThresholdOverrides {
        ground: args.ground,
        above: args.above,
        below: args.below,
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        init_logging();
    }

    let params = load_params(&args)?;
    let dims = frame_dims(&args)?;
    let overrides = overrides(&args);

    if let Some(input_dir) = &args.input_dir {
        let output_dir = args.output_dir.as_ref().ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;
        if !(args.fps.is_finite() && args.fps > 0.0) {
            return Err(AppError::InvalidFrameRate { fps: args.fps }.into());
        }

        info!("Rendering sequence {:?} -> {:?}", input_dir, output_dir);
        let options = SequenceOptions {
            dims,
            frame_rate: args.fps,
            overrides,
            continue_on_error: args.batch,
        };
        let report = process_sequence_to_dir(input_dir, output_dir, &options, &params)?;

        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.as_ref().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.as_ref().ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;

        let thresholds = process_depth_file_to_path(input, output, dims, &overrides, &params)?;
        info!(
            "Successfully rendered: {:?} -> {:?} (ground={:.2}m above={:.2}m below={:.2}m)",
            input, output, thresholds.ground_level, thresholds.range_above, thresholds.range_below
        );
    }

    Ok(())
}
