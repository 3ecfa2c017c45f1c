#![doc = r#"
LIDARTERRAIN — real-time false-color terrain rendering of LiDAR depth maps.

This crate turns dense per-pixel depth maps (meters, row-major `f32`, streamed at
sensor frame rate) into downsampled RGBA "terrain" images. Depth is partitioned into
four bands (water, grass, mountain, snow) by three adjustable thresholds that are
auto-calibrated from an initial observation window. It powers the `lidarterrain` CLI
and can be embedded behind any sensor session and display.

Stability
---------
The public library API is experimental in initial releases and may evolve.

Add dependency
--------------
```toml
[dependencies]
lidarterrain = "0.1"
```

Live pipeline
-------------
Feed frames as they arrive; results come back through a [`TerrainSink`].

```rust,no_run
use std::sync::Arc;
use lidarterrain::{ChannelSink, PipelineParams, TerrainEvent, TerrainPipeline, ThresholdKind};

fn main() -> lidarterrain::Result<()> {
    let (sink, events) = ChannelSink::new();
    let mut pipeline = TerrainPipeline::new(PipelineParams::default(), Arc::new(sink))?;
    pipeline.reset_calibration();

    let frame = vec![1.5_f32; 256 * 192];
    pipeline.on_frame(&frame, 256, 192);

    // Later, from a control:
    pipeline.set_threshold(ThresholdKind::Ground, 1.2);

    for event in events.try_iter() {
        if let TerrainEvent::ImageReady(image) = event {
            println!("{}x{} image", image.width, image.height);
        }
    }
    Ok(())
}
```

Render a recorded frame
-----------------------
```rust,no_run
use std::path::Path;
use lidarterrain::{PipelineParams, ThresholdOverrides, process_depth_file_to_path};

fn main() -> lidarterrain::Result<()> {
    let thresholds = process_depth_file_to_path(
        Path::new("/data/frame_0001.tiff"),
        Path::new("/out/frame_0001.jpg"),
        None,
        &ThresholdOverrides::default(),
        &PipelineParams::default(),
    )?;
    println!("rendered with {:?}", thresholds);
    Ok(())
}
```

Low-level building blocks
-------------------------
```rust
use lidarterrain::{ThresholdSet, colorize, downsample};

let depth = vec![6.0_f32, 4.0, 1.0, -1.0];
let grid = downsample(&depth, 2, 2, 1);
let image = colorize(&grid, &ThresholdSet::new(5.0, 2.0, 3.0));
assert_eq!(image.pixel(0, 0), Some([0, 0, 255, 255]));
assert_eq!(image.pixel(1, 1), Some([255, 255, 255, 255]));
```

Error handling
--------------
The frame pipeline never fails on odd input: empty calibration windows, frames smaller
than one stride, non-finite depths and zero-width bands all produce valid (if
degenerate) output. File, preset and argument problems are reported as
`lidarterrain::Error` through `lidarterrain::Result<T>`.

Useful modules
--------------
- [`api`] — high-level, file-oriented entry points.
- [`core`] — calibration, downsampling, colormap, thresholds, debouncing, pipeline.
- [`io`] — depth frame readers and JPEG/TIFF/JSON writers.
- [`types`] — `ThresholdKind`, `Band` and label formatting.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::frame::{ColorImage, DepthFrame};
pub use core::params::{PipelineParams, SequenceOptions, ThresholdOverrides};
pub use error::{Error, Result};
pub use types::{Band, ThresholdKind, format_label};

// Processing
pub use core::processing::calibration::{
    Calibration, ControlRange, ControlRanges, DepthSampleCollector, DepthStats, calibrate,
    depth_stats,
};
pub use core::processing::colormap::{classify, colorize, terrain_color};
pub use core::processing::debounce::{DebounceHandle, DebounceScheduler};
pub use core::processing::downsample::{DepthGrid, downsample};
pub use core::processing::pipeline::{ChannelSink, TerrainEvent, TerrainPipeline, TerrainSink};
pub use core::processing::thresholds::{ThresholdSet, ThresholdStore};

// High-level API re-exports
pub use api::{
    BatchReport, calibrate_frames, process_depth_file_to_path, process_sequence_to_dir,
    render_depth_frame, resolve_thresholds,
};
