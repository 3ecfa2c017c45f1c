//! Per-frame orchestration: calibration window, downsample + colorize on every frame,
//! and debounced recoloring after threshold edits.
//!
//! The pipeline talks to its collaborators (display, controls) only through
//! [`TerrainSink`]. Images are handed over by value and never referenced again.
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::core::frame::{ColorImage, DepthFrame};
use crate::core::params::PipelineParams;
use crate::core::processing::calibration::{Calibration, DepthSampleCollector, calibrate};
use crate::core::processing::colormap::colorize;
use crate::core::processing::debounce::DebounceScheduler;
use crate::core::processing::downsample::downsample;
use crate::core::processing::thresholds::{ThresholdSet, ThresholdStore};
use crate::error::Result;
use crate::types::{ThresholdKind, format_label};

/// Receiver of everything the pipeline produces. Called from the frame thread and from
/// the debounce worker, so implementations must be thread-safe and must not block.
pub trait TerrainSink: Send + Sync {
    /// Fired once per successful calibration window.
    fn on_calibrated(&self, calibration: &Calibration);

    /// Fired after every colorization pass.
    fn on_image_ready(&self, image: ColorImage);

    /// Immediate control feedback, formatted as `"<Label>: %.2fm"`.
    fn on_label_update(&self, kind: ThresholdKind, text: String);
}

#[derive(Debug, Clone)]
pub enum TerrainEvent {
    Calibrated(Calibration),
    ImageReady(ColorImage),
    LabelUpdate(ThresholdKind, String),
}

/// Forwards every pipeline output into an `mpsc` channel.
pub struct ChannelSink {
    tx: Sender<TerrainEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<TerrainEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl TerrainSink for ChannelSink {
    fn on_calibrated(&self, calibration: &Calibration) {
        let _ = self.tx.send(TerrainEvent::Calibrated(calibration.clone()));
    }

    fn on_image_ready(&self, image: ColorImage) {
        let _ = self.tx.send(TerrainEvent::ImageReady(image));
    }

    fn on_label_update(&self, kind: ThresholdKind, text: String) {
        let _ = self.tx.send(TerrainEvent::LabelUpdate(kind, text));
    }
}

/// State reachable from both the frame thread and the debounce worker.
struct Shared {
    thresholds: ThresholdStore,
    current: Mutex<Option<Arc<DepthFrame>>>,
    sink: Arc<dyn TerrainSink>,
    factor: usize,
}

impl Shared {
    fn current_frame(&self) -> Option<Arc<DepthFrame>> {
        match self.current.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish_frame(&self, frame: Arc<DepthFrame>) {
        match self.current.lock() {
            Ok(mut guard) => *guard = Some(frame),
            Err(poisoned) => *poisoned.into_inner() = Some(frame),
        }
    }

    fn render(&self, frame: &DepthFrame) {
        let grid = downsample(&frame.data, frame.width, frame.height, self.factor);
        let image = colorize(&grid, &self.thresholds.snapshot());
        self.sink.on_image_ready(image);
    }

    /// Recolors whatever frame is current, with whatever thresholds are current.
    fn recolor(&self) {
        match self.current_frame() {
            Some(frame) => {
                trace!("Debounced recolor of {}x{} frame", frame.width, frame.height);
                self.render(&frame);
            }
            None => trace!("Debounced recolor skipped: no frame yet"),
        }
    }
}

/// Depth-to-terrain pipeline for one sensor session.
///
/// The calibration window is only checked when a frame arrives or on
/// [`poll_calibration`](Self::poll_calibration); if frames may stop before the window
/// elapses, call `poll_calibration` periodically to finish it.
pub struct TerrainPipeline {
    params: PipelineParams,
    collector: DepthSampleCollector,
    shared: Arc<Shared>,
    scheduler: DebounceScheduler,
}

impl TerrainPipeline {
    /// Builds the pipeline and starts its debounce worker. Thresholds start at zero and
    /// no calibration window is open until [`reset_calibration`](Self::reset_calibration).
    pub fn new(params: PipelineParams, sink: Arc<dyn TerrainSink>) -> Result<Self> {
        Self::with_thresholds(params, sink, ThresholdSet::default())
    }

    pub fn with_thresholds(
        params: PipelineParams,
        sink: Arc<dyn TerrainSink>,
        initial: ThresholdSet,
    ) -> Result<Self> {
        params.validate()?;

        let shared = Arc::new(Shared {
            thresholds: ThresholdStore::new(initial),
            current: Mutex::new(None),
            sink,
            factor: params.downsample_factor,
        });

        let worker_shared = Arc::clone(&shared);
        let scheduler = DebounceScheduler::spawn(params.debounce_interval, move || {
            worker_shared.recolor();
        })?;
        shared.thresholds.attach(scheduler.handle());

        let collector =
            DepthSampleCollector::new(params.downsample_factor, params.calibration_window);

        info!(
            "Terrain pipeline ready (factor {}, window {:?}, debounce {:?})",
            params.downsample_factor, params.calibration_window, params.debounce_interval
        );

        Ok(Self {
            params,
            collector,
            shared,
            scheduler,
        })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Discards collected samples and opens a new calibration window.
    pub fn reset_calibration(&mut self) {
        self.reset_calibration_at(Instant::now());
    }

    pub fn reset_calibration_at(&mut self, now: Instant) {
        self.collector.reset(now);
    }

    pub fn is_calibrating(&self) -> bool {
        self.collector.is_active()
    }

    /// Handles one sensor frame: finalizes an expired calibration window, colorizes the
    /// frame with the current thresholds, then feeds the open window, if any.
    pub fn on_frame(&mut self, buffer: &[f32], width: usize, height: usize) {
        self.on_frame_at(buffer, width, height, Instant::now());
    }

    /// Like [`on_frame`](Self::on_frame), with an explicit clock reading.
    pub fn on_frame_at(&mut self, buffer: &[f32], width: usize, height: usize, now: Instant) {
        self.poll_calibration_at(now);

        let frame = Arc::new(DepthFrame {
            width,
            height,
            data: buffer.to_vec(),
        });
        self.shared.publish_frame(Arc::clone(&frame));
        self.shared.render(&frame);

        if self.collector.is_active() {
            let added = self.collector.ingest(buffer, width, height);
            trace!(
                "Collected {} calibration samples ({} total)",
                added,
                self.collector.len()
            );
        }
    }

    /// Finalizes the calibration window if it has elapsed. Useful when frames stop
    /// arriving before the window closes.
    pub fn poll_calibration(&mut self) -> Option<Calibration> {
        self.poll_calibration_at(Instant::now())
    }

    pub fn poll_calibration_at(&mut self, now: Instant) -> Option<Calibration> {
        if !self.collector.is_expired(now) {
            return None;
        }
        self.finish_calibration()
    }

    fn finish_calibration(&mut self) -> Option<Calibration> {
        let samples = self.collector.finish();
        let Some(calibration) = calibrate(&samples, &self.params) else {
            warn!("Calibration window closed with no samples; keeping current thresholds");
            return None;
        };
        if !calibration.is_usable() {
            warn!(
                "Calibration produced non-finite thresholds {:?} (min={}, max={}); keeping current thresholds",
                calibration.thresholds, calibration.stats.min, calibration.stats.max
            );
            return None;
        }

        self.shared.thresholds.replace(calibration.thresholds);
        self.shared.sink.on_calibrated(&calibration);
        for kind in ThresholdKind::ALL {
            self.shared
                .sink
                .on_label_update(kind, format_label(kind, calibration.thresholds.get(kind)));
        }
        debug!("Installed calibrated thresholds {:?}", calibration.thresholds);
        Some(calibration)
    }

    /// Applies an external control change. The label is updated immediately; the
    /// recolor is debounced. Returns the stored value, or `None` if it was rejected.
    pub fn set_threshold(&self, kind: ThresholdKind, value: f32) -> Option<f32> {
        let stored = self.shared.thresholds.set(kind, value)?;
        self.shared
            .sink
            .on_label_update(kind, format_label(kind, stored));
        Some(stored)
    }

    pub fn thresholds(&self) -> ThresholdSet {
        self.shared.thresholds.snapshot()
    }

    /// Forces a recolor of the current frame after the quiet interval.
    pub fn request_recolor(&self) {
        self.scheduler.notify();
    }

    pub fn current_frame(&self) -> Option<Arc<DepthFrame>> {
        self.shared.current_frame()
    }
}
