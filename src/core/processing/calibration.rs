//! Auto-calibration: collect strided depth samples over a fixed observation window,
//! then derive the initial thresholds and control ranges from their distribution.
//!
//! Ordering of non-finite samples follows IEEE-754 `totalOrder` (`f32::total_cmp`):
//! `-NaN < -inf < finite < +inf < +NaN`. A window that contains a (positive) NaN or
//! `+inf` therefore yields a non-finite maximum, and the derived thresholds are
//! non-finite too. Callers decide whether to install such a result; see
//! [`Calibration::is_usable`].
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::params::PipelineParams;
use crate::core::processing::thresholds::ThresholdSet;
use crate::types::ThresholdKind;

/// Accumulates every Nth row and column of incoming frames during the calibration window.
#[derive(Debug)]
pub struct DepthSampleCollector {
    samples: Vec<f32>,
    factor: usize,
    window: Duration,
    started_at: Option<Instant>,
}

impl DepthSampleCollector {
    /// Creates an idle collector; nothing is gathered until [`reset`](Self::reset).
    pub fn new(factor: usize, window: Duration) -> Self {
        Self {
            samples: Vec::new(),
            factor: factor.max(1),
            window,
            started_at: None,
        }
    }

    /// Clears all samples and (re)starts the window at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.samples.clear();
        self.started_at = Some(now);
        debug!("Calibration window started ({:?})", self.window);
    }

    /// True between `reset` and `finish`.
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.started_at
            .is_some_and(|start| now.saturating_duration_since(start) >= self.window)
    }

    /// Appends the strided samples of one frame. Invalid values are kept.
    /// Returns the number of samples appended; zero while idle.
    pub fn ingest(&mut self, buffer: &[f32], width: usize, height: usize) -> usize {
        if !self.is_active() || width == 0 {
            return 0;
        }
        let before = self.samples.len();
        for y in (0..height).step_by(self.factor) {
            let row = y * width;
            for x in (0..width).step_by(self.factor) {
                match buffer.get(row + x) {
                    Some(&v) => self.samples.push(v),
                    None => break,
                }
            }
        }
        self.samples.len() - before
    }

    /// Ends the window and hands over the collected samples.
    pub fn finish(&mut self) -> Vec<f32> {
        self.started_at = None;
        std::mem::take(&mut self.samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// Order statistics of a sample window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthStats {
    pub sample_count: usize,
    pub min: f32,
    pub max: f32,
    /// Value at sorted index `count / 2` (lower median for even counts)
    pub median: f32,
}

/// Computes min, max and median under `f32::total_cmp`. Returns `None` for no samples.
pub fn depth_stats(samples: &[f32]) -> Option<DepthStats> {
    let min = samples.iter().copied().min_by(f32::total_cmp)?;
    let max = samples.iter().copied().max_by(f32::total_cmp)?;

    let mut scratch = samples.to_vec();
    let mid = scratch.len() / 2;
    let median = *scratch.select_nth_unstable_by(mid, f32::total_cmp).1;

    Some(DepthStats {
        sample_count: samples.len(),
        min,
        max,
        median,
    })
}

/// Legal range and starting value for one external control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
    pub initial: f32,
}

impl ControlRange {
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRanges {
    pub ground: ControlRange,
    pub above: ControlRange,
    pub below: ControlRange,
}

impl ControlRanges {
    pub fn get(&self, kind: ThresholdKind) -> &ControlRange {
        match kind {
            ThresholdKind::Ground => &self.ground,
            ThresholdKind::Above => &self.above,
            ThresholdKind::Below => &self.below,
        }
    }
}

/// Everything derived from one calibration window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub stats: DepthStats,
    pub mountain_range: f32,
    pub grass_range: f32,
    pub peak_range: f32,
    pub thresholds: ThresholdSet,
    pub controls: ControlRanges,
}

impl Calibration {
    /// True when the derived thresholds are finite and may be installed.
    pub fn is_usable(&self) -> bool {
        self.thresholds.is_finite()
    }
}

/// Derives thresholds and control ranges from `samples`. Returns `None` when there is
/// nothing to calibrate on (after dropping non-finite samples, if configured).
pub fn calibrate(samples: &[f32], params: &PipelineParams) -> Option<Calibration> {
    let stats = if params.ignore_non_finite_samples {
        let finite: Vec<f32> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.len() < samples.len() {
            debug!(
                "Dropped {} non-finite calibration samples",
                samples.len() - finite.len()
            );
        }
        depth_stats(&finite)?
    } else {
        depth_stats(samples)?
    };

    let range = stats.max - stats.min;
    let mountain_range = range * params.mountain_fraction;
    let grass_range = range * params.grass_fraction;
    let peak_range = range * params.peak_fraction;

    let thresholds = ThresholdSet {
        ground_level: stats.max - grass_range,
        range_above: mountain_range,
        range_below: grass_range,
    };

    let controls = ControlRanges {
        ground: ControlRange {
            min: stats.min,
            max: stats.max,
            initial: thresholds.ground_level,
        },
        above: ControlRange {
            min: 0.0,
            max: mountain_range + peak_range,
            initial: mountain_range / 2.0,
        },
        below: ControlRange {
            min: 0.0,
            max: grass_range,
            initial: grass_range / 2.0,
        },
    };

    info!(
        "Calibrated on {} samples: min={:.3} max={:.3} median={:.3}",
        stats.sample_count, stats.min, stats.max, stats.median
    );
    debug!("Derived thresholds: {:?}", thresholds);

    Some(Calibration {
        stats,
        mountain_range,
        grass_range,
        peak_range,
        thresholds,
        controls,
    })
}
