use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::processing::debounce::DebounceHandle;
use crate::types::ThresholdKind;

/// The three scalars that partition depth into terrain bands.
///
/// Invariant: every field is finite and both ranges are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Depth separating "ground and below" from "above ground"
    pub ground_level: f32,
    /// Extent of the mountain band
    pub range_above: f32,
    /// Extent of the grass band
    pub range_below: f32,
}

impl ThresholdSet {
    pub fn new(ground_level: f32, range_above: f32, range_below: f32) -> Self {
        Self {
            ground_level,
            range_above,
            range_below,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.ground_level.is_finite() && self.range_above.is_finite() && self.range_below.is_finite()
    }

    pub fn get(&self, kind: ThresholdKind) -> f32 {
        match kind {
            ThresholdKind::Ground => self.ground_level,
            ThresholdKind::Above => self.range_above,
            ThresholdKind::Below => self.range_below,
        }
    }

    /// Lower edge of the grass band.
    #[inline]
    pub fn grass_floor(&self) -> f32 {
        self.ground_level - self.range_below
    }

    /// Lower edge of the mountain band; anything at or below is snow.
    #[inline]
    pub fn mountain_floor(&self) -> f32 {
        self.ground_level - self.range_below - self.range_above
    }
}

/// Shared, mutable home of the current thresholds.
///
/// Each field is stored in its own atomic, so the frame thread and the recolor thread
/// never block on each other. A reader may see a mix of old and new fields while a
/// caller is updating them one at a time.
pub struct ThresholdStore {
    ground: AtomicU32,
    above: AtomicU32,
    below: AtomicU32,
    notifier: OnceLock<DebounceHandle>,
}

impl ThresholdStore {
    pub fn new(initial: ThresholdSet) -> Self {
        Self {
            ground: AtomicU32::new(initial.ground_level.to_bits()),
            above: AtomicU32::new(initial.range_above.to_bits()),
            below: AtomicU32::new(initial.range_below.to_bits()),
            notifier: OnceLock::new(),
        }
    }

    /// Routes every subsequent change to `handle`. Only the first call takes effect.
    pub fn attach(&self, handle: DebounceHandle) -> bool {
        self.notifier.set(handle).is_ok()
    }

    pub fn snapshot(&self) -> ThresholdSet {
        ThresholdSet {
            ground_level: f32::from_bits(self.ground.load(Ordering::Relaxed)),
            range_above: f32::from_bits(self.above.load(Ordering::Relaxed)),
            range_below: f32::from_bits(self.below.load(Ordering::Relaxed)),
        }
    }

    pub fn get(&self, kind: ThresholdKind) -> f32 {
        f32::from_bits(self.slot(kind).load(Ordering::Relaxed))
    }

    pub fn set_ground(&self, value: f32) -> Option<f32> {
        self.set(ThresholdKind::Ground, value)
    }

    pub fn set_above(&self, value: f32) -> Option<f32> {
        self.set(ThresholdKind::Above, value)
    }

    pub fn set_below(&self, value: f32) -> Option<f32> {
        self.set(ThresholdKind::Below, value)
    }

    /// Overwrites one field and notifies the scheduler.
    ///
    /// Returns the stored value, or `None` when `value` is not finite and was ignored.
    /// Negative band widths are stored as zero. No cross-field checks are made.
    pub fn set(&self, kind: ThresholdKind, value: f32) -> Option<f32> {
        if !value.is_finite() {
            warn!("Ignoring non-finite {} threshold: {}", kind, value);
            return None;
        }
        let stored = match kind {
            ThresholdKind::Ground => value,
            ThresholdKind::Above | ThresholdKind::Below => value.max(0.0),
        };
        self.slot(kind).store(stored.to_bits(), Ordering::Relaxed);
        debug!("{} threshold set to {}", kind, stored);
        self.notify();
        Some(stored)
    }

    /// Installs a whole set at once, as calibration does, with a single notification.
    pub fn replace(&self, set: ThresholdSet) {
        self.ground.store(set.ground_level.to_bits(), Ordering::Relaxed);
        self.above.store(set.range_above.to_bits(), Ordering::Relaxed);
        self.below.store(set.range_below.to_bits(), Ordering::Relaxed);
        self.notify();
    }

    fn slot(&self, kind: ThresholdKind) -> &AtomicU32 {
        match kind {
            ThresholdKind::Ground => &self.ground,
            ThresholdKind::Above => &self.above,
            ThresholdKind::Below => &self.below,
        }
    }

    fn notify(&self) {
        if let Some(handle) = self.notifier.get() {
            handle.notify();
        }
    }
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::new(ThresholdSet::default())
    }
}

impl std::fmt::Debug for ThresholdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdStore")
            .field("current", &self.snapshot())
            .field("attached", &self.notifier.get().is_some())
            .finish()
    }
}
