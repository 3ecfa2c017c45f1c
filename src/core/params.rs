use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::processing::thresholds::ThresholdSet;
use crate::error::{Error, Result};

/// Pipeline constants suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Stride applied to both frame dimensions
    pub downsample_factor: usize,
    /// Observation window used for auto-calibration, in seconds
    #[serde(with = "duration_secs")]
    pub calibration_window: Duration,
    /// Quiet period before a threshold change triggers a recolor, in seconds
    #[serde(with = "duration_secs")]
    pub debounce_interval: Duration,
    pub mountain_fraction: f32,
    pub grass_fraction: f32,
    /// Only widens the upper bound of the above-ground control
    pub peak_fraction: f32,
    /// Drop NaN/inf samples before calibrating
    pub ignore_non_finite_samples: bool,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            downsample_factor: 4,
            calibration_window: Duration::from_secs(2),
            debounce_interval: Duration::from_millis(200),
            mountain_fraction: 0.2,
            grass_fraction: 0.6,
            peak_fraction: 0.05,
            ignore_non_finite_samples: false,
        }
    }
}

impl PipelineParams {
    pub fn validate(&self) -> Result<()> {
        if self.downsample_factor == 0 {
            return Err(Error::invalid("downsample_factor", self.downsample_factor));
        }
        for (arg, value) in [
            ("mountain_fraction", self.mountain_fraction),
            ("grass_fraction", self.grass_fraction),
            ("peak_fraction", self.peak_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid(arg, value));
            }
        }
        Ok(())
    }

    /// Load a JSON preset and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let params: PipelineParams = serde_json::from_str(&json)?;
        params.validate()?;
        info!("Loaded pipeline preset from {:?}", path);
        debug!("Pipeline params: {:?}", params);
        Ok(params)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Saved pipeline preset to {:?}", path);
        Ok(())
    }
}

/// Per-field threshold overrides applied on top of a calibrated set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverrides {
    pub ground: Option<f32>,
    pub above: Option<f32>,
    pub below: Option<f32>,
}

impl ThresholdOverrides {
    pub fn is_empty(&self) -> bool {
        self.ground.is_none() && self.above.is_none() && self.below.is_none()
    }

    /// Returns true when every field is overridden, so no calibration is needed.
    pub fn is_complete(&self) -> bool {
        self.ground.is_some() && self.above.is_some() && self.below.is_some()
    }

    /// Rejects NaN and infinite overrides.
    pub fn validate(&self) -> Result<()> {
        for (arg, value) in [
            ("ground", self.ground),
            ("above", self.above),
            ("below", self.below),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(Error::invalid(arg, v));
            }
        }
        Ok(())
    }

    pub fn apply(&self, base: ThresholdSet) -> ThresholdSet {
        ThresholdSet {
            ground_level: self.ground.unwrap_or(base.ground_level),
            range_above: self.above.map_or(base.range_above, |v| v.max(0.0)),
            range_below: self.below.map_or(base.range_below, |v| v.max(0.0)),
        }
    }
}

/// Options for rendering a directory of recorded frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceOptions {
    /// Dimensions for raw `f32` frames; TIFF frames carry their own
    pub dims: Option<(usize, usize)>,
    /// Nominal recording rate used to size the calibration window in frames
    pub frame_rate: f64,
    pub overrides: ThresholdOverrides,
    /// Keep going when a frame fails to load or render
    pub continue_on_error: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            dims: None,
            frame_rate: 30.0,
            overrides: ThresholdOverrides::default(),
            continue_on_error: false,
        }
    }
}

impl SequenceOptions {
    /// Number of leading frames that fall inside the calibration window (at least one).
    pub fn calibration_frames(&self, window: Duration) -> usize {
        let frames = (window.as_secs_f64() * self.frame_rate).ceil();
        if frames.is_finite() && frames >= 1.0 {
            frames as usize
        } else {
            1
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| de::Error::custom(format!("invalid duration {secs}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sensor_constants() {
        let params = PipelineParams::default();
        assert_eq!(params.downsample_factor, 4);
        assert_eq!(params.calibration_window, Duration::from_secs(2));
        assert_eq!(params.debounce_interval, Duration::from_millis(200));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(PipelineParams::default()).unwrap();
        assert_eq!(json["calibration_window"], 2.0);
        assert!((json["debounce_interval"].as_f64().unwrap() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn partial_preset_falls_back_to_defaults() {
        let params: PipelineParams =
            serde_json::from_str(r#"{ "downsample_factor": 2, "debounce_interval": 0.5 }"#)
                .unwrap();
        assert_eq!(params.downsample_factor, 2);
        assert_eq!(params.debounce_interval, Duration::from_millis(500));
        assert_eq!(params.calibration_window, Duration::from_secs(2));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let parsed: std::result::Result<PipelineParams, _> =
            serde_json::from_str(r#"{ "calibration_window": -1.0 }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_rejects_zero_factor_and_bad_fractions() {
        let zero = PipelineParams {
            downsample_factor: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(Error::InvalidArgument {
                arg: "downsample_factor",
                ..
            })
        ));

        let bad = PipelineParams {
            grass_fraction: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(Error::InvalidArgument {
                arg: "grass_fraction",
                ..
            })
        ));

        let nan = PipelineParams {
            peak_fraction: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let base = ThresholdSet::new(4.0, 1.0, 2.0);
        let overrides = ThresholdOverrides {
            ground: Some(3.0),
            above: None,
            below: Some(-1.0),
        };
        let applied = overrides.apply(base);
        assert_eq!(applied, ThresholdSet::new(3.0, 1.0, 0.0));
        assert!(!overrides.is_empty());
        assert!(!overrides.is_complete());
    }

    #[test]
    fn calibration_frames_cover_window() {
        let options = SequenceOptions::default();
        assert_eq!(options.calibration_frames(Duration::from_secs(2)), 60);
        assert_eq!(options.calibration_frames(Duration::ZERO), 1);
    }
}
