//! Shared types and enums used across the crate.
//! Includes `ThresholdKind` (the three adjustable controls), `Band` (the four
//! terrain classes) and label formatting for control feedback.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One of the three adjustable thresholds.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize,
)]
pub enum ThresholdKind {
    Ground,
    Above,
    Below,
}

impl ThresholdKind {
    pub const ALL: [ThresholdKind; 3] = [
        ThresholdKind::Ground,
        ThresholdKind::Above,
        ThresholdKind::Below,
    ];

    /// Human-readable label shown next to the control.
    pub fn label(self) -> &'static str {
        match self {
            ThresholdKind::Ground => "Ground Distance",
            ThresholdKind::Above => "Mountain Height",
            ThresholdKind::Below => "Water Depth",
        }
    }
}

impl std::fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdKind::Ground => write!(f, "Ground"),
            ThresholdKind::Above => write!(f, "Above"),
            ThresholdKind::Below => write!(f, "Below"),
        }
    }
}

/// Formats control feedback as `"<Label>: %.2fm"`.
pub fn format_label(kind: ThresholdKind, value: f32) -> String {
    format!("{}: {:.2}m", kind.label(), value)
}

/// Terrain class assigned to a depth value, in classification priority order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Band {
    Water,
    Grass,
    Mountain,
    Snow,
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::Water => write!(f, "Water"),
            Band::Grass => write!(f, "Grass"),
            Band::Mountain => write!(f, "Mountain"),
            Band::Snow => write!(f, "Snow"),
        }
    }
}
