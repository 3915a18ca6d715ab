use serde::{Deserialize, Serialize};

use crate::error::{MsdfError, Result};

/// Which texels the corrector may touch.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrectionMode {
    /// No correction at all.
    Disabled,
    /// Correct every detected artifact.
    Indiscriminate,
    /// Correct artifacts, but protect corners and texels carrying edges.
    #[default]
    EdgePriority,
    /// Only correct artifacts at edges.
    EdgeOnly,
}

/// When candidates are verified against the exact shape distance.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceCheckMode {
    /// Trust the bitmap-only detection.
    DoNotCheck,
    /// Verify only candidates on protected (edge) texels.
    #[default]
    CheckAtEdge,
    /// Verify every candidate.
    AlwaysCheck,
}

/// Error correction settings.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCorrectionConfig {
    pub mode: ErrorCorrectionMode,
    pub distance_check_mode: DistanceCheckMode,
    /// Minimum deviation of an interpolated median from its expected range, relative to
    /// the distance covered by one texel, for it to count as an artifact.
    pub min_deviation_ratio: f64,
    /// Minimum improvement of the exact distance error for a verified correction.
    pub min_improve_ratio: f64,
}

impl ErrorCorrectionConfig {
    pub const DEFAULT_MIN_DEVIATION_RATIO: f64 = 1.111_111_111_111_111_1;
    pub const DEFAULT_MIN_IMPROVE_RATIO: f64 = 1.111_111_111_111_111_1;

    /// Configuration that turns correction off.
    pub fn disabled() -> Self {
        Self {
            mode: ErrorCorrectionMode::Disabled,
            distance_check_mode: DistanceCheckMode::DoNotCheck,
            ..Self::default()
        }
    }

    /// Rejects ratios that are not positive finite numbers and mode combinations where
    /// the check mode would have no effect.
    pub fn validate(&self) -> Result<()> {
        for (name, ratio) in [
            ("min_deviation_ratio", self.min_deviation_ratio),
            ("min_improve_ratio", self.min_improve_ratio),
        ] {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(MsdfError::config(format!(
                    "{name} must be positive and finite, got {ratio}"
                )));
            }
        }
        match (self.mode, self.distance_check_mode) {
            (ErrorCorrectionMode::Disabled, DistanceCheckMode::DoNotCheck) => Ok(()),
            (ErrorCorrectionMode::Disabled, check) => Err(MsdfError::config(format!(
                "distance check mode {check:?} requires error correction to be enabled"
            ))),
            (ErrorCorrectionMode::EdgeOnly, DistanceCheckMode::CheckAtEdge) => {
                Err(MsdfError::config(
                    "EdgeOnly already restricts correction to edges; use AlwaysCheck or DoNotCheck",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Default for ErrorCorrectionConfig {
    fn default() -> Self {
        Self {
            mode: ErrorCorrectionMode::EdgePriority,
            distance_check_mode: DistanceCheckMode::CheckAtEdge,
            min_deviation_ratio: Self::DEFAULT_MIN_DEVIATION_RATIO,
            min_improve_ratio: Self::DEFAULT_MIN_IMPROVE_RATIO,
        }
    }
}
