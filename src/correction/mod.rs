//! Multi-channel artifact detection and correction.
//!
//! Bilinear interpolation of independent channels can move the median across 0.5 where
//! no edge exists. The corrector finds texels that cause this and collapses them to
//! their median, optionally confirming each candidate against the exact shape distance.

mod classifier;
mod config;
mod corrector;


use tracing::{debug, warn};

use crate::bitmap::Bitmap;
use crate::distance::{OverlappingContourCombiner, PseudoDistanceSelector, SimpleContourCombiner};
use crate::error::{MsdfError, Result};
use crate::generator::GeneratorConfig;
use crate::geometry::Shape;
use crate::projection::{DistanceMapping, Projection};

pub use config::{DistanceCheckMode, ErrorCorrectionConfig, ErrorCorrectionMode};

use corrector::{ErrorCorrector, StencilFlags};

/// Outcome of a correction pass.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    /// Texels collapsed to their median.
    pub corrected: usize,
    /// Texels that were protected from non-inverting corrections.
    pub protected: usize,
}

/// Corrects an MSDF or MTSDF `bitmap` generated from `shape` with `projection` and
/// `range`, following `config.error_correction`. Alpha channels are left untouched.
pub fn correct_errors(
    bitmap: &mut Bitmap,
    shape: &Shape,
    projection: &Projection,
    range: f64,
    config: &GeneratorConfig,
) -> Result<CorrectionReport> {
    let settings = config.error_correction;
    settings.validate()?;
    projection.validate()?;
    let mapping = DistanceMapping::new(range)?;
    shape.validate()?;

    if settings.mode == ErrorCorrectionMode::Disabled {
        return Ok(CorrectionReport::default());
    }
    if bitmap.channels < 3 {
        warn!(
            "Skipping error correction of a {}-channel bitmap",
            bitmap.channels
        );
        return Ok(CorrectionReport::default());
    }

    let mut corrector = ErrorCorrector::new(
        bitmap.width,
        bitmap.height,
        projection,
        mapping.inv_range(),
        settings.min_deviation_ratio,
        settings.min_improve_ratio,
    );
    match settings.mode {
        ErrorCorrectionMode::EdgePriority => {
            corrector.protect_corners(shape);
            corrector.protect_edges(bitmap);
        }
        ErrorCorrectionMode::EdgeOnly => corrector.protect_all(),
        ErrorCorrectionMode::Indiscriminate | ErrorCorrectionMode::Disabled => {}
    }
    let protected = corrector.count(StencilFlags::PROTECTED);

    let check = settings.distance_check_mode;
    if check == DistanceCheckMode::DoNotCheck
        || (check == DistanceCheckMode::CheckAtEdge
            && settings.mode != ErrorCorrectionMode::EdgeOnly)
    {
        corrector.find_errors(bitmap);
        if check == DistanceCheckMode::CheckAtEdge {
            // Remaining candidates are all at edges and go through the exact check.
            corrector.protect_all();
        }
    }
    if check != DistanceCheckMode::DoNotCheck {
        if config.overlap_support {
            corrector.find_errors_checked::<OverlappingContourCombiner<PseudoDistanceSelector>>(
                bitmap, shape,
            );
        } else {
            corrector
                .find_errors_checked::<SimpleContourCombiner<PseudoDistanceSelector>>(bitmap, shape);
        }
    }

    let corrected = corrector.apply(bitmap);
    debug!(
        "Corrected {} texels ({} protected) in {}x{} bitmap",
        corrected, protected, bitmap.width, bitmap.height
    );
    Ok(CorrectionReport {
        corrected,
        protected,
    })
}

/// Bitmap-only correction without edge protection.
pub fn correct_errors_fast_distance(
    bitmap: &mut Bitmap,
    projection: &Projection,
    range: f64,
    min_deviation_ratio: f64,
) -> Result<CorrectionReport> {
    fast_correction(bitmap, projection, range, min_deviation_ratio, false)
}

/// Bitmap-only correction that only fixes sign inversions.
pub fn correct_errors_fast_edge(
    bitmap: &mut Bitmap,
    projection: &Projection,
    range: f64,
    min_deviation_ratio: f64,
) -> Result<CorrectionReport> {
    fast_correction(bitmap, projection, range, min_deviation_ratio, true)
}

fn fast_correction(
    bitmap: &mut Bitmap,
    projection: &Projection,
    range: f64,
    min_deviation_ratio: f64,
    protect_all: bool,
) -> Result<CorrectionReport> {
    if !min_deviation_ratio.is_finite() || min_deviation_ratio <= 0.0 {
        return Err(MsdfError::config(format!(
            "min_deviation_ratio must be positive and finite, got {min_deviation_ratio}"
        )));
    }
    projection.validate()?;
    let mapping = DistanceMapping::new(range)?;
    if bitmap.channels < 3 {
        warn!(
            "Skipping error correction of a {}-channel bitmap",
            bitmap.channels
        );
        return Ok(CorrectionReport::default());
    }

    let mut corrector = ErrorCorrector::new(
        bitmap.width,
        bitmap.height,
        projection,
        mapping.inv_range(),
        min_deviation_ratio,
        ErrorCorrectionConfig::DEFAULT_MIN_IMPROVE_RATIO,
    );
    if protect_all {
        corrector.protect_all();
    }
    let protected = corrector.count(StencilFlags::PROTECTED);
    corrector.find_errors(bitmap);
    let corrected = corrector.apply(bitmap);
    debug!("Fast correction fixed {} texels", corrected);
    Ok(CorrectionReport {
        corrected,
        protected,
    })
}
