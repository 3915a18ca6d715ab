//! Error types for shape validation and field generation.

use thiserror::Error;

/// Defect found while validating a shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Segment end does not meet the start of the next segment
    #[error("Contour {contour} is open after segment {segment}")]
    OpenContour {
        /// Index of the contour.
        contour: usize,
        /// Index of the segment whose end point is not joined.
        segment: usize,
    },

    /// Control point is NaN or infinite
    #[error("Contour {contour} segment {segment} has a non-finite control point")]
    NonFinitePoint {
        /// Index of the contour.
        contour: usize,
        /// Index of the offending segment.
        segment: usize,
    },

    /// Contour encloses no area
    #[error("Contour {contour} is degenerate (zero winding)")]
    DegenerateContour {
        /// Index of the contour.
        contour: usize,
    },

    /// Contour crosses itself
    #[error("Contour {contour} intersects itself")]
    SelfIntersection {
        /// Index of the contour.
        contour: usize,
    },

    /// Two contours cross each other
    #[error("Contours {first} and {second} cross each other")]
    CrossingContours {
        /// Index of the first contour.
        first: usize,
        /// Index of the second contour.
        second: usize,
    },

    /// Contour orientation disagrees with its nesting depth
    #[error("Contour {contour} at nesting depth {depth} has winding {winding}")]
    InconsistentWinding {
        /// Index of the contour.
        contour: usize,
        /// Number of contours enclosing it.
        depth: usize,
        /// Its winding (-1 outline, +1 hole).
        winding: i32,
    },
}

/// Error returned by the field generator and error corrector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MsdfError {
    /// Shape failed validation
    #[error("Invalid shape: {0}")]
    InvalidShape(#[from] ShapeError),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Distance range is not a positive finite number
    #[error("Invalid distance range: {0}")]
    InvalidRange(f64),

    /// Bitmap dimensions or channel count are unusable
    #[error("Invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Projection scale is zero or not finite
    #[error("Invalid projection")]
    InvalidProjection,
}

impl MsdfError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MsdfError>;
