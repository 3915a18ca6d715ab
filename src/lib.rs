mod bitmap;
mod color;
pub mod coloring;
pub mod correction;
pub mod distance;
mod error;
mod generator;
mod geometry;
mod math;
mod projection;

pub use bitmap::Bitmap;
pub use color::EdgeColor;
pub use coloring::{edge_coloring_simple, DEFAULT_ANGLE_THRESHOLD};
pub use correction::{
    correct_errors, correct_errors_fast_distance, correct_errors_fast_edge, CorrectionReport,
    DistanceCheckMode, ErrorCorrectionConfig, ErrorCorrectionMode,
};
pub use distance::{DistanceValue, ShapeDistanceFinder, SignedDistance};
pub use error::{MsdfError, Result, ShapeError};
pub use generator::{generate_msdf, generate_mtsdf, generate_psdf, generate_sdf, GeneratorConfig};
pub use geometry::{Contour, Curve, EdgeSegment, PathCommand, SegmentId, Shape};
pub use math::{median, Mat3, Vec2};
pub use projection::{DistanceMapping, Projection};
