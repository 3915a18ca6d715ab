//! Outline geometry: segments, contours and shapes.

mod contour;
pub(crate) mod equation;
mod path;
mod segment;
mod shape;

#[cfg(test)]
pub(crate) mod fixtures;

pub use contour::Contour;
pub use path::PathCommand;
pub use segment::{Curve, EdgeSegment};
pub use shape::{SegmentId, Shape};
