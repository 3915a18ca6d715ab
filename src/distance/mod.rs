//! Signed and pseudo distance queries against shapes.

mod combiner;
mod finder;
mod selector;
mod types;


pub use combiner::{ContourCombiner, OverlappingContourCombiner, SimpleContourCombiner};
pub use finder::ShapeDistanceFinder;
pub use selector::{
    ChannelSelector, EdgeSelector, MultiAndTrueDistanceSelector, MultiDistanceSelector,
    PseudoDistanceSelector, TrueDistanceSelector,
};
pub use types::{
    DistanceValue, MultiAndTrueDistance, MultiDistance, PseudoEdgeCache, SignedDistance,
    TrueEdgeCache,
};
