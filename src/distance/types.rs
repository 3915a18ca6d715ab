//! Distance values and per-edge caches shared by selectors and combiners.

use crate::math::{median, Vec2};

/// Distance to a segment together with the obliqueness of the closest point.
///
/// `dot` is |cos| of the angle between the segment tangent and the direction to the
/// query point, so 0 means the query point lies on the segment's normal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SignedDistance {
    pub distance: f64,
    pub dot: f64,
}

impl SignedDistance {
    /// Farther than anything; the starting value of every search.
    pub const INFINITE: Self = Self {
        distance: -f64::MAX,
        dot: 0.0,
    };

    pub const fn new(distance: f64, dot: f64) -> Self {
        Self { distance, dot }
    }

    /// Smaller magnitude wins; equal magnitudes are decided by the more orthogonal hit.
    pub fn closer_than(&self, other: &Self) -> bool {
        let (a, b) = (self.distance.abs(), other.distance.abs());
        a < b || (a == b && self.dot < other.dot)
    }
}

impl Default for SignedDistance {
    fn default() -> Self {
        Self::INFINITE
    }
}

/// Cache for the true distance selector.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TrueEdgeCache {
    pub point: Vec2,
    pub abs_distance: f64,
}

/// Cache for pseudo distance selectors: the true distance plus the distances measured
/// in the start (a) and end (b) extension domains.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PseudoEdgeCache {
    pub point: Vec2,
    pub abs_distance: f64,
    pub a_domain_distance: f64,
    pub b_domain_distance: f64,
    pub a_pseudo_distance: f64,
    pub b_pseudo_distance: f64,
}

/// Per-channel distances of a three-channel field.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MultiDistance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Per-channel distances plus the true distance in the fourth channel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MultiAndTrueDistance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Output of a selector: one value per bitmap channel.
pub trait DistanceValue: Copy + Send + Sync {
    /// Number of channels written.
    const CHANNELS: usize;

    /// Value farther than any real distance.
    fn infinite() -> Self;

    /// Scalar used to compare and combine values (the median for multi-channel values).
    fn resolve(&self) -> f64;

    /// Writes every channel through `map`.
    fn write(&self, out: &mut [f32], map: impl Fn(f64) -> f32);
}

impl DistanceValue for f64 {
    const CHANNELS: usize = 1;

    fn infinite() -> Self {
        -f64::MAX
    }

    fn resolve(&self) -> f64 {
        *self
    }

    fn write(&self, out: &mut [f32], map: impl Fn(f64) -> f32) {
        out[0] = map(*self);
    }
}

impl DistanceValue for MultiDistance {
    const CHANNELS: usize = 3;

    fn infinite() -> Self {
        Self {
            r: -f64::MAX,
            g: -f64::MAX,
            b: -f64::MAX,
        }
    }

    fn resolve(&self) -> f64 {
        median(self.r, self.g, self.b)
    }

    fn write(&self, out: &mut [f32], map: impl Fn(f64) -> f32) {
        out[0] = map(self.r);
        out[1] = map(self.g);
        out[2] = map(self.b);
    }
}

impl DistanceValue for MultiAndTrueDistance {
    const CHANNELS: usize = 4;

    fn infinite() -> Self {
        Self {
            r: -f64::MAX,
            g: -f64::MAX,
            b: -f64::MAX,
            a: -f64::MAX,
        }
    }

    fn resolve(&self) -> f64 {
        median(self.r, self.g, self.b)
    }

    fn write(&self, out: &mut [f32], map: impl Fn(f64) -> f32) {
        out[0] = map(self.r);
        out[1] = map(self.g);
        out[2] = map(self.b);
        out[3] = map(self.a);
    }
}
