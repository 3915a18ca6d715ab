//! Mapping between shape coordinates, bitmap coordinates and stored values.

use serde::{Deserialize, Serialize};

use crate::error::{MsdfError, Result};
use crate::math::Vec2;

/// Axis-aligned mapping from shape space to bitmap (texel) space:
/// `project(p) = scale * (p + translate)`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub scale: Vec2,
    pub translate: Vec2,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            scale: Vec2::splat(1.0),
            translate: Vec2::ZERO,
        }
    }
}

impl Projection {
    pub fn new(scale: Vec2, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    /// Frames `min..max` inside a `width` x `height` bitmap with `padding` texels on
    /// every side, preserving aspect ratio and centering the short axis.
    pub fn fit(min: Vec2, max: Vec2, width: u32, height: u32, padding: f64) -> Result<Self> {
        let frame = Vec2::new(f64::from(width), f64::from(height)) - Vec2::splat(2.0 * padding);
        let dims = max - min;
        if !(frame.x > 0.0 && frame.y > 0.0 && dims.x > 0.0 && dims.y > 0.0) || !dims.is_finite() {
            return Err(MsdfError::InvalidProjection);
        }
        let (scale, translate) = if dims.x * frame.y < dims.y * frame.x {
            (
                frame.y / dims.y,
                Vec2::new(0.5 * (frame.x / frame.y * dims.y - dims.x) - min.x, -min.y),
            )
        } else {
            (
                frame.x / dims.x,
                Vec2::new(-min.x, 0.5 * (frame.y / frame.x * dims.x - dims.y) - min.y),
            )
        };
        Ok(Self {
            scale: Vec2::splat(scale),
            translate: translate + Vec2::splat(padding / scale),
        })
    }

    /// Rejects zero, negative-zero and non-finite scales and non-finite offsets.
    pub fn validate(&self) -> Result<()> {
        if self.scale.is_finite()
            && self.translate.is_finite()
            && self.scale.x != 0.0
            && self.scale.y != 0.0
        {
            Ok(())
        } else {
            Err(MsdfError::InvalidProjection)
        }
    }

    pub fn project(&self, p: Vec2) -> Vec2 {
        self.scale * (p + self.translate)
    }

    pub fn unproject(&self, p: Vec2) -> Vec2 {
        p / self.scale - self.translate
    }

    pub fn project_vector(&self, v: Vec2) -> Vec2 {
        self.scale * v
    }

    pub fn unproject_vector(&self, v: Vec2) -> Vec2 {
        v / self.scale
    }
}

/// Linear mapping of signed distances to stored values: `d / range + 0.5`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DistanceMapping {
    inv_range: f64,
}

impl DistanceMapping {
    /// `range` is the width, in shape units, of the distance band mapped onto `0..1`.
    pub fn new(range: f64) -> Result<Self> {
        if range.is_finite() && range > 0.0 {
            Ok(Self {
                inv_range: 1.0 / range,
            })
        } else {
            Err(MsdfError::InvalidRange(range))
        }
    }

    pub fn inv_range(&self) -> f64 {
        self.inv_range
    }

    /// Stored value for a distance, clamped to the finite f32 range.
    pub fn map(&self, distance: f64) -> f32 {
        let value = distance * self.inv_range + 0.5;
        value.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
    }

    /// Distance represented by a stored value.
    pub fn unmap(&self, value: f32) -> f64 {
        (f64::from(value) - 0.5) / self.inv_range
    }
}
