//! Lightweight math types used across msdf-rs.

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

// Tolerance for matrix inversion checks.
const EPSILON: f64 = 1.0e-12;

/// 2D double-precision vector with basic arithmetic helpers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Construct a new 2D vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector with both components set to `v`.
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v }
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (scalar).
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Vector magnitude.
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared vector magnitude.
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// True when both components are exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// True when both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Unit vector in the same direction.
    ///
    /// A zero vector maps to `(0, 0)` when `allow_zero` is set and to `(0, 1)` otherwise.
    pub fn normalize(self, allow_zero: bool) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::new(0.0, if allow_zero { 0.0 } else { 1.0 });
        }
        self / len
    }

    /// Unit normal. `polarity` selects the left (`true`) or right (`false`) side.
    pub fn orthonormal(self, polarity: bool, allow_zero: bool) -> Self {
        let len = self.length();
        if len == 0.0 {
            let y = if allow_zero { 0.0 } else { 1.0 };
            return if polarity {
                Self::new(0.0, y)
            } else {
                Self::new(0.0, -y)
            };
        }
        if polarity {
            Self::new(-self.y / len, self.x / len)
        } else {
            Self::new(self.y / len, -self.x / len)
        }
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Linear interpolation between two vectors.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self * rhs.x, self * rhs.y)
    }
}

/// Component-wise product.
impl Mul for Vec2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Component-wise quotient.
impl Div for Vec2 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self::new(self.x / rhs.x, self.y / rhs.y)
    }
}

/// Returns 1 for positive `n` and -1 otherwise (including zero).
pub fn non_zero_sign(n: f64) -> f64 {
    if n > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Returns -1, 0 or 1 according to the sign of `n`.
pub fn sign(n: f64) -> i32 {
    if n > 0.0 {
        1
    } else if n < 0.0 {
        -1
    } else {
        0
    }
}

/// Median of three values.
pub fn median<T: PartialOrd + Copy>(a: T, b: T, c: T) -> T {
    max(min(a, b), min(max(a, b), c))
}

fn min<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a < b {
        b
    } else {
        a
    }
}

/// Linear interpolation of scalars.
pub fn mix(a: f32, b: f32, t: f64) -> f32 {
    ((1.0 - t) * a as f64 + t * b as f64) as f32
}

/// 3x3 matrix for 2D affine transforms in homogeneous coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    pub m: [[f64; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat3 {
    /// Identity transform.
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Translation transform.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            m: [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]],
        }
    }

    /// Non-uniform scale transform.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotation transform (radians).
    pub fn rotate(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            m: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Matrix multiply (self * other).
    pub fn mul(self, other: Self) -> Self {
        let mut out = Self { m: [[0.0; 3]; 3] };
        for r in 0..3 {
            for c in 0..3 {
                out.m[r][c] = self.m[r][0] * other.m[0][c]
                    + self.m[r][1] * other.m[1][c]
                    + self.m[r][2] * other.m[2][c];
            }
        }
        out
    }

    /// Transform a point (includes translation).
    pub fn transform_point(&self, v: Vec2) -> Vec2 {
        let x = self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2];
        let y = self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2];
        Vec2::new(x, y)
    }

    /// Determinant of the linear part. Negative values mirror the plane.
    pub fn determinant(&self) -> f64 {
        self.m[0][0] * self.m[1][1] - self.m[0][1] * self.m[1][0]
    }

    /// True when the linear part is invertible and every entry is finite.
    pub fn is_invertible(&self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite()) && self.determinant().abs() > EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_picks_middle_value() {
        assert_eq!(median(1.0, 3.0, 2.0), 2.0);
        assert_eq!(median(3.0, 1.0, 2.0), 2.0);
        assert_eq!(median(2.0, 2.0, -1.0), 2.0);
        assert_eq!(median(f32::NEG_INFINITY, 0.25, 0.75), 0.25);
    }

    #[test]
    fn orthonormal_left_of_direction() {
        let n = Vec2::new(2.0, 0.0).orthonormal(true, false);
        assert_eq!(n, Vec2::new(0.0, 1.0));
        let n = Vec2::new(2.0, 0.0).orthonormal(false, false);
        assert_eq!(n, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn normalize_zero_vector_fallback() {
        assert_eq!(Vec2::ZERO.normalize(false), Vec2::new(0.0, 1.0));
        assert_eq!(Vec2::ZERO.normalize(true), Vec2::ZERO);
    }

    #[test]
    fn mirrored_transform_has_negative_determinant() {
        assert!(Mat3::scale(-1.0, 1.0).determinant() < 0.0);
        assert!(Mat3::rotate(0.3).mul(Mat3::translate(4.0, 2.0)).is_invertible());
    }
}
