//! 3-component vector.
//!
//! [`Vec3`] is a plain `f32` triple used for positions, directions and
//! per-axis scale. Every operation returns a new value; fallible ones
//! (normalisation, projection, reciprocal) report a [`MathError`] instead of
//! producing NaN.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};

/// A 3D vector of `f32` components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// All zeros.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All ones.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    /// Unit X, the "right" direction.
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit Y, the "up" direction.
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit Z, the "forward" direction.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// A vector with all three components set to `v`.
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    #[must_use]
    pub const fn right() -> Self {
        Self::X
    }

    #[must_use]
    pub const fn up() -> Self {
        Self::Y
    }

    #[must_use]
    pub const fn forward() -> Self {
        Self::Z
    }

    #[must_use]
    pub const fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Multiply every component by `s`.
    #[must_use]
    pub fn scale(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[must_use]
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Right-handed cross product.
    #[must_use]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector pointing the same way.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateInput`] if the vector has zero length.
    pub fn normalize(self) -> MathResult<Self> {
        let len = self.length();
        if len == 0.0 {
            return Err(MathError::DegenerateInput("cannot normalize a zero-length vector"));
        }
        Ok(self.scale(1.0 / len))
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, rhs: Self) -> f32 {
        (self - rhs).length()
    }

    /// Projects `self` onto `onto`: `(self · onto / |onto|) * onto`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateInput`] if `onto` has zero length.
    pub fn project_onto(self, onto: Self) -> MathResult<Self> {
        let len = onto.length();
        if len == 0.0 {
            return Err(MathError::DegenerateInput("cannot project onto a zero-length vector"));
        }
        Ok(onto.scale(self.dot(onto) / len))
    }

    /// Component-wise product.
    #[must_use]
    pub fn mul_elem(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Component-wise reciprocal.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateInput`] if any component is zero.
    pub fn recip_elem(self) -> MathResult<Self> {
        if self.x == 0.0 || self.y == 0.0 || self.z == 0.0 {
            return Err(MathError::DegenerateInput("cannot invert a zero scale component"));
        }
        Ok(Self::new(1.0 / self.x, 1.0 / self.y, 1.0 / self.z))
    }

    /// Linear interpolation; `t = 0` gives `self`, `t = 1` gives `rhs`.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f32) -> Self {
        self + (rhs - self).scale(t)
    }

    /// Returns `true` if every component differs by at most `max_abs_diff`.
    #[must_use]
    pub fn abs_diff_eq(self, rhs: Self, max_abs_diff: f32) -> bool {
        (self.x - rhs.x).abs() <= max_abs_diff
            && (self.y - rhs.y).abs() <= max_abs_diff
            && (self.z - rhs.z).abs() <= max_abs_diff
    }

    /// Converts every component from degrees to radians.
    #[must_use]
    pub fn to_radians(self) -> Self {
        Self::new(self.x.to_radians(), self.y.to_radians(), self.z.to_radians())
    }

    /// Converts every component from radians to degrees.
    #[must_use]
    pub fn to_degrees(self) -> Self {
        Self::new(self.x.to_degrees(), self.y.to_degrees(), self.z.to_degrees())
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Mul<Vec3> for f32 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs.scale(self)
    }
}

impl MulAssign<f32> for Vec3 {
    fn mul_assign(&mut self, rhs: f32) {
        *self = self.scale(rhs);
    }
}

impl Div<f32> for Vec3 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(a: [f32; 3]) -> Self {
        Self::from_array(a)
    }
}

impl From<glam::Vec3> for Vec3 {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for glam::Vec3 {
    fn from(v: Vec3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_cross_is_right_handed() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_eq!(Vec3::Y.cross(Vec3::Z), Vec3::X);
        assert_eq!(Vec3::Z.cross(Vec3::X), Vec3::Y);
        assert_eq!(Vec3::Y.cross(Vec3::X), -Vec3::Z);
    }

    #[test]
    fn test_cross_matches_glam() {
        let a = Vec3::new(1.5, -2.0, 0.25);
        let b = Vec3::new(-0.5, 3.0, 4.0);
        let expected: Vec3 = glam::Vec3::from(a).cross(glam::Vec3::from(b)).into();
        assert!(a.cross(b).abs_diff_eq(expected, EPS));
    }

    #[test]
    fn test_dot_and_length() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(v.dot(Vec3::X), 3.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!(v.length_squared(), 25.0);
    }

    #[test]
    fn test_normalize_has_unit_length() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(1000.0, -250.0, 12.0),
        ] {
            let n = v.normalize().unwrap();
            assert!((n.length() - 1.0).abs() < EPS, "{v} normalized to {n}");
        }
    }

    #[test]
    fn test_normalize_zero_is_error() {
        assert!(matches!(
            Vec3::ZERO.normalize(),
            Err(MathError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_distance() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        let b = Vec3::new(1.0, 4.0, 5.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn test_project_onto() {
        let a = Vec3::new(2.0, 3.0, 0.0);
        // Along a unit axis the projection is the usual component.
        assert_eq!(a.project_onto(Vec3::X).unwrap(), Vec3::new(2.0, 0.0, 0.0));
        // The formula divides by |b| once, so a non-unit target scales the result.
        let p = a.project_onto(Vec3::new(2.0, 0.0, 0.0)).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn test_project_onto_zero_is_error() {
        assert!(Vec3::ONE.project_onto(Vec3::ZERO).is_err());
    }

    #[test]
    fn test_recip_elem() {
        let s = Vec3::new(2.0, 4.0, -0.5);
        assert_eq!(s.recip_elem().unwrap(), Vec3::new(0.5, 0.25, -2.0));
        assert!(Vec3::new(1.0, 0.0, 1.0).recip_elem().is_err());
    }

    #[test]
    fn test_operators() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        v += Vec3::ONE;
        assert_eq!(v, Vec3::new(2.0, 3.0, 4.0));
        v -= Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(v, Vec3::new(0.0, 3.0, 4.0));
        v *= 2.0;
        assert_eq!(v, Vec3::new(0.0, 6.0, 8.0));
        assert_eq!(v / 2.0, Vec3::new(0.0, 3.0, 4.0));
        assert_eq!(0.5 * v, v * 0.5);
    }

    #[test]
    fn test_lerp() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, -10.0, 2.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec3::new(5.0, -5.0, 1.0));
    }
}
