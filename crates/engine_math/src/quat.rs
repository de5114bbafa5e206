//! Rotation quaternion.
//!
//! [`Quat`] stores `(x, y, z, w)` with `w` the real part. Values used as
//! rotations are expected to be unit length; [`Quat::add`] and
//! [`Quat::scale`] do not preserve that, so renormalise before reusing such a
//! result as a rotation.
//!
//! ## Conventions
//!
//! - `a * b` is the Hamilton product. Applied to a vector it rotates by `b`
//!   first, then by `a`.
//! - `q * v` is the active rotation `q v q*`, the same result as
//!   [`Mat4::from_rotation(q).transform_point(v)`](crate::Mat4::transform_point).
//! - [`Quat::rotate_vector`] is the conjugate sandwich `q* v q`, the same
//!   result as the row-vector form
//!   [`Mat4::from_rotation(q).transform_point_row(v)`](crate::Mat4::transform_point_row).
//! - Euler angles are `Vec3 { x: pitch, y: yaw, z: roll }` in radians,
//!   composed as `yaw * pitch * roll`: roll about Z is applied first, then
//!   pitch about X, then yaw about Y.

use std::fmt;
use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::vector::Vec3;

/// Cross products shorter than this are treated as parallel vectors.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A quaternion `x i + y j + z k + w`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// The identity rotation.
    pub const IDENTITY: Self = Self::from_xyzw(0.0, 0.0, 0.0, 1.0);

    #[must_use]
    pub const fn from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis`. The axis does not need to
    /// be normalised.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateInput`] if `axis` has zero length.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> MathResult<Self> {
        let axis = axis.normalize()?;
        Ok(Self::from_unit_axis_angle(axis, angle))
    }

    fn from_unit_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::from_xyzw(axis.x * s, axis.y * s, axis.z * s, c)
    }

    #[must_use]
    pub fn from_rotation_x(angle: f32) -> Self {
        Self::from_unit_axis_angle(Vec3::X, angle)
    }

    #[must_use]
    pub fn from_rotation_y(angle: f32) -> Self {
        Self::from_unit_axis_angle(Vec3::Y, angle)
    }

    #[must_use]
    pub fn from_rotation_z(angle: f32) -> Self {
        Self::from_unit_axis_angle(Vec3::Z, angle)
    }

    /// Builds a rotation from `(pitch, yaw, roll)` radians, applied roll
    /// first, then pitch, then yaw.
    #[must_use]
    pub fn from_euler(angles: Vec3) -> Self {
        Self::from_rotation_y(angles.y) * Self::from_rotation_x(angles.x) * Self::from_rotation_z(angles.z)
    }

    /// Same as [`Quat::from_euler`] with the angles given in degrees.
    #[must_use]
    pub fn from_euler_degrees(angles: Vec3) -> Self {
        Self::from_euler(angles.to_radians())
    }

    /// Extracts `(pitch, yaw, roll)` radians in the order used by
    /// [`Quat::from_euler`].
    ///
    /// Pitch lies in `[-π/2, π/2]`. At the poles the `asin` argument is
    /// clamped so rounding error cannot produce NaN.
    #[must_use]
    pub fn to_euler(self) -> Vec3 {
        let Self { x, y, z, w } = self;
        let sin_pitch = (2.0 * (w * x - y * z)).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();
        let yaw = (2.0 * (x * z + w * y)).atan2(1.0 - 2.0 * (x * x + y * y));
        let roll = (2.0 * (x * y + w * z)).atan2(1.0 - 2.0 * (x * x + z * z));
        Vec3::new(pitch, yaw, roll)
    }

    /// Same as [`Quat::to_euler`] with the angles returned in degrees.
    #[must_use]
    pub fn to_euler_degrees(self) -> Vec3 {
        self.to_euler().to_degrees()
    }

    /// The rotation that takes the direction of `from` onto the direction
    /// of `to` under [`Quat::rotate_vector`].
    ///
    /// Parallel vectors give the identity.
    ///
    /// # Errors
    ///
    /// - [`MathError::DegenerateInput`] if either vector has zero length.
    /// - [`MathError::DegenerateRotation`] if the vectors point in opposite
    ///   directions, where the axis is undefined.
    pub fn angle_between(from: Vec3, to: Vec3) -> MathResult<Self> {
        let from = from.normalize()?;
        let to = to.normalize()?;
        let cos = from.dot(to).clamp(-1.0, 1.0);
        let axis = to.cross(from);
        if axis.length() <= PARALLEL_EPSILON {
            return if cos > 0.0 {
                Ok(Self::IDENTITY)
            } else {
                Err(MathError::DegenerateRotation)
            };
        }
        Self::from_axis_angle(axis, cos.acos())
    }

    /// Component-wise sum. The result is generally not a unit quaternion.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, rhs: Self) -> Self {
        Self::from_xyzw(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z, self.w + rhs.w)
    }

    /// Multiplies all four components by `s`.
    #[must_use]
    pub fn scale(self, s: f32) -> Self {
        Self::from_xyzw(self.x * s, self.y * s, self.z * s, self.w * s)
    }

    /// Four-component dot product.
    #[must_use]
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub fn is_normalized(self) -> bool {
        (self.length_squared() - 1.0).abs() <= 1e-4
    }

    #[must_use]
    pub fn conjugate(self) -> Self {
        Self::from_xyzw(-self.x, -self.y, -self.z, self.w)
    }

    /// # Errors
    ///
    /// Returns [`MathError::DegenerateInput`] for the zero quaternion.
    pub fn normalize(self) -> MathResult<Self> {
        let len = self.length();
        if len == 0.0 {
            return Err(MathError::DegenerateInput("cannot normalize a zero quaternion"));
        }
        Ok(self.scale(1.0 / len))
    }

    /// Multiplicative inverse, `conjugate / |q|²`.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateInput`] for the zero quaternion.
    pub fn inverse(self) -> MathResult<Self> {
        let len_sq = self.length_squared();
        if len_sq == 0.0 {
            return Err(MathError::DegenerateInput("cannot invert a zero quaternion"));
        }
        Ok(self.conjugate().scale(1.0 / len_sq))
    }

    /// The real part.
    #[must_use]
    pub fn real(self) -> f32 {
        self.w
    }

    /// The imaginary part as a vector.
    #[must_use]
    pub fn imaginary(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// `Im(q* ⊗ (v, 0) ⊗ q)`, the inverse of the active rotation `q * v`.
    #[must_use]
    pub fn rotate_vector(self, v: Vec3) -> Vec3 {
        (self.conjugate() * Self::pure(v) * self).imaginary()
    }

    fn pure(v: Vec3) -> Self {
        Self::from_xyzw(v.x, v.y, v.z, 0.0)
    }

    /// Returns `true` if every component differs by at most `max_abs_diff`.
    #[must_use]
    pub fn abs_diff_eq(self, rhs: Self, max_abs_diff: f32) -> bool {
        (self.x - rhs.x).abs() <= max_abs_diff
            && (self.y - rhs.y).abs() <= max_abs_diff
            && (self.z - rhs.z).abs() <= max_abs_diff
            && (self.w - rhs.w).abs() <= max_abs_diff
    }

    /// Like [`Quat::abs_diff_eq`] but treats `q` and `-q` as equal, since
    /// both encode the same rotation.
    #[must_use]
    pub fn same_rotation(self, rhs: Self, max_abs_diff: f32) -> bool {
        self.abs_diff_eq(rhs, max_abs_diff) || self.abs_diff_eq(rhs.scale(-1.0), max_abs_diff)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Quat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

impl Mul for Quat {
    type Output = Self;

    /// Hamilton product.
    fn mul(self, q: Self) -> Self {
        let p = self;
        Self::from_xyzw(
            p.w * q.x + p.x * q.w + p.y * q.z - p.z * q.y,
            p.w * q.y - p.x * q.z + p.y * q.w + p.z * q.x,
            p.w * q.z + p.x * q.y - p.y * q.x + p.z * q.w,
            p.w * q.w - p.x * q.x - p.y * q.y - p.z * q.z,
        )
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    /// Active rotation `q v q*`.
    fn mul(self, v: Vec3) -> Vec3 {
        (self * Self::pure(v) * self.conjugate()).imaginary()
    }
}

impl From<glam::Quat> for Quat {
    fn from(q: glam::Quat) -> Self {
        Self::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

impl From<Quat> for glam::Quat {
    fn from(q: Quat) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use super::*;

    const EPS: f32 = 1e-5;

    fn sample_rotations() -> Vec<Quat> {
        vec![
            Quat::IDENTITY,
            Quat::from_rotation_x(0.3),
            Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0), 1.1).unwrap(),
            Quat::from_euler(Vec3::new(0.4, -1.2, 2.5)),
            Quat::from_axis_angle(Vec3::new(-0.2, 0.0, 1.0), -2.9).unwrap(),
        ]
    }

    #[test]
    fn test_identity_rotation_is_noop() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Quat::IDENTITY * v, v);
        assert_eq!(Quat::IDENTITY.rotate_vector(v), v);
    }

    #[test]
    fn test_axis_angle_normalizes_axis() {
        let a = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 10.0), FRAC_PI_2).unwrap();
        let b = Quat::from_rotation_z(FRAC_PI_2);
        assert!(a.abs_diff_eq(b, EPS));
        assert!(a.is_normalized());
    }

    #[test]
    fn test_axis_angle_zero_axis_is_error() {
        assert!(Quat::from_axis_angle(Vec3::ZERO, 1.0).is_err());
    }

    #[test]
    fn test_active_rotation_is_right_handed() {
        let q = Quat::from_rotation_z(FRAC_PI_2);
        assert!((q * Vec3::X).abs_diff_eq(Vec3::Y, EPS));
        // The conjugate sandwich goes the other way.
        assert!(q.rotate_vector(Vec3::X).abs_diff_eq(-Vec3::Y, EPS));
    }

    #[test]
    fn test_active_rotation_matches_glam() {
        let v = Vec3::new(0.3, -1.0, 2.0);
        for q in sample_rotations() {
            let expected: Vec3 = (glam::Quat::from(q) * glam::Vec3::from(v)).into();
            assert!((q * v).abs_diff_eq(expected, 1e-4), "{q}");
        }
    }

    #[test]
    fn test_rotation_preserves_length() {
        let v = Vec3::new(3.0, -4.0, 12.0);
        for q in sample_rotations() {
            assert!((q.rotate_vector(v).length() - v.length()).abs() < 1e-4);
            assert!(((q * v).length() - v.length()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_product_composes_right_to_left() {
        let a = Quat::from_rotation_y(0.7);
        let b = Quat::from_rotation_x(-1.3);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(((a * b) * v).abs_diff_eq(a * (b * v), 1e-4));
        // Non-commutative.
        assert!(!(a * b).abs_diff_eq(b * a, 1e-3));
    }

    #[test]
    fn test_product_with_inverse_is_identity() {
        let qs = [
            Quat::from_xyzw(1.0, 2.0, 3.0, 4.0),
            Quat::from_xyzw(-0.5, 0.1, 0.0, 0.2),
            Quat::from_rotation_z(1.0),
        ];
        for q in qs {
            let inv = q.inverse().unwrap();
            assert!((q * inv).abs_diff_eq(Quat::IDENTITY, EPS), "{q}");
            assert!((inv * q).abs_diff_eq(Quat::IDENTITY, EPS), "{q}");
        }
    }

    #[test]
    fn test_zero_quaternion_errors() {
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        assert!(zero.inverse().is_err());
        assert!(zero.normalize().is_err());
    }

    #[test]
    fn test_dot_includes_real_part() {
        assert_eq!(Quat::IDENTITY.dot(Quat::IDENTITY), 1.0);
        let q = Quat::from_xyzw(1.0, 2.0, 3.0, 4.0);
        assert_eq!(q.dot(q), 30.0);
    }

    #[test]
    fn test_add_and_scale_need_renormalizing() {
        let q = Quat::IDENTITY.add(Quat::from_rotation_x(0.5));
        assert!(!q.is_normalized());
        assert!(q.normalize().unwrap().is_normalized());
        assert!((Quat::IDENTITY.scale(2.0).length() - 2.0).abs() < EPS);
    }

    #[test]
    fn test_euler_order_is_roll_pitch_yaw() {
        let angles = Vec3::new(0.4, -1.2, 2.5);
        let q = Quat::from_euler(angles);
        let expected = glam::Quat::from_euler(glam::EulerRot::YXZ, angles.y, angles.x, angles.z);
        let v = Vec3::new(1.0, -2.0, 0.5);
        let got = q * v;
        let want: Vec3 = (expected * glam::Vec3::from(v)).into();
        assert!(got.abs_diff_eq(want, 1e-4));
    }

    #[test]
    fn test_euler_roundtrip() {
        for angles in [
            Vec3::ZERO,
            Vec3::new(0.4, -1.2, 2.5),
            Vec3::new(-1.0, 3.0, -0.1),
            Vec3::new(FRAC_PI_4, FRAC_PI_4, FRAC_PI_4),
        ] {
            let back = Quat::from_euler(angles).to_euler();
            assert!(back.abs_diff_eq(angles, 1e-4), "{angles} -> {back}");
        }
    }

    #[test]
    fn test_euler_degrees() {
        let q = Quat::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        assert!(q.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), EPS));
        assert!(q.to_euler_degrees().abs_diff_eq(Vec3::new(0.0, 90.0, 0.0), 1e-3));
    }

    #[test]
    fn test_euler_at_pole_is_clamped() {
        // Slightly over-unit quaternion at the pitch pole would push the asin
        // argument past 1 without the clamp.
        let q = Quat::from_rotation_x(FRAC_PI_2).scale(1.0001);
        let e = q.to_euler();
        assert!(!e.x.is_nan());
        assert!((e.x - FRAC_PI_2).abs() < 1e-3);
        assert!(!e.y.is_nan() && !e.z.is_nan());
    }

    #[test]
    fn test_angle_between_maps_from_onto_to() {
        let pairs = [
            (Vec3::X, Vec3::Y),
            (Vec3::new(1.0, 2.0, 3.0), Vec3::new(-3.0, 0.5, 1.0)),
            (Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 1.0, 0.0)),
        ];
        for (from, to) in pairs {
            let q = Quat::angle_between(from, to).unwrap();
            let mapped = q.rotate_vector(from.normalize().unwrap());
            assert!(mapped.abs_diff_eq(to.normalize().unwrap(), 1e-4), "{from} -> {to}");
        }
    }

    #[test]
    fn test_angle_between_parallel_is_identity() {
        let q = Quat::angle_between(Vec3::X, Vec3::new(4.0, 0.0, 0.0)).unwrap();
        assert_eq!(q, Quat::IDENTITY);
    }

    #[test]
    fn test_angle_between_degenerate_cases() {
        assert_eq!(
            Quat::angle_between(Vec3::X, -Vec3::X),
            Err(MathError::DegenerateRotation)
        );
        assert!(matches!(
            Quat::angle_between(Vec3::ZERO, Vec3::X),
            Err(MathError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_same_rotation_accepts_negated() {
        let q = Quat::from_rotation_y(PI / 3.0);
        assert!(q.same_rotation(q.scale(-1.0), EPS));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let q = Quat::from_euler(Vec3::new(0.1, 0.2, 0.3));
        let bytes = rmp_serde::to_vec(&q).unwrap();
        let restored: Quat = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(q, restored);
    }
}
