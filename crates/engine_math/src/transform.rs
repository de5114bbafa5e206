//! Position / rotation / scale triple.
//!
//! [`Transform3D`] is the local state a scene node owns. It composes to a
//! matrix as `T · R · S` and can be inverted component-wise, which is how the
//! scene graph solves for local values from requested world values.

use serde::{Deserialize, Serialize};

use crate::error::MathResult;
use crate::matrix::Mat4;
use crate::quat::Quat;
use crate::vector::Vec3;

/// A 3D transform representing position, rotation, and per-axis scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform3D {
    /// Translation relative to the parent frame.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Per-axis scale factor.
    pub scale: Vec3,
}

impl Transform3D {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform with the given position and default rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a new transform with position and rotation.
    #[must_use]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Compute the 4×4 model matrix `T · R · S`.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rigidbody(self.rotation, self.position) * Mat4::from_scale(self.scale)
    }

    /// Maps a point from this transform's child space into its own space:
    /// `position + rotation * (scale ∘ p)`.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.mul_elem(p)
    }

    /// Inverse of [`Transform3D::transform_point`], undoing translation,
    /// rotation and scale one at a time.
    ///
    /// # Errors
    ///
    /// Fails if the rotation is the zero quaternion or any scale component
    /// is zero.
    pub fn inverse_transform_point(&self, p: Vec3) -> MathResult<Vec3> {
        let inv_rotation = self.rotation.inverse()?;
        let inv_scale = self.scale.recip_elem()?;
        Ok(inv_scale.mul_elem(inv_rotation * (p - self.position)))
    }

    /// Combines `self` (the parent) with a child's local transform.
    ///
    /// Rotation and scale compose independently, so the result is exact only
    /// when the parent scale is uniform or the child is unrotated.
    #[must_use]
    pub fn compose(&self, child: &Self) -> Self {
        Self {
            position: self.transform_point(child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale.mul_elem(child.scale),
        }
    }

    /// Translate the transform by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }

    /// Rotate the transform by the given quaternion, applied after the
    /// current rotation.
    #[must_use]
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation * self.rotation;
        self
    }

    /// Apply a uniform scale factor.
    #[must_use]
    pub fn scaled(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transform3D::IDENTITY;
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_from_position() {
        let t = Transform3D::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_builders() {
        let t = Transform3D::IDENTITY
            .translated(Vec3::new(5.0, 0.0, 0.0))
            .scaled(2.0)
            .rotated(Quat::from_rotation_y(0.5));
        assert_eq!(t.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(t.scale, Vec3::splat(2.0));
        assert!(t.rotation.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
    }

    #[test]
    fn test_point_transform_matches_matrix() {
        let t = Transform3D::from_position_rotation(Vec3::new(1.0, -2.0, 0.5), Quat::from_rotation_z(FRAC_PI_2))
            .with_scale(Vec3::new(2.0, 3.0, 4.0));
        let p = Vec3::new(0.5, 1.0, -1.0);
        assert!(t.transform_point(p).abs_diff_eq(t.to_matrix().transform_point(p), 1e-5));
    }

    #[test]
    fn test_inverse_transform_point() {
        let t = Transform3D::from_position_rotation(Vec3::new(3.0, 1.0, -2.0), Quat::from_euler(Vec3::new(0.2, 1.0, -0.4)))
            .with_scale(Vec3::new(0.5, 2.0, 1.5));
        let p = Vec3::new(-4.0, 7.0, 0.25);
        let local = t.inverse_transform_point(p).unwrap();
        assert!(t.transform_point(local).abs_diff_eq(p, 1e-4));
    }

    #[test]
    fn test_inverse_with_zero_scale_fails() {
        let t = Transform3D::IDENTITY.with_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(t.inverse_transform_point(Vec3::ONE).is_err());
    }

    #[test]
    fn test_compose_uniform_scale_matches_matrix() {
        let parent = Transform3D::from_position_rotation(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_y(0.7)).scaled(2.0);
        let child = Transform3D::from_position_rotation(Vec3::new(0.0, 1.0, 2.0), Quat::from_rotation_x(-0.3))
            .with_scale(Vec3::new(1.0, 2.0, 3.0));
        let composed = parent.compose(&child).to_matrix();
        let product = parent.to_matrix() * child.to_matrix();
        assert!(composed.abs_diff_eq(&product, 1e-4));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let t = Transform3D::from_position(Vec3::new(1.0, 2.0, 3.0));
        let bytes = rmp_serde::to_vec(&t).unwrap();
        let restored: Transform3D = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(t, restored);
    }
}
