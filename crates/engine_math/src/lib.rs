//! # engine_math
//!
//! Value-type algebra for the scene graph: [`Vec3`], [`Quat`], [`Mat4`] and the
//! [`Transform3D`] TRS triple. Every operation is pure; fallible ones return
//! [`MathError`] rather than NaN.
//!
//! All types convert to and from their [`glam`] counterparts so consumers that
//! already speak glam (renderers, physics) can take values straight across.
//! Note that [`Mat4`] is row-major while `glam::Mat4` is column-major; the
//! conversions account for that.

pub mod error;
pub mod matrix;
pub mod quat;
pub mod transform;
pub mod vector;

pub use error::{MathError, MathResult};
pub use matrix::Mat4;
pub use quat::Quat;
pub use transform::Transform3D;
pub use vector::Vec3;
