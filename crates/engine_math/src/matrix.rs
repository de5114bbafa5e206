//! 4×4 matrix.
//!
//! [`Mat4`] stores 16 floats in **row-major** order: element `(r, c)` lives at
//! index `r * 4 + c`. Transforms built here use the column-vector convention
//! (`M · v`, translation in column 3). [`Mat4::transform_point_row`] is the
//! row-vector form `vᵗ · M` and is kept as a separate operation.
//!
//! With column vectors, `A * B` applies `B` first.

use std::fmt;
use std::ops::{Index, Mul};

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};
use crate::quat::Quat;
use crate::vector::Vec3;

/// A 4×4 `f32` matrix in row-major layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    m: [f32; 16],
}

impl Mat4 {
    pub const ZERO: Self = Self { m: [0.0; 16] };

    pub const IDENTITY: Self = Self::from_array([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Builds a matrix from 16 row-major values.
    #[must_use]
    pub const fn from_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    #[must_use]
    pub const fn from_rows(r0: [f32; 4], r1: [f32; 4], r2: [f32; 4], r3: [f32; 4]) -> Self {
        Self::from_array([
            r0[0], r0[1], r0[2], r0[3], //
            r1[0], r1[1], r1[2], r1[3], //
            r2[0], r2[1], r2[2], r2[3], //
            r3[0], r3[1], r3[2], r3[3],
        ])
    }

    /// Flat index of element `(row, col)`.
    #[must_use]
    pub const fn index_of(row: usize, col: usize) -> usize {
        row * 4 + col
    }

    /// The 16 row-major values. This is the layout handed to renderers.
    #[must_use]
    pub const fn as_array(&self) -> &[f32; 16] {
        &self.m
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 16] {
        self.m
    }

    /// # Panics
    ///
    /// Panics if `row` or `col` is greater than 3.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < 4 && col < 4, "matrix index ({row}, {col}) out of range");
        self.m[Self::index_of(row, col)]
    }

    /// # Panics
    ///
    /// Panics if `row` or `col` is greater than 3.
    pub fn set_element(&mut self, row: usize, col: usize, value: f32) {
        assert!(row < 4 && col < 4, "matrix index ({row}, {col}) out of range");
        self.m[Self::index_of(row, col)] = value;
    }

    /// Replaces all 16 values from a row-major slice.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::InvalidArgument`] unless `values` holds exactly 16
    /// elements. The matrix is left unchanged on error.
    pub fn set(&mut self, values: &[f32]) -> MathResult<()> {
        let m: [f32; 16] = values.try_into().map_err(|_| MathError::InvalidArgument {
            expected: 16,
            actual: values.len(),
        })?;
        self.m = m;
        Ok(())
    }

    #[must_use]
    pub fn row(&self, row: usize) -> [f32; 4] {
        [self.get(row, 0), self.get(row, 1), self.get(row, 2), self.get(row, 3)]
    }

    #[must_use]
    pub fn col(&self, col: usize) -> [f32; 4] {
        [self.get(0, col), self.get(1, col), self.get(2, col), self.get(3, col)]
    }

    /// Writes `(xyz.x, xyz.y, xyz.z, w)` into `row`.
    pub fn set_row(&mut self, row: usize, xyz: Vec3, w: f32) {
        self.set_element(row, 0, xyz.x);
        self.set_element(row, 1, xyz.y);
        self.set_element(row, 2, xyz.z);
        self.set_element(row, 3, w);
    }

    /// Writes `(xyz.x, xyz.y, xyz.z, w)` down `col`.
    pub fn set_col(&mut self, col: usize, xyz: Vec3, w: f32) {
        self.set_element(0, col, xyz.x);
        self.set_element(1, col, xyz.y);
        self.set_element(2, col, xyz.z);
        self.set_element(3, col, w);
    }

    /// Diagonal scale matrix.
    #[must_use]
    pub const fn from_scale(s: Vec3) -> Self {
        Self::from_rows(
            [s.x, 0.0, 0.0, 0.0],
            [0.0, s.y, 0.0, 0.0],
            [0.0, 0.0, s.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Identity with `t` in the translation column.
    #[must_use]
    pub const fn from_translation(t: Vec3) -> Self {
        Self::from_rows(
            [1.0, 0.0, 0.0, t.x],
            [0.0, 1.0, 0.0, t.y],
            [0.0, 0.0, 1.0, t.z],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Rotation matrix of a unit quaternion.
    #[must_use]
    pub fn from_rotation(q: Quat) -> Self {
        Self::from_rigidbody(q, Vec3::ZERO)
    }

    #[must_use]
    pub fn from_euler(angles: Vec3) -> Self {
        Self::from_rotation(Quat::from_euler(angles))
    }

    /// Rotation by `q` followed by translation by `t` (no scale).
    #[must_use]
    pub fn from_rigidbody(q: Quat, t: Vec3) -> Self {
        let Quat { x, y, z, w } = q;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Self::from_rows(
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy), t.x],
            [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx), t.y],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy), t.z],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// `T · R · S`: scale, then rotate, then translate.
    #[must_use]
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self::from_rigidbody(rotation, translation) * Self::from_scale(scale)
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut out = Self::ZERO;
        for r in 0..4 {
            for c in 0..4 {
                out.m[Self::index_of(r, c)] = self.m[Self::index_of(c, r)];
            }
        }
        out
    }

    /// Column-vector point transform `M · (v, 1)`, keeping the first three rows.
    #[must_use]
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        let row = |r: usize| {
            self.get(r, 0) * v.x + self.get(r, 1) * v.y + self.get(r, 2) * v.z + self.get(r, 3)
        };
        Vec3::new(row(0), row(1), row(2))
    }

    /// Row-vector point transform `(v, 1)ᵗ · M`, keeping the first three columns.
    #[must_use]
    pub fn transform_point_row(&self, v: Vec3) -> Vec3 {
        let col = |c: usize| {
            v.x * self.get(0, c) + v.y * self.get(1, c) + v.z * self.get(2, c) + self.get(3, c)
        };
        Vec3::new(col(0), col(1), col(2))
    }

    /// Column-vector direction transform `M · (v, 0)`; translation is ignored.
    #[must_use]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let row = |r: usize| self.get(r, 0) * v.x + self.get(r, 1) * v.y + self.get(r, 2) * v.z;
        Vec3::new(row(0), row(1), row(2))
    }

    /// The translation column.
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.get(0, 3), self.get(1, 3), self.get(2, 3))
    }

    #[must_use]
    pub fn abs_diff_eq(&self, rhs: &Self, max_abs_diff: f32) -> bool {
        self.m
            .iter()
            .zip(rhs.m.iter())
            .all(|(a, b)| (a - b).abs() <= max_abs_diff)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(row < 4 && col < 4, "matrix index ({row}, {col}) out of range");
        &self.m[Self::index_of(row, col)]
    }
}

impl Mul for Mat4 {
    type Output = Self;

    /// `result[i][j] = Σ_k self[i][k] · rhs[k][j]`.
    fn mul(self, rhs: Self) -> Self {
        let mut out = Self::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                out.m[Self::index_of(i, j)] = (0..4)
                    .map(|k| self.m[Self::index_of(i, k)] * rhs.m[Self::index_of(k, j)])
                    .sum();
            }
        }
        out
    }
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            let [a, b, c, d] = self.row(r);
            writeln!(f, "[{a:>10.4} {b:>10.4} {c:>10.4} {d:>10.4}]")?;
        }
        Ok(())
    }
}

// glam stores matrices column-major, so its column array is our row array
// of the transpose.
impl From<Mat4> for glam::Mat4 {
    fn from(m: Mat4) -> Self {
        glam::Mat4::from_cols_array(&m.m).transpose()
    }
}

impl From<glam::Mat4> for Mat4 {
    fn from(m: glam::Mat4) -> Self {
        Mat4::from_array(m.transpose().to_cols_array())
    }
}
