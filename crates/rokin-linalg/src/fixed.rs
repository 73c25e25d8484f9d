//! Fixed-size row-major matrices.
//!
//! Shapes are part of the type, so products and element-wise operations
//! between incompatible matrices do not compile. Rotation and translation
//! helpers are available on every shape that contains a 3x3 block.

use std::ops::{AddAssign, Index, IndexMut, Mul, MulAssign, SubAssign};

use rokin_kernels::lapack;

use crate::error::{LinalgError, Result};
use crate::quaternion::Quaternion;
use crate::vector::Vector3;

/// Determinants with a smaller magnitude are considered singular.
pub const SINGULAR_DET_TOLERANCE: f32 = 1e-6;

/// A dense `R x C` matrix of `f32` stored row-major on the stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMat<const R: usize, const C: usize>(pub [[f32; C]; R]);

/// 2x2 matrix.
pub type Matrix2x2 = FixedMat<2, 2>;
/// 3x3 matrix, typically a rotation.
pub type Matrix3x3 = FixedMat<3, 3>;
/// 3x4 matrix, typically a `[R | t]` pose.
pub type Matrix3x4 = FixedMat<3, 4>;
/// 4x3 matrix.
pub type Matrix4x3 = FixedMat<4, 3>;
/// 4x4 matrix, typically a homogeneous transform.
pub type Matrix4x4 = FixedMat<4, 4>;

impl<const R: usize, const C: usize> Default for FixedMat<R, C> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const R: usize, const C: usize> FixedMat<R, C> {
    /// Matrix of zeros.
    pub const fn zeros() -> Self {
        Self([[0.0; C]; R])
    }

    /// Ones on the main diagonal, zeros elsewhere.
    pub fn eye() -> Self {
        let mut m = Self::zeros();
        for i in 0..R.min(C) {
            m.0[i][i] = 1.0;
        }
        m
    }

    /// Matrix from its rows.
    pub const fn from_rows(rows: [[f32; C]; R]) -> Self {
        Self(rows)
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        R
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        C
    }

    /// Element at `(r, c)`.
    pub fn get(&self, r: usize, c: usize) -> f32 {
        self.0[r][c]
    }

    /// Sets the element at `(r, c)`.
    pub fn set(&mut self, r: usize, c: usize, v: f32) {
        self.0[r][c] = v;
    }

    /// Copy of row `r`.
    pub fn row(&self, r: usize) -> [f32; C] {
        self.0[r]
    }

    /// Copy of column `c`.
    pub fn col(&self, c: usize) -> [f32; R] {
        std::array::from_fn(|r| self.0[r][c])
    }

    /// Overwrites row `r`.
    pub fn set_row(&mut self, r: usize, v: [f32; C]) {
        self.0[r] = v;
    }

    /// Overwrites column `c`.
    pub fn set_col(&mut self, c: usize, v: [f32; R]) {
        for (row, x) in self.0.iter_mut().zip(v) {
            row[c] = x;
        }
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> FixedMat<C, R> {
        FixedMat(std::array::from_fn(|c| self.col(c)))
    }

    /// Divides every element by `c` in place.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `c` is zero.
    pub fn div_c(&mut self, c: f32) -> Result<()> {
        if c == 0.0 {
            return Err(LinalgError::InvalidArgument("division by zero"));
        }
        *self *= 1.0 / c;
        Ok(())
    }

    /// `A * v`.
    pub fn mul_vec(&self, v: &[f32; C]) -> [f32; R] {
        std::array::from_fn(|r| self.0[r].iter().zip(v).map(|(a, b)| a * b).sum())
    }

    /// `Aᵀ * v`.
    pub fn mul_vec_t(&self, v: &[f32; R]) -> [f32; C] {
        std::array::from_fn(|c| (0..R).map(|r| self.0[r][c] * v[r]).sum())
    }

    /// The contiguous row-major storage.
    pub fn flat(&self) -> &[f32] {
        self.0.as_flattened()
    }

    /// The contiguous row-major storage, mutable.
    pub fn flat_mut(&mut self) -> &mut [f32] {
        self.0.as_flattened_mut()
    }
}

impl<const R: usize, const C: usize, const K: usize> Mul<FixedMat<C, K>> for FixedMat<R, C> {
    type Output = FixedMat<R, K>;

    fn mul(self, rhs: FixedMat<C, K>) -> FixedMat<R, K> {
        let mut out = FixedMat::<R, K>::zeros();
        for i in 0..R {
            for j in 0..K {
                let mut sum = 0.0;
                for k in 0..C {
                    sum += self.0[i][k] * rhs.0[k][j];
                }
                out.0[i][j] = sum;
            }
        }
        out
    }
}

impl<const R: usize, const C: usize> AddAssign for FixedMat<R, C> {
    fn add_assign(&mut self, rhs: Self) {
        self.flat_mut()
            .iter_mut()
            .zip(rhs.flat())
            .for_each(|(a, b)| *a += b);
    }
}

impl<const R: usize, const C: usize> SubAssign for FixedMat<R, C> {
    fn sub_assign(&mut self, rhs: Self) {
        self.flat_mut()
            .iter_mut()
            .zip(rhs.flat())
            .for_each(|(a, b)| *a -= b);
    }
}

impl<const R: usize, const C: usize> MulAssign<f32> for FixedMat<R, C> {
    fn mul_assign(&mut self, rhs: f32) {
        self.flat_mut().iter_mut().for_each(|a| *a *= rhs);
    }
}

impl<const R: usize, const C: usize> Index<(usize, usize)> for FixedMat<R, C> {
    type Output = f32;

    fn index(&self, (r, c): (usize, usize)) -> &f32 {
        &self.0[r][c]
    }
}

impl<const R: usize, const C: usize> IndexMut<(usize, usize)> for FixedMat<R, C> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f32 {
        &mut self.0[r][c]
    }
}

impl<const N: usize> FixedMat<N, N> {
    /// Determinant by Gaussian elimination with partial pivoting on a copy.
    pub fn det(&self) -> f32 {
        let mut a = self.0;
        let mut det = 1.0;
        for k in 0..N {
            let mut p = k;
            for i in k + 1..N {
                if a[i][k].abs() > a[p][k].abs() {
                    p = i;
                }
            }
            if a[p][k] == 0.0 {
                return 0.0;
            }
            if p != k {
                a.swap(p, k);
                det = -det;
            }
            det *= a[k][k];
            for i in k + 1..N {
                let f = a[i][k] / a[k][k];
                for j in k..N {
                    a[i][j] -= f * a[k][j];
                }
            }
        }
        det
    }

    /// The main diagonal.
    pub fn diagonal(&self) -> [f32; N] {
        std::array::from_fn(|i| self.0[i][i])
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> f32 {
        (0..N).map(|i| self.0[i][i]).sum()
    }
}

fn check_det(det: f32) -> Result<()> {
    if det.is_nan() || det.abs() < SINGULAR_DET_TOLERANCE {
        return Err(LinalgError::SingularMatrix);
    }
    Ok(())
}

impl Matrix2x2 {
    /// Closed-form inverse.
    ///
    /// # Errors
    ///
    /// `SingularMatrix` when `|det| < 1e-6`.
    pub fn inverse(&self) -> Result<Self> {
        let [[a, b], [c, d]] = self.0;
        let det = a * d - b * c;
        check_det(det)?;
        let inv = 1.0 / det;
        Ok(Self([[d * inv, -b * inv], [-c * inv, a * inv]]))
    }
}

impl Matrix3x3 {
    /// Closed-form inverse via the adjugate.
    ///
    /// # Errors
    ///
    /// `SingularMatrix` when `|det| < 1e-6`.
    pub fn inverse(&self) -> Result<Self> {
        let m = &self.0;
        let c00 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
        let c01 = m[1][2] * m[2][0] - m[1][0] * m[2][2];
        let c02 = m[1][0] * m[2][1] - m[1][1] * m[2][0];
        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02;
        check_det(det)?;
        let inv = 1.0 / det;
        Ok(Self([
            [
                c00 * inv,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv,
            ],
            [
                c01 * inv,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv,
            ],
            [
                c02 * inv,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv,
            ],
        ]))
    }
}

impl Matrix4x4 {
    /// Inverse by LU factorization with forward and back substitution.
    ///
    /// # Errors
    ///
    /// `SingularMatrix` when a pivot is zero or `|det| < 1e-6`.
    pub fn inverse(&self) -> Result<Self> {
        let mut lu = self.0;
        let mut ipiv = [0usize; 4];
        lapack::getrf_ip(4, 4, lu.as_flattened_mut(), 4, &mut ipiv)?;

        let mut det = 1.0;
        for (k, &p) in ipiv.iter().enumerate() {
            det *= lu[k][k];
            if p != k {
                det = -det;
            }
        }
        check_det(det)?;

        let mut out = Self::zeros();
        lapack::getri(4, lu.as_flattened(), 4, &ipiv, out.flat_mut(), 4)?;
        Ok(out)
    }

    /// Rigid transform `[R | t; 0 0 0 1]`.
    pub fn homogenous(r: &Matrix3x3, t: Vector3) -> Self {
        let mut m = Self::eye();
        m.set_rotation(r);
        m.set_translation(t);
        m
    }

    /// Inverse of a rigid transform, `[Rᵀ | -Rᵀ t; 0 0 0 1]`.
    ///
    /// Only valid when the top-left block is a rotation; use
    /// [`Matrix4x4::inverse`] for general matrices.
    pub fn homogenous_inverse(&self) -> Self {
        let rt = self.get_rotation().transpose();
        let t = rt.mul_vec(&self.get_translation().to_array());
        Self::homogenous(&rt, -Vector3::from(t))
    }

    /// Applies the transform to a point.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let v = self.mul_vec(&[p.x, p.y, p.z, 1.0]);
        Vector3::new(v[0], v[1], v[2])
    }
}

macro_rules! impl_spatial {
    ($r:literal, $c:literal) => {
        impl FixedMat<$r, $c> {
            fn write_block(&mut self, b: [[f32; 3]; 3]) {
                for (row, src) in self.0.iter_mut().zip(b) {
                    row[..3].copy_from_slice(&src);
                }
            }

            /// Writes a rotation of `a` radians about x into the 3x3 block.
            pub fn rotation_x(&mut self, a: f32) -> &mut Self {
                let (s, c) = a.sin_cos();
                self.write_block([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]);
                self
            }

            /// Writes a rotation of `a` radians about y into the 3x3 block.
            pub fn rotation_y(&mut self, a: f32) -> &mut Self {
                let (s, c) = a.sin_cos();
                self.write_block([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]]);
                self
            }

            /// Writes a rotation of `a` radians about z into the 3x3 block.
            pub fn rotation_z(&mut self, a: f32) -> &mut Self {
                let (s, c) = a.sin_cos();
                self.write_block([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]);
                self
            }

            /// Writes the rotation of a unit quaternion into the 3x3 block.
            pub fn orientation(&mut self, q: &Quaternion) -> &mut Self {
                self.write_block(q.to_rotation_rows());
                self
            }

            /// Quaternion of the 3x3 block.
            pub fn quaternion(&self) -> Quaternion {
                Quaternion::from_rotation_rows(&self.get_rotation().0)
            }

            /// Overwrites the 3x3 block.
            pub fn set_rotation(&mut self, r: &Matrix3x3) -> &mut Self {
                self.write_block(r.0);
                self
            }

            /// Copy of the 3x3 block.
            pub fn get_rotation(&self) -> Matrix3x3 {
                FixedMat(std::array::from_fn(|i| {
                    std::array::from_fn(|j| self.0[i][j])
                }))
            }

            /// First three entries of column `i`.
            pub fn col3d(&self, i: usize) -> Vector3 {
                Vector3::new(self.0[0][i], self.0[1][i], self.0[2][i])
            }
        }
    };
}

impl_spatial!(3, 3);
impl_spatial!(3, 4);
impl_spatial!(4, 3);
impl_spatial!(4, 4);

macro_rules! impl_translation {
    ($r:literal) => {
        impl FixedMat<$r, 4> {
            /// Writes `t` into the first three entries of column 3.
            pub fn set_translation(&mut self, t: Vector3) -> &mut Self {
                self.0[0][3] = t.x;
                self.0[1][3] = t.y;
                self.0[2][3] = t.z;
                self
            }

            /// First three entries of column 3.
            pub fn get_translation(&self) -> Vector3 {
                self.col3d(3)
            }
        }
    };
}

impl_translation!(3);
impl_translation!(4);

impl From<glam::Mat3> for Matrix3x3 {
    fn from(m: glam::Mat3) -> Self {
        FixedMat(m.transpose().to_cols_array_2d())
    }
}

impl From<Matrix3x3> for glam::Mat3 {
    fn from(m: Matrix3x3) -> Self {
        glam::Mat3::from_cols_array_2d(&m.0).transpose()
    }
}

impl From<glam::Mat4> for Matrix4x4 {
    fn from(m: glam::Mat4) -> Self {
        FixedMat(m.transpose().to_cols_array_2d())
    }
}

impl From<Matrix4x4> for glam::Mat4 {
    fn from(m: Matrix4x4) -> Self {
        glam::Mat4::from_cols_array_2d(&m.0).transpose()
    }
}
