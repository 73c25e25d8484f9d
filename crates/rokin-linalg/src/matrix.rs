use std::ops::{Index, IndexMut};

use rokin_kernels::{level2, level3};

use crate::error::{LinalgError, Result};
use crate::fixed::FixedMat;
use crate::rows::flatten_rows;

/// A dense row-major matrix whose shape is known at runtime.
///
/// The elements live in one contiguous buffer, so [`Matrix::flat`] is always
/// a zero-copy view suitable for the BLAS kernels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

pub(crate) fn expect_shape(op: &'static str, m: &Matrix, rows: usize, cols: usize) -> Result<()> {
    if m.shape() != (rows, cols) {
        return Err(LinalgError::DimensionMismatch {
            op,
            expected: (rows, cols),
            actual: m.shape(),
        });
    }
    Ok(())
}

pub(crate) fn expect_len(op: &'static str, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(LinalgError::DimensionMismatch {
            op,
            expected: (expected, 1),
            actual: (len, 1),
        });
    }
    Ok(())
}

impl Matrix {
    /// Create a `rows x cols` matrix of zeros.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create the `n x n` identity.
    pub fn eye(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Wrap a row-major buffer.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LinalgError::InvalidArgument(
                "buffer length does not match rows * cols",
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from independent row slices.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the rows have different lengths.
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self> {
        let flat = flatten_rows(rows, None)?;
        let cols = rows.first().map_or(0, |r| r.len());
        Self::from_vec(rows.len(), cols, flat.into_owned())
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Reshape to `rows x cols` and zero every element.
    ///
    /// The buffer is reused when its capacity allows.
    pub fn reset(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.data.clear();
        self.data.resize(rows * cols, 0.0);
    }

    /// The contiguous row-major storage.
    pub fn flat(&self) -> &[f32] {
        &self.data
    }

    /// The contiguous row-major storage, mutable.
    pub fn flat_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the matrix and returns its storage.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Row `i` as a mutable slice.
    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterator over the rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Copy of column `j`.
    pub fn col(&self, j: usize) -> Vec<f32> {
        (0..self.rows).map(|i| self.data[i * self.cols + j]).collect()
    }

    /// Overwrites column `j`.
    pub fn set_col(&mut self, j: usize, v: &[f32]) -> Result<()> {
        expect_len("set_col", v.len(), self.rows)?;
        for (i, x) in v.iter().enumerate() {
            self.data[i * self.cols + j] = *x;
        }
        Ok(())
    }

    /// Element at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.cols + j]
    }

    /// Sets the element at `(i, j)`.
    pub fn set(&mut self, i: usize, j: usize, v: f32) {
        self.data[i * self.cols + j] = v;
    }

    /// `self += other`, element-wise.
    pub fn add(&mut self, other: &Matrix) -> Result<()> {
        expect_shape("add", other, self.rows, self.cols)?;
        self.data
            .iter_mut()
            .zip(&other.data)
            .for_each(|(a, b)| *a += b);
        Ok(())
    }

    /// `self -= other`, element-wise.
    pub fn sub(&mut self, other: &Matrix) -> Result<()> {
        expect_shape("sub", other, self.rows, self.cols)?;
        self.data
            .iter_mut()
            .zip(&other.data)
            .for_each(|(a, b)| *a -= b);
        Ok(())
    }

    /// Multiplies every element by `c`.
    pub fn mul_c(&mut self, c: f32) {
        self.data.iter_mut().for_each(|a| *a *= c);
    }

    /// Divides every element by `c`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `c` is zero.
    pub fn div_c(&mut self, c: f32) -> Result<()> {
        if c == 0.0 {
            return Err(LinalgError::InvalidArgument("division by zero"));
        }
        self.mul_c(1.0 / c);
        Ok(())
    }

    /// `self = a * b`.
    ///
    /// `self` must already be `a.rows() x b.cols()`.
    pub fn mul(&mut self, a: &Matrix, b: &Matrix) -> Result<()> {
        if a.cols != b.rows {
            return Err(LinalgError::DimensionMismatch {
                op: "mul",
                expected: (a.cols, b.cols),
                actual: b.shape(),
            });
        }
        expect_shape("mul", self, a.rows, b.cols)?;
        let (m, n, k) = (a.rows, b.cols, a.cols);
        level3::gemm_nn(
            m,
            n,
            k,
            1.0,
            &a.data,
            k.max(1),
            &b.data,
            n.max(1),
            0.0,
            &mut self.data,
            n.max(1),
        )?;
        Ok(())
    }

    /// `y = self * x`.
    pub fn mul_vec(&self, x: &[f32], y: &mut [f32]) -> Result<()> {
        expect_len("mul_vec", x.len(), self.cols)?;
        expect_len("mul_vec", y.len(), self.rows)?;
        level2::gemv_n(
            self.rows,
            self.cols,
            1.0,
            &self.data,
            self.cols.max(1),
            x,
            1,
            0.0,
            y,
            1,
        )?;
        Ok(())
    }

    /// `y = selfᵀ * x`.
    pub fn mul_vec_t(&self, x: &[f32], y: &mut [f32]) -> Result<()> {
        expect_len("mul_vec_t", x.len(), self.rows)?;
        expect_len("mul_vec_t", y.len(), self.cols)?;
        level2::gemv_t(
            self.rows,
            self.cols,
            1.0,
            &self.data,
            self.cols.max(1),
            x,
            1,
            0.0,
            y,
            1,
        )?;
        Ok(())
    }

    /// Rank-1 update `self += alpha * x * yᵀ`.
    pub fn add_outer(&mut self, alpha: f32, x: &[f32], y: &[f32]) -> Result<()> {
        expect_len("add_outer", x.len(), self.rows)?;
        expect_len("add_outer", y.len(), self.cols)?;
        let ld = self.cols.max(1);
        level2::ger(self.rows, self.cols, alpha, x, 1, y, 1, &mut self.data, ld)?;
        Ok(())
    }

    /// Writes `selfᵀ` into `dst`, which must be `cols x rows`.
    pub fn transpose(&self, dst: &mut Matrix) -> Result<()> {
        expect_shape("transpose", dst, self.cols, self.rows)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                dst.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Ok(())
    }

    /// Returns `selfᵀ` as a new matrix.
    pub fn transposed(&self) -> Matrix {
        let mut out = Matrix::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        out
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        &mut self.data[i * self.cols + j]
    }
}

impl<const R: usize, const C: usize> From<&FixedMat<R, C>> for Matrix {
    fn from(m: &FixedMat<R, C>) -> Self {
        Self {
            rows: R,
            cols: C,
            data: m.flat().to_vec(),
        }
    }
}
