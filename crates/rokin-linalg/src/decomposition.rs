use rokin_kernels::{lapack, level3, KernelError};

use crate::error::{svd_error, LinalgError, Result};
use crate::fixed::SINGULAR_DET_TOLERANCE;
use crate::matrix::{expect_len, expect_shape, Matrix};
use crate::workspace::Workspace;

/// Result of `P * A = L * U`.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    /// Unit lower triangular factor, `m x min(m, n)`.
    pub l: Matrix,
    /// Upper triangular factor, `min(m, n) x n`.
    pub u: Matrix,
    /// Row `i` of `P * A` is row `permutation[i]` of `A`.
    pub permutation: Vec<usize>,
    /// Number of row exchanges performed.
    pub swaps: usize,
}

impl LuDecomposition {
    /// Determinant of the factored square matrix.
    pub fn det(&self) -> f32 {
        let n = self.u.rows().min(self.u.cols());
        let prod: f32 = (0..n).map(|i| self.u.get(i, i)).product();
        if self.swaps % 2 == 0 {
            prod
        } else {
            -prod
        }
    }
}

/// Householder QR factors in packed form.
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    /// `R` on and above the diagonal, reflector vectors below it.
    pub factors: Matrix,
    /// Reflector scales.
    pub tau: Vec<f32>,
    /// Diagonal of `R`.
    pub diag: Vec<f32>,
    /// Whether a diagonal entry of `R` vanished.
    pub singular: bool,
}

impl QrDecomposition {
    /// Explicit orthogonal factor `Q`, `m x m`.
    pub fn q(&self) -> Result<Matrix> {
        let (m, n) = self.factors.shape();
        let mut q = Matrix::new(m, m);
        lapack::orgqr(m, m, n, self.factors.flat(), n, &self.tau, q.flat_mut(), m)?;
        Ok(q)
    }

    /// Upper triangular factor `R`, `n x n`.
    pub fn r(&self) -> Matrix {
        let n = self.factors.cols();
        let mut r = Matrix::new(n, n);
        for i in 0..n {
            for j in i..n {
                r.set(i, j, self.factors.get(i, j));
            }
        }
        r
    }

    /// Least squares solution of `A x = b`.
    ///
    /// # Errors
    ///
    /// `SingularMatrix` when `A` does not have full column rank.
    pub fn solve(&self, b: &[f32]) -> Result<Vec<f32>> {
        let (m, n) = self.factors.shape();
        expect_len("qr_solve", b.len(), m)?;
        if self.singular {
            return Err(LinalgError::SingularMatrix);
        }
        let mut qtb = b.to_vec();
        lapack::apply_qt(m, n, self.factors.flat(), n, &self.tau, &mut qtb)?;
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut v = qtb[i];
            for j in i + 1..n {
                v -= self.factors.get(i, j) * x[j];
            }
            x[i] = v / self.diag[i];
        }
        Ok(x)
    }
}

/// Thin singular value decomposition `A = U * diag(s) * Vᵀ`.
#[derive(Debug, Clone)]
pub struct SvdResult {
    /// Left singular vectors, `m x k` with `k = min(m, n)`.
    pub u: Matrix,
    /// Singular values in descending order.
    pub s: Vec<f32>,
    /// Transposed right singular vectors, `k x n`.
    pub vt: Matrix,
}

impl SvdResult {
    /// Computes `U * diag(s) * Vᵀ`.
    pub fn reconstruct(&self) -> Result<Matrix> {
        let mut us = self.u.clone();
        for i in 0..us.rows() {
            for (v, s) in us.row_mut(i).iter_mut().zip(&self.s) {
                *v *= s;
            }
        }
        let mut out = Matrix::new(self.u.rows(), self.vt.cols());
        out.mul(&us, &self.vt)?;
        Ok(out)
    }
}

impl Matrix {
    fn require_square(&self, op: &'static str) -> Result<usize> {
        if self.rows() != self.cols() {
            return Err(LinalgError::DimensionMismatch {
                op,
                expected: (self.rows(), self.rows()),
                actual: self.shape(),
            });
        }
        Ok(self.rows())
    }

    /// LU factorization with partial pivoting, `P * A = L * U`.
    ///
    /// # Errors
    ///
    /// `SingularMatrix` when elimination meets an exactly zero pivot.
    pub fn lu(&self) -> Result<LuDecomposition> {
        let (m, n) = self.shape();
        let k = m.min(n);
        let mut packed = self.flat().to_vec();
        let mut l = Matrix::new(m, k);
        let mut u = Matrix::new(k, n);
        let mut ipiv = vec![0; k];
        lapack::getrf(
            m,
            n,
            &mut packed,
            n.max(1),
            l.flat_mut(),
            k.max(1),
            u.flat_mut(),
            n.max(1),
            &mut ipiv,
        )?;

        let mut permutation: Vec<usize> = (0..m).collect();
        let mut swaps = 0;
        for (i, &p) in ipiv.iter().enumerate() {
            if p != i {
                permutation.swap(i, p);
                swaps += 1;
            }
        }
        Ok(LuDecomposition {
            l,
            u,
            permutation,
            swaps,
        })
    }

    /// Determinant of a square matrix.
    pub fn det(&self) -> Result<f32> {
        self.require_square("det")?;
        match self.lu() {
            Ok(lu) => Ok(lu.det()),
            Err(LinalgError::SingularMatrix) => Ok(0.0),
            Err(e) => Err(e),
        }
    }

    /// Writes the inverse of a square matrix into `dst`.
    ///
    /// # Errors
    ///
    /// `SingularMatrix` when a pivot is zero or `|det| < 1e-6`.
    pub fn inverse(&self, dst: &mut Matrix) -> Result<()> {
        self.inverse_in(dst, &mut Workspace::new())
    }

    /// Inverse using caller provided scratch for the LU factors.
    pub fn inverse_in(&self, dst: &mut Matrix, ws: &mut Workspace) -> Result<()> {
        let n = self.require_square("inverse")?;
        expect_shape("inverse", dst, n, n)?;
        let (packed, ipiv) = ws.floats_and_pivots(n * n, n);
        packed.copy_from_slice(self.flat());
        lapack::getrf_ip(n, n, packed, n.max(1), ipiv)?;

        let mut det = 1.0;
        for (i, &p) in ipiv.iter().enumerate() {
            det *= packed[i * n + i];
            if p != i {
                det = -det;
            }
        }
        if det.is_nan() || det.abs() < SINGULAR_DET_TOLERANCE {
            return Err(LinalgError::SingularMatrix);
        }
        lapack::getri(n, packed, n.max(1), ipiv, dst.flat_mut(), n.max(1))?;
        Ok(())
    }

    /// Householder QR factorization of a matrix with `rows >= cols`.
    pub fn qr_decompose(&self) -> Result<QrDecomposition> {
        let (m, n) = self.shape();
        if m < n {
            return Err(LinalgError::InvalidArgument("QR requires rows >= cols"));
        }
        let mut factors = self.clone();
        let mut tau = vec![0.0; n];
        lapack::geqrf(m, n, factors.flat_mut(), n.max(1), &mut tau)?;

        let diag: Vec<f32> = (0..n).map(|i| factors.get(i, i)).collect();
        let scale = diag.iter().fold(0.0f32, |acc, d| acc.max(d.abs()));
        let tol = scale * f32::EPSILON * m as f32;
        let singular = diag.iter().any(|d| d.abs() <= tol);
        Ok(QrDecomposition {
            factors,
            tau,
            diag,
            singular,
        })
    }

    /// Explicit `(Q, R)` with `Q` `m x m` and `R` `n x n`.
    pub fn qr(&self) -> Result<(Matrix, Matrix)> {
        let qr = self.qr_decompose()?;
        Ok((qr.q()?, qr.r()))
    }

    /// Thin singular value decomposition.
    ///
    /// Matrices with fewer rows than columns are decomposed through their
    /// transpose and the factors swapped back.
    ///
    /// # Errors
    ///
    /// `SvdNotConverged` when the QR sweeps hit their cap.
    pub fn svd(&self) -> Result<SvdResult> {
        let (m, n) = self.shape();
        if m == 0 || n == 0 {
            return Err(LinalgError::InvalidArgument("SVD of an empty matrix"));
        }
        let transposed = m < n;
        let src = if transposed {
            self.transposed()
        } else {
            self.clone()
        };
        let (p, q) = src.shape();

        let mut u = Matrix::new(p, q);
        let mut s = vec![0.0; q];
        let mut vt = Matrix::new(q, q);
        let mut work = vec![0.0; lapack::gesvd_work_len(p, q)];
        lapack::gesvd(
            p,
            q,
            src.flat(),
            q,
            &mut s,
            u.flat_mut(),
            q,
            vt.flat_mut(),
            q,
            &mut work,
        )
        .map_err(svd_error)?;

        if transposed {
            // Aᵀ = U S Vᵀ, hence A = V S Uᵀ
            Ok(SvdResult {
                u: vt.transposed(),
                s,
                vt: u.transposed(),
            })
        } else {
            Ok(SvdResult { u, s, vt })
        }
    }

    /// Writes the Moore–Penrose pseudo-inverse into `dst` (`cols x rows`).
    ///
    /// Returns the numerical rank. See [`Matrix::pseudo_inverse_in`].
    pub fn pseudo_inverse(&self, dst: &mut Matrix) -> Result<usize> {
        self.pseudo_inverse_in(dst, &mut Workspace::new())
    }

    /// Pseudo-inverse using caller provided scratch.
    ///
    /// Singular values at or below `max(1e-6, s_max * f32::EPSILON * max(m, n))`
    /// are treated as zero.
    pub fn pseudo_inverse_in(&self, dst: &mut Matrix, ws: &mut Workspace) -> Result<usize> {
        let (m, n) = self.shape();
        if m == 0 || n == 0 {
            return Err(LinalgError::InvalidArgument("pseudo-inverse of an empty matrix"));
        }
        expect_shape("pseudo_inverse", dst, n, m)?;
        let work = ws.floats(lapack::gepseu_work_len(m, n));
        let rank = lapack::gepseu(m, n, self.flat(), n, dst.flat_mut(), m, work).map_err(svd_error)?;
        Ok(rank)
    }

    /// Writes the damped least squares inverse `Aᵀ (A Aᵀ + λ² I)⁻¹` into `dst`.
    pub fn damped_least_squares(&self, lambda: f32, dst: &mut Matrix) -> Result<()> {
        self.damped_least_squares_in(lambda, dst, &mut Workspace::new())
    }

    /// Damped least squares inverse using caller provided scratch.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative or non-finite `lambda`,
    /// `NotPositiveDefinite` when `A Aᵀ + λ² I` cannot be factored.
    pub fn damped_least_squares_in(
        &self,
        lambda: f32,
        dst: &mut Matrix,
        ws: &mut Workspace,
    ) -> Result<()> {
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(LinalgError::InvalidArgument("damping must be finite and non-negative"));
        }
        let (m, n) = self.shape();
        if m == 0 || n == 0 {
            return Err(LinalgError::InvalidArgument("damped inverse of an empty matrix"));
        }
        expect_shape("damped_least_squares", dst, n, m)?;

        let (g, x) = ws.floats(m * m + m * n).split_at_mut(m * m);
        level3::gemm_nt(m, m, n, 1.0, self.flat(), n, self.flat(), n, 0.0, g, m)?;
        let l2 = lambda * lambda;
        for i in 0..m {
            g[i * m + i] += l2;
        }
        lapack::potrf(m, g, m)?;

        // X = G⁻¹ A, then dst = Xᵀ = Aᵀ G⁻¹ since G is symmetric
        x.copy_from_slice(self.flat());
        lapack::potrs(m, n, g, m, x, n)?;
        for i in 0..m {
            for j in 0..n {
                dst.set(j, i, x[i * n + j]);
            }
        }
        Ok(())
    }

    /// Writes the lower triangular Cholesky factor `L` with `A = L Lᵀ` into `dst`.
    ///
    /// # Errors
    ///
    /// `NotPositiveDefinite` when the matrix is not symmetric positive definite.
    pub fn cholesky(&self, dst: &mut Matrix) -> Result<()> {
        let n = self.require_square("cholesky")?;
        expect_shape("cholesky", dst, n, n)?;
        dst.flat_mut().copy_from_slice(self.flat());
        lapack::potrf(n, dst.flat_mut(), n.max(1)).map_err(|e| match e {
            KernelError::NotPositiveDefinite(_) => LinalgError::NotPositiveDefinite,
            other => other.into(),
        })
    }

    /// Solves `A x = b` for a symmetric positive definite `A`.
    pub fn cholesky_solve(&self, b: &[f32], x: &mut [f32]) -> Result<()> {
        let n = self.require_square("cholesky_solve")?;
        expect_len("cholesky_solve", b.len(), n)?;
        expect_len("cholesky_solve", x.len(), n)?;
        let mut l = Matrix::new(n, n);
        self.cholesky(&mut l)?;
        x.copy_from_slice(b);
        lapack::potrs(n, 1, l.flat(), n.max(1), x, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_matrix_eq(a: &Matrix, b: &Matrix, eps: f32) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.flat().iter().zip(b.flat()) {
            assert_relative_eq!(x, y, epsilon = eps);
        }
    }

    #[test]
    fn test_lu_reconstructs_permuted_rows() -> Result<()> {
        let a = Matrix::from_vec(3, 3, vec![2.0, 1.0, 1.0, 4.0, -6.0, 0.0, -2.0, 7.0, 2.0])?;
        let lu = a.lu()?;
        let mut prod = Matrix::new(3, 3);
        prod.mul(&lu.l, &lu.u)?;
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(prod.get(i, j), a.get(lu.permutation[i], j), epsilon = 1e-5);
            }
        }
        assert_relative_eq!(a.det()?, -16.0, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn test_det_of_singular_is_zero() -> Result<()> {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 4.0])?;
        assert_eq!(a.det()?, 0.0);
        let mut inv = Matrix::new(2, 2);
        assert_eq!(a.inverse(&mut inv), Err(LinalgError::SingularMatrix));
        Ok(())
    }

    #[test]
    fn test_inverse() -> Result<()> {
        let a = Matrix::from_vec(2, 2, vec![4.0, 7.0, 2.0, 6.0])?;
        let mut inv = Matrix::new(2, 2);
        a.inverse(&mut inv)?;
        let mut id = Matrix::new(2, 2);
        id.mul(&a, &inv)?;
        assert_matrix_eq(&id, &Matrix::eye(2), 1e-6);
        assert!(a.inverse(&mut Matrix::new(3, 3)).is_err());
        Ok(())
    }

    #[test]
    fn test_qr_and_least_squares() -> Result<()> {
        // fit y = 1 + 2 t through exact samples
        let a = Matrix::from_vec(4, 2, vec![1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0])?;
        let b = [1.0, 3.0, 5.0, 7.0];
        let qr = a.qr_decompose()?;
        assert!(!qr.singular);
        let x = qr.solve(&b)?;
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-5);

        let (q, r) = a.qr()?;
        assert_eq!(q.shape(), (4, 4));
        assert_eq!(r.shape(), (2, 2));
        assert_eq!(r.get(1, 0), 0.0);
        let mut q_thin = Matrix::new(4, 2);
        for i in 0..4 {
            q_thin.row_mut(i).copy_from_slice(&q.row(i)[..2]);
        }
        let mut qr_prod = Matrix::new(4, 2);
        qr_prod.mul(&q_thin, &r)?;
        assert_matrix_eq(&qr_prod, &a, 1e-5);

        assert!(Matrix::new(2, 3).qr_decompose().is_err());
        Ok(())
    }

    #[test]
    fn test_qr_flags_rank_deficiency() -> Result<()> {
        let a = Matrix::from_vec(3, 2, vec![1.0, 2.0, 2.0, 4.0, 3.0, 6.0])?;
        let qr = a.qr_decompose()?;
        assert!(qr.singular);
        assert_eq!(qr.solve(&[1.0, 2.0, 3.0]), Err(LinalgError::SingularMatrix));
        Ok(())
    }

    #[test]
    fn test_svd_wide_matrix() -> Result<()> {
        let a = Matrix::from_vec(2, 3, vec![3.0, 2.0, 2.0, 2.0, 3.0, -2.0])?;
        let svd = a.svd()?;
        assert_eq!(svd.u.shape(), (2, 2));
        assert_eq!(svd.vt.shape(), (2, 3));
        assert_relative_eq!(svd.s[0], 5.0, epsilon = 1e-5);
        assert_relative_eq!(svd.s[1], 3.0, epsilon = 1e-5);
        assert_matrix_eq(&svd.reconstruct()?, &a, 1e-5);
        Ok(())
    }

    #[test]
    fn test_pseudo_inverse_of_jacobian_shape() -> Result<()> {
        // planar two link jacobian at q = (0, π/2)
        let j = Matrix::from_vec(3, 2, vec![-1.0, -1.0, 1.0, 0.0, 0.0, 0.0])?;
        let mut pinv = Matrix::new(2, 3);
        let rank = j.pseudo_inverse(&mut pinv)?;
        assert_eq!(rank, 2);

        let mut jp = Matrix::new(3, 3);
        jp.mul(&j, &pinv)?;
        let mut jpj = Matrix::new(3, 2);
        jpj.mul(&jp, &j)?;
        assert_matrix_eq(&jpj, &j, 1e-5);
        assert!(j.pseudo_inverse(&mut Matrix::new(3, 2)).is_err());
        Ok(())
    }

    #[test]
    fn test_damped_least_squares_approaches_pseudo_inverse() -> Result<()> {
        let a = Matrix::from_vec(2, 3, vec![1.0, 0.0, 1.0, 0.0, 1.0, 1.0])?;
        let mut pinv = Matrix::new(3, 2);
        a.pseudo_inverse(&mut pinv)?;
        let mut ws = Workspace::new();
        let mut dls = Matrix::new(3, 2);
        a.damped_least_squares_in(1e-3, &mut dls, &mut ws)?;
        assert_matrix_eq(&dls, &pinv, 1e-4);

        // heavy damping shrinks the solution
        let mut damped = Matrix::new(3, 2);
        a.damped_least_squares_in(10.0, &mut damped, &mut ws)?;
        assert!(damped.norm() < pinv.norm());
        assert!(a.damped_least_squares(-1.0, &mut damped).is_err());
        Ok(())
    }

    #[test]
    fn test_damped_least_squares_rank_deficient() -> Result<()> {
        let a = Matrix::from_vec(3, 2, vec![0.0, 0.0, 2.0, 1.0, 0.0, 0.0])?;
        let mut dls = Matrix::new(2, 3);
        a.damped_least_squares(0.01, &mut dls)?;
        assert!(dls.flat().iter().all(|v| v.is_finite()));
        Ok(())
    }

    #[test]
    fn test_cholesky_solve() -> Result<()> {
        let a = Matrix::from_vec(2, 2, vec![4.0, 2.0, 2.0, 3.0])?;
        let mut x = [0.0; 2];
        a.cholesky_solve(&[10.0, 11.0], &mut x)?;
        let mut ax = [0.0; 2];
        a.mul_vec(&x, &mut ax)?;
        assert_relative_eq!(ax[0], 10.0, epsilon = 1e-4);
        assert_relative_eq!(ax[1], 11.0, epsilon = 1e-4);

        let mut l = Matrix::new(2, 2);
        a.cholesky(&mut l)?;
        assert_relative_eq!(l.get(1, 1), 2.0f32.sqrt(), epsilon = 1e-6);

        let indefinite = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 1.0])?;
        assert_eq!(indefinite.cholesky(&mut l), Err(LinalgError::NotPositiveDefinite));
        Ok(())
    }
}
