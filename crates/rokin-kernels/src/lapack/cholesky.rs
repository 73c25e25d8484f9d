use crate::error::KernelError;
use crate::level2::check_mat;

/// Computes the Cholesky factorization `A = L * Lᵀ` of a symmetric positive definite matrix.
///
/// Only the lower triangle of `a` is read. On return it holds `L` and the
/// strict upper triangle is zeroed.
///
/// # Errors
///
/// `NotPositiveDefinite(k)` when the leading minor of order `k` is not positive.
pub fn potrf(n: usize, a: &mut [f32], lda: usize) -> Result<(), KernelError> {
    check_mat(n, n, a, lda)?;
    for j in 0..n {
        let mut d = a[j * lda + j];
        for k in 0..j {
            d -= a[j * lda + k] * a[j * lda + k];
        }
        if d.is_nan() || d <= 0.0 {
            return Err(KernelError::NotPositiveDefinite(j + 1));
        }
        let ljj = d.sqrt();
        a[j * lda + j] = ljj;
        for i in j + 1..n {
            let mut v = a[i * lda + j];
            for k in 0..j {
                v -= a[i * lda + k] * a[j * lda + k];
            }
            a[i * lda + j] = v / ljj;
        }
        for k in j + 1..n {
            a[j * lda + k] = 0.0;
        }
    }
    Ok(())
}

/// Solves `A * X = B` given the Cholesky factor `L` computed by [`potrf`].
///
/// `b` is `n x nrhs` and is overwritten with `X`.
pub fn potrs(
    n: usize,
    nrhs: usize,
    l: &[f32],
    ldl: usize,
    b: &mut [f32],
    ldb: usize,
) -> Result<(), KernelError> {
    check_mat(n, n, l, ldl)?;
    check_mat(n, nrhs, b, ldb)?;

    // L * Y = B
    for i in 0..n {
        for c in 0..nrhs {
            let mut v = b[i * ldb + c];
            for k in 0..i {
                v -= l[i * ldl + k] * b[k * ldb + c];
            }
            b[i * ldb + c] = v / l[i * ldl + i];
        }
    }
    // Lᵀ * X = Y
    for i in (0..n).rev() {
        for c in 0..nrhs {
            let mut v = b[i * ldb + c];
            for k in i + 1..n {
                v -= l[k * ldl + i] * b[k * ldb + c];
            }
            b[i * ldb + c] = v / l[i * ldl + i];
        }
    }
    Ok(())
}
