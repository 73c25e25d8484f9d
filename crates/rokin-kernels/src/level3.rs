use crate::error::KernelError;
use crate::level2::check_mat;

#[derive(Clone, Copy)]
enum Op {
    N,
    T,
}

fn gemm(
    ta: Op,
    tb: Op,
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    beta: f32,
    c: &mut [f32],
    ldc: usize,
) -> Result<(), KernelError> {
    match ta {
        Op::N => check_mat(m, k, a, lda)?,
        Op::T => check_mat(k, m, a, lda)?,
    }
    match tb {
        Op::N => check_mat(k, n, b, ldb)?,
        Op::T => check_mat(n, k, b, ldb)?,
    }
    check_mat(m, n, c, ldc)?;

    for i in 0..m {
        let row = &mut c[i * ldc..i * ldc + n];
        if beta == 0.0 {
            row.fill(0.0);
        } else if beta != 1.0 {
            row.iter_mut().for_each(|v| *v *= beta);
        }
    }
    if alpha == 0.0 || k == 0 {
        return Ok(());
    }

    for i in 0..m {
        for p in 0..k {
            let aip = match ta {
                Op::N => a[i * lda + p],
                Op::T => a[p * lda + i],
            };
            if aip == 0.0 {
                continue;
            }
            let s = alpha * aip;
            let crow = &mut c[i * ldc..i * ldc + n];
            match tb {
                Op::N => {
                    let brow = &b[p * ldb..p * ldb + n];
                    crow.iter_mut().zip(brow).for_each(|(cij, bpj)| *cij += s * bpj);
                }
                Op::T => {
                    for (j, cij) in crow.iter_mut().enumerate() {
                        *cij += s * b[j * ldb + p];
                    }
                }
            }
        }
    }
    Ok(())
}

/// Computes `C = alpha * A * B + beta * C`.
///
/// `A` is `m x k`, `B` is `k x n` and `C` is `m x n`, all row-major. When
/// `beta` is zero `C` is overwritten.
///
/// Example:
/// ```
/// use rokin_kernels::level3::gemm_nn;
///
/// let a = [1.0, 2.0, 3.0, 4.0];
/// let b = [5.0, 6.0, 7.0, 8.0];
/// let mut c = [0.0; 4];
/// gemm_nn(2, 2, 2, 1.0, &a, 2, &b, 2, 0.0, &mut c, 2).unwrap();
/// assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
/// ```
pub fn gemm_nn(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    beta: f32,
    c: &mut [f32],
    ldc: usize,
) -> Result<(), KernelError> {
    gemm(Op::N, Op::N, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
}

/// Computes `C = alpha * A * Bᵀ + beta * C`, with `B` stored as `n x k`.
pub fn gemm_nt(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    beta: f32,
    c: &mut [f32],
    ldc: usize,
) -> Result<(), KernelError> {
    gemm(Op::N, Op::T, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
}

/// Computes `C = alpha * Aᵀ * B + beta * C`, with `A` stored as `k x m`.
pub fn gemm_tn(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    beta: f32,
    c: &mut [f32],
    ldc: usize,
) -> Result<(), KernelError> {
    gemm(Op::T, Op::N, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
}

/// Computes `C = alpha * Aᵀ * Bᵀ + beta * C`, with `A` stored as `k x m` and `B` as `n x k`.
pub fn gemm_tt(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    beta: f32,
    c: &mut [f32],
    ldc: usize,
) -> Result<(), KernelError> {
    gemm(Op::T, Op::T, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A is 2x3, B is 3x2
    const A: [f32; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    const B: [f32; 6] = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
    const AB: [f32; 4] = [58.0, 64.0, 139.0, 154.0];

    fn transpose(src: &[f32], rows: usize, cols: usize) -> Vec<f32> {
        let mut out = vec![0.0; rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                out[j * rows + i] = src[i * cols + j];
            }
        }
        out
    }

    #[test]
    fn test_gemm_variants_agree() -> Result<(), KernelError> {
        let at = transpose(&A, 2, 3);
        let bt = transpose(&B, 3, 2);

        let mut c = [0.0; 4];
        gemm_nn(2, 2, 3, 1.0, &A, 3, &B, 2, 0.0, &mut c, 2)?;
        assert_eq!(c, AB);

        let mut c = [0.0; 4];
        gemm_nt(2, 2, 3, 1.0, &A, 3, &bt, 3, 0.0, &mut c, 2)?;
        assert_eq!(c, AB);

        let mut c = [0.0; 4];
        gemm_tn(2, 2, 3, 1.0, &at, 2, &B, 2, 0.0, &mut c, 2)?;
        assert_eq!(c, AB);

        let mut c = [0.0; 4];
        gemm_tt(2, 2, 3, 1.0, &at, 2, &bt, 3, 0.0, &mut c, 2)?;
        assert_eq!(c, AB);
        Ok(())
    }

    #[test]
    fn test_gemm_alpha_beta() -> Result<(), KernelError> {
        let mut c = [1.0; 4];
        gemm_nn(2, 2, 3, 2.0, &A, 3, &B, 2, -1.0, &mut c, 2)?;
        assert_eq!(c, [115.0, 127.0, 277.0, 307.0]);
        Ok(())
    }

    #[test]
    fn test_gemm_short_output() {
        let mut c = [0.0; 3];
        let res = gemm_nn(2, 2, 3, 1.0, &A, 3, &B, 2, 0.0, &mut c, 2);
        assert_eq!(res, Err(KernelError::LengthMismatch(4, 3)));
    }
}
