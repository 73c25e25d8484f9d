use super::{pytag, sign};
use crate::error::{ensure_len, KernelError};
use crate::level1::nrm2;
use crate::level2::check_mat;

/// Applies the reflector stored in column `j` of `a` to columns `c0..c1` of `b`.
///
/// The reflector is `H = I - tau * v * vᵀ` with `v[j] = 1` implied and
/// `v[j + 1..m]` read from `a`.
fn apply_reflector(
    m: usize,
    j: usize,
    a: &[f32],
    lda: usize,
    tau: f32,
    b: &mut [f32],
    ldb: usize,
    cols: std::ops::Range<usize>,
) {
    if tau == 0.0 {
        return;
    }
    for c in cols {
        let mut w = b[j * ldb + c];
        for i in j + 1..m {
            w += a[i * lda + j] * b[i * ldb + c];
        }
        if w == 0.0 {
            continue;
        }
        let tw = tau * w;
        b[j * ldb + c] -= tw;
        for i in j + 1..m {
            b[i * ldb + c] -= tw * a[i * lda + j];
        }
    }
}

/// Computes the Householder QR factorization of an `m x n` matrix in place.
///
/// On return the upper triangle of `a` holds `R` and the entries below the
/// diagonal hold the essential part of each reflector `v` (with `v[j] = 1`
/// implied). `tau` receives the `min(m, n)` reflector scales so that
/// `Q = H(0) * H(1) * ... * H(k - 1)` with `H(j) = I - tau[j] * v * vᵀ`.
pub fn geqrf(
    m: usize,
    n: usize,
    a: &mut [f32],
    lda: usize,
    tau: &mut [f32],
) -> Result<(), KernelError> {
    check_mat(m, n, a, lda)?;
    let k = m.min(n);
    ensure_len(tau.len(), k)?;

    for j in 0..k {
        let alpha = a[j * lda + j];
        let xnorm = if j + 1 < m {
            nrm2(m - j - 1, &a[(j + 1) * lda + j..], lda)?
        } else {
            0.0
        };
        if xnorm == 0.0 {
            tau[j] = 0.0;
            continue;
        }
        let beta = -sign(pytag(alpha, xnorm), alpha);
        tau[j] = (beta - alpha) / beta;
        let scale = 1.0 / (alpha - beta);
        for i in j + 1..m {
            a[i * lda + j] *= scale;
        }
        a[j * lda + j] = beta;

        apply_reflector_in_place(m, j, a, lda, tau[j], j + 1..n);
    }
    Ok(())
}

/// Same as [`apply_reflector`] when the reflector and the target share a buffer.
///
/// Column `j` is never part of `cols`, so reads of `v` are unaffected by the update.
fn apply_reflector_in_place(
    m: usize,
    j: usize,
    a: &mut [f32],
    lda: usize,
    tau: f32,
    cols: std::ops::Range<usize>,
) {
    if tau == 0.0 {
        return;
    }
    for c in cols {
        let mut w = a[j * lda + c];
        for i in j + 1..m {
            w += a[i * lda + j] * a[i * lda + c];
        }
        if w == 0.0 {
            continue;
        }
        let tw = tau * w;
        a[j * lda + c] -= tw;
        for i in j + 1..m {
            let v = a[i * lda + j];
            a[i * lda + c] -= tw * v;
        }
    }
}

/// Expands the first `n` columns of `Q` from the reflectors produced by [`geqrf`].
///
/// `k` is the number of reflectors, `q` is `m x n` with `k <= n <= m`. Passing
/// `n = m` yields the full orthogonal matrix.
pub fn orgqr(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    lda: usize,
    tau: &[f32],
    q: &mut [f32],
    ldq: usize,
) -> Result<(), KernelError> {
    if n > m || k > n {
        return Err(KernelError::BadDimensions("orgqr requires k <= n <= m"));
    }
    check_mat(m, k, a, lda)?;
    check_mat(m, n, q, ldq)?;
    ensure_len(tau.len(), k)?;

    for i in 0..m {
        let row = &mut q[i * ldq..i * ldq + n];
        row.fill(0.0);
        if i < n {
            row[i] = 1.0;
        }
    }
    for j in (0..k).rev() {
        apply_reflector(m, j, a, lda, tau[j], q, ldq, 0..n);
    }
    Ok(())
}

/// Overwrites the `m`-vector `b` with `Qᵀ * b` using `k` reflectors from [`geqrf`].
pub fn apply_qt(
    m: usize,
    k: usize,
    a: &[f32],
    lda: usize,
    tau: &[f32],
    b: &mut [f32],
) -> Result<(), KernelError> {
    if k > m {
        return Err(KernelError::BadDimensions("more reflectors than rows"));
    }
    check_mat(m, k, a, lda)?;
    ensure_len(tau.len(), k)?;
    ensure_len(b.len(), m)?;
    for j in 0..k {
        apply_reflector(m, j, a, lda, tau[j], b, 1, 0..1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const A: [f32; 12] = [
        12.0, -51.0, 4.0, //
        6.0, 167.0, -68.0, //
        -4.0, 24.0, -41.0, //
        -1.0, 1.0, 0.0,
    ];

    #[test]
    fn test_qr_reconstructs() -> Result<(), KernelError> {
        let (m, n) = (4, 3);
        let mut a = A;
        let mut tau = [0.0; 3];
        geqrf(m, n, &mut a, n, &mut tau)?;

        let mut q = [0.0; 16];
        orgqr(m, m, n, &a, n, &tau, &mut q, m)?;

        for i in 0..m {
            for j in 0..n {
                let qr: f32 = (0..n)
                    .filter(|&k| k <= j)
                    .map(|k| q[i * m + k] * a[k * n + j])
                    .sum();
                assert_relative_eq!(qr, A[i * n + j], epsilon = 1e-3);
            }
        }

        // QᵀQ = I
        for i in 0..m {
            for j in 0..m {
                let d: f32 = (0..m).map(|k| q[k * m + i] * q[k * m + j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(d, expected, epsilon = 1e-5);
            }
        }
        Ok(())
    }

    #[test]
    fn test_apply_qt_matches_explicit_q() -> Result<(), KernelError> {
        let (m, n) = (4, 3);
        let mut a = A;
        let mut tau = [0.0; 3];
        geqrf(m, n, &mut a, n, &mut tau)?;
        let mut q = [0.0; 16];
        orgqr(m, m, n, &a, n, &tau, &mut q, m)?;

        let b = [1.0, 2.0, 3.0, 4.0];
        let mut qtb = b;
        apply_qt(m, n, &a, n, &tau, &mut qtb)?;
        for j in 0..m {
            let expected: f32 = (0..m).map(|i| q[i * m + j] * b[i]).sum();
            assert_relative_eq!(qtb[j], expected, epsilon = 1e-4);
        }
        Ok(())
    }

    #[test]
    fn test_geqrf_padded_rows() -> Result<(), KernelError> {
        let (m, n, lda) = (4, 3, 4);
        let mut packed = A;
        let mut tau = [0.0; 3];
        geqrf(m, n, &mut packed, n, &mut tau)?;

        // minimum length buffer, no padding after the last row
        let mut a = [-9.0; 15];
        for i in 0..m {
            a[i * lda..i * lda + n].copy_from_slice(&A[i * n..i * n + n]);
        }
        let mut tau_padded = [0.0; 3];
        geqrf(m, n, &mut a, lda, &mut tau_padded)?;
        for i in 0..m {
            assert_eq!(a[i * lda..i * lda + n], packed[i * n..i * n + n]);
        }
        for i in 0..m - 1 {
            assert_eq!(a[i * lda + n], -9.0);
        }
        assert_eq!(tau, tau_padded);
        Ok(())
    }

    #[test]
    fn test_geqrf_zero_column() -> Result<(), KernelError> {
        let mut a = [0.0, 1.0, 0.0, 1.0];
        let mut tau = [0.0; 2];
        geqrf(2, 2, &mut a, 2, &mut tau)?;
        assert_eq!(tau[0], 0.0);
        assert_eq!(a[0], 0.0);
        Ok(())
    }
}
