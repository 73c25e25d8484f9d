use crate::error::{ensure_len, KernelError};
use crate::level1::{iamax, swap_rows};
use crate::level2::check_mat;

/// Computes the LU factorization `P * A = L * U` of an `m x n` matrix in place.
///
/// Partial pivoting selects the row with the largest absolute value in the
/// pivot column. On return `a` holds `U` on and above the diagonal and the
/// multipliers of the unit lower triangular `L` below it. `ipiv[k]` is the
/// row exchanged with row `k` at step `k`.
///
/// # Errors
///
/// `SingularMatrix(k)` when the best pivot of column `k` is exactly zero.
pub fn getrf_ip(
    m: usize,
    n: usize,
    a: &mut [f32],
    lda: usize,
    ipiv: &mut [usize],
) -> Result<(), KernelError> {
    check_mat(m, n, a, lda)?;
    let steps = m.min(n);
    ensure_len(ipiv.len(), steps)?;

    for k in 0..steps {
        let p = k + iamax(m - k, &a[k * lda + k..], lda)?;
        ipiv[k] = p;
        if a[p * lda + k] == 0.0 {
            return Err(KernelError::SingularMatrix(k));
        }
        swap_rows(a, lda, n, k, p);

        // split right after the pivot row so a minimum length buffer never overruns
        let (top, rest) = a.split_at_mut(k * lda + n);
        let pivot_row = &top[k * lda..];
        let pivot = pivot_row[k];
        for i in 0..m - k - 1 {
            let off = (i + 1) * lda - n;
            let row = &mut rest[off..off + n];
            let factor = row[k] / pivot;
            row[k] = factor;
            if factor != 0.0 {
                for j in k + 1..n {
                    row[j] -= factor * pivot_row[j];
                }
            }
        }
    }
    Ok(())
}

/// Computes `P * A = L * U` and writes the factors into separate buffers.
///
/// `a` is overwritten with the packed factors of [`getrf_ip`]. `l` receives the
/// `m x min(m, n)` unit lower triangular factor and `u` the `min(m, n) x n`
/// upper triangular factor.
pub fn getrf(
    m: usize,
    n: usize,
    a: &mut [f32],
    lda: usize,
    l: &mut [f32],
    ldl: usize,
    u: &mut [f32],
    ldu: usize,
    ipiv: &mut [usize],
) -> Result<(), KernelError> {
    let k = m.min(n);
    check_mat(m, k, l, ldl)?;
    check_mat(k, n, u, ldu)?;
    getrf_ip(m, n, a, lda, ipiv)?;

    for i in 0..m {
        for j in 0..k {
            l[i * ldl + j] = match i.cmp(&j) {
                std::cmp::Ordering::Greater => a[i * lda + j],
                std::cmp::Ordering::Equal => 1.0,
                std::cmp::Ordering::Less => 0.0,
            };
        }
    }
    for i in 0..k {
        for j in 0..n {
            u[i * ldu + j] = if j >= i { a[i * lda + j] } else { 0.0 };
        }
    }
    Ok(())
}

/// Computes the inverse of an `n x n` matrix from its packed LU factors.
///
/// `a` and `ipiv` are the outputs of [`getrf_ip`]. The row exchanges are
/// applied to the identity in the order they were recorded, followed by a
/// forward substitution with `L` and a back substitution with `U`.
pub fn getri(
    n: usize,
    a: &[f32],
    lda: usize,
    ipiv: &[usize],
    ainv: &mut [f32],
    ldinv: usize,
) -> Result<(), KernelError> {
    check_mat(n, n, a, lda)?;
    check_mat(n, n, ainv, ldinv)?;
    ensure_len(ipiv.len(), n)?;

    for i in 0..n {
        let row = &mut ainv[i * ldinv..i * ldinv + n];
        row.fill(0.0);
        row[i] = 1.0;
    }
    for (k, &p) in ipiv.iter().take(n).enumerate() {
        if p >= n {
            return Err(KernelError::BadDimensions("pivot index out of range"));
        }
        swap_rows(ainv, ldinv, n, k, p);
    }

    // L * Y = P
    for i in 1..n {
        let (done, rest) = ainv.split_at_mut(i * ldinv);
        let row = &mut rest[..n];
        for k in 0..i {
            let lik = a[i * lda + k];
            if lik != 0.0 {
                let src = &done[k * ldinv..k * ldinv + n];
                row.iter_mut().zip(src).for_each(|(r, s)| *r -= lik * s);
            }
        }
    }

    // U * X = Y
    for i in (0..n).rev() {
        let uii = a[i * lda + i];
        if uii == 0.0 {
            return Err(KernelError::SingularMatrix(i));
        }
        let (head, tail) = ainv.split_at_mut(i * ldinv + n);
        let row = &mut head[i * ldinv..];
        for k in i + 1..n {
            let uik = a[i * lda + k];
            if uik != 0.0 {
                let off = (k - i) * ldinv - n;
                let src = &tail[off..off + n];
                row.iter_mut().zip(src).for_each(|(r, s)| *r -= uik * s);
            }
        }
        row.iter_mut().for_each(|r| *r /= uii);
    }
    Ok(())
}
