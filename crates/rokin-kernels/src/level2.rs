use crate::error::{ensure_len, matrix_len, strided_len, KernelError};

pub(crate) fn check_mat(
    rows: usize,
    cols: usize,
    a: &[f32],
    lda: usize,
) -> Result<(), KernelError> {
    if lda < cols.max(1) {
        return Err(KernelError::BadDimensions("leading dimension smaller than column count"));
    }
    ensure_len(a.len(), matrix_len(rows, cols, lda))
}

fn check_vec(n: usize, x: &[f32], inc: usize) -> Result<(), KernelError> {
    if inc == 0 {
        return Err(KernelError::BadDimensions("vector increment must be positive"));
    }
    ensure_len(x.len(), strided_len(n, inc))
}

/// Computes `y = alpha * A * x + beta * y` for a row-major `m x n` matrix `A`.
///
/// When `beta` is zero `y` is overwritten and its previous contents are ignored.
pub fn gemv_n(
    m: usize,
    n: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    x: &[f32],
    incx: usize,
    beta: f32,
    y: &mut [f32],
    incy: usize,
) -> Result<(), KernelError> {
    check_mat(m, n, a, lda)?;
    check_vec(n, x, incx)?;
    check_vec(m, y, incy)?;

    for i in 0..m {
        let row = &a[i * lda..i * lda + n];
        let sum: f32 = row
            .iter()
            .enumerate()
            .map(|(j, aij)| aij * x[j * incx])
            .sum();
        let yi = &mut y[i * incy];
        *yi = if beta == 0.0 {
            alpha * sum
        } else {
            alpha * sum + beta * *yi
        };
    }
    Ok(())
}

/// Computes `y = alpha * Aᵀ * x + beta * y` for a row-major `m x n` matrix `A`.
///
/// `x` has `m` entries and `y` has `n` entries.
pub fn gemv_t(
    m: usize,
    n: usize,
    alpha: f32,
    a: &[f32],
    lda: usize,
    x: &[f32],
    incx: usize,
    beta: f32,
    y: &mut [f32],
    incy: usize,
) -> Result<(), KernelError> {
    check_mat(m, n, a, lda)?;
    check_vec(m, x, incx)?;
    check_vec(n, y, incy)?;

    for j in 0..n {
        let yj = &mut y[j * incy];
        if beta == 0.0 {
            *yj = 0.0;
        } else if beta != 1.0 {
            *yj *= beta;
        }
    }
    for i in 0..m {
        let xi = alpha * x[i * incx];
        if xi == 0.0 {
            continue;
        }
        let row = &a[i * lda..i * lda + n];
        for (j, aij) in row.iter().enumerate() {
            y[j * incy] += xi * aij;
        }
    }
    Ok(())
}

/// Rank-1 update `A = A + alpha * x * yᵀ` of a row-major `m x n` matrix.
pub fn ger(
    m: usize,
    n: usize,
    alpha: f32,
    x: &[f32],
    incx: usize,
    y: &[f32],
    incy: usize,
    a: &mut [f32],
    lda: usize,
) -> Result<(), KernelError> {
    check_mat(m, n, a, lda)?;
    check_vec(m, x, incx)?;
    check_vec(n, y, incy)?;

    for i in 0..m {
        let xi = alpha * x[i * incx];
        if xi == 0.0 {
            continue;
        }
        let row = &mut a[i * lda..i * lda + n];
        for (j, aij) in row.iter_mut().enumerate() {
            *aij += xi * y[j * incy];
        }
    }
    Ok(())
}
