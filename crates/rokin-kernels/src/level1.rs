use crate::error::{ensure_len, strided_len, KernelError};

fn check_vec(n: usize, buf: &[f32], inc: usize) -> Result<(), KernelError> {
    if inc == 0 {
        return Err(KernelError::BadDimensions("vector increment must be positive"));
    }
    ensure_len(buf.len(), strided_len(n, inc))
}

/// Computes `y = alpha * x + y`.
///
/// # Arguments
///
/// * `n` - Number of elements to update.
/// * `alpha` - Scale applied to `x`.
/// * `x` - Input vector, read with increment `incx`.
/// * `y` - Output vector, updated with increment `incy`.
///
/// Example:
/// ```
/// use rokin_kernels::level1::axpy;
///
/// let x = [1.0, 2.0, 3.0];
/// let mut y = [1.0, 1.0, 1.0];
/// axpy(3, 2.0, &x, 1, &mut y, 1).unwrap();
/// assert_eq!(y, [3.0, 5.0, 7.0]);
/// ```
pub fn axpy(
    n: usize,
    alpha: f32,
    x: &[f32],
    incx: usize,
    y: &mut [f32],
    incy: usize,
) -> Result<(), KernelError> {
    check_vec(n, x, incx)?;
    check_vec(n, y, incy)?;
    if alpha == 0.0 {
        return Ok(());
    }
    if incx == 1 && incy == 1 {
        y[..n]
            .iter_mut()
            .zip(&x[..n])
            .for_each(|(yi, xi)| *yi += alpha * xi);
    } else {
        for i in 0..n {
            y[i * incy] += alpha * x[i * incx];
        }
    }
    Ok(())
}

/// Computes the dot product `xᵀy` of two strided vectors.
///
/// Example:
/// ```
/// use rokin_kernels::level1::dot;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// assert_eq!(dot(3, &a, 1, &b, 1).unwrap(), 32.0);
/// ```
pub fn dot(n: usize, x: &[f32], incx: usize, y: &[f32], incy: usize) -> Result<f32, KernelError> {
    check_vec(n, x, incx)?;
    check_vec(n, y, incy)?;
    let sum = if incx == 1 && incy == 1 {
        x[..n].iter().zip(&y[..n]).map(|(a, b)| a * b).sum()
    } else {
        (0..n).map(|i| x[i * incx] * y[i * incy]).sum()
    };
    Ok(sum)
}

/// Computes the Euclidean norm of a strided vector.
///
/// The accumulation is scaled by the running maximum magnitude so that
/// neither overflow nor underflow occurs for representable results.
pub fn nrm2(n: usize, x: &[f32], incx: usize) -> Result<f32, KernelError> {
    check_vec(n, x, incx)?;
    let mut scale = 0.0f32;
    let mut ssq = 1.0f32;
    for i in 0..n {
        let v = x[i * incx];
        if v != 0.0 {
            let absv = v.abs();
            if scale < absv {
                ssq = 1.0 + ssq * (scale / absv) * (scale / absv);
                scale = absv;
            } else {
                ssq += (absv / scale) * (absv / scale);
            }
        }
    }
    Ok(scale * ssq.sqrt())
}

/// Computes the sum of absolute values of a strided vector.
pub fn asum(n: usize, x: &[f32], incx: usize) -> Result<f32, KernelError> {
    check_vec(n, x, incx)?;
    Ok((0..n).map(|i| x[i * incx].abs()).sum())
}

/// Scales a strided vector in place: `x = alpha * x`.
pub fn scal(n: usize, alpha: f32, x: &mut [f32], incx: usize) -> Result<(), KernelError> {
    check_vec(n, x, incx)?;
    for i in 0..n {
        x[i * incx] *= alpha;
    }
    Ok(())
}

/// Copies `n` strided elements from `x` into `y`.
pub fn copy(n: usize, x: &[f32], incx: usize, y: &mut [f32], incy: usize) -> Result<(), KernelError> {
    check_vec(n, x, incx)?;
    check_vec(n, y, incy)?;
    for i in 0..n {
        y[i * incy] = x[i * incx];
    }
    Ok(())
}

/// Exchanges `n` strided elements between `x` and `y`.
pub fn swap(
    n: usize,
    x: &mut [f32],
    incx: usize,
    y: &mut [f32],
    incy: usize,
) -> Result<(), KernelError> {
    check_vec(n, x, incx)?;
    check_vec(n, y, incy)?;
    for i in 0..n {
        std::mem::swap(&mut x[i * incx], &mut y[i * incy]);
    }
    Ok(())
}

/// Returns the index of the first element with the largest absolute value.
///
/// An empty vector yields index 0.
///
/// Example:
/// ```
/// use rokin_kernels::level1::iamax;
///
/// let x = [1.0, -4.0, 4.0, 2.0];
/// assert_eq!(iamax(4, &x, 1).unwrap(), 1);
/// ```
pub fn iamax(n: usize, x: &[f32], incx: usize) -> Result<usize, KernelError> {
    check_vec(n, x, incx)?;
    let mut best = 0;
    let mut best_abs = -1.0f32;
    for i in 0..n {
        let v = x[i * incx].abs();
        if v > best_abs {
            best_abs = v;
            best = i;
        }
    }
    Ok(best)
}

/// Swaps rows `i` and `j` of a row-major matrix over the first `n` columns.
pub(crate) fn swap_rows(a: &mut [f32], lda: usize, n: usize, i: usize, j: usize) {
    if i == j {
        return;
    }
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    let (head, tail) = a.split_at_mut(hi * lda);
    head[lo * lda..lo * lda + n].swap_with_slice(&mut tail[..n]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axpy_strided() -> Result<(), KernelError> {
        let x = [1.0, 0.0, 2.0, 0.0, 3.0];
        let mut y = [10.0, 20.0, 30.0];
        axpy(3, -1.0, &x, 2, &mut y, 1)?;
        assert_eq!(y, [9.0, 18.0, 27.0]);
        Ok(())
    }

    #[test]
    fn test_dot_column_of_matrix() -> Result<(), KernelError> {
        // column 1 of a 3x2 row-major matrix
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let d = dot(3, &a[1..], 2, &a[1..], 2)?;
        assert_eq!(d, 4.0 + 16.0 + 36.0);
        Ok(())
    }

    #[test]
    fn test_dot_length_mismatch() {
        let a = [1.0, 2.0];
        let b = [1.0, 2.0, 3.0];
        assert_eq!(dot(3, &a, 1, &b, 1), Err(KernelError::LengthMismatch(3, 2)));
    }

    #[test]
    fn test_zero_increment() {
        let a = [1.0];
        assert!(matches!(
            asum(1, &a, 0),
            Err(KernelError::BadDimensions(_))
        ));
    }

    #[test]
    fn test_nrm2_no_overflow() -> Result<(), KernelError> {
        let x = [3.0e30, 4.0e30];
        assert_relative_eq!(nrm2(2, &x, 1)?, 5.0e30, max_relative = 1e-6);
        let y = [3.0, 4.0];
        assert_relative_eq!(nrm2(2, &y, 1)?, 5.0);
        assert_eq!(nrm2(0, &y, 1)?, 0.0);
        Ok(())
    }

    #[test]
    fn test_asum_scal_copy_swap() -> Result<(), KernelError> {
        let mut x = [1.0, -2.0, 3.0];
        assert_eq!(asum(3, &x, 1)?, 6.0);
        scal(3, 2.0, &mut x, 1)?;
        assert_eq!(x, [2.0, -4.0, 6.0]);

        let mut y = [0.0; 3];
        copy(3, &x, 1, &mut y, 1)?;
        assert_eq!(y, x);

        let mut z = [7.0, 8.0, 9.0];
        swap(3, &mut y, 1, &mut z, 1)?;
        assert_eq!(y, [7.0, 8.0, 9.0]);
        assert_eq!(z, [2.0, -4.0, 6.0]);
        Ok(())
    }

    #[test]
    fn test_iamax_first_of_ties() -> Result<(), KernelError> {
        let x = [0.5, -3.0, 3.0, 1.0];
        assert_eq!(iamax(4, &x, 1)?, 1);
        assert_eq!(iamax(2, &x[2..], 1)?, 0);
        assert_eq!(iamax(0, &x, 1)?, 0);
        Ok(())
    }

    #[test]
    fn test_swap_rows() {
        let mut a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        swap_rows(&mut a, 2, 2, 2, 0);
        assert_eq!(a, [5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }
}
