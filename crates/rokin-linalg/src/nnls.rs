use rokin_kernels::{lapack, KernelError};

use crate::error::{LinalgError, Result};
use crate::matrix::{expect_len, Matrix};

/// Solution of a non-negative least squares problem.
#[derive(Debug, Clone, PartialEq)]
pub struct NnlsResult {
    /// The minimizer, component-wise non-negative.
    pub x: Vec<f32>,
    /// Dual vector `Aᵀ (b - A x)`.
    pub w: Vec<f32>,
    /// Residual norm `||A x - b||`.
    pub rnorm: f32,
}

/// Solution of a least distance programming problem.
#[derive(Debug, Clone, PartialEq)]
pub struct LdpResult {
    /// The feasible point of minimum norm.
    pub x: Vec<f32>,
    /// `||x||`.
    pub xnorm: f32,
}

fn nnls_error(err: KernelError) -> LinalgError {
    match err {
        KernelError::NotConverged { iterations } => LinalgError::MaxIterations(iterations),
        other => other.into(),
    }
}

/// Minimizes `||A x - b||` subject to `x >= 0`.
///
/// # Errors
///
/// `MaxIterations` when the active set method does not settle within `3 n`
/// iterations, `DimensionMismatch` when `b` does not have `A.rows()` entries.
pub fn nnls(a: &Matrix, b: &[f32]) -> Result<NnlsResult> {
    let (m, n) = a.shape();
    if m == 0 || n == 0 {
        return Err(LinalgError::InvalidArgument("NNLS of an empty matrix"));
    }
    expect_len("nnls", b.len(), m)?;
    let mut x = vec![0.0; n];
    let mut w = vec![0.0; n];
    let rnorm = lapack::gnnls(m, n, a.flat(), n, b, &mut x, &mut w).map_err(nnls_error)?;
    Ok(NnlsResult { x, w, rnorm })
}

/// Minimizes `||x||` subject to `G x >= h`.
///
/// Solved through the dual NNLS problem on `E = [Gᵀ; hᵀ]`, `f = (0, …, 0, 1)`.
///
/// # Errors
///
/// `IncompatibleConstraints` when no `x` satisfies the constraints.
pub fn ldp(g: &Matrix, h: &[f32]) -> Result<LdpResult> {
    let (m, n) = g.shape();
    if m == 0 || n == 0 {
        return Err(LinalgError::InvalidArgument("LDP with no constraints"));
    }
    expect_len("ldp", h.len(), m)?;

    let mut e = Matrix::new(n + 1, m);
    for (i, row) in g.iter_rows().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            e.set(j, i, v);
        }
        e.set(n, i, h[i]);
    }
    let mut f = vec![0.0; n + 1];
    f[n] = 1.0;

    let sol = nnls(&e, &f)?;
    if sol.rnorm <= 0.0 {
        return Err(LinalgError::IncompatibleConstraints);
    }

    // residual r = E u - f; the last component gives the scaling
    let mut r = vec![0.0; n + 1];
    e.mul_vec(&sol.x, &mut r)?;
    r[n] -= 1.0;
    let fac = -r[n];
    if fac <= f32::EPSILON {
        return Err(LinalgError::IncompatibleConstraints);
    }

    let x: Vec<f32> = r[..n].iter().map(|v| v / fac).collect();
    let xnorm = x.iter().map(|v| v * v).sum::<f32>().sqrt();
    Ok(LdpResult { x, xnorm })
}
