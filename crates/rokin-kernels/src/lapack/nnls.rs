use super::{apply_qt, geqrf};
use crate::error::{ensure_len, KernelError};
use crate::level1::nrm2;
use crate::level2::{check_mat, gemv_n, gemv_t};

/// Scratch shared by the passive-set least squares solves.
struct PassiveSolver {
    qr: Vec<f32>,
    rhs: Vec<f32>,
    tau: Vec<f32>,
    rank_tol: f32,
}

impl PassiveSolver {
    /// Solves `min ||A_P z - b||` over the columns in `set`, writing `z[set[c]]`.
    ///
    /// Returns `false` when the selected columns are numerically dependent.
    fn solve(
        &mut self,
        m: usize,
        a: &[f32],
        lda: usize,
        b: &[f32],
        set: &[usize],
        z: &mut [f32],
    ) -> Result<bool, KernelError> {
        let k = set.len();
        for i in 0..m {
            for (c, &j) in set.iter().enumerate() {
                self.qr[i * k + c] = a[i * lda + j];
            }
        }
        self.rhs[..m].copy_from_slice(&b[..m]);
        geqrf(m, k, &mut self.qr, k, &mut self.tau)?;
        apply_qt(m, k, &self.qr, k, &self.tau, &mut self.rhs)?;

        for c in (0..k).rev() {
            let rcc = self.qr[c * k + c];
            if rcc.abs() <= self.rank_tol {
                return Ok(false);
            }
            let mut v = self.rhs[c];
            for d in c + 1..k {
                v -= self.qr[c * k + d] * self.rhs[d];
            }
            self.rhs[c] = v / rcc;
        }
        for (c, &j) in set.iter().enumerate() {
            z[j] = self.rhs[c];
        }
        Ok(true)
    }
}

/// Solves the non-negative least squares problem `min ||A x - b||` subject to `x >= 0`.
///
/// Lawson–Hanson active set method. `a` (`m x n`) and `b` are not modified.
/// On return `x` holds the solution and `w` the dual vector `Aᵀ (b - A x)`,
/// which is non-positive on the components where `x` is zero.
///
/// Returns the residual norm `||A x - b||`.
///
/// # Errors
///
/// `NotConverged` when more than `3 n` active set iterations are needed.
pub fn gnnls(
    m: usize,
    n: usize,
    a: &[f32],
    lda: usize,
    b: &[f32],
    x: &mut [f32],
    w: &mut [f32],
) -> Result<f32, KernelError> {
    if m == 0 || n == 0 {
        return Err(KernelError::BadDimensions("gnnls requires a non-empty matrix"));
    }
    check_mat(m, n, a, lda)?;
    ensure_len(b.len(), m)?;
    ensure_len(x.len(), n)?;
    ensure_len(w.len(), n)?;
    let x = &mut x[..n];
    let w = &mut w[..n];
    x.fill(0.0);

    let anorm = (0..m)
        .map(|i| a[i * lda..i * lda + n].iter().map(|v| v.abs()).sum::<f32>())
        .fold(0.0f32, f32::max);
    let bnorm = b[..m].iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
    let eps = 10.0 * f32::EPSILON * m.max(n) as f32;
    let dual_tol = eps * anorm * bnorm;

    let mut solver = PassiveSolver {
        qr: vec![0.0; m * n],
        rhs: vec![0.0; m],
        tau: vec![0.0; n],
        rank_tol: eps * anorm,
    };
    let mut passive = vec![false; n];
    let mut set: Vec<usize> = Vec::with_capacity(n);
    let mut z = vec![0.0f32; n];
    let mut resid = vec![0.0f32; m];
    let max_iterations = 3 * n;
    let mut iterations = 0;

    loop {
        // dual vector w = Aᵀ (b - A x)
        resid.copy_from_slice(&b[..m]);
        gemv_n(m, n, -1.0, a, lda, x, 1, 1.0, &mut resid, 1)?;
        gemv_t(m, n, 1.0, a, lda, &resid, 1, 0.0, w, 1)?;

        if set.len() >= m {
            break;
        }

        // move the most promising column into the passive set
        let mut accepted = false;
        loop {
            let candidate = (0..n)
                .filter(|&j| !passive[j] && w[j] > dual_tol)
                .fold(None, |best: Option<usize>, j| match best {
                    Some(bj) if w[bj] >= w[j] => Some(bj),
                    _ => Some(j),
                });
            let Some(t) = candidate else {
                break;
            };
            passive[t] = true;
            set.push(t);
            if solver.solve(m, a, lda, b, &set, &mut z)? && z[t] > 0.0 {
                accepted = true;
                break;
            }
            passive[t] = false;
            set.pop();
            w[t] = 0.0;
        }
        if !accepted {
            break;
        }

        // step back towards feasibility until the passive solution is positive
        loop {
            iterations += 1;
            if iterations > max_iterations {
                return Err(KernelError::NotConverged {
                    iterations: max_iterations,
                });
            }
            if set.iter().all(|&j| z[j] > 0.0) {
                for &j in &set {
                    x[j] = z[j];
                }
                break;
            }

            let mut alpha = f32::INFINITY;
            let mut blocking = set[0];
            for &j in &set {
                if z[j] <= 0.0 {
                    let step = x[j] / (x[j] - z[j]);
                    if step < alpha {
                        alpha = step;
                        blocking = j;
                    }
                }
            }
            for &j in &set {
                x[j] += alpha * (z[j] - x[j]);
            }
            x[blocking] = 0.0;
            set.retain(|&j| {
                let keep = x[j] > 0.0;
                if !keep {
                    passive[j] = false;
                    x[j] = 0.0;
                }
                keep
            });
            if set.is_empty() || !solver.solve(m, a, lda, b, &set, &mut z)? {
                break;
            }
        }
    }

    resid.copy_from_slice(&b[..m]);
    gemv_n(m, n, -1.0, a, lda, x, 1, 1.0, &mut resid, 1)?;
    nrm2(m, &resid, 1)
}
