use super::{pytag, sign};
use crate::error::{ensure_len, KernelError};
use crate::level2::check_mat;

/// Maximum number of implicit QR sweeps spent on a single singular value.
pub const SVD_MAX_ITERATIONS: usize = 30;

/// Scratch length required by [`gesvd`] for an `m x n` input.
pub fn gesvd_work_len(_m: usize, n: usize) -> usize {
    n
}

/// Computes the thin singular value decomposition `A = U * diag(s) * Vᵀ`.
///
/// Golub–Reinsch: Householder bidiagonalization followed by implicit shifted
/// QR sweeps. Requires `m >= n`; transpose the input otherwise.
///
/// # Arguments
///
/// * `a` - Input `m x n` matrix, left untouched.
/// * `s` - Receives the `n` singular values in descending order.
/// * `u` - Receives the `m x n` left singular vectors.
/// * `vt` - Receives the `n x n` transposed right singular vectors.
/// * `work` - Scratch of at least [`gesvd_work_len`] elements.
///
/// # Errors
///
/// `NotConverged` when a singular value needs more than
/// [`SVD_MAX_ITERATIONS`] sweeps.
pub fn gesvd(
    m: usize,
    n: usize,
    a: &[f32],
    lda: usize,
    s: &mut [f32],
    u: &mut [f32],
    ldu: usize,
    vt: &mut [f32],
    ldvt: usize,
    work: &mut [f32],
) -> Result<(), KernelError> {
    if m == 0 || n == 0 {
        return Err(KernelError::BadDimensions("gesvd requires a non-empty matrix"));
    }
    if m < n {
        return Err(KernelError::BadDimensions("gesvd requires m >= n"));
    }
    check_mat(m, n, a, lda)?;
    check_mat(m, n, u, ldu)?;
    for i in 0..m {
        u[i * ldu..i * ldu + n].copy_from_slice(&a[i * lda..i * lda + n]);
    }
    gesvd_ip(m, n, u, ldu, s, vt, ldvt, work)
}

/// In-place variant of [`gesvd`]: `u` holds `A` on entry and `U` on return.
fn gesvd_ip(
    m: usize,
    n: usize,
    u: &mut [f32],
    ldu: usize,
    s: &mut [f32],
    vt: &mut [f32],
    ldvt: usize,
    work: &mut [f32],
) -> Result<(), KernelError> {
    check_mat(n, n, vt, ldvt)?;
    ensure_len(s.len(), n)?;
    ensure_len(work.len(), gesvd_work_len(m, n))?;

    bidiagonalize_and_diagonalize(m, n, u, ldu, &mut s[..n], vt, ldvt, &mut work[..n])?;
    sort_descending(m, n, u, ldu, &mut s[..n], vt, ldvt);

    // vt holds V, transpose it in place
    for i in 0..n {
        for j in i + 1..n {
            vt.swap(i * ldvt + j, j * ldvt + i);
        }
    }
    Ok(())
}

fn bidiagonalize_and_diagonalize(
    m: usize,
    n: usize,
    a: &mut [f32],
    lda: usize,
    w: &mut [f32],
    v: &mut [f32],
    ldv: usize,
    rv1: &mut [f32],
) -> Result<(), KernelError> {
    let mut g = 0.0f32;
    let mut scale = 0.0f32;
    let mut anorm = 0.0f32;
    let mut l = 0;

    // Householder reduction to bidiagonal form
    for i in 0..n {
        l = i + 1;
        rv1[i] = scale * g;
        g = 0.0;
        scale = 0.0;
        let mut s;
        if i < m {
            for k in i..m {
                scale += a[k * lda + i].abs();
            }
            if scale != 0.0 {
                s = 0.0;
                for k in i..m {
                    a[k * lda + i] /= scale;
                    s += a[k * lda + i] * a[k * lda + i];
                }
                let f = a[i * lda + i];
                g = -sign(s.sqrt(), f);
                let h = f * g - s;
                a[i * lda + i] = f - g;
                for j in l..n {
                    s = 0.0;
                    for k in i..m {
                        s += a[k * lda + i] * a[k * lda + j];
                    }
                    let f = s / h;
                    for k in i..m {
                        a[k * lda + j] += f * a[k * lda + i];
                    }
                }
                for k in i..m {
                    a[k * lda + i] *= scale;
                }
            }
        }
        w[i] = scale * g;
        g = 0.0;
        scale = 0.0;
        if i < m && i + 1 != n {
            for k in l..n {
                scale += a[i * lda + k].abs();
            }
            if scale != 0.0 {
                s = 0.0;
                for k in l..n {
                    a[i * lda + k] /= scale;
                    s += a[i * lda + k] * a[i * lda + k];
                }
                let f = a[i * lda + l];
                g = -sign(s.sqrt(), f);
                let h = f * g - s;
                a[i * lda + l] = f - g;
                for k in l..n {
                    rv1[k] = a[i * lda + k] / h;
                }
                for j in l..m {
                    s = 0.0;
                    for k in l..n {
                        s += a[j * lda + k] * a[i * lda + k];
                    }
                    for k in l..n {
                        a[j * lda + k] += s * rv1[k];
                    }
                }
                for k in l..n {
                    a[i * lda + k] *= scale;
                }
            }
        }
        anorm = anorm.max(w[i].abs() + rv1[i].abs());
    }

    // accumulation of right-hand transformations
    for i in (0..n).rev() {
        if i + 1 < n {
            if g != 0.0 {
                for j in l..n {
                    v[j * ldv + i] = (a[i * lda + j] / a[i * lda + l]) / g;
                }
                for j in l..n {
                    let mut s = 0.0;
                    for k in l..n {
                        s += a[i * lda + k] * v[k * ldv + j];
                    }
                    for k in l..n {
                        v[k * ldv + j] += s * v[k * ldv + i];
                    }
                }
            }
            for j in l..n {
                v[i * ldv + j] = 0.0;
                v[j * ldv + i] = 0.0;
            }
        }
        v[i * ldv + i] = 1.0;
        g = rv1[i];
        l = i;
    }

    // accumulation of left-hand transformations
    for i in (0..m.min(n)).rev() {
        let l = i + 1;
        let g = w[i];
        for j in l..n {
            a[i * lda + j] = 0.0;
        }
        if g != 0.0 {
            let g = 1.0 / g;
            for j in l..n {
                let mut s = 0.0;
                for k in l..m {
                    s += a[k * lda + i] * a[k * lda + j];
                }
                let f = (s / a[i * lda + i]) * g;
                for k in i..m {
                    a[k * lda + j] += f * a[k * lda + i];
                }
            }
            for j in i..m {
                a[j * lda + i] *= g;
            }
        } else {
            for j in i..m {
                a[j * lda + i] = 0.0;
            }
        }
        a[i * lda + i] += 1.0;
    }

    // diagonalization of the bidiagonal form
    for k in (0..n).rev() {
        let mut its = 0;
        loop {
            its += 1;
            let mut l = k;
            let mut split = false;
            loop {
                if l == 0 || rv1[l].abs() + anorm == anorm {
                    break;
                }
                if w[l - 1].abs() + anorm == anorm {
                    split = true;
                    break;
                }
                l -= 1;
            }
            if split {
                let nm = l - 1;
                let mut c = 0.0;
                let mut s = 1.0;
                for i in l..=k {
                    let f = s * rv1[i];
                    rv1[i] *= c;
                    if f.abs() + anorm == anorm {
                        break;
                    }
                    let g = w[i];
                    let mut h = pytag(f, g);
                    w[i] = h;
                    h = 1.0 / h;
                    c = g * h;
                    s = -f * h;
                    for j in 0..m {
                        let y = a[j * lda + nm];
                        let z = a[j * lda + i];
                        a[j * lda + nm] = y * c + z * s;
                        a[j * lda + i] = z * c - y * s;
                    }
                }
            }

            let z = w[k];
            if l == k {
                if z < 0.0 {
                    w[k] = -z;
                    for j in 0..n {
                        v[j * ldv + k] = -v[j * ldv + k];
                    }
                }
                break;
            }
            if its >= SVD_MAX_ITERATIONS {
                return Err(KernelError::NotConverged {
                    iterations: SVD_MAX_ITERATIONS,
                });
            }

            // shift from the bottom 2x2 minor
            let mut x = w[l];
            let nm = k - 1;
            let mut y = w[nm];
            let mut g = rv1[nm];
            let mut h = rv1[k];
            let mut f = ((y - z) * (y + z) + (g - h) * (g + h)) / (2.0 * h * y);
            g = pytag(f, 1.0);
            f = ((x - z) * (x + z) + h * ((y / (f + sign(g, f))) - h)) / x;

            // next QR transformation
            let mut c = 1.0f32;
            let mut s = 1.0f32;
            for j in l..=nm {
                let i = j + 1;
                g = rv1[i];
                y = w[i];
                h = s * g;
                g *= c;
                let mut z = pytag(f, h);
                rv1[j] = z;
                c = f / z;
                s = h / z;
                f = x * c + g * s;
                g = g * c - x * s;
                h = y * s;
                y *= c;
                for jj in 0..n {
                    let xv = v[jj * ldv + j];
                    let zv = v[jj * ldv + i];
                    v[jj * ldv + j] = xv * c + zv * s;
                    v[jj * ldv + i] = zv * c - xv * s;
                }
                z = pytag(f, h);
                w[j] = z;
                if z != 0.0 {
                    z = 1.0 / z;
                    c = f * z;
                    s = h * z;
                }
                f = c * g + s * y;
                x = c * y - s * g;
                for jj in 0..m {
                    let ya = a[jj * lda + j];
                    let za = a[jj * lda + i];
                    a[jj * lda + j] = ya * c + za * s;
                    a[jj * lda + i] = za * c - ya * s;
                }
            }
            rv1[l] = 0.0;
            rv1[k] = f;
            w[k] = x;
        }
    }
    Ok(())
}

/// Selection sort of the singular values, swapping the matching columns of `U` and `V`.
fn sort_descending(
    m: usize,
    n: usize,
    u: &mut [f32],
    ldu: usize,
    s: &mut [f32],
    v: &mut [f32],
    ldv: usize,
) {
    for i in 0..n {
        let mut best = i;
        for j in i + 1..n {
            if s[j] > s[best] {
                best = j;
            }
        }
        if best == i {
            continue;
        }
        s.swap(i, best);
        for r in 0..m {
            u.swap(r * ldu + i, r * ldu + best);
        }
        for r in 0..n {
            v.swap(r * ldv + i, r * ldv + best);
        }
    }
}

/// Scratch length required by [`gepseu`] for an `m x n` input.
pub fn gepseu_work_len(m: usize, n: usize) -> usize {
    let p = m.max(n);
    let q = m.min(n);
    p * q + q + q * q + q
}

/// Computes the Moore–Penrose pseudo-inverse of an `m x n` matrix via SVD.
///
/// Singular values at or below `max(1e-6, s_max * f32::EPSILON * max(m, n))`
/// are treated as zero. Inputs with `m < n` are decomposed through their
/// transpose. `pinv` receives the `n x m` result; `work` needs at least
/// [`gepseu_work_len`] elements and holds the singular values in
/// `work[m.max(n) * m.min(n)..][..m.min(n)]` on return.
///
/// Returns the numerical rank, i.e. the number of singular values kept.
pub fn gepseu(
    m: usize,
    n: usize,
    a: &[f32],
    lda: usize,
    pinv: &mut [f32],
    ldp: usize,
    work: &mut [f32],
) -> Result<usize, KernelError> {
    if m == 0 || n == 0 {
        return Err(KernelError::BadDimensions("gepseu requires a non-empty matrix"));
    }
    check_mat(m, n, a, lda)?;
    check_mat(n, m, pinv, ldp)?;
    ensure_len(work.len(), gepseu_work_len(m, n))?;

    let transposed = m < n;
    let (p, q) = if transposed { (n, m) } else { (m, n) };
    let (u, rest) = work.split_at_mut(p * q);
    let (s, rest) = rest.split_at_mut(q);
    let (vt, rv1) = rest.split_at_mut(q * q);

    for i in 0..m {
        for j in 0..n {
            let v = a[i * lda + j];
            if transposed {
                u[j * q + i] = v;
            } else {
                u[i * q + j] = v;
            }
        }
    }
    gesvd_ip(p, q, u, q, s, vt, q, rv1)?;

    let tol = (s[0] * f32::EPSILON * p as f32).max(1e-6);
    let rank = s.iter().take_while(|&&sv| sv > tol).count();

    // A = U S Vᵀ gives A⁺ = V S⁺ Uᵀ; for the transposed case A = V S Uᵀ gives A⁺ = U S⁺ Vᵀ
    for i in 0..n {
        for j in 0..m {
            let mut sum = 0.0;
            for k in 0..rank {
                let term = if transposed {
                    u[i * q + k] * vt[k * q + j]
                } else {
                    vt[k * q + i] * u[j * q + k]
                };
                sum += term / s[k];
            }
            pinv[i * ldp + j] = sum;
        }
    }
    Ok(rank)
}
