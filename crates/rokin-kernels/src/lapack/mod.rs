//! LAPACK style routines on row-major `f32` buffers.
//!
//! Every routine takes the matrix shape and leading dimension explicitly and
//! never allocates on the caller's behalf, except [`gnnls`] which keeps its
//! own active-set bookkeeping.

mod cholesky;
mod lu;
mod nnls;
mod qr;
mod svd;

pub use cholesky::{potrf, potrs};
pub use lu::{getrf, getrf_ip, getri};
pub use nnls::gnnls;
pub use qr::{apply_qt, geqrf, orgqr};
pub use svd::{gepseu, gepseu_work_len, gesvd, gesvd_work_len, SVD_MAX_ITERATIONS};

/// Returns `|a|` with the sign of `b`.
#[inline]
pub fn sign(a: f32, b: f32) -> f32 {
    if b >= 0.0 {
        a.abs()
    } else {
        -a.abs()
    }
}

/// Computes `sqrt(a² + b²)` without destructive underflow or overflow.
#[inline]
pub fn pytag(a: f32, b: f32) -> f32 {
    let absa = a.abs();
    let absb = b.abs();
    if absa > absb {
        absa * (1.0 + (absb / absa) * (absb / absa)).sqrt()
    } else if absb == 0.0 {
        0.0
    } else {
        absb * (1.0 + (absa / absb) * (absa / absb)).sqrt()
    }
}
