use thiserror::Error;

/// An error type for the numeric kernels.
#[derive(Error, Debug, PartialEq)]
pub enum KernelError {
    /// A buffer is too short or a dimension is invalid for the requested operation.
    #[error("Bad dimensions: {0}")]
    BadDimensions(&'static str),

    /// Length mismatch for vector operations
    #[error("Length mismatch: expected {0} elements, got {1}")]
    LengthMismatch(usize, usize),

    /// A zero pivot was found during elimination.
    #[error("Singular matrix: zero pivot at column {0}")]
    SingularMatrix(usize),

    /// An iterative routine exceeded its iteration cap.
    #[error("Routine did not converge after {iterations} iterations")]
    NotConverged {
        /// Number of iterations performed before giving up.
        iterations: usize,
    },

    /// The leading minor of the given order is not positive definite.
    #[error("Matrix is not positive definite: leading minor {0}")]
    NotPositiveDefinite(usize),
}

/// Checks that a buffer holds at least `required` elements.
pub(crate) fn ensure_len(buf: usize, required: usize) -> Result<(), KernelError> {
    if buf < required {
        return Err(KernelError::LengthMismatch(required, buf));
    }
    Ok(())
}

/// Number of elements spanned by `n` strided vector entries.
pub(crate) fn strided_len(n: usize, inc: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n - 1) * inc + 1
    }
}

/// Number of elements spanned by a row-major `rows x cols` block with leading dimension `ld`.
pub(crate) fn matrix_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        (rows - 1) * ld + cols
    }
}
