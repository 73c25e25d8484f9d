use rokin_kernels::KernelError;
use thiserror::Error;

/// Error types for matrix and vector operations.
#[derive(Debug, Error, PartialEq)]
pub enum LinalgError {
    /// An argument is outside of the domain of the operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Operand or destination shapes are incompatible.
    #[error("Dimension mismatch in {op}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Name of the operation that rejected the shapes.
        op: &'static str,
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Provided `(rows, cols)`.
        actual: (usize, usize),
    },

    /// The matrix has a zero pivot or a determinant below tolerance.
    #[error("Singular matrix")]
    SingularMatrix,

    /// The SVD iteration exceeded its cap.
    #[error("SVD did not converge after {0} iterations")]
    SvdNotConverged(usize),

    /// The matrix is not symmetric positive definite.
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,

    /// An iterative solver exceeded its iteration cap.
    #[error("Maximum iterations ({0}) exceeded")]
    MaxIterations(usize),

    /// The inequality constraints admit no feasible point.
    #[error("Incompatible constraints")]
    IncompatibleConstraints,

    /// A zero length vector or quaternion cannot be normalized.
    #[error("Cannot normalize a zero vector")]
    ZeroVector,

    /// Any other failure reported by the kernels.
    #[error(transparent)]
    Kernel(KernelError),
}

impl From<KernelError> for LinalgError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::SingularMatrix(_) => LinalgError::SingularMatrix,
            KernelError::NotPositiveDefinite(_) => LinalgError::NotPositiveDefinite,
            other => LinalgError::Kernel(other),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LinalgError>;

/// Maps a kernel failure raised inside an SVD.
pub(crate) fn svd_error(err: KernelError) -> LinalgError {
    match err {
        KernelError::NotConverged { iterations } => LinalgError::SvdNotConverged(iterations),
        other => other.into(),
    }
}
