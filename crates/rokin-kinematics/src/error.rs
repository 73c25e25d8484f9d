use rokin_linalg::LinalgError;

/// An error type for the kinematics module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum KinematicsError {
    /// A constructor or setter argument is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A joint kind index has no implementation.
    #[error("Unsupported joint kind index {0}, expected 0 (revolute) or 3 (prismatic along z)")]
    UnsupportedJoint(u8),

    /// A state or pose vector does not match the chain.
    #[error("Dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// Length required by the chain.
        expected: usize,
        /// Length that was provided.
        actual: usize,
    },

    /// Neither the pseudo-inverse nor the damped fallback produced a usable step.
    #[error("Inverse kinematics solver failed at iteration {iteration}")]
    SolverFailure {
        /// Iteration at which the step could not be computed.
        iteration: usize,
    },

    /// Error from the linear algebra layer.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}
