use crate::joint::JointConfig;

/// Parameters of the iterative inverse kinematics solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IkParams {
    /// Convergence threshold on the position error norm.
    pub tolerance: f32,
    /// Maximum number of Jacobian steps.
    pub max_iterations: usize,
    /// Damping λ of the least squares fallback.
    pub damping: f32,
}

impl Default for IkParams {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 100,
            damping: 1e-2,
        }
    }
}

impl IkParams {
    /// Create default solver parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the damping used when the Jacobian is rank deficient, must be positive.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }
}

/// Outcome of an inverse kinematics solve.
///
/// Running out of iterations is reported here rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkReport {
    /// Whether the position error fell below the tolerance.
    pub converged: bool,
    /// Number of Jacobian steps taken.
    pub iterations: usize,
    /// Distance between the target and the reached position.
    pub position_error: f32,
}

/// A serializable description of a kinematic chain.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainConfig {
    /// Solver parameters.
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: IkParams,
    /// Links from base to effector.
    pub joints: Vec<JointConfig>,
}
