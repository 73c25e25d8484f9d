use rokin_linalg::{Matrix, Matrix4x4, Quaternion, Vector3, Workspace};

use crate::error::KinematicsError;
use crate::joint::{JointConfig, JointKind};
use crate::params::{ChainConfig, IkParams, IkReport};

/// Length of the effector pose `(x, y, z, qx, qy, qz, qw)`.
pub const EFFECTOR_SIZE: usize = 7;

/// Forward and position-only inverse kinematics of a serial DH chain.
///
/// The instance owns the joint values, the cumulative base-to-link
/// transforms and the effector pose. [`DHKinematics::forward`] evaluates the
/// chain at the current joint values; [`DHKinematics::inverse`] drives the
/// joint values towards the position stored in the effector pose.
///
/// # Example
///
/// ```
/// use rokin_kinematics::{DHKinematics, JointConfig};
/// use rokin_linalg::Vector3;
///
/// let joints = vec![JointConfig::revolute(1.0), JointConfig::revolute(1.0)];
/// let mut arm = DHKinematics::new(1e-4, 100, joints)?;
/// arm.set_params(&[0.3, 0.8])?;
/// arm.set_target(Vector3::new(1.0, 1.0, 0.0));
/// let report = arm.inverse()?;
/// assert!(report.converged);
/// # Ok::<(), rokin_kinematics::KinematicsError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DHKinematics {
    joints: Vec<JointConfig>,
    params: Vec<f32>,
    h0i: Vec<Matrix4x4>,
    pos: [f32; EFFECTOR_SIZE],
    ik: IkParams,
    // solver scratch, sized once at construction
    jacobian: Matrix,
    jinv: Matrix,
    dq: Vec<f32>,
    ws: Workspace,
}

fn validate(ik: &IkParams, joints: &[JointConfig]) -> Result<(), KinematicsError> {
    if !ik.tolerance.is_finite() || ik.tolerance <= 0.0 {
        return Err(KinematicsError::InvalidArgument(format!(
            "tolerance must be positive, got {}",
            ik.tolerance
        )));
    }
    if ik.max_iterations < 1 {
        return Err(KinematicsError::InvalidArgument(
            "max_iterations must be at least 1".to_string(),
        ));
    }
    if !ik.damping.is_finite() || ik.damping <= 0.0 {
        return Err(KinematicsError::InvalidArgument(format!(
            "damping must be positive, got {}",
            ik.damping
        )));
    }
    if joints.is_empty() {
        return Err(KinematicsError::InvalidArgument(
            "a chain needs at least one joint".to_string(),
        ));
    }
    let inverted = |j: &&JointConfig| j.min.is_nan() || j.max.is_nan() || j.min > j.max;
    if let Some((i, j)) = joints.iter().enumerate().find(|(_, j)| inverted(j)) {
        return Err(KinematicsError::InvalidArgument(format!(
            "joint {i} has min {} > max {}",
            j.min, j.max
        )));
    }
    Ok(())
}

impl DHKinematics {
    /// Create a chain with tolerance `eps` and iteration cap `max_iterations`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `eps <= 0`, `max_iterations < 1`, `joints` is
    /// empty or a joint has `min > max`.
    pub fn new(
        eps: f32,
        max_iterations: usize,
        joints: Vec<JointConfig>,
    ) -> Result<Self, KinematicsError> {
        let ik = IkParams::default()
            .with_tolerance(eps)
            .with_max_iterations(max_iterations);
        Self::with_params(ik, joints)
    }

    /// Create a chain from solver parameters and links.
    pub fn with_params(ik: IkParams, joints: Vec<JointConfig>) -> Result<Self, KinematicsError> {
        validate(&ik, &joints)?;
        let n = joints.len();
        let mut pos = [0.0; EFFECTOR_SIZE];
        pos[6] = 1.0;
        Ok(Self {
            joints,
            params: vec![0.0; n],
            h0i: vec![Matrix4x4::eye(); n + 1],
            pos,
            ik,
            jacobian: Matrix::new(3, n),
            jinv: Matrix::new(n, 3),
            dq: vec![0.0; n],
            ws: Workspace::new(),
        })
    }

    /// Number of joints.
    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// The links of the chain.
    pub fn joints(&self) -> &[JointConfig] {
        &self.joints
    }

    /// Current solver parameters.
    pub fn ik_params(&self) -> &IkParams {
        &self.ik
    }

    /// Replace the solver parameters.
    pub fn set_ik_params(&mut self, ik: IkParams) -> Result<(), KinematicsError> {
        validate(&ik, &self.joints)?;
        self.ik = ik;
        Ok(())
    }

    /// Joint values.
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    /// Mutable joint values. They are clamped on the next evaluation.
    pub fn params_mut(&mut self) -> &mut [f32] {
        &mut self.params
    }

    /// Copy joint values in.
    pub fn set_params(&mut self, state: &[f32]) -> Result<(), KinematicsError> {
        if state.len() != self.dof() {
            return Err(KinematicsError::DimensionMismatch {
                expected: self.dof(),
                actual: state.len(),
            });
        }
        self.params.copy_from_slice(state);
        Ok(())
    }

    /// Effector pose `(x, y, z, qx, qy, qz, qw)`.
    pub fn effector(&self) -> &[f32; EFFECTOR_SIZE] {
        &self.pos
    }

    /// Mutable effector pose; the first three values are the inverse target.
    pub fn effector_mut(&mut self) -> &mut [f32; EFFECTOR_SIZE] {
        &mut self.pos
    }

    /// Write the position [`DHKinematics::inverse`] should reach.
    pub fn set_target(&mut self, target: Vector3) {
        self.pos[..3].copy_from_slice(&target.to_array());
    }

    /// Effector position.
    pub fn position(&self) -> Vector3 {
        Vector3::new(self.pos[0], self.pos[1], self.pos[2])
    }

    /// Effector orientation.
    pub fn orientation(&self) -> Quaternion {
        Quaternion::new(self.pos[3], self.pos[4], self.pos[5], self.pos[6])
    }

    /// Base-to-link transforms `H0i`, with `H0i[0] = I` and `H0i[dof]` the effector.
    pub fn transforms(&self) -> &[Matrix4x4] {
        &self.h0i
    }

    /// Position Jacobian of the last inverse iteration, `3 x dof`.
    pub fn jacobian(&self) -> &Matrix {
        &self.jacobian
    }

    /// The chain as a serializable configuration.
    pub fn to_config(&self) -> ChainConfig {
        ChainConfig {
            params: self.ik,
            joints: self.joints.clone(),
        }
    }

    /// Evaluate the chain at the current joint values.
    ///
    /// Joint values are clamped to their limits first.
    pub fn forward(&mut self) {
        self.h0i[0] = Matrix4x4::eye();
        for (i, joint) in self.joints.iter().enumerate() {
            self.params[i] = joint.limit(self.params[i]);
            self.h0i[i + 1] = self.h0i[i] * joint.transform(self.params[i]);
        }

        let effector = &self.h0i[self.joints.len()];
        self.pos[..3].copy_from_slice(&effector.get_translation().to_array());
        self.pos[3..].copy_from_slice(&effector.quaternion().to_array());
        log::trace!("forward: effector at {:?}", &self.pos[..3]);
    }

    /// Load `state` as joint values, evaluate, and return the effector pose.
    pub fn forward_from(&mut self, state: &[f32]) -> Result<[f32; EFFECTOR_SIZE], KinematicsError> {
        self.set_params(state)?;
        self.forward();
        Ok(self.pos)
    }

    /// Solve for joint values that move the effector to the stored target.
    ///
    /// Uses Jacobian pseudo-inverse steps, switching to damped least
    /// squares when the Jacobian loses rank. Not reaching the tolerance
    /// within the iteration cap is reported through [`IkReport::converged`].
    /// On return the effector holds the pose reached by the final joints.
    ///
    /// # Errors
    ///
    /// `SolverFailure` when no finite step can be computed.
    pub fn inverse(&mut self) -> Result<IkReport, KinematicsError> {
        let target = self.position();
        let eps2 = self.ik.tolerance * self.ik.tolerance;
        let mut report = IkReport {
            converged: false,
            iterations: 0,
            position_error: f32::INFINITY,
        };

        for iter in 0..=self.ik.max_iterations {
            self.forward();
            let err = target - self.position();
            let err2 = err.length_squared();
            report.iterations = iter;
            log::debug!("Iteration: {}, position error: {}", iter, err2.sqrt());

            if err2 < eps2 {
                report.converged = true;
                break;
            }
            if iter == self.ik.max_iterations {
                break;
            }

            self.update_jacobian();
            self.solve_step(err, iter)?;
            for ((q, dq), joint) in self.params.iter_mut().zip(&self.dq).zip(&self.joints) {
                *q = joint.limit(*q + dq);
            }
        }

        self.forward();
        report.position_error = target.distance(&self.position());
        if report.converged {
            log::debug!(
                "IK converged in {} iterations with error {}",
                report.iterations,
                report.position_error
            );
        } else {
            log::debug!(
                "IK stopped after {} iterations with error {}",
                report.iterations,
                report.position_error
            );
        }
        Ok(report)
    }

    /// Seed joint values from `state` if given, then solve for the position of `pose`.
    pub fn inverse_from(
        &mut self,
        state: Option<&[f32]>,
        pose: &[f32; EFFECTOR_SIZE],
    ) -> Result<IkReport, KinematicsError> {
        if let Some(state) = state {
            self.set_params(state)?;
        }
        self.pos = *pose;
        self.inverse()
    }

    fn update_jacobian(&mut self) {
        let n = self.joints.len();
        let pn = self.h0i[n].col3d(3);
        for (i, joint) in self.joints.iter().enumerate() {
            let z = self.h0i[i].col3d(2);
            let column = match joint.kind {
                JointKind::Revolute => z.cross(&(pn - self.h0i[i].col3d(3))),
                JointKind::PrismaticZ => z,
            };
            for (row, v) in column.to_array().into_iter().enumerate() {
                self.jacobian.set(row, i, v);
            }
        }
    }

    fn solve_step(&mut self, err: Vector3, iteration: usize) -> Result<(), KinematicsError> {
        let full_rank = self.joints.len().min(3);
        let pinv_ok = match self.jacobian.pseudo_inverse_in(&mut self.jinv, &mut self.ws) {
            Ok(rank) if rank >= full_rank => true,
            Ok(rank) => {
                log::debug!("Jacobian rank {rank} < {full_rank}, using damped least squares");
                false
            }
            Err(e) => {
                log::debug!("pseudo-inverse failed: {e}, using damped least squares");
                false
            }
        };

        if !pinv_ok {
            if let Err(e) =
                self.jacobian
                    .damped_least_squares_in(self.ik.damping, &mut self.jinv, &mut self.ws)
            {
                log::warn!("damped least squares failed at iteration {iteration}: {e}");
                return Err(KinematicsError::SolverFailure { iteration });
            }
        }

        self.jinv.mul_vec(&err.to_array(), &mut self.dq)?;
        if self.dq.iter().any(|v| !v.is_finite()) {
            log::warn!("non-finite joint update at iteration {iteration}");
            return Err(KinematicsError::SolverFailure { iteration });
        }
        Ok(())
    }
}
