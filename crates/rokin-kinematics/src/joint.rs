use rokin_linalg::Matrix4x4;

use crate::error::KinematicsError;

/// The DH parameter a joint actuates.
///
/// Numeric configurations identify the kind by the index of the varied
/// parameter in `(θ, α, r, d)`, so `0` is revolute and `3` is prismatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum JointKind {
    /// Rotation about the local z axis, varies θ.
    #[default]
    Revolute,
    /// Translation along the local z axis, varies d.
    PrismaticZ,
}

impl TryFrom<u8> for JointKind {
    type Error = KinematicsError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Self::Revolute),
            3 => Ok(Self::PrismaticZ),
            other => Err(KinematicsError::UnsupportedJoint(other)),
        }
    }
}

impl From<JointKind> for u8 {
    fn from(kind: JointKind) -> Self {
        match kind {
            JointKind::Revolute => 0,
            JointKind::PrismaticZ => 3,
        }
    }
}

/// One link of a serial chain in Denavit-Hartenberg form.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointConfig {
    /// Which parameter the joint variable drives.
    pub kind: JointKind,
    /// Joint angle offset θ₀ in radians.
    pub theta: f32,
    /// Offset along the previous z axis.
    pub d: f32,
    /// Link length along the common normal.
    pub r: f32,
    /// Link twist α in radians.
    pub alpha: f32,
    /// Lower joint limit.
    pub min: f32,
    /// Upper joint limit.
    pub max: f32,
}

impl JointConfig {
    /// A revolute joint with link length `r`, no offsets, and limits `[-π, π]`.
    pub fn revolute(r: f32) -> Self {
        Self {
            kind: JointKind::Revolute,
            theta: 0.0,
            d: 0.0,
            r,
            alpha: 0.0,
            min: -std::f32::consts::PI,
            max: std::f32::consts::PI,
        }
    }

    /// A prismatic joint along z with travel `[min, max]`.
    pub fn prismatic(min: f32, max: f32) -> Self {
        Self {
            kind: JointKind::PrismaticZ,
            theta: 0.0,
            d: 0.0,
            r: 0.0,
            alpha: 0.0,
            min,
            max,
        }
    }

    /// Set the joint limits.
    pub fn with_limits(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Set the link twist.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the offset along z.
    pub fn with_d(mut self, d: f32) -> Self {
        self.d = d;
        self
    }

    /// Set the angle offset.
    pub fn with_theta(mut self, theta: f32) -> Self {
        self.theta = theta;
        self
    }

    /// Clamp a joint value into `[min, max]`.
    ///
    /// Never panics: with inverted limits the result is `max`, and a NaN
    /// limit is ignored.
    pub fn limit(&self, q: f32) -> f32 {
        q.max(self.min).min(self.max)
    }

    /// Link transform for joint value `q`.
    ///
    /// ```text
    /// | cosθ  -sinθ·cosα   sinθ·sinα  r·cosθ |
    /// | sinθ   cosθ·cosα  -cosθ·sinα  r·sinθ |
    /// |  0       sinα        cosα       d    |
    /// |  0        0           0         1    |
    /// ```
    pub fn transform(&self, q: f32) -> Matrix4x4 {
        let (theta, d) = match self.kind {
            JointKind::Revolute => (self.theta + q, self.d),
            JointKind::PrismaticZ => (self.theta, self.d + q),
        };
        let (st, ct) = theta.sin_cos();
        let (sa, ca) = self.alpha.sin_cos();
        Matrix4x4::from_rows([
            [ct, -st * ca, st * sa, self.r * ct],
            [st, ct * ca, -ct * sa, self.r * st],
            [0.0, sa, ca, d],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_kind_from_index() {
        assert_eq!(JointKind::try_from(0), Ok(JointKind::Revolute));
        assert_eq!(JointKind::try_from(3), Ok(JointKind::PrismaticZ));
        assert_eq!(
            JointKind::try_from(1),
            Err(KinematicsError::UnsupportedJoint(1))
        );
        assert_eq!(u8::from(JointKind::PrismaticZ), 3);
    }

    #[test]
    fn test_limit() {
        let joint = JointConfig::revolute(1.0).with_limits(-FRAC_PI_2, FRAC_PI_2);
        assert_eq!(joint.limit(PI), FRAC_PI_2);
        assert_eq!(joint.limit(-PI), -FRAC_PI_2);
        assert_eq!(joint.limit(0.3), 0.3);
    }

    #[test]
    fn test_limit_with_inverted_or_nan_bounds() {
        assert_eq!(JointConfig::prismatic(2.0, 0.0).limit(1.0), 0.0);
        let joint = JointConfig::revolute(1.0).with_limits(f32::NAN, 1.0);
        assert_eq!(joint.limit(-3.0), -3.0);
        assert_eq!(joint.limit(3.0), 1.0);
    }

    #[test]
    fn test_revolute_transform() {
        let t = JointConfig::revolute(2.0).transform(FRAC_PI_2);
        let p = t.get_translation();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-6);
        assert_eq!(t.row(3), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_prismatic_transform_with_twist() {
        let joint = JointConfig::prismatic(0.0, 1.0).with_d(0.5).with_alpha(FRAC_PI_2);
        let t = joint.transform(0.25);
        assert_relative_eq!(t[(2, 3)], 0.75, epsilon = 1e-6);
        // twisting by 90° maps the local z axis onto -y
        assert_relative_eq!(t[(1, 2)], -1.0, epsilon = 1e-6);
        assert_relative_eq!(t[(2, 1)], 1.0, epsilon = 1e-6);
    }
}
