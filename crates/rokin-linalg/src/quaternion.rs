//! Unit quaternions using the Hamilton convention.
//!
//! A quaternion is stored as `(x, y, z, w)` with vector part `(x, y, z)` and
//! scalar part `w`. Rotations are active: [`Quaternion::rotate`] moves a
//! vector, it does not change its frame.

use std::ops::{Mul, Neg};

use crate::error::{LinalgError, Result};
use crate::vector::Vector3;

/// A rotation quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    /// The x component of the vector part.
    pub x: f32,
    /// The y component of the vector part.
    pub y: f32,
    /// The z component of the vector part.
    pub z: f32,
    /// The scalar part.
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a quaternion from its components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// # Errors
    ///
    /// `ZeroVector` when the axis has zero length.
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Result<Self> {
        let axis = axis.normalize()?;
        let (s, c) = (angle * 0.5).sin_cos();
        Ok(Self::new(axis.x * s, axis.y * s, axis.z * s, c))
    }

    /// The vector part.
    pub fn vector(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Rotation angle `2·acos(w)` in `[0, 2π]`.
    pub fn theta(&self) -> f32 {
        2.0 * self.w.clamp(-1.0, 1.0).acos()
    }

    /// Four dimensional dot product.
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Returns the quaternion scaled to unit norm.
    ///
    /// # Errors
    ///
    /// `ZeroVector` when the norm is zero.
    pub fn normalize(&self) -> Result<Self> {
        let n = self.norm();
        if n == 0.0 {
            return Err(LinalgError::ZeroVector);
        }
        let inv = 1.0 / n;
        Ok(Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv))
    }

    /// The conjugate `(-x, -y, -z, w)`.
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// The multiplicative inverse.
    ///
    /// # Errors
    ///
    /// `ZeroVector` when the norm is zero.
    pub fn inverse(&self) -> Result<Self> {
        let n2 = self.dot(self);
        if n2 == 0.0 {
            return Err(LinalgError::ZeroVector);
        }
        let c = self.conjugate();
        Ok(Self::new(c.x / n2, c.y / n2, c.z / n2, c.w / n2))
    }

    /// Angle of the relative rotation between two unit quaternions.
    ///
    /// `q` and `-q` describe the same rotation, so the result is in `[0, π]`.
    pub fn angle_to(&self, other: &Self) -> f32 {
        2.0 * self.dot(other).abs().clamp(-1.0, 1.0).acos()
    }

    /// Unit axis of the rotation.
    ///
    /// Falls back to [`Vector3::X`] when the rotation angle is zero and the
    /// axis is undefined.
    pub fn axis(&self) -> Vector3 {
        let s2 = 1.0 - self.w * self.w;
        if s2 <= f32::EPSILON {
            return Vector3::X;
        }
        self.vector() * (1.0 / s2.sqrt())
    }

    /// Rotation about the x axis, in the yaw-pitch-roll (intrinsic ZYX) convention.
    pub fn roll(&self) -> f32 {
        let Self { x, y, z, w } = *self;
        (w * x + y * z).atan2(0.5 - x * x - y * y)
    }

    /// Rotation about the y axis, in `[-π/2, π/2]`.
    pub fn pitch(&self) -> f32 {
        let Self { x, y, z, w } = *self;
        (2.0 * (w * y - x * z)).clamp(-1.0, 1.0).asin()
    }

    /// Rotation about the z axis.
    pub fn yaw(&self) -> f32 {
        let Self { x, y, z, w } = *self;
        (x * y + w * z).atan2(0.5 - y * y - z * z)
    }

    /// Spherical linear interpolation along the shorter arc.
    ///
    /// `t = 0` gives `self` and `t = 1` gives `other` (up to sign). Both
    /// inputs are expected to be unit quaternions.
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let d = self.dot(other);
        if d < 0.0 {
            self.interpolate(&-*other, -d, t)
        } else {
            self.interpolate(other, d, t)
        }
    }

    /// Spherical linear interpolation without the sign flip.
    ///
    /// When `self` and `other` lie in opposite hemispheres the path is the
    /// longer arc, more than a half turn.
    pub fn slerp_long(&self, other: &Self, t: f32) -> Self {
        self.interpolate(other, self.dot(other), t)
    }

    fn interpolate(&self, other: &Self, cos: f32, t: f32) -> Self {
        const LERP_THRESHOLD: f32 = 0.9995;
        let (k0, k1) = if cos.abs() > LERP_THRESHOLD {
            (1.0 - t, t)
        } else {
            let angle = cos.clamp(-1.0, 1.0).acos();
            let inv_sin = 1.0 / angle.sin();
            (((1.0 - t) * angle).sin() * inv_sin, (t * angle).sin() * inv_sin)
        };
        let q = Self::new(
            k0 * self.x + k1 * other.x,
            k0 * self.y + k1 * other.y,
            k0 * self.z + k1 * other.z,
            k0 * self.w + k1 * other.w,
        );
        // nearly parallel inputs take the linear path, which shrinks the norm
        q.normalize().unwrap_or(q)
    }

    /// Rotates a vector by this unit quaternion.
    pub fn rotate(&self, v: Vector3) -> Vector3 {
        let u = self.vector();
        let t = u.cross(&v) * 2.0;
        v + t * self.w + u.cross(&t)
    }

    /// Rotation matrix rows of this unit quaternion.
    pub fn to_rotation_rows(&self) -> [[f32; 3]; 3] {
        let Self { x, y, z, w } = *self;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (xw, yw, zw) = (x * w, y * w, z * w);
        [
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - zw), 2.0 * (xz + yw)],
            [2.0 * (xy + zw), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - xw)],
            [2.0 * (xz - yw), 2.0 * (yz + xw), 1.0 - 2.0 * (xx + yy)],
        ]
    }

    /// Quaternion of a rotation matrix given by rows.
    ///
    /// Branches on the sign of `m[2][2]` and the relative size of the other
    /// diagonal entries so the pivot component is always the largest one,
    /// which keeps rotations close to 180° accurate.
    pub fn from_rotation_rows(m: &[[f32; 3]; 3]) -> Self {
        let (m00, m01, m02) = (m[0][0], m[0][1], m[0][2]);
        let (m10, m11, m12) = (m[1][0], m[1][1], m[1][2]);
        let (m20, m21, m22) = (m[2][0], m[2][1], m[2][2]);

        let (t, q) = if m22 < 0.0 {
            if m00 > m11 {
                let t = 1.0 + m00 - m11 - m22;
                (t, [t, m01 + m10, m20 + m02, m21 - m12])
            } else {
                let t = 1.0 - m00 + m11 - m22;
                (t, [m01 + m10, t, m12 + m21, m02 - m20])
            }
        } else if m00 < -m11 {
            let t = 1.0 - m00 - m11 + m22;
            (t, [m20 + m02, m12 + m21, t, m10 - m01])
        } else {
            let t = 1.0 + m00 + m11 + m22;
            (t, [m21 - m12, m02 - m20, m10 - m01, t])
        };

        let s = 0.5 / t.sqrt();
        Self::new(q[0] * s, q[1] * s, q[2] * s, q[3] * s)
    }

    /// Components as `[x, y, z, w]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product: `(a * b).rotate(v) == a.rotate(b.rotate(v))`.
    fn mul(self, rhs: Self) -> Self {
        let (a, b) = (self, rhs);
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from(q: [f32; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }
}

impl From<glam::Quat> for Quaternion {
    fn from(q: glam::Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quaternion> for glam::Quat {
    fn from(q: Quaternion) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}
