use nalgebra::Vector3;
use rand::{prelude::*, rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg};
use thiserror::Error;

/// A quaternion used for 3D orientation and for orientation time derivatives.
///
/// Unit quaternions represent rotations; non-unit quaternions show up as
/// intermediate values when integrating orientation (stage derivatives and
/// additive stage updates are generally not unit-norm).
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// Errors that can occur when operating on a `Quaternion`.
#[derive(Debug, Clone, Copy, Error)]
pub enum QuaternionError {
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
}

impl Quaternion {
    /// The identity quaternion, representing no rotation.
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// The zero quaternion. Not a rotation; the additive identity for
    /// derivative accumulation.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };

    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Builds the pure quaternion (w = 0) carrying an angular velocity,
    /// as used when forming the orientation time derivative.
    pub fn from_angular_velocity(omega: &Vector3<f64>) -> Self {
        Self { x: omega[0], y: omega[1], z: omega[2], w: 0.0 }
    }

    // Dot product of two quaternions
    pub fn dot(&self, other: &Quaternion) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// The conjugate. Equals the inverse for unit quaternions.
    pub fn inv(&self) -> Quaternion {
        Quaternion::new(-self.x, -self.y, -self.z, self.w)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Returns the unit quaternion with the same direction.
    ///
    /// # Returns
    ///
    /// A `Result` containing the normalized `Quaternion`, or
    /// `QuaternionError::ZeroMagnitude` if the magnitude is too small to
    /// divide by.
    pub fn normalize(&self) -> Result<Self, QuaternionError> {
        let mag = self.norm();
        if !(mag > f64::EPSILON) {
            return Err(QuaternionError::ZeroMagnitude);
        }
        Ok(Quaternion::new(
            self.x / mag,
            self.y / mag,
            self.z / mag,
            self.w / mag,
        ))
    }

    /// Creates a random quaternion. Components are uniform in [-1, 1);
    /// normalize for a random orientation.
    pub fn rand() -> Quaternion {
        let mut rng = rng();
        let x = rng.random_range(-1.0..1.0);
        let y = rng.random_range(-1.0..1.0);
        let z = rng.random_range(-1.0..1.0);
        let w = rng.random_range(-1.0..1.0);

        Quaternion::new(x, y, z, w)
    }

    /// Spherical linear interpolation from `q1` (t = 0) to `q2` (t = 1).
    ///
    /// Takes the shorter of the two great-circle arcs: q and -q encode the
    /// same rotation, so `q2` is negated when the dot product is negative.
    /// Nearly-parallel inputs fall back to linear interpolation to avoid
    /// dividing by a vanishing sine.
    pub fn slerp(q1: &Quaternion, q2: &Quaternion, t: f64) -> Result<Self, QuaternionError> {
        let q1 = q1.normalize()?;
        let q2 = q2.normalize()?;

        let mut dot = q1.dot(&q2);
        let q2 = if dot < 0.0 {
            dot = -dot;
            -q2
        } else {
            q2
        };

        if dot > 0.9995 {
            let result = Quaternion {
                x: q1.x + t * (q2.x - q1.x),
                y: q1.y + t * (q2.y - q1.y),
                z: q1.z + t * (q2.z - q1.z),
                w: q1.w + t * (q2.w - q1.w),
            };
            return result.normalize();
        }

        let theta = dot.acos();
        let sin_theta = theta.sin();
        let w1 = ((1.0 - t) * theta).sin() / sin_theta;
        let w2 = (t * theta).sin() / sin_theta;

        (q1 * w1 + q2 * w2).normalize()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quaternion {{ x: {}, y: {}, z: {}, w: {} }}",
            self.x, self.y, self.z, self.w
        )
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;

    /// Hamilton product. `self * rhs` applies `rhs` first, then `self`,
    /// and `Quaternion::from_angular_velocity(&w) * q * 0.5` is the time
    /// derivative of the orientation `q` under angular velocity `w`.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;

    /// Component-wise sum. Not a composition of rotations: summing
    /// quaternions is only meaningful when accumulating orientation
    /// derivatives inside an integration stage.
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}
