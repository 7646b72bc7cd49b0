use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MassPropertiesError {
    #[error("Ixx cant be less than or equal to zero")]
    IxxLessThanOrEqualToZero,
    #[error("Iyy cant be less than or equal to zero")]
    IyyLessThanOrEqualToZero,
    #[error("Izz cant be less than or equal to zero")]
    IzzLessThanOrEqualToZero,
    #[error("mass cannot be less than or equal to zero")]
    MassLessThanOrEqualToZero,
    #[error("inverse mass cannot be negative")]
    NegativeInverseMass,
    #[error("mass properties must be finite")]
    NonFinite,
    #[error("inertia tensor is singular")]
    SingularInertia,
}

/// A mass in kilograms. Always finite and strictly positive; bodies of
/// infinite mass are expressed through [`InverseMass::ZERO`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Mass(f64);

impl Mass {
    pub fn new(kilograms: f64) -> Result<Self, MassPropertiesError> {
        if !kilograms.is_finite() {
            return Err(MassPropertiesError::NonFinite);
        }
        if kilograms <= f64::EPSILON {
            return Err(MassPropertiesError::MassLessThanOrEqualToZero);
        }
        Ok(Self(kilograms))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn inverse(&self) -> InverseMass {
        InverseMass(1.0 / self.0)
    }
}

/// An inverse mass in 1/kg. Zero encodes infinite mass, i.e. a body no
/// finite force can move.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct InverseMass(f64);

impl InverseMass {
    pub const ZERO: Self = Self(0.0);

    pub fn new(value: f64) -> Result<Self, MassPropertiesError> {
        if !value.is_finite() {
            return Err(MassPropertiesError::NonFinite);
        }
        if value < 0.0 {
            return Err(MassPropertiesError::NegativeInverseMass);
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl From<Mass> for InverseMass {
    fn from(mass: Mass) -> InverseMass {
        mass.inverse()
    }
}

/// The inertia tensor of a body: three moments and three products of
/// inertia, forming a symmetric 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Inertia {
    ixx: f64,
    iyy: f64,
    izz: f64,
    ixy: f64,
    ixz: f64,
    iyz: f64,
}

impl Inertia {
    pub fn new(
        ixx: f64,
        iyy: f64,
        izz: f64,
        ixy: f64,
        ixz: f64,
        iyz: f64,
    ) -> Result<Self, MassPropertiesError> {
        if ![ixx, iyy, izz, ixy, ixz, iyz].iter().all(|v| v.is_finite()) {
            return Err(MassPropertiesError::NonFinite);
        }
        if ixx <= f64::EPSILON {
            return Err(MassPropertiesError::IxxLessThanOrEqualToZero);
        }
        if iyy <= f64::EPSILON {
            return Err(MassPropertiesError::IyyLessThanOrEqualToZero);
        }
        if izz <= f64::EPSILON {
            return Err(MassPropertiesError::IzzLessThanOrEqualToZero);
        }
        Ok(Self {
            ixx,
            iyy,
            izz,
            ixy,
            ixz,
            iyz,
        })
    }

    /// An inertia tensor with no products of inertia.
    pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> Result<Self, MassPropertiesError> {
        Self::new(ixx, iyy, izz, 0.0, 0.0, 0.0)
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.ixx, self.ixy, self.ixz, //
            self.ixy, self.iyy, self.iyz, //
            self.ixz, self.iyz, self.izz,
        )
    }

    /// Inverts the tensor for use in angular velocity recovery.
    ///
    /// # Returns
    ///
    /// A `Result` containing the inverse matrix, or
    /// `MassPropertiesError::SingularInertia` when the tensor is not
    /// invertible.
    pub fn inverse_matrix(&self) -> Result<Matrix3<f64>, MassPropertiesError> {
        self.matrix()
            .try_inverse()
            .ok_or(MassPropertiesError::SingularInertia)
    }
}

impl Default for Inertia {
    fn default() -> Self {
        Inertia::diagonal(1.0, 1.0, 1.0).unwrap()
    }
}

impl TryFrom<Matrix3<f64>> for Inertia {
    type Error = MassPropertiesError;

    fn try_from(m: Matrix3<f64>) -> Result<Inertia, MassPropertiesError> {
        Inertia::new(
            m[(0, 0)],
            m[(1, 1)],
            m[(2, 2)],
            m[(0, 1)],
            m[(0, 2)],
            m[(2, 1)],
        )
    }
}
