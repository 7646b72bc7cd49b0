use mass_properties::InverseMass;
use nalgebra::{Matrix3, Vector3};
use rotations::quaternion::{Quaternion, QuaternionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error)]
pub enum StateError {
    #[error("{0}")]
    Quaternion(#[from] QuaternionError),
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// A simulation timestep in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct TimeStep(f64);

impl TimeStep {
    pub fn new(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for TimeStep {
    fn from(seconds: f64) -> TimeStep {
        TimeStep(seconds)
    }
}

/// A rate-of-change sample for one integration stage: the velocity, force,
/// orientation derivative, and torque the integrator evaluated at that
/// stage. Built by the integrator, consumed by [`BodyState::step`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DerivativeBodyState {
    linear_velocity: Vector3<f64>,
    force: Vector3<f64>,
    spin: Quaternion,
    torque: Vector3<f64>,
}

impl DerivativeBodyState {
    pub fn new(
        linear_velocity: Vector3<f64>,
        force: Vector3<f64>,
        spin: Quaternion,
        torque: Vector3<f64>,
    ) -> Self {
        Self {
            linear_velocity,
            force,
            spin,
            torque,
        }
    }

    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.linear_velocity
    }

    pub fn force(&self) -> Vector3<f64> {
        self.force
    }

    pub fn spin(&self) -> Quaternion {
        self.spin
    }

    pub fn torque(&self) -> Vector3<f64> {
        self.torque
    }
}

impl Default for DerivativeBodyState {
    fn default() -> Self {
        Self {
            linear_velocity: Vector3::zeros(),
            force: Vector3::zeros(),
            spin: Quaternion::ZERO,
            torque: Vector3::zeros(),
        }
    }
}

/// The dynamical state of one rigid body.
///
/// Position, orientation, linear momentum, and angular momentum are the
/// primary quantities; momentum rather than velocity is integrated because
/// momentum is what impulsive forces conserve. Linear velocity, angular
/// velocity, and the spin quaternion are derived from the primaries by
/// [`BodyState::derive`] and are never set directly; every mutation path
/// re-derives them, so a `BodyState` observed through its accessors is
/// always self-consistent.
///
/// The inverse inertia tensor is applied to the angular momentum exactly as
/// supplied and is treated as constant: callers whose tensor is expressed
/// in the body frame must refresh it as the orientation changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub(crate) position: Vector3<f64>,
    pub(crate) orientation: Quaternion,
    pub(crate) linear_momentum: Vector3<f64>,
    pub(crate) angular_momentum: Vector3<f64>,
    pub(crate) inverse_mass: InverseMass,
    pub(crate) inverse_inertia_tensor: Matrix3<f64>,
    pub(crate) external_force: Vector3<f64>,
    pub(crate) external_torque: Vector3<f64>,
    pub(crate) linear_velocity: Vector3<f64>,
    pub(crate) angular_velocity: Vector3<f64>,
    pub(crate) spin: Quaternion,
}

fn vector_is_finite(v: &Vector3<f64>) -> bool {
    v.iter().all(|c| c.is_finite())
}

impl BodyState {
    /// Creates a body state at rest: both momenta and both accumulators are
    /// zero, and the derived quantities are computed immediately.
    ///
    /// # Returns
    ///
    /// A `Result` containing the state, or a `StateError` when the
    /// orientation has zero magnitude or an input is non-finite.
    pub fn new(
        position: Vector3<f64>,
        orientation: Quaternion,
        inverse_inertia_tensor: Matrix3<f64>,
        inverse_mass: InverseMass,
    ) -> Result<Self, StateError> {
        if !inverse_inertia_tensor.iter().all(|v| v.is_finite()) {
            return Err(StateError::NonFinite("inverse inertia tensor"));
        }
        let mut state = Self {
            position,
            orientation,
            linear_momentum: Vector3::zeros(),
            angular_momentum: Vector3::zeros(),
            inverse_mass,
            inverse_inertia_tensor,
            external_force: Vector3::zeros(),
            external_torque: Vector3::zeros(),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            spin: Quaternion::ZERO,
        };
        state.derive()?;
        Ok(state)
    }

    /// Recomputes the derived quantities from the primary quantities.
    ///
    /// Idempotent: a second call with unchanged primaries changes nothing.
    /// Restores the orientation to unit norm and reports, rather than
    /// propagates, non-finite values.
    pub fn derive(&mut self) -> Result<(), StateError> {
        self.linear_velocity = self.linear_momentum * self.inverse_mass.value();
        self.angular_velocity = self.inverse_inertia_tensor * self.angular_momentum;
        self.orientation = self.orientation.normalize()?;
        self.spin =
            Quaternion::from_angular_velocity(&self.angular_velocity) * self.orientation * 0.5;
        self.check_finite()
    }

    /// Advances the state by one explicit (forward) stage of size `dt`,
    /// using a derivative the integrator evaluated at an earlier stage.
    ///
    /// The orientation update adds `spin * dt` to the quaternion
    /// component-wise, treating it as a 4-vector rather than composing
    /// rotations. That is the standard stage update for multi-stage
    /// integrators and is only valid for small `dt`; the `derive` call
    /// that follows restores unit norm.
    pub fn step(&mut self, dt: TimeStep, derivative: &DerivativeBodyState) -> Result<(), StateError> {
        let dt = dt.value();

        self.position += derivative.linear_velocity * dt;
        self.linear_momentum += derivative.force * dt;
        self.orientation = self.orientation + derivative.spin * dt;
        self.angular_momentum += derivative.torque * dt;

        self.derive()
    }

    /// The force acting on the body at time `t`. Currently the accumulated
    /// external force regardless of `t`; the parameter is the seam where a
    /// caller-supplied time-varying force field would plug in.
    pub fn force_at(&self, _t: TimeStep) -> Vector3<f64> {
        self.external_force
    }

    /// The torque acting on the body at time `t`. See [`BodyState::force_at`].
    pub fn torque_at(&self, _t: TimeStep) -> Vector3<f64> {
        self.external_torque
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn linear_momentum(&self) -> Vector3<f64> {
        self.linear_momentum
    }

    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.angular_momentum
    }

    pub fn inverse_mass(&self) -> InverseMass {
        self.inverse_mass
    }

    pub fn inverse_inertia_tensor(&self) -> Matrix3<f64> {
        self.inverse_inertia_tensor
    }

    pub fn external_force(&self) -> Vector3<f64> {
        self.external_force
    }

    pub fn external_torque(&self) -> Vector3<f64> {
        self.external_torque
    }

    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    pub fn spin(&self) -> Quaternion {
        self.spin
    }

    pub fn set_position(&mut self, position: Vector3<f64>) -> Result<(), StateError> {
        self.position = position;
        self.derive()
    }

    pub fn set_orientation(&mut self, orientation: Quaternion) -> Result<(), StateError> {
        self.orientation = orientation;
        self.derive()
    }

    pub fn set_linear_momentum(&mut self, linear_momentum: Vector3<f64>) -> Result<(), StateError> {
        self.linear_momentum = linear_momentum;
        self.derive()
    }

    pub fn set_angular_momentum(
        &mut self,
        angular_momentum: Vector3<f64>,
    ) -> Result<(), StateError> {
        self.angular_momentum = angular_momentum;
        self.derive()
    }

    pub fn set_external_force(&mut self, force: Vector3<f64>) -> Result<(), StateError> {
        self.external_force = force;
        self.derive()
    }

    pub fn set_external_torque(&mut self, torque: Vector3<f64>) -> Result<(), StateError> {
        self.external_torque = torque;
        self.derive()
    }

    pub fn set_inverse_inertia_tensor(
        &mut self,
        inverse_inertia_tensor: Matrix3<f64>,
    ) -> Result<(), StateError> {
        self.inverse_inertia_tensor = inverse_inertia_tensor;
        self.derive()
    }

    fn check_finite(&self) -> Result<(), StateError> {
        if !vector_is_finite(&self.position) {
            return Err(StateError::NonFinite("position"));
        }
        if !self.orientation.is_finite() {
            return Err(StateError::NonFinite("orientation"));
        }
        if !vector_is_finite(&self.linear_momentum) {
            return Err(StateError::NonFinite("linear momentum"));
        }
        if !vector_is_finite(&self.angular_momentum) {
            return Err(StateError::NonFinite("angular momentum"));
        }
        if !vector_is_finite(&self.external_force) {
            return Err(StateError::NonFinite("external force"));
        }
        if !vector_is_finite(&self.external_torque) {
            return Err(StateError::NonFinite("external torque"));
        }
        if !vector_is_finite(&self.linear_velocity) {
            return Err(StateError::NonFinite("linear velocity"));
        }
        if !vector_is_finite(&self.angular_velocity) {
            return Err(StateError::NonFinite("angular velocity"));
        }
        if !self.spin.is_finite() {
            return Err(StateError::NonFinite("spin"));
        }
        Ok(())
    }
}
