use crate::bounds::BoundingVolume;
use crate::state::{BodyState, DerivativeBodyState, StateError, TimeStep};
use mass_properties::{Inertia, InverseMass, Mass, MassPropertiesError};
use nalgebra::{Matrix3, Vector3};
use rotations::quaternion::{Quaternion, QuaternionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RigidBodyError {
    #[error("interpolation factor {0} is outside [0, 1]")]
    InterpolationFactorOutOfRange(f64),
    #[error("cannot assign a velocity to a body with infinite mass")]
    ImmovableBody,
    #[error("{0}")]
    MassProperties(#[from] MassPropertiesError),
    #[error("{0}")]
    State(#[from] StateError),
    #[error("{0}")]
    Quaternion(#[from] QuaternionError),
}

/// A rigid body: the authoritative `current` state the integrator advances,
/// the `previous` state snapshotted once per tick for interpolation, the
/// non-inverted inertia tensor, motion/collision flags, and the bounding
/// volume that tracks the current pose.
///
/// One tick, caller-driven: [`RigidBody::snapshot_previous`], then the
/// integrator advances the current state, then [`RigidBody::refresh_bounds`].
/// Between ticks the presentation layer blends the pair through
/// [`RigidBody::interpolated_state`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody<B> {
    inertia: Option<Inertia>,
    current: BodyState,
    previous: BodyState,
    motion_enabled: bool,
    collision_enabled: bool,
    interpolation_factor: f64,
    bounds: B,
}

impl<B: BoundingVolume> RigidBody<B> {
    /// Creates a dynamic body at rest. The mass and inertia tensor are
    /// inverted here; the state only ever sees the inverse forms.
    pub fn new(
        position: Vector3<f64>,
        orientation: Quaternion,
        mass: Mass,
        inertia: Inertia,
        bounds: B,
    ) -> Result<Self, RigidBodyError> {
        let inverse_inertia = inertia.inverse_matrix()?;
        let state = BodyState::new(position, orientation, inverse_inertia, mass.inverse())?;
        let mut body = Self {
            inertia: Some(inertia),
            current: state,
            previous: state,
            motion_enabled: true,
            collision_enabled: true,
            interpolation_factor: 0.0,
            bounds,
        };
        body.refresh_bounds();
        Ok(body)
    }

    /// Creates a body of infinite mass. No finite force or torque moves
    /// it; it has no finite inertia tensor, so [`RigidBody::inertia`]
    /// returns `None`.
    pub fn immovable(
        position: Vector3<f64>,
        orientation: Quaternion,
        bounds: B,
    ) -> Result<Self, RigidBodyError> {
        let state = BodyState::new(position, orientation, Matrix3::zeros(), InverseMass::ZERO)?;
        let mut body = Self {
            inertia: None,
            current: state,
            previous: state,
            motion_enabled: false,
            collision_enabled: true,
            interpolation_factor: 0.0,
            bounds,
        };
        body.refresh_bounds();
        Ok(body)
    }

    pub fn current(&self) -> &BodyState {
        &self.current
    }

    pub fn previous(&self) -> &BodyState {
        &self.previous
    }

    pub fn bounds(&self) -> &B {
        &self.bounds
    }

    /// The non-inverted inertia tensor, kept for inspection and
    /// serialization. `None` for an immovable body.
    pub fn inertia(&self) -> Option<&Inertia> {
        self.inertia.as_ref()
    }

    /// Replaces the inertia tensor, keeping both states' inverse tensors
    /// consistent with it.
    pub fn set_inertia(&mut self, inertia: Inertia) -> Result<(), RigidBodyError> {
        let inverse = inertia.inverse_matrix()?;
        self.current.set_inverse_inertia_tensor(inverse)?;
        self.previous.set_inverse_inertia_tensor(inverse)?;
        self.inertia = Some(inertia);
        Ok(())
    }

    pub fn interpolation_factor(&self) -> f64 {
        self.interpolation_factor
    }

    /// Sets the blend factor used by [`RigidBody::interpolated_state`].
    ///
    /// # Returns
    ///
    /// `RigidBodyError::InterpolationFactorOutOfRange` when `factor` is
    /// outside [0, 1] or non-finite. The factor is never clamped; the
    /// caller decides how to recover.
    pub fn set_interpolation_factor(&mut self, factor: f64) -> Result<(), RigidBodyError> {
        if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
            return Err(RigidBodyError::InterpolationFactorOutOfRange(factor));
        }
        self.interpolation_factor = factor;
        Ok(())
    }

    /// A synthetic state blending `previous` (factor 0) into `current`
    /// (factor 1) for sub-frame presentation: position and momenta are
    /// interpolated linearly, the orientation spherically. Spherical
    /// interpolation is chosen over lerp-and-renormalize for smoothness at
    /// wide angular separations.
    pub fn interpolated_state(&self) -> Result<BodyState, RigidBodyError> {
        let factor = self.interpolation_factor;
        let mut state = self.current;
        state.position = self.previous.position.lerp(&self.current.position, factor);
        state.linear_momentum = self
            .previous
            .linear_momentum
            .lerp(&self.current.linear_momentum, factor);
        state.angular_momentum = self
            .previous
            .angular_momentum
            .lerp(&self.current.angular_momentum, factor);
        state.orientation = Quaternion::slerp(
            &self.previous.orientation,
            &self.current.orientation,
            factor,
        )?;
        state.derive()?;
        Ok(state)
    }

    pub fn is_motion_enabled(&self) -> bool {
        self.motion_enabled
    }

    /// Marks whether the integrator should advance this body at all. The
    /// flag is advisory to the integrator; a disabled body remains fully
    /// addressable and collidable.
    pub fn set_motion_enabled(&mut self, motion_enabled: bool) {
        self.motion_enabled = motion_enabled;
    }

    pub fn is_collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    pub fn set_collision_enabled(&mut self, collision_enabled: bool) {
        self.collision_enabled = collision_enabled;
    }

    /// Assigns a linear velocity by recomputing the current state's linear
    /// momentum.
    ///
    /// # Returns
    ///
    /// `RigidBodyError::ImmovableBody` for an infinite-mass body, which
    /// has no momentum consistent with a nonzero velocity.
    pub fn set_linear_velocity(&mut self, linear_velocity: Vector3<f64>) -> Result<(), RigidBodyError> {
        let inverse_mass = self.current.inverse_mass();
        if inverse_mass.is_zero() {
            return Err(RigidBodyError::ImmovableBody);
        }
        self.current.linear_momentum = linear_velocity / inverse_mass.value();
        self.current.derive()?;
        Ok(())
    }

    pub fn set_external_force(&mut self, force: Vector3<f64>) -> Result<(), RigidBodyError> {
        self.current.set_external_force(force)?;
        Ok(())
    }

    pub fn set_external_torque(&mut self, torque: Vector3<f64>) -> Result<(), RigidBodyError> {
        self.current.set_external_torque(torque)?;
        Ok(())
    }

    /// Snapshots the current state as the interpolation baseline. Call
    /// exactly once per fixed tick, strictly before the integrator mutates
    /// the current state; interpolation otherwise blends states that
    /// straddle more than one physics step.
    pub fn snapshot_previous(&mut self) {
        self.previous = self.current;
    }

    /// Advances the current state by one explicit stage. Single-stage
    /// integrators drive the body with this directly; multi-stage drivers
    /// work on copies of [`RigidBody::current`] and commit the combined
    /// result through [`RigidBody::replace_current`].
    pub fn step(&mut self, dt: TimeStep, derivative: &DerivativeBodyState) -> Result<(), RigidBodyError> {
        self.current.step(dt, derivative)?;
        Ok(())
    }

    /// Commits an integrated state as the new current state, re-deriving
    /// it so the published state is self-consistent no matter how the
    /// integrator produced it.
    pub fn replace_current(&mut self, state: BodyState) -> Result<(), RigidBodyError> {
        self.current = state;
        self.current.derive()?;
        Ok(())
    }

    /// Re-poses the bounding volume from the current state. Call after
    /// every integration step, before collision code consults the bounds.
    pub fn refresh_bounds(&mut self) {
        self.bounds
            .set_pose(self.current.position, self.current.orientation);
    }
}
