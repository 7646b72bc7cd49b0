//! Dynamical state of a single rigid body: primary quantities (position,
//! orientation, momenta), derived kinematics, the explicit per-stage step
//! consumed by an external multi-stage integrator, and the double-buffered
//! current/previous state pair used for sub-frame interpolation.
//!
//! The per-tick sequence is caller-driven: [`body::RigidBody::snapshot_previous`],
//! then integration against the current state, then
//! [`body::RigidBody::refresh_bounds`]. Between ticks the presentation layer reads
//! [`body::RigidBody::interpolated_state`].

pub mod body;
pub mod bounds;
pub mod state;

pub mod prelude {
    pub use crate::body::{RigidBody, RigidBodyError};
    pub use crate::bounds::{BoundingVolume, Obb};
    pub use crate::state::{BodyState, DerivativeBodyState, StateError, TimeStep};
}
