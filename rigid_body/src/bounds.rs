use nalgebra::Vector3;
use rotations::quaternion::Quaternion;
use serde::{Deserialize, Serialize};

/// The seam between this core and an externally owned bounding volume.
///
/// Collision code owns the volume's shape and queries; this core only
/// re-poses it so it tracks the authoritative body state.
pub trait BoundingVolume {
    fn set_pose(&mut self, position: Vector3<f64>, orientation: Quaternion);
}

/// A minimal oriented bounding box: a pose and half-extents. Shape
/// construction from geometry belongs to the collision system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obb {
    pub center: Vector3<f64>,
    pub orientation: Quaternion,
    pub half_extents: Vector3<f64>,
}

impl Obb {
    pub fn new(center: Vector3<f64>, orientation: Quaternion, half_extents: Vector3<f64>) -> Self {
        Self {
            center,
            orientation,
            half_extents,
        }
    }
}

impl BoundingVolume for Obb {
    fn set_pose(&mut self, position: Vector3<f64>, orientation: Quaternion) {
        self.center = position;
        self.orientation = orientation;
    }
}
