pub mod quaternion;

pub mod prelude {
    pub use crate::quaternion::{Quaternion, QuaternionError};
}
