#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod dh;
pub use dh::{DHKinematics, EFFECTOR_SIZE};

/// Error types for the kinematics module.
pub mod error;
pub use error::KinematicsError;

mod joint;
pub use joint::{JointConfig, JointKind};

mod params;
pub use params::{ChainConfig, IkParams, IkReport};
