#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Rectified stereo camera models.
pub mod camera;

/// Symmetric eigenvalue analysis of small matrices.
pub mod eigen;

/// Homogeneous 2D line utilities.
pub mod line;

pub use camera::{CameraError, PinholeStereoCamera, StereoCamera};
