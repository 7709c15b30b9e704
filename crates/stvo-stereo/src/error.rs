use stvo_features::{FeatureError, ImageError, ImageSize};
use stvo_geometry::CameraError;

/// An error type for the stereo pipeline.
#[derive(thiserror::Error, Debug)]
pub enum StereoError {
    /// The camera model is malformed.
    #[error("Invalid camera: {0}")]
    Camera(#[from] CameraError),

    /// The stereo images have different sizes.
    #[error("Image size mismatch: {0:?} != {1:?}")]
    ImageSizeMismatch(ImageSize, ImageSize),

    /// The images do not have the size the camera was calibrated for.
    #[error("{0:?} does not match the camera resolution {1}x{2}")]
    CameraResolutionMismatch(ImageSize, usize, usize),

    /// A detector returned a descriptor matrix not aligned with its features.
    #[error("Detector returned {0} descriptors for {1} features")]
    DescriptorMismatch(usize, usize),

    /// An image buffer could not be created.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// A feature buffer, detector or matcher failed.
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    /// The configuration holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
