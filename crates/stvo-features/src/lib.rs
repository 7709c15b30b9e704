#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Binary descriptor matrices and the Hamming distance.
pub mod descriptor;

/// Detector boundary used by the stereo pipeline.
pub mod detector;

/// Error types for the features module.
pub mod error;

/// Point and line keypoint types.
pub mod keypoint;

/// Nearest-neighbour descriptor matchers.
pub mod matcher;

pub use descriptor::{hamming_distance, Descriptors};
pub use detector::{
    DetectionRequest, Detections, FeatureDetector, LineDetectorKind, PointDetectorKind,
};
pub use error::FeatureError;
pub use keypoint::{KeyLine, KeyPoint};
pub use matcher::{BruteForceMatcher, CandidateMatch, DescriptorMatcher, ParallelBruteForceMatcher};

pub use kornia_image::{ImageError, ImageSize};

/// Single channel 8-bit image handed to feature detectors.
pub type GrayImage = kornia_image::Image<u8, 1>;
