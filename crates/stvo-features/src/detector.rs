use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptors;
use crate::error::FeatureError;
use crate::keypoint::{KeyLine, KeyPoint};
use crate::GrayImage;

/// Point detector/descriptor backends a detector may provide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointDetectorKind {
    /// Oriented FAST and rotated BRIEF.
    #[default]
    Orb,
    /// Binary robust invariant scalable keypoints.
    Brisk,
}

/// Line segment detector backends a detector may provide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDetectorKind {
    /// Line segment detector.
    #[default]
    Lsd,
    /// Edge drawing lines.
    EdLines,
}

/// What a single detection call has to produce.
///
/// A `None` backend means the feature class is disabled and the detector must
/// return no features of that class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionRequest {
    /// Point backend, if points are enabled.
    pub points: Option<PointDetectorKind>,
    /// Line backend, if lines are enabled.
    pub lines: Option<LineDetectorKind>,
    /// Segments not longer than this many pixels are discarded.
    pub min_line_length: f64,
}

/// Features detected in one image, with descriptors aligned row by row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detections {
    /// Detected keypoints.
    pub points: Vec<KeyPoint>,
    /// One descriptor row per keypoint.
    pub point_descriptors: Descriptors,
    /// Detected line segments.
    pub lines: Vec<KeyLine>,
    /// One descriptor row per line segment.
    pub line_descriptors: Descriptors,
}

/// Point and line detection plus binary description of one image.
///
/// The detector is shared by the left and right worker tasks, so it must not
/// rely on interior mutability that is not thread safe.
pub trait FeatureDetector: Send + Sync {
    /// Detect and describe features in `image` as specified by `request`.
    fn detect(
        &self,
        image: &GrayImage,
        request: &DetectionRequest,
    ) -> Result<Detections, FeatureError>;
}
