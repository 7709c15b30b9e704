use stvo_features::{DetectionRequest, Detections, FeatureDetector, GrayImage};

use crate::error::StereoError;

/// Descriptor rows must line up with the features they describe.
fn check_alignment(detections: &Detections) -> Result<(), StereoError> {
    let points = detections.points.len();
    let point_rows = detections.point_descriptors.rows();
    if points != point_rows {
        return Err(StereoError::DescriptorMismatch(point_rows, points));
    }

    let lines = detections.lines.len();
    let line_rows = detections.line_descriptors.rows();
    if lines != line_rows {
        return Err(StereoError::DescriptorMismatch(line_rows, lines));
    }

    Ok(())
}

/// Run the detector on both stereo images.
///
/// With `parallel` the two images are processed concurrently on the rayon
/// pool; both halves complete before this function returns.
pub fn detect_stereo<D: FeatureDetector + ?Sized>(
    detector: &D,
    left: &GrayImage,
    right: &GrayImage,
    request: &DetectionRequest,
    parallel: bool,
) -> Result<(Detections, Detections), StereoError> {
    let (left_detections, right_detections) = if parallel {
        rayon::join(
            || detector.detect(left, request),
            || detector.detect(right, request),
        )
    } else {
        (detector.detect(left, request), detector.detect(right, request))
    };

    let left_detections = left_detections?;
    let right_detections = right_detections?;
    check_alignment(&left_detections)?;
    check_alignment(&right_detections)?;

    log::debug!(
        "stereo detection: {}/{} points, {}/{} lines",
        left_detections.points.len(),
        right_detections.points.len(),
        left_detections.lines.len(),
        right_detections.lines.len()
    );

    Ok((left_detections, right_detections))
}
