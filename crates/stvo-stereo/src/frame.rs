use std::sync::Arc;

use stvo_features::{Descriptors, FeatureDetector, GrayImage, ImageSize};
use stvo_geometry::StereoCamera;

use crate::detection::detect_stereo;
use crate::error::StereoError;
use crate::feature::{LineFeature, PointFeature};
use crate::mad::line_descriptor_mad;
use crate::matching::match_stereo;
use crate::pipeline::{ExtractionSummary, StereoPipeline};
use crate::verify::{verify_lines, verify_points, ExtractionMode, LineThresholds};

/// A rectified stereo pair and the features validated on it.
///
/// Every successful extraction call replaces the previous features and
/// rebuilds the left descriptor matrices so that row `i` describes feature
/// `i`. A failed call leaves the frame untouched.
pub struct StereoFrame {
    frame_idx: usize,
    image_left: GrayImage,
    image_right: GrayImage,
    image_aux: Option<GrayImage>,
    camera: Arc<dyn StereoCamera>,
    point_descriptors_left: Descriptors,
    point_descriptors_right: Descriptors,
    line_descriptors_left: Descriptors,
    line_descriptors_right: Descriptors,
    points: Vec<PointFeature>,
    lines: Vec<LineFeature>,
}

impl StereoFrame {
    /// Create a frame from a rectified image pair.
    ///
    /// # Errors
    ///
    /// If the camera is malformed, the images differ in size or do not match
    /// the camera resolution.
    pub fn new(
        image_left: GrayImage,
        image_right: GrayImage,
        frame_idx: usize,
        camera: Arc<dyn StereoCamera>,
    ) -> Result<Self, StereoError> {
        camera.validate()?;
        if image_left.size() != image_right.size() {
            return Err(StereoError::ImageSizeMismatch(
                image_left.size(),
                image_right.size(),
            ));
        }
        check_resolution(camera.as_ref(), image_left.size())?;

        Ok(Self {
            frame_idx,
            image_left,
            image_right,
            image_aux: None,
            camera,
            point_descriptors_left: Descriptors::default(),
            point_descriptors_right: Descriptors::default(),
            line_descriptors_left: Descriptors::default(),
            line_descriptors_right: Descriptors::default(),
            points: Vec::new(),
            lines: Vec::new(),
        })
    }

    /// Attach an auxiliary image of the same size, e.g. a depth or color view.
    pub fn with_auxiliary(mut self, image: GrayImage) -> Result<Self, StereoError> {
        if image.size() != self.image_left.size() {
            return Err(StereoError::ImageSizeMismatch(
                self.image_left.size(),
                image.size(),
            ));
        }
        self.image_aux = Some(image);
        Ok(self)
    }

    /// Extract features on the first frame of a sequence: identifiers are
    /// assigned sequentially and lines are not filtered by uncertainty.
    pub fn extract_initial_stereo_features<D: FeatureDetector>(
        &mut self,
        pipeline: &StereoPipeline<D>,
    ) -> Result<ExtractionSummary, StereoError> {
        self.extract(pipeline, ExtractionMode::Bootstrap)
    }

    /// Extract features on a tracked frame: identifiers stay unassigned and
    /// lines with uncertain endpoints are dropped.
    pub fn extract_stereo_features<D: FeatureDetector>(
        &mut self,
        pipeline: &StereoPipeline<D>,
    ) -> Result<ExtractionSummary, StereoError> {
        self.extract(pipeline, ExtractionMode::Tracking)
    }

    /// Detect, match, verify and triangulate stereo features.
    pub fn extract<D: FeatureDetector>(
        &mut self,
        pipeline: &StereoPipeline<D>,
        mode: ExtractionMode,
    ) -> Result<ExtractionSummary, StereoError> {
        let config = pipeline.config();
        let camera = self.camera.as_ref();
        let parallel = config.lr_in_parallel;

        let request = pipeline.detection_request(camera.width(), camera.height());
        let (left, right) = detect_stereo(
            pipeline.detector(),
            &self.image_left,
            &self.image_right,
            &request,
            parallel,
        )?;

        let mut summary = ExtractionSummary::default();

        let (points, point_descriptors_left, point_descriptors_right) =
            if config.has_points && !left.points.is_empty() && !right.points.is_empty() {
                let candidates = match_stereo(
                    pipeline.point_matcher(),
                    &left.point_descriptors,
                    &right.point_descriptors,
                    config.best_lr_matches,
                    parallel,
                )?;
                let verified =
                    verify_points(&candidates, &left.points, &right.points, camera, config, mode);

                summary.point_candidates = candidates.len();
                summary.points_accepted = verified.len();
                let selected = left.point_descriptors.select_rows(&verified.descriptor_rows)?;
                (verified.features, selected, right.point_descriptors)
            } else {
                (Vec::new(), Descriptors::default(), Descriptors::default())
            };

        let (lines, line_descriptors_left, line_descriptors_right) =
            if config.has_lines && !left.lines.is_empty() && !right.lines.is_empty() {
                let candidates = match_stereo(
                    pipeline.line_matcher(),
                    &left.line_descriptors,
                    &right.line_descriptors,
                    config.best_lr_matches,
                    parallel,
                )?;
                let mad = line_descriptor_mad(&candidates.lr);
                let thresholds = LineThresholds {
                    separation: mad.nn12_mad * config.desc_th_l,
                    min_length_px: request.min_line_length,
                };
                let verified = verify_lines(
                    &candidates,
                    &left.lines,
                    &right.lines,
                    camera,
                    config,
                    mode,
                    thresholds,
                );

                summary.line_candidates = candidates.len();
                summary.lines_accepted = verified.len();
                summary.line_mad = Some(mad);
                let selected = left.line_descriptors.select_rows(&verified.descriptor_rows)?;
                (verified.features, selected, right.line_descriptors)
            } else {
                (Vec::new(), Descriptors::default(), Descriptors::default())
            };

        // nothing above touched the frame, commit both classes together
        self.points = points;
        self.point_descriptors_left = point_descriptors_left;
        self.point_descriptors_right = point_descriptors_right;
        self.lines = lines;
        self.line_descriptors_left = line_descriptors_left;
        self.line_descriptors_right = line_descriptors_right;

        log::debug!(
            "frame {} ({:?}): {}/{} points, {}/{} lines",
            self.frame_idx,
            mode,
            summary.points_accepted,
            summary.point_candidates,
            summary.lines_accepted,
            summary.line_candidates
        );

        Ok(summary)
    }

    /// Index of the frame in its sequence.
    pub fn frame_idx(&self) -> usize {
        self.frame_idx
    }

    /// The left image.
    pub fn image_left(&self) -> &GrayImage {
        &self.image_left
    }

    /// The right image.
    pub fn image_right(&self) -> &GrayImage {
        &self.image_right
    }

    /// The auxiliary image, if any.
    pub fn image_aux(&self) -> Option<&GrayImage> {
        self.image_aux.as_ref()
    }

    /// The stereo camera.
    pub fn camera(&self) -> &Arc<dyn StereoCamera> {
        &self.camera
    }

    /// Validated point features.
    pub fn points(&self) -> &[PointFeature] {
        &self.points
    }

    /// Mutable access to the point features, e.g. to update inlier flags.
    pub fn points_mut(&mut self) -> &mut [PointFeature] {
        &mut self.points
    }

    /// Validated line features.
    pub fn lines(&self) -> &[LineFeature] {
        &self.lines
    }

    /// Mutable access to the line features.
    pub fn lines_mut(&mut self) -> &mut [LineFeature] {
        &mut self.lines
    }

    /// Left point descriptors, one row per point feature.
    pub fn point_descriptors_left(&self) -> &Descriptors {
        &self.point_descriptors_left
    }

    /// Right point descriptors of the last extraction.
    pub fn point_descriptors_right(&self) -> &Descriptors {
        &self.point_descriptors_right
    }

    /// Left line descriptors, one row per line feature.
    pub fn line_descriptors_left(&self) -> &Descriptors {
        &self.line_descriptors_left
    }

    /// Right line descriptors of the last extraction.
    pub fn line_descriptors_right(&self) -> &Descriptors {
        &self.line_descriptors_right
    }
}

fn check_resolution(camera: &dyn StereoCamera, size: ImageSize) -> Result<(), StereoError> {
    if size.width != camera.width() || size.height != camera.height() {
        return Err(StereoError::CameraResolutionMismatch(
            size,
            camera.width(),
            camera.height(),
        ));
    }
    Ok(())
}
