use stvo_features::{
    BruteForceMatcher, DescriptorMatcher, DetectionRequest, FeatureDetector,
    ParallelBruteForceMatcher,
};

use crate::config::{LineMatcherBackend, StereoConfig};
use crate::error::StereoError;
use crate::mad::DescriptorMad;

/// Counts and thresholds of one extraction call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtractionSummary {
    /// Left to right point candidates.
    pub point_candidates: usize,
    /// Accepted point features.
    pub points_accepted: usize,
    /// Left to right line candidates.
    pub line_candidates: usize,
    /// Accepted line features.
    pub lines_accepted: usize,
    /// Robust line distance dispersion, when lines were extracted.
    pub line_mad: Option<DescriptorMad>,
}

/// Detector, matchers and configuration used to extract stereo features.
///
/// The pipeline is shared read-only across frames; frames borrow it for the
/// duration of an extraction call.
pub struct StereoPipeline<D> {
    config: StereoConfig,
    detector: D,
    point_matcher: Box<dyn DescriptorMatcher>,
    brute_force_lines: Box<dyn DescriptorMatcher>,
    parallel_lines: Box<dyn DescriptorMatcher>,
}

impl<D: FeatureDetector> StereoPipeline<D> {
    /// A pipeline with brute-force Hamming matchers.
    ///
    /// # Errors
    ///
    /// If the configuration does not validate.
    pub fn new(config: StereoConfig, detector: D) -> Result<Self, StereoError> {
        config.validate()?;
        Ok(Self {
            config,
            detector,
            point_matcher: Box::new(BruteForceMatcher),
            brute_force_lines: Box::new(BruteForceMatcher),
            parallel_lines: Box::new(ParallelBruteForceMatcher::default()),
        })
    }

    /// Replace the point descriptor matcher.
    pub fn with_point_matcher(mut self, matcher: impl DescriptorMatcher + 'static) -> Self {
        self.point_matcher = Box::new(matcher);
        self
    }

    /// Replace the line descriptor matcher used for `backend`.
    pub fn with_line_matcher(
        mut self,
        backend: LineMatcherBackend,
        matcher: impl DescriptorMatcher + 'static,
    ) -> Self {
        match backend {
            LineMatcherBackend::BruteForce => self.brute_force_lines = Box::new(matcher),
            LineMatcherBackend::Parallel => self.parallel_lines = Box::new(matcher),
        }
        self
    }

    /// The configuration.
    pub fn config(&self) -> &StereoConfig {
        &self.config
    }

    /// The feature detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// The point descriptor matcher.
    pub fn point_matcher(&self) -> &dyn DescriptorMatcher {
        self.point_matcher.as_ref()
    }

    /// The line descriptor matcher selected by the configuration.
    pub fn line_matcher(&self) -> &dyn DescriptorMatcher {
        match self.config.line_matcher {
            LineMatcherBackend::BruteForce => self.brute_force_lines.as_ref(),
            LineMatcherBackend::Parallel => self.parallel_lines.as_ref(),
        }
    }

    /// Detection request for images of the given dimensions.
    pub fn detection_request(&self, width: usize, height: usize) -> DetectionRequest {
        DetectionRequest {
            points: self.config.has_points.then_some(self.config.point_detector),
            lines: self.config.has_lines.then_some(self.config.line_detector),
            min_line_length: self.config.min_line_length_px(width, height),
        }
    }
}
