use serde::{Deserialize, Serialize};
use stvo_features::{LineDetectorKind, PointDetectorKind};

use crate::error::StereoError;

/// Matcher used for the line descriptors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMatcherBackend {
    /// Sequential brute-force Hamming search.
    #[default]
    BruteForce,
    /// Brute-force Hamming search spread over the rayon pool.
    Parallel,
}

/// Configuration of the stereo feature pipeline.
///
/// Angles are in radians, distances in pixels. Missing fields in a
/// deserialized document take their default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    /// Extract point features.
    pub has_points: bool,
    /// Extract line segment features.
    pub has_lines: bool,
    /// Point detector backend forwarded to the detector.
    pub point_detector: PointDetectorKind,
    /// Line detector backend forwarded to the detector.
    pub line_detector: LineDetectorKind,
    /// Matcher used for line descriptors.
    pub line_matcher: LineMatcherBackend,
    /// Run the left and right halves of detection and matching concurrently.
    pub lr_in_parallel: bool,
    /// Match in both directions and keep only mutual best matches.
    pub best_lr_matches: bool,
    /// Points are kept only when `best / second_best` is above this value.
    pub min_ratio_12_p: f64,
    /// Multiplier of the robust `second_best - best` dispersion for lines.
    pub desc_th_l: f64,
    /// Maximum row offset between stereo point correspondences.
    pub max_dist_epip: f64,
    /// Minimum disparity of points and line endpoints.
    pub min_disp: f64,
    /// Minimum absolute line orientation.
    pub min_horiz_angle: f64,
    /// Maximum orientation difference between the left and right segments.
    pub max_angle_diff: f64,
    /// Minimum line length as a fraction of the smaller image dimension.
    pub min_line_length: f64,
    /// Minimum absolute horizontal coefficient of the right line equation.
    pub line_horiz_th: f64,
    /// Maximum eigenvalue of a line endpoint covariance.
    pub line_cov_th: f64,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            has_points: true,
            has_lines: true,
            point_detector: PointDetectorKind::Orb,
            line_detector: LineDetectorKind::Lsd,
            line_matcher: LineMatcherBackend::BruteForce,
            lr_in_parallel: true,
            best_lr_matches: true,
            min_ratio_12_p: 0.1,
            desc_th_l: 0.1,
            max_dist_epip: 1.0,
            min_disp: 1.0,
            min_horiz_angle: 5f64.to_radians(),
            max_angle_diff: 10f64.to_radians(),
            min_line_length: 0.025,
            line_horiz_th: 0.1,
            line_cov_th: 10.0,
        }
    }
}

impl StereoConfig {
    /// Minimum line length in pixels for an image of the given dimensions.
    pub fn min_line_length_px(&self, width: usize, height: usize) -> f64 {
        self.min_line_length * width.min(height) as f64
    }

    /// Check that every threshold is a usable number.
    pub fn validate(&self) -> Result<(), StereoError> {
        let thresholds = [
            ("min_ratio_12_p", self.min_ratio_12_p),
            ("desc_th_l", self.desc_th_l),
            ("max_dist_epip", self.max_dist_epip),
            ("min_disp", self.min_disp),
            ("min_horiz_angle", self.min_horiz_angle),
            ("max_angle_diff", self.max_angle_diff),
            ("min_line_length", self.min_line_length),
            ("line_horiz_th", self.line_horiz_th),
            ("line_cov_th", self.line_cov_th),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(StereoError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.min_line_length > 1.0 {
            return Err(StereoError::InvalidConfig(format!(
                "min_line_length is a fraction of the image size, got {}",
                self.min_line_length
            )));
        }
        Ok(())
    }
}
