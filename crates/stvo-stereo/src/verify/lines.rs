use glam::{DVec2, DVec3};
use stvo_features::KeyLine;
use stvo_geometry::{
    line::{angle_diff, intersect_row, line_through, normalized_line_through},
    StereoCamera,
};

use super::{ExtractionMode, Verified};
use crate::config::StereoConfig;
use crate::feature::LineFeature;
use crate::matching::StereoCandidates;
use crate::uncertainty::line_uncertainty;

/// Per-call line thresholds derived from the image size and the candidate population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineThresholds {
    /// Minimum `second - best` descriptor separation.
    pub separation: f64,
    /// Right segments must be longer than this many pixels.
    pub min_length_px: f64,
}

/// Right image points on the rows of the left endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndpointCorrespondence {
    /// Homogeneous line through the right segment, not normalized.
    pub right_line: DVec3,
    /// Point of the right line on the row of the left start point.
    pub right_start: DVec2,
    /// Point of the right line on the row of the left end point.
    pub right_end: DVec2,
    /// Disparity of the left start point.
    pub start_disparity: f64,
    /// Disparity of the left end point.
    pub end_disparity: f64,
}

/// Transfer the left endpoints onto the right segment's line along their rows.
///
/// Returns `None` when the right line is too close to horizontal, i.e. its
/// horizontal coefficient is not above `line_horiz_th` in magnitude.
pub fn rederive_endpoints(
    left: &KeyLine,
    right: &KeyLine,
    line_horiz_th: f64,
) -> Option<EndpointCorrespondence> {
    let right_line = line_through(right.start, right.end);
    if !(right_line.x.abs() > line_horiz_th) {
        return None;
    }

    let right_start = DVec2::new(intersect_row(right_line, left.start.y), left.start.y);
    let right_end = DVec2::new(intersect_row(right_line, left.end.y), left.end.y);

    Some(EndpointCorrespondence {
        right_line,
        right_start,
        right_end,
        start_disparity: left.start.x - right_start.x,
        end_disparity: left.end.x - right_end.x,
    })
}

/// Keep the line candidates that pass the stereo checks and triangulate them.
///
/// In [`ExtractionMode::Tracking`] the worst endpoint covariance eigenvalue
/// must also stay within `line_cov_th`.
pub fn verify_lines(
    candidates: &StereoCandidates,
    left: &[KeyLine],
    right: &[KeyLine],
    camera: &dyn StereoCamera,
    config: &StereoConfig,
    mode: ExtractionMode,
    thresholds: LineThresholds,
) -> Verified<LineFeature> {
    let mut verified = Verified::default();

    for candidate in &candidates.lr {
        let idx = candidate.query_idx;
        let (Some(kl_l), Some(kl_r)) = (left.get(idx), right.get(candidate.train_idx)) else {
            log::warn!(
                "line candidate {} -> {} is out of range",
                idx,
                candidate.train_idx
            );
            continue;
        };

        if !candidates.is_mutual(candidate) {
            log::trace!("line {idx}: not a mutual best match");
            continue;
        }
        if !(kl_r.length > thresholds.min_length_px) {
            log::trace!("line {idx}: right segment too short");
            continue;
        }
        if !candidate
            .separation()
            .is_some_and(|s| s > thresholds.separation)
        {
            log::trace!("line {idx}: descriptor separation");
            continue;
        }

        if kl_l.angle.abs() < config.min_horiz_angle
            || kl_r.angle.abs() < config.min_horiz_angle
            || !(angle_diff(kl_l.angle, kl_r.angle).abs() < config.max_angle_diff)
        {
            log::trace!("line {idx}: orientation");
            continue;
        }

        let Some(corr) = rederive_endpoints(kl_l, kl_r, config.line_horiz_th) else {
            log::trace!("line {idx}: right line nearly horizontal");
            continue;
        };
        if !(corr.start_disparity >= config.min_disp && corr.end_disparity >= config.min_disp) {
            log::trace!(
                "line {idx}: disparities {} {}",
                corr.start_disparity,
                corr.end_disparity
            );
            continue;
        }

        let Some(line_eq) = normalized_line_through(kl_l.start, kl_l.end) else {
            log::trace!("line {idx}: degenerate left segment");
            continue;
        };

        if mode.uncertainty_gate() {
            let max_eig = line_uncertainty(
                camera,
                kl_l.start,
                corr.start_disparity,
                kl_l.end,
                corr.end_disparity,
            );
            if !(max_eig <= config.line_cov_th) {
                log::trace!("line {idx}: endpoint uncertainty {max_eig}");
                continue;
            }
        }

        let feature = LineFeature {
            start_pixel: kl_l.start,
            start_disparity: corr.start_disparity,
            start_point: camera.back_project(kl_l.start.x, kl_l.start.y, corr.start_disparity),
            end_pixel: kl_l.end,
            end_disparity: corr.end_disparity,
            end_point: camera.back_project(kl_l.end.x, kl_l.end.y, corr.end_disparity),
            line_eq,
            angle: kl_l.angle,
            id: mode.id_for(verified.len()),
            inlier: true,
        };
        verified.push(feature, idx);
    }

    verified
}
