use stvo_features::KeyPoint;
use stvo_geometry::StereoCamera;

use super::{ExtractionMode, Verified};
use crate::config::StereoConfig;
use crate::feature::PointFeature;
use crate::matching::StereoCandidates;

/// Keep the point candidates that pass the stereo checks and triangulate them.
///
/// A candidate is accepted when it is a mutual best match (if reverse
/// matches exist), its `best / second` ratio is above `min_ratio_12_p`, both
/// keypoints lie within `max_dist_epip` rows of each other and the disparity
/// is at least `min_disp`. Accepted features keep the candidate order.
pub fn verify_points(
    candidates: &StereoCandidates,
    left: &[KeyPoint],
    right: &[KeyPoint],
    camera: &dyn StereoCamera,
    config: &StereoConfig,
    mode: ExtractionMode,
) -> Verified<PointFeature> {
    let mut verified = Verified::default();

    for candidate in &candidates.lr {
        let (Some(kp_l), Some(kp_r)) =
            (left.get(candidate.query_idx), right.get(candidate.train_idx))
        else {
            log::warn!(
                "point candidate {} -> {} is out of range",
                candidate.query_idx,
                candidate.train_idx
            );
            continue;
        };

        if !candidates.is_mutual(candidate) {
            log::trace!("point {}: not a mutual best match", candidate.query_idx);
            continue;
        }

        // an undefined ratio never passes
        if !candidate.ratio().is_some_and(|r| r > config.min_ratio_12_p) {
            log::trace!("point {}: ratio test", candidate.query_idx);
            continue;
        }

        let (pl, pr) = (kp_l.pt, kp_r.pt);
        if (pl.y - pr.y).abs() > config.max_dist_epip {
            log::trace!("point {}: off the epipolar row", candidate.query_idx);
            continue;
        }

        let disparity = pl.x - pr.x;
        if !(disparity >= config.min_disp) {
            log::trace!("point {}: disparity {disparity}", candidate.query_idx);
            continue;
        }

        let point = camera.back_project(pl.x, pl.y, disparity);
        let id = mode.id_for(verified.len());
        verified.push(
            PointFeature::new(pl, disparity, point, id),
            candidate.query_idx,
        );
    }

    verified
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use stvo_features::CandidateMatch;
    use stvo_geometry::{CameraError, PinholeStereoCamera};

    fn camera() -> Result<PinholeStereoCamera, CameraError> {
        PinholeStereoCamera::new((500.0, 500.0), (320.0, 240.0), (640, 480), 0.12)
    }

    fn config() -> StereoConfig {
        StereoConfig {
            min_disp: 5.0,
            ..Default::default()
        }
    }

    fn cm(query_idx: usize, train_idx: usize, best: f64, second: f64) -> CandidateMatch {
        CandidateMatch {
            query_idx,
            train_idx,
            distance: best,
            second_distance: Some(second),
        }
    }

    #[test]
    fn test_accepts_and_triangulates() -> Result<(), CameraError> {
        let camera = camera()?;
        let left = [KeyPoint::new(300.0, 200.0), KeyPoint::new(340.0, 240.0)];
        let right = [KeyPoint::new(290.0, 200.0), KeyPoint::new(320.0, 240.5)];
        let candidates = StereoCandidates {
            lr: vec![cm(0, 0, 24.0, 128.0), cm(1, 1, 24.0, 128.0)],
            rl_best: Some(vec![Some(0), Some(1)]),
        };

        let verified = verify_points(
            &candidates,
            &left,
            &right,
            &camera,
            &config(),
            ExtractionMode::Bootstrap,
        );
        assert_eq!(verified.len(), 2);
        assert_eq!(verified.descriptor_rows, vec![0, 1]);

        let p = &verified.features[0];
        assert_eq!(p.disparity, 10.0);
        assert_eq!(p.id, Some(0));
        assert!(p.inlier);
        let z = 500.0 * 0.12 / 10.0;
        assert_relative_eq!(p.point.z, z, epsilon = 1e-12);
        assert_relative_eq!(p.point.x, -20.0 * z / 500.0, epsilon = 1e-12);
        assert_relative_eq!(p.point.y, -40.0 * z / 500.0, epsilon = 1e-12);

        assert_eq!(verified.features[1].id, Some(1));
        Ok(())
    }

    #[test]
    fn test_rejections() -> Result<(), CameraError> {
        let camera = camera()?;
        let left = [
            KeyPoint::new(300.0, 200.0),
            KeyPoint::new(300.0, 210.0),
            KeyPoint::new(300.0, 220.0),
            KeyPoint::new(300.0, 230.0),
            KeyPoint::new(300.0, 250.0),
        ];
        let right = [
            // epipolar violation
            KeyPoint::new(290.0, 202.0),
            // disparity below min_disp
            KeyPoint::new(297.0, 210.0),
            // fine geometry, ratio fails
            KeyPoint::new(290.0, 220.0),
            // fine geometry, reverse link broken
            KeyPoint::new(290.0, 230.0),
            // accepted
            KeyPoint::new(280.0, 250.0),
        ];
        let candidates = StereoCandidates {
            lr: vec![
                cm(0, 0, 24.0, 128.0),
                cm(1, 1, 24.0, 128.0),
                cm(2, 2, 4.0, 128.0),
                cm(3, 3, 24.0, 128.0),
                cm(4, 4, 24.0, 128.0),
            ],
            rl_best: Some(vec![Some(0), Some(1), Some(2), Some(0), Some(4)]),
        };

        let verified = verify_points(
            &candidates,
            &left,
            &right,
            &camera,
            &config(),
            ExtractionMode::Tracking,
        );
        assert_eq!(verified.descriptor_rows, vec![4]);
        assert_eq!(verified.features[0].disparity, 20.0);
        assert_eq!(verified.features[0].id, None);
        Ok(())
    }

    #[test]
    fn test_undefined_ratio_and_out_of_range() -> Result<(), CameraError> {
        let camera = camera()?;
        let left = [KeyPoint::new(300.0, 200.0)];
        let right = [KeyPoint::new(290.0, 200.0)];
        let candidates = StereoCandidates {
            lr: vec![
                CandidateMatch {
                    query_idx: 0,
                    train_idx: 0,
                    distance: 10.0,
                    second_distance: None,
                },
                cm(0, 0, 10.0, 0.0),
                cm(0, 7, 24.0, 128.0),
            ],
            rl_best: None,
        };
        let verified = verify_points(
            &candidates,
            &left,
            &right,
            &camera,
            &config(),
            ExtractionMode::Bootstrap,
        );
        assert!(verified.is_empty());
        Ok(())
    }

    #[test]
    fn test_near_identical_descriptors_need_a_low_ratio() -> Result<(), CameraError> {
        let camera = camera()?;
        let left = [KeyPoint::new(300.0, 200.0), KeyPoint::new(340.0, 240.0)];
        let right = [KeyPoint::new(290.0, 200.0), KeyPoint::new(320.0, 240.0)];
        let candidates = StereoCandidates {
            lr: vec![cm(0, 0, 2.0, 120.0), cm(1, 1, 0.0, 120.0)],
            rl_best: Some(vec![Some(0), Some(1)]),
        };

        let strict = verify_points(
            &candidates,
            &left,
            &right,
            &camera,
            &config(),
            ExtractionMode::Bootstrap,
        );
        assert!(strict.is_empty());

        let permissive = StereoConfig {
            min_ratio_12_p: 0.0,
            ..config()
        };
        let verified = verify_points(
            &candidates,
            &left,
            &right,
            &camera,
            &permissive,
            ExtractionMode::Bootstrap,
        );
        // the ratio must strictly exceed the threshold, an exact match never does
        assert_eq!(verified.descriptor_rows, vec![0]);
        assert_eq!(verified.features[0].disparity, 10.0);
        Ok(())
    }
}
