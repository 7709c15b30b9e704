use glam::{DMat3, DVec2, DVec3};
use stvo_geometry::{eigen::max_symmetric_eigenvalue3, StereoCamera};

/// Analytic covariance of a back-projected stereo pixel.
///
/// With `px`, `py` the offsets of the pixel from the principal point, `d` the
/// disparity, `f` the focal length and `B` the baseline:
///
/// ```text
///       | d²+2px²   2px·py    2f·px |
/// Σ  =  | 2px·py    d²+2py²   2f·py |  ·  B² / d⁴
///       | 2f·px     2f·py     2f²   |
/// ```
///
/// The unscaled matrix is built first and scaled afterwards.
pub fn endpoint_covariance(camera: &dyn StereoCamera, pixel: DVec2, disparity: f64) -> DMat3 {
    let px = pixel.x - camera.cx();
    let py = pixel.y - camera.cy();
    let f = camera.fx();
    let d2 = disparity * disparity;

    let raw = DMat3::from_cols(
        DVec3::new(d2 + 2.0 * px * px, 2.0 * px * py, 2.0 * f * px),
        DVec3::new(2.0 * px * py, d2 + 2.0 * py * py, 2.0 * f * py),
        DVec3::new(2.0 * f * px, 2.0 * f * py, 2.0 * f * f),
    );

    let b = camera.baseline();
    raw * (b * b / (d2 * d2))
}

/// Largest eigenvalue of [`endpoint_covariance`].
pub fn endpoint_uncertainty(camera: &dyn StereoCamera, pixel: DVec2, disparity: f64) -> f64 {
    max_symmetric_eigenvalue3(&endpoint_covariance(camera, pixel, disparity))
}

/// Worst endpoint uncertainty of a stereo line segment.
pub fn line_uncertainty(
    camera: &dyn StereoCamera,
    start: DVec2,
    start_disparity: f64,
    end: DVec2,
    end_disparity: f64,
) -> f64 {
    endpoint_uncertainty(camera, start, start_disparity)
        .max(endpoint_uncertainty(camera, end, end_disparity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use stvo_geometry::{CameraError, PinholeStereoCamera};

    fn camera() -> Result<PinholeStereoCamera, CameraError> {
        PinholeStereoCamera::new((500.0, 500.0), (320.0, 240.0), (640, 480), 0.12)
    }

    #[test]
    fn test_covariance_at_principal_point() -> Result<(), CameraError> {
        let camera = camera()?;
        let d = 20.0;
        let cov = endpoint_covariance(&camera, DVec2::new(320.0, 240.0), d);
        let scale = 0.12 * 0.12 / (d * d * d * d);
        assert_relative_eq!(cov.x_axis.x, d * d * scale, epsilon = 1e-15);
        assert_relative_eq!(cov.y_axis.y, d * d * scale, epsilon = 1e-15);
        assert_relative_eq!(cov.z_axis.z, 2.0 * 500.0 * 500.0 * scale, epsilon = 1e-12);
        assert_eq!(cov.x_axis.y, 0.0);
        assert_eq!(cov.x_axis.z, 0.0);

        // diagonal, so the largest eigenvalue is the depth term
        let max_eig = endpoint_uncertainty(&camera, DVec2::new(320.0, 240.0), d);
        assert_relative_eq!(max_eig, 2.0 * 500.0 * 500.0 * scale, max_relative = 1e-12);
        Ok(())
    }

    #[test]
    fn test_covariance_is_symmetric() -> Result<(), CameraError> {
        let camera = camera()?;
        let cov = endpoint_covariance(&camera, DVec2::new(100.0, 400.0), 12.5);
        assert_eq!(cov, cov.transpose());
        Ok(())
    }

    #[test]
    fn test_uncertainty_grows_with_depth() -> Result<(), CameraError> {
        let camera = camera()?;
        let center = DVec2::new(320.0, 240.0);
        let near = endpoint_uncertainty(&camera, center, 60.0);
        let far = endpoint_uncertainty(&camera, center, 6.0);
        assert!(near < far);

        // a bound between the two keeps only the near endpoint
        let bound = 0.5 * (near + far);
        assert!(near <= bound);
        assert!(far > bound);

        let line = line_uncertainty(&camera, center, 60.0, center, 6.0);
        assert_eq!(line, far);
        Ok(())
    }
}
