use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Errors raised when a stereo camera model is malformed.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CameraError {
    /// The focal length is not a finite positive number.
    #[error("Invalid focal length ({0}, {1})")]
    InvalidFocalLength(f64, f64),

    /// The principal point is not finite.
    #[error("Invalid principal point ({0}, {1})")]
    InvalidPrincipalPoint(f64, f64),

    /// The stereo baseline is not a finite positive number.
    #[error("Invalid baseline {0}")]
    InvalidBaseline(f64),

    /// The image has a zero dimension.
    #[error("Invalid image size {0}x{1}")]
    InvalidImageSize(usize, usize),
}

/// Calibrated rectified stereo rig as seen by the feature pipeline.
///
/// Implementors must be safe to share across the left/right worker tasks.
pub trait StereoCamera: Send + Sync {
    /// Image width in pixels.
    fn width(&self) -> usize;

    /// Image height in pixels.
    fn height(&self) -> usize;

    /// Horizontal focal length in pixels.
    fn fx(&self) -> f64;

    /// Vertical focal length in pixels.
    fn fy(&self) -> f64;

    /// Principal point x coordinate in pixels.
    fn cx(&self) -> f64;

    /// Principal point y coordinate in pixels.
    fn cy(&self) -> f64;

    /// Distance between the two optical centers, in metric units.
    fn baseline(&self) -> f64;

    /// Back-project a left image pixel with the given disparity to a 3D point
    /// expressed in the left camera frame.
    fn back_project(&self, x: f64, y: f64, disparity: f64) -> DVec3 {
        let depth = self.fx() * self.baseline() / disparity;
        DVec3::new(
            (x - self.cx()) * depth / self.fx(),
            (y - self.cy()) * depth / self.fy(),
            depth,
        )
    }

    /// Project a 3D point in the left camera frame to its left image pixel
    /// and stereo disparity.
    fn project(&self, point: DVec3) -> (DVec2, f64) {
        let pixel = DVec2::new(
            self.cx() + self.fx() * point.x / point.z,
            self.cy() + self.fy() * point.y / point.z,
        );
        (pixel, self.fx() * self.baseline() / point.z)
    }

    /// Check that the intrinsics and baseline are usable.
    fn validate(&self) -> Result<(), CameraError> {
        let (fx, fy) = (self.fx(), self.fy());
        if !(fx.is_finite() && fy.is_finite() && fx > 0.0 && fy > 0.0) {
            return Err(CameraError::InvalidFocalLength(fx, fy));
        }
        let (cx, cy) = (self.cx(), self.cy());
        if !(cx.is_finite() && cy.is_finite()) {
            return Err(CameraError::InvalidPrincipalPoint(cx, cy));
        }
        let baseline = self.baseline();
        if !(baseline.is_finite() && baseline > 0.0) {
            return Err(CameraError::InvalidBaseline(baseline));
        }
        if self.width() == 0 || self.height() == 0 {
            return Err(CameraError::InvalidImageSize(self.width(), self.height()));
        }
        Ok(())
    }
}

/// A rectified pinhole stereo pair sharing the same intrinsics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinholeStereoCamera {
    /// The focal length in pixels (fx, fy)
    pub focal_length: (f64, f64),
    /// The principal point in pixels (cx, cy)
    pub principal_point: (f64, f64),
    /// The image dimensions (width, height)
    pub image_size: (usize, usize),
    /// The stereo baseline
    pub baseline: f64,
}

impl PinholeStereoCamera {
    /// Creates a new stereo camera and validates its parameters.
    pub fn new(
        focal_length: (f64, f64),
        principal_point: (f64, f64),
        image_size: (usize, usize),
        baseline: f64,
    ) -> Result<Self, CameraError> {
        let camera = Self {
            focal_length,
            principal_point,
            image_size,
            baseline,
        };
        camera.validate()?;
        Ok(camera)
    }
}

impl StereoCamera for PinholeStereoCamera {
    fn width(&self) -> usize {
        self.image_size.0
    }

    fn height(&self) -> usize {
        self.image_size.1
    }

    fn fx(&self) -> f64 {
        self.focal_length.0
    }

    fn fy(&self) -> f64 {
        self.focal_length.1
    }

    fn cx(&self) -> f64 {
        self.principal_point.0
    }

    fn cy(&self) -> f64 {
        self.principal_point.1
    }

    fn baseline(&self) -> f64 {
        self.baseline
    }
}
