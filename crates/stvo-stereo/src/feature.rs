use glam::{DVec2, DVec3};

/// A stereo point correspondence with its triangulated position.
#[derive(Clone, Debug, PartialEq)]
pub struct PointFeature {
    /// Pixel in the left image.
    pub pixel: DVec2,
    /// Horizontal disparity `x_left - x_right`.
    pub disparity: f64,
    /// Back-projected point in the left camera frame.
    pub point: DVec3,
    /// Identifier, `None` until the feature is tracked.
    pub id: Option<usize>,
    /// Inlier flag owned by the pose estimation that consumes the feature.
    pub inlier: bool,
}

impl PointFeature {
    /// A new inlier point feature.
    pub fn new(pixel: DVec2, disparity: f64, point: DVec3, id: Option<usize>) -> Self {
        Self {
            pixel,
            disparity,
            point,
            id,
            inlier: true,
        }
    }
}

/// A stereo line segment correspondence with triangulated endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct LineFeature {
    /// Start pixel in the left image.
    pub start_pixel: DVec2,
    /// Disparity at the start pixel.
    pub start_disparity: f64,
    /// Back-projected start point.
    pub start_point: DVec3,
    /// End pixel in the left image.
    pub end_pixel: DVec2,
    /// Disparity at the end pixel.
    pub end_disparity: f64,
    /// Back-projected end point.
    pub end_point: DVec3,
    /// Left image line equation `[a, b, c]` with `a² + b² = 1`.
    pub line_eq: DVec3,
    /// Orientation of the left segment in radians.
    pub angle: f64,
    /// Identifier, `None` until the feature is tracked.
    pub id: Option<usize>,
    /// Inlier flag owned by the pose estimation that consumes the feature.
    pub inlier: bool,
}
