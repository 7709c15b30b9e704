use std::f64::consts::PI;

use glam::{DVec2, DVec3};

/// Homogeneous line `l = [a, b, c]` through two pixels, with `a*x + b*y + c = 0`.
///
/// The coefficients are not normalized: `a = y_start - y_end` and
/// `b = x_end - x_start`.
pub fn line_through(start: DVec2, end: DVec2) -> DVec3 {
    start.extend(1.0).cross(end.extend(1.0))
}

/// Homogeneous line through two pixels scaled so that `(a, b)` is a unit vector.
///
/// Returns `None` when both pixels coincide.
pub fn normalized_line_through(start: DVec2, end: DVec2) -> Option<DVec3> {
    let line = line_through(start, end);
    let norm = line.truncate().length();
    if norm > 0.0 {
        Some(line / norm)
    } else {
        None
    }
}

/// Abscissa where the horizontal row `y` crosses the homogeneous line.
///
/// PRECONDITION: `line.x` is not zero. Callers gate on the horizontal
/// coefficient before using the result.
#[inline]
pub fn intersect_row(line: DVec3, y: f64) -> f64 {
    -(line.z + line.y * y) / line.x
}

/// Signed algebraic residual of a pixel with respect to a homogeneous line.
#[inline]
pub fn line_residual(line: DVec3, point: DVec2) -> f64 {
    line.dot(point.extend(1.0))
}

/// Difference between two angles in radians, wrapped to `[-pi, pi]`.
pub fn angle_diff(alpha: f64, beta: f64) -> f64 {
    let mut theta = alpha - beta;
    if theta > PI {
        theta -= 2.0 * PI;
    }
    if theta < -PI {
        theta += 2.0 * PI;
    }
    theta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_through_contains_endpoints() {
        let start = DVec2::new(100.0, 100.0);
        let end = DVec2::new(150.0, 300.0);
        let line = line_through(start, end);
        assert_relative_eq!(line_residual(line, start), 0.0);
        assert_relative_eq!(line_residual(line, end), 0.0);
        assert_eq!(line.x, start.y - end.y);
        assert_eq!(line.y, end.x - start.x);
    }

    #[test]
    fn test_normalized_line() {
        let line = normalized_line_through(DVec2::new(0.0, 0.0), DVec2::new(3.0, 4.0));
        let line = line.expect("distinct points");
        assert_relative_eq!(line.truncate().length(), 1.0, epsilon = 1e-12);
        assert!(normalized_line_through(DVec2::ONE, DVec2::ONE).is_none());
    }

    #[test]
    fn test_intersect_row() {
        // x = 80 + 0.25 * (y - 100)
        let line = line_through(DVec2::new(85.0, 120.0), DVec2::new(125.0, 280.0));
        for y in [100.0, 200.0, 300.0] {
            let x = intersect_row(line, y);
            assert_relative_eq!(x, 80.0 + 0.25 * (y - 100.0), epsilon = 1e-9);
            assert_relative_eq!(line_residual(line, DVec2::new(x, y)), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_angle_diff_wraps() {
        assert_relative_eq!(angle_diff(0.3, 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_diff(PI - 0.05, -PI + 0.05), -0.1, epsilon = 1e-12);
        assert_relative_eq!(angle_diff(-PI + 0.05, PI - 0.05), 0.1, epsilon = 1e-12);
    }
}
