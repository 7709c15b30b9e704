use glam::DVec2;

/// A detected point feature in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPoint {
    /// Pixel location (x = column, y = row).
    pub pt: DVec2,
}

impl KeyPoint {
    /// A keypoint at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            pt: DVec2::new(x, y),
        }
    }
}

/// A detected line segment in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyLine {
    /// Start point of the segment.
    pub start: DVec2,
    /// End point of the segment.
    pub end: DVec2,
    /// Orientation `atan2(end.y - start.y, end.x - start.x)` in radians.
    pub angle: f64,
    /// Segment length in pixels.
    pub length: f64,
}

impl KeyLine {
    /// A keyline between two pixels; orientation and length are derived from them.
    pub fn new(start: DVec2, end: DVec2) -> Self {
        let d = end - start;
        Self {
            start,
            end,
            angle: d.y.atan2(d.x),
            length: d.length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyline_geometry() {
        let line = KeyLine::new(DVec2::new(0.0, 0.0), DVec2::new(3.0, 4.0));
        assert_eq!(line.length, 5.0);
        assert_eq!(line.angle, 4.0f64.atan2(3.0));

        let reversed = KeyLine::new(line.end, line.start);
        assert_eq!(reversed.length, 5.0);
        assert!(reversed.angle < 0.0);
    }
}
