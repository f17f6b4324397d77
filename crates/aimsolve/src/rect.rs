use serde::{Deserialize, Serialize};

/// Width and height of a rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size2 {
    /// Horizontal extent before rotation.
    pub width: f64,
    /// Vertical extent before rotation.
    pub height: f64,
}

/// A rectangle rotated about its center, as produced by contour fitting.
///
/// `angle` is in degrees, measured clockwise in image coordinates (y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    /// Center in pixels.
    pub center: [f64; 2],
    /// Size in pixels.
    pub size: Size2,
    /// Rotation in degrees.
    pub angle: f64,
}

impl RotatedRect {
    /// Create a new rotated rectangle.
    pub fn new(center: [f64; 2], width: f64, height: f64, angle: f64) -> Self {
        Self {
            center,
            size: Size2 { width, height },
            angle,
        }
    }

    /// The four corners.
    ///
    /// The first corner is the bottom-left one of the unrotated rectangle and the
    /// rest follow clockwise; callers must not rely on this order once the
    /// rectangle is rotated.
    pub fn points(&self) -> [[f64; 2]; 4] {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let a = sin * 0.5;
        let b = cos * 0.5;
        let [cx, cy] = self.center;
        let Size2 { width, height } = self.size;

        let p0 = [cx - a * height - b * width, cy + b * height - a * width];
        let p1 = [cx + a * height - b * width, cy - b * height - a * width];
        let p2 = [2.0 * cx - p0[0], 2.0 * cy - p0[1]];
        let p3 = [2.0 * cx - p1[0], 2.0 * cy - p1[1]];
        [p0, p1, p2, p3]
    }

    /// A copy whose shorter side is adjusted so that long side over short side
    /// equals `ratio`.
    ///
    /// Center, angle and the longer side are kept. Detectors may report a
    /// lying rectangle with `width < height`, so the sides are picked by length
    /// rather than by name. For the same reason a `ratio` below one, as given by
    /// a target taller than wide, is used as its inverse.
    pub fn with_aspect_ratio(&self, ratio: f64) -> Self {
        let ratio = if ratio < 1.0 { ratio.recip() } else { ratio };
        let mut rect = *self;
        if rect.size.width >= rect.size.height {
            rect.size.height = rect.size.width / ratio;
        } else {
            rect.size.width = rect.size.height / ratio;
        }
        rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_points_axis_aligned() {
        let rect = RotatedRect::new([320.0, 240.0], 100.0, 40.0, 0.0);
        let p = rect.points();
        assert_eq!(p[0], [270.0, 260.0]);
        assert_eq!(p[1], [270.0, 220.0]);
        assert_eq!(p[2], [370.0, 220.0]);
        assert_eq!(p[3], [370.0, 260.0]);
    }

    #[test]
    fn test_points_rotated_keep_center_and_sides() {
        let rect = RotatedRect::new([100.0, 50.0], 60.0, 20.0, 30.0);
        let p = rect.points();

        let cx = p.iter().map(|q| q[0]).sum::<f64>() / 4.0;
        let cy = p.iter().map(|q| q[1]).sum::<f64>() / 4.0;
        assert_relative_eq!(cx, 100.0, epsilon = 1e-9);
        assert_relative_eq!(cy, 50.0, epsilon = 1e-9);

        let dist = |a: [f64; 2], b: [f64; 2]| ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
        assert_relative_eq!(dist(p[0], p[1]), 20.0, epsilon = 1e-9);
        assert_relative_eq!(dist(p[1], p[2]), 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_with_aspect_ratio() {
        let ratio = 135.0 / 55.0;
        let rect = RotatedRect::new([10.0, 20.0], 100.0, 37.0, 12.0);
        let fixed = rect.with_aspect_ratio(ratio);
        assert_eq!(fixed.center, rect.center);
        assert_eq!(fixed.angle, rect.angle);
        assert_eq!(fixed.size.width, 100.0);
        assert_relative_eq!(fixed.size.width / fixed.size.height, ratio, epsilon = 1e-12);

        // lying rectangle: the long side is reported as height
        let rect = RotatedRect::new([10.0, 20.0], 45.0, 100.0, -80.0);
        let fixed = rect.with_aspect_ratio(ratio);
        assert_eq!(fixed.size.height, 100.0);
        assert_relative_eq!(fixed.size.height / fixed.size.width, ratio, epsilon = 1e-12);
    }

    #[test]
    fn test_with_aspect_ratio_below_one() {
        // a target 55 wide and 135 tall gives the same long over short side
        let rect = RotatedRect::new([0.0, 0.0], 100.0, 37.0, 0.0);
        let tall = rect.with_aspect_ratio(55.0 / 135.0);
        let wide = rect.with_aspect_ratio(135.0 / 55.0);
        assert_eq!(tall.size.width, 100.0);
        assert_relative_eq!(tall.size.height, wide.size.height, epsilon = 1e-12);
        assert!(tall.size.height < tall.size.width);
    }
}
