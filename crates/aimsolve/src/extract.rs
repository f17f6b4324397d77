use crate::rect::RotatedRect;

/// Corners of a detected rectangle in the order the pose solver expects:
/// top-left, top-right, bottom-right, bottom-left, each shifted by `offset`.
///
/// The order comes from sorting the corners by x only, so it does not depend
/// on how the detector reports the rotation angle. The two left-most corners
/// form the left pair and the smaller y of each pair is the top corner. Ties in
/// x keep the order of [`RotatedRect::points`].
///
/// `offset` maps region-of-interest coordinates back to the full image.
pub fn target_points(rect: &RotatedRect, offset: [f64; 2]) -> [[f64; 2]; 4] {
    let mut vertices = rect.points();
    // stable sort, NaN-safe
    vertices.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let (lu, ld) = if vertices[0][1] < vertices[1][1] {
        (vertices[0], vertices[1])
    } else {
        (vertices[1], vertices[0])
    };
    let (ru, rd) = if vertices[2][1] < vertices[3][1] {
        (vertices[2], vertices[3])
    } else {
        (vertices[3], vertices[2])
    };

    [lu, ru, rd, ld].map(|p| [p[0] + offset[0], p[1] + offset[1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_axis_aligned_with_offset() {
        let rect = RotatedRect::new([320.0, 240.0], 100.0, 40.0, 0.0);
        let p = target_points(&rect, [10.0, -5.0]);
        assert_eq!(p[0], [280.0, 215.0]);
        assert_eq!(p[1], [380.0, 215.0]);
        assert_eq!(p[2], [380.0, 255.0]);
        assert_eq!(p[3], [280.0, 255.0]);
    }

    #[test]
    fn test_small_tilt_matches_true_corners() {
        // a slightly rolled target: labels must follow the physical corners
        for angle in [-20.0, -5.0, 3.0, 15.0] {
            let rect = RotatedRect::new([200.0, 150.0], 120.0, 50.0, angle);
            let p = target_points(&rect, [0.0, 0.0]);

            let (sin, cos) = f64::to_radians(angle).sin_cos();
            let corner = |sx: f64, sy: f64| {
                let (x, y) = (sx * 60.0, sy * 25.0);
                [200.0 + x * cos - y * sin, 150.0 + x * sin + y * cos]
            };
            let expected = [
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ];
            for (got, want) in p.iter().zip(expected.iter()) {
                assert_relative_eq!(got[0], want[0], epsilon = 1e-9);
                assert_relative_eq!(got[1], want[1], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_canonical_order_any_angle() {
        let mut rng = StdRng::seed_from_u64(3);
        for step in 0..360 {
            let angle = step as f64 + rng.random_range(0.0..1.0);
            let rect = RotatedRect::new(
                [rng.random_range(0.0..640.0), rng.random_range(0.0..480.0)],
                rng.random_range(1.0..200.0),
                rng.random_range(1.0..80.0),
                angle,
            );
            let offset = [rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0)];
            let [tl, tr, br, bl] = target_points(&rect, offset);

            // left pair is left of the right pair, tops above bottoms
            assert!(tl[0].max(bl[0]) <= tr[0].min(br[0]));
            assert!(tl[1] <= bl[1]);
            assert!(tr[1] <= br[1]);

            // same corner set as the rectangle, shifted
            let mut got = [tl, tr, br, bl];
            let mut want = rect.points().map(|p| [p[0] + offset[0], p[1] + offset[1]]);
            got.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
            want.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
            assert_eq!(got, want);
        }
    }
}
