use nalgebra::{DMatrix, DVector};

use crate::pnp::{PnPError, SVD_MAX_ITERATIONS};

/// Compute the homography mapping `src` points onto `dst` points.
///
/// The last entry of the homography is fixed to one and the remaining eight are
/// solved in the least-squares sense, so four points give the exact solution and
/// more points average out noise.
///
/// * `src` - The source 2d points with shape (N, 2), N >= 4.
/// * `dst` - The destination 2d points with shape (N, 2).
///
/// Returns the row-major 3x3 homography from `src` to `dst`.
pub fn homography_from_points(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    svd_eps: f64,
) -> Result<[[f64; 3]; 3], PnPError> {
    if src.len() != dst.len() {
        return Err(PnPError::MismatchedArrayLengths {
            left_name: "source points",
            left_len: src.len(),
            right_name: "destination points",
            right_len: dst.len(),
        });
    }
    let n = src.len();
    if n < 4 {
        return Err(PnPError::InsufficientCorrespondences {
            required: 4,
            actual: n,
        });
    }

    if src.iter().chain(dst.iter()).flatten().any(|v| !v.is_finite()) {
        return Err(PnPError::DegenerateHomography("non-finite point coordinates"));
    }

    // scale the source so its coordinates are O(1)
    let scale = src
        .iter()
        .flat_map(|p| p.iter())
        .fold(0.0f64, |acc, &v| acc.max(v.abs()));
    if scale <= 0.0 {
        return Err(PnPError::DegenerateHomography("source points collapse to the origin"));
    }
    let inv_scale = 1.0 / scale;

    let mut mat_a = DMatrix::<f64>::zeros(2 * n, 8);
    let mut vec_b = DVector::<f64>::zeros(2 * n);
    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let (x, y) = (s[0] * inv_scale, s[1] * inv_scale);
        let (u, v) = (d[0], d[1]);

        mat_a[(2 * i, 0)] = x;
        mat_a[(2 * i, 1)] = y;
        mat_a[(2 * i, 2)] = 1.0;
        mat_a[(2 * i, 6)] = -u * x;
        mat_a[(2 * i, 7)] = -u * y;
        vec_b[2 * i] = u;

        mat_a[(2 * i + 1, 3)] = x;
        mat_a[(2 * i + 1, 4)] = y;
        mat_a[(2 * i + 1, 5)] = 1.0;
        mat_a[(2 * i + 1, 6)] = -v * x;
        mat_a[(2 * i + 1, 7)] = -v * y;
        vec_b[2 * i + 1] = v;
    }

    let svd = mat_a
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| PnPError::SvdFailed("SVD did not converge".to_string()))?;
    let sv_max = svd.singular_values.max();
    let sv_min = svd.singular_values.min();
    if sv_max <= 0.0 || sv_min / sv_max < 1e-12 {
        return Err(PnPError::DegenerateHomography("points are collinear or repeated"));
    }
    let h = svd
        .solve(&vec_b, svd_eps)
        .map_err(|e| PnPError::SvdFailed(e.to_string()))?;

    // undo the source scaling: H = H' * diag(1/s, 1/s, 1)
    let homo = [
        [h[0] * inv_scale, h[1] * inv_scale, h[2]],
        [h[3] * inv_scale, h[4] * inv_scale, h[5]],
        [h[6] * inv_scale, h[7] * inv_scale, 1.0],
    ];

    let det = det_mat33(&homo);
    if det == 0.0 || !det.is_finite() {
        return Err(PnPError::DegenerateHomography("homography is singular"));
    }

    Ok(homo)
}

fn det_mat33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}
