//! Levenberg–Marquardt pose refinement for PnP solutions.

use glam::DVec3;
use nalgebra::{Matrix6, Vector6};

use crate::camera::CameraModel;
use crate::pnp::{check_lengths, PnPError};
use crate::so3::SO3;

/// Parameters controlling the LM pose refinement.
#[derive(Debug, Clone)]
pub struct LMParams {
    /// Maximum number of LM iterations.
    pub max_iters: usize,
    /// Convergence threshold on the decrease of the squared reprojection error.
    pub eps: f64,
    /// Convergence threshold on the gradient norm.
    pub gradient_tol: f64,
    /// Initial damping factor (lambda).
    pub lambda_init: f64,
    /// Multiplicative factor to increase/decrease lambda.
    pub lambda_mul: f64,
}

impl Default for LMParams {
    fn default() -> Self {
        Self {
            max_iters: 20,
            eps: 1e-12,
            gradient_tol: 1e-6,
            lambda_init: 1e-3,
            lambda_mul: 10.0,
        }
    }
}

/// Outcome of [`refine_pose_lm`].
#[derive(Debug, Clone, Copy)]
pub struct LMSummary {
    /// Final root-mean-square reprojection error in pixels.
    pub rmse: f64,
    /// Number of iterations run.
    pub iterations: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
}

/// Refine a pose (rvec, t) with Levenberg–Marquardt to minimize pixel reprojection error.
///
/// Projection goes through the full camera model, distortion included, so the
/// residuals are measured against the raw observed pixels.
///
/// - `points_world`: World points (N,3)
/// - `points_image`: Pixel points (N,2)
/// - `camera`: Camera intrinsics and distortion
/// - `rvec`: Initial axis-angle rotation (input/output)
/// - `t`: Initial translation (input/output)
pub fn refine_pose_lm(
    points_world: &[[f64; 3]],
    points_image: &[[f64; 2]],
    camera: &CameraModel,
    rvec: &mut [f64; 3],
    t: &mut [f64; 3],
    params: &LMParams,
) -> Result<LMSummary, PnPError> {
    check_lengths(points_world, points_image)?;

    let n = points_world.len();
    if n < 3 {
        return Err(PnPError::InsufficientCorrespondences { required: 3, actual: n });
    }

    // Parameters vector x = [rx, ry, rz, tx, ty, tz]
    let mut x = [rvec[0], rvec[1], rvec[2], t[0], t[1], t[2]];

    let project_all = |x: &[f64; 6], out: &mut [f64]| -> f64 {
        let r_mat = SO3::exp(DVec3::new(x[0], x[1], x[2])).matrix();
        let t_vec = DVec3::new(x[3], x[4], x[5]);

        let mut sum_sq = 0.0;
        for (i, (pw, uv)) in points_world.iter().zip(points_image.iter()).enumerate() {
            let pc = r_mat * DVec3::from_array(*pw) + t_vec;
            let (du, dv) = match camera.project(pc) {
                Ok([u, v]) => (u - uv[0], v - uv[1]),
                // a point flipped behind the camera makes the step unusable
                Err(_) => (f64::INFINITY, f64::INFINITY),
            };
            out[2 * i] = du;
            out[2 * i + 1] = dv;
            sum_sq += du.mul_add(du, dv * dv);
        }
        sum_sq
    };

    let mut residuals = vec![0.0f64; 2 * n];
    let mut residuals_p = vec![0.0f64; 2 * n];
    let mut residuals_m = vec![0.0f64; 2 * n];
    let mut jac = vec![0.0f64; 2 * n * 6];

    let mut err_sq = project_all(&x, &mut residuals);
    if !err_sq.is_finite() {
        return Err(PnPError::Camera(crate::camera::CameraError::BehindCamera(t[2])));
    }

    let mut lambda = params.lambda_init;
    let mut iters = 0usize;
    let mut converged = false;

    while iters < params.max_iters {
        iters += 1;

        const H_ROT: f64 = 1e-7; // radians
        let t_scale = x[3].abs().max(x[4].abs()).max(x[5].abs()).max(1.0);
        let h_trans = 1e-7 * t_scale;

        for k in 0..6 {
            // central differences
            let h = if k < 3 { H_ROT } else { h_trans };
            let mut x_plus = x;
            let mut x_minus = x;
            x_plus[k] += h;
            x_minus[k] -= h;
            project_all(&x_plus, &mut residuals_p);
            project_all(&x_minus, &mut residuals_m);
            for i in 0..(2 * n) {
                jac[i * 6 + k] = (residuals_p[i] - residuals_m[i]) / (2.0 * h);
            }
        }

        // normal equations: (J^T J + lambda I) delta = -J^T r
        let mut a = Matrix6::<f64>::zeros();
        let mut b = Vector6::<f64>::zeros();
        for (row, r_val) in residuals.iter().enumerate() {
            let j_row = Vector6::from_row_slice(&jac[row * 6..row * 6 + 6]);
            a += j_row * j_row.transpose();
            b += j_row * *r_val;
        }

        if b.amax() < params.gradient_tol {
            converged = true;
            break;
        }

        for d in 0..6 {
            a[(d, d)] += lambda * a[(d, d)].max(1e-12);
        }

        let Some(chol) = a.cholesky() else {
            lambda *= params.lambda_mul;
            continue;
        };
        let delta = chol.solve(&(-b));

        let mut x_new = x;
        for (xi, di) in x_new.iter_mut().zip(delta.iter()) {
            *xi += di;
        }
        let err_sq_new = project_all(&x_new, &mut residuals_p);

        if err_sq_new < err_sq {
            x = x_new;
            residuals.copy_from_slice(&residuals_p);
            let decrease = err_sq - err_sq_new;
            err_sq = err_sq_new;
            if decrease < params.eps {
                converged = true;
                break;
            }
            lambda = (lambda / params.lambda_mul).max(1e-12);
        } else {
            lambda *= params.lambda_mul;
        }
    }

    log::debug!(
        "LM refinement: {} iterations, squared error {:.3e}, converged {}",
        iters,
        err_sq,
        converged
    );

    rvec.copy_from_slice(&x[0..3]);
    t.copy_from_slice(&x[3..6]);

    Ok(LMSummary {
        rmse: (err_sq / n as f64).sqrt(),
        iterations: iters,
        converged,
    })
}
