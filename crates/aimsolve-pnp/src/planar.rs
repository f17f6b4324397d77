//! Homography-based pose estimation for planar targets.
//!
//! The target points lie on the plane z = 0 of the target frame. The pose is
//! recovered in two steps:
//! 1. the homography between the target plane and the undistorted, normalized
//!    image points is decomposed into `[r1 r2 t]` and projected onto SO(3);
//! 2. the pose is optionally polished with Levenberg–Marquardt on the pixel
//!    reprojection error, distortion included.

use glam::DVec3;
use nalgebra::Matrix3;

use crate::camera::CameraModel;
use crate::homography::homography_from_points;
use crate::pnp::{check_lengths, NumericTol, PnPError, PnPResult, PnPSolver, SVD_MAX_ITERATIONS};
use crate::refine::{refine_pose_lm, LMParams};
use crate::so3::{mat3_from_rows, mat3_to_rows, SO3};

/// Marker type for the planar homography PnP solver.
pub struct PlanarPnP;

/// Parameters controlling the planar solver.
#[derive(Debug, Clone)]
pub struct PlanarPnPParams {
    /// Shared numeric tolerances.
    pub tol: NumericTol,
    /// Optional Levenberg–Marquardt refinement. `None` keeps the linear estimate.
    pub refine_lm: Option<LMParams>,
}

impl Default for PlanarPnPParams {
    fn default() -> Self {
        Self {
            tol: NumericTol::default(),
            refine_lm: Some(LMParams::default()),
        }
    }
}

impl PnPSolver for PlanarPnP {
    type Param = PlanarPnPParams;

    fn solve(
        world: &[[f64; 3]],
        image: &[[f64; 2]],
        camera: &CameraModel,
        params: &Self::Param,
    ) -> Result<PnPResult, PnPError> {
        solve_planar(world, image, camera, params)
    }
}

/// Solve the pose of a planar target.
///
/// # Arguments
/// * `points_world` – Target points on z = 0, shape *(N,3)* with `N≥4`.
/// * `points_image` – Corresponding observed pixel coordinates, shape *(N,2)*.
/// * `camera` – Camera intrinsics and distortion.
///
/// # Returns
/// The rotation/translation mapping target coordinates into the camera frame.
pub fn solve_planar(
    points_world: &[[f64; 3]],
    points_image: &[[f64; 2]],
    camera: &CameraModel,
    params: &PlanarPnPParams,
) -> Result<PnPResult, PnPError> {
    check_lengths(points_world, points_image)?;
    let n = points_world.len();
    if n < 4 {
        return Err(PnPError::InsufficientCorrespondences {
            required: 4,
            actual: n,
        });
    }
    if let Some((index, p)) = points_world
        .iter()
        .enumerate()
        .find(|(_, p)| p[2].abs() > params.tol.planarity)
    {
        return Err(PnPError::NonPlanarPoints { index, z: p[2] });
    }

    let plane: Vec<[f64; 2]> = points_world.iter().map(|p| [p[0], p[1]]).collect();
    let normalized = camera.normalize_points(points_image);

    let hmat = homography_from_points(&plane, &normalized, params.tol.svd)?;
    let (r, t) = decompose_homography(&hmat)?;

    let mut rvec = SO3::from_rows(&r).log().to_array();
    let mut tvec = t;

    let (reproj_rmse, num_iterations, converged) = match &params.refine_lm {
        Some(lm) => {
            let summary =
                refine_pose_lm(points_world, points_image, camera, &mut rvec, &mut tvec, lm)?;
            (
                Some(summary.rmse),
                Some(summary.iterations),
                Some(summary.converged),
            )
        }
        None => (
            Some(reprojection_rmse(points_world, points_image, camera, &r, &t)?),
            None,
            None,
        ),
    };

    let rotation = mat3_to_rows(&SO3::exp(DVec3::from_array(rvec)).matrix());

    Ok(PnPResult {
        rotation,
        translation: tvec,
        rvec,
        reproj_rmse,
        num_iterations,
        converged,
    })
}

/// Decompose a plane-to-normalized-image homography into rotation and translation.
///
/// `H ~ [r1 r2 t]`; the scale is chosen so that the target lies in front of the camera.
fn decompose_homography(h: &[[f64; 3]; 3]) -> Result<([[f64; 3]; 3], [f64; 3]), PnPError> {
    let h1 = DVec3::new(h[0][0], h[1][0], h[2][0]);
    let h2 = DVec3::new(h[0][1], h[1][1], h[2][1]);
    let h3 = DVec3::new(h[0][2], h[1][2], h[2][2]);

    let norm = (h1.length() * h2.length()).sqrt();
    if norm <= 0.0 || !norm.is_finite() {
        return Err(PnPError::DegenerateHomography("zero-length rotation columns"));
    }
    let mut s = 1.0 / norm;
    if h3.z * s < 0.0 {
        s = -s;
    }

    let r1 = h1 * s;
    let r2 = h2 * s;
    let r3 = r1.cross(r2);
    let t = h3 * s;

    // closest rotation in the Frobenius sense: R = U * V^T
    let m = Matrix3::new(
        r1.x, r2.x, r3.x, //
        r1.y, r2.y, r3.y, //
        r1.z, r2.z, r3.z,
    );
    let svd = m
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| PnPError::SvdFailed("SVD did not converge".to_string()))?;
    let (Some(mut u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(PnPError::SvdFailed("failed to compute U or V^T".to_string()));
    };
    if (u * v_t).determinant() < 0.0 {
        u.column_mut(2).neg_mut();
    }
    let r = u * v_t;

    let rows = [
        [r[(0, 0)], r[(0, 1)], r[(0, 2)]],
        [r[(1, 0)], r[(1, 1)], r[(1, 2)]],
        [r[(2, 0)], r[(2, 1)], r[(2, 2)]],
    ];
    Ok((rows, t.to_array()))
}

/// Root-mean-square pixel reprojection error of a pose.
pub fn reprojection_rmse(
    points_world: &[[f64; 3]],
    points_image: &[[f64; 2]],
    camera: &CameraModel,
    rotation: &[[f64; 3]; 3],
    translation: &[f64; 3],
) -> Result<f64, PnPError> {
    check_lengths(points_world, points_image)?;
    if points_world.is_empty() {
        return Err(PnPError::InsufficientCorrespondences {
            required: 1,
            actual: 0,
        });
    }
    let r_mat = mat3_from_rows(rotation);
    let t_vec = DVec3::from_array(*translation);

    let mut sum_sq = 0.0;
    for (pw, uv) in points_world.iter().zip(points_image.iter()) {
        let [u, v] = camera.project(r_mat * DVec3::from_array(*pw) + t_vec)?;
        let du = u - uv[0];
        let dv = v - uv[1];
        sum_sq += du.mul_add(du, dv * dv);
    }
    Ok((sum_sq / points_world.len() as f64).sqrt())
}
