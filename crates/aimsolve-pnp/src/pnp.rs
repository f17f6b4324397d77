//! Common data types shared across Perspective-n-Point (PnP) solvers.

use crate::camera::{CameraError, CameraModel};
use thiserror::Error;

/// Error types for PnP solvers.
#[derive(Debug, Error)]
pub enum PnPError {
    /// Invalid input data - insufficient correspondences for the specific solver.
    #[error("PnP solver requires at least {required} 2D-3D correspondences, got {actual}")]
    InsufficientCorrespondences {
        /// Minimum number of correspondences required by the solver.
        required: usize,
        /// Actual number of correspondences provided.
        actual: usize,
    },

    /// Invalid input data - mismatched array lengths with descriptive labels.
    #[error("Mismatched array lengths: {left_name} ({left_len}) != {right_name} ({right_len})")]
    MismatchedArrayLengths {
        /// Label for the left-hand slice.
        left_name: &'static str,
        /// Length of the left-hand slice.
        left_len: usize,
        /// Label for the right-hand slice.
        right_name: &'static str,
        /// Length of the right-hand slice.
        right_len: usize,
    },

    /// The world points do not lie on the z = 0 plane.
    #[error("Planar solver expects world points on z = 0, point {index} has z = {z}")]
    NonPlanarPoints {
        /// Index of the first offending point.
        index: usize,
        /// Its z coordinate.
        z: f64,
    },

    /// The homography between model plane and image is rank deficient.
    #[error("Degenerate homography: {0}")]
    DegenerateHomography(&'static str),

    /// Singular value decomposition failed.
    #[error("SVD computation failed: {0}")]
    SvdFailed(String),

    /// Camera model error.
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// Iteration cap for the SVDs in the pose pipeline.
pub(crate) const SVD_MAX_ITERATIONS: usize = 200;

/// Numeric tolerances used by linear algebra routines throughout the PnP pipeline.
#[derive(Debug, Clone)]
pub struct NumericTol {
    /// Tolerance passed to the SVD least-squares solve.
    pub svd: f64,
    /// Largest |z| accepted for a point on the model plane.
    pub planarity: f64,
}

impl Default for NumericTol {
    fn default() -> Self {
        Self {
            svd: 1e-12,
            planarity: 1e-9,
        }
    }
}

/// Result returned by any PnP solver.
///
/// The rotation matrix maps coordinates from the **world** (target) frame to the
/// **camera** frame: `p_cam = R * p_world + t`.
#[derive(Debug, Clone, PartialEq)]
pub struct PnPResult {
    /// Estimated rotation matrix, row-major.
    pub rotation: [[f64; 3]; 3],
    /// Estimated translation vector.
    pub translation: [f64; 3],
    /// Rodrigues axis-angle representation of the rotation.
    pub rvec: [f64; 3],
    /// Root-mean-square reprojection error in pixels (if computed).
    pub reproj_rmse: Option<f64>,
    /// Number of iterations taken (if applicable).
    pub num_iterations: Option<usize>,
    /// Whether the solver converged (if applicable).
    pub converged: Option<bool>,
}

impl PnPResult {
    /// Identity rotation and zero translation.
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
            rvec: [0.0; 3],
            reproj_rmse: None,
            num_iterations: None,
            converged: None,
        }
    }
}

/// Trait for PnP solvers.
pub trait PnPSolver {
    /// Solver-specific parameters.
    type Param;

    /// Solve for the target pose given 2D-3D correspondences.
    ///
    /// # Arguments
    /// - `world` – 3-D coordinates in the target frame.
    /// - `image` – Corresponding pixel coordinates, as observed (distorted).
    /// - `camera` – Camera intrinsics and lens distortion.
    /// - `params` – Solver-specific parameters.
    fn solve(
        world: &[[f64; 3]],
        image: &[[f64; 2]],
        camera: &CameraModel,
        params: &Self::Param,
    ) -> Result<PnPResult, PnPError>;
}

pub(crate) fn check_lengths(world: &[[f64; 3]], image: &[[f64; 2]]) -> Result<(), PnPError> {
    if world.len() != image.len() {
        return Err(PnPError::MismatchedArrayLengths {
            left_name: "world points",
            left_len: world.len(),
            right_name: "image points",
            right_len: image.len(),
        });
    }
    Ok(())
}
