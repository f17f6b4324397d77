#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Planar PnP
//!
//! Pose of a planar target relative to a calibrated camera from 2D-3D point
//! correspondences.
//!
//! ## Key Features
//!
//! - **Planar solver**: homography decomposition followed by Levenberg–Marquardt refinement
//! - **Distortion handling**: Brown-Conrady lens distortion in both steps
//! - **Rectangle targets**: four-corner solver with a centred target frame
//!
//! ## Example
//!
//! ```rust
//! use aimsolve_pnp::{CameraIntrinsics, CameraModel, RectPnPSolver};
//!
//! let camera = CameraModel::pinhole(CameraIntrinsics::new(1000.0, 1000.0, 320.0, 240.0));
//! let mut solver = RectPnPSolver::new(camera);
//! solver.set_target_size(135.0, 55.0);
//!
//! // corners of a fronto-parallel target 1350 units away
//! let half_w = 1000.0 * 135.0 / 1350.0 / 2.0;
//! let half_h = 1000.0 * 55.0 / 1350.0 / 2.0;
//! let corners = [
//!     [320.0 - half_w, 240.0 - half_h],
//!     [320.0 + half_w, 240.0 - half_h],
//!     [320.0 + half_w, 240.0 + half_h],
//!     [320.0 - half_w, 240.0 + half_h],
//! ];
//! let pose = solver.solve(&corners)?;
//! assert!((pose.translation[2] - 1350.0).abs() < 1e-3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Pinhole camera model with lens distortion.
pub mod camera;

/// Homography estimation between planes.
pub mod homography;

/// Planar homography-based PnP solver.
pub mod planar;

/// Common data types and traits for PnP solvers.
pub mod pnp;

/// Rectangle pose solver.
pub mod rectangle;

/// Levenberg–Marquardt pose refinement.
pub mod refine;

/// SO(3) rotation helpers.
pub mod so3;

pub use camera::{CameraError, CameraIntrinsics, CameraModel, PolynomialDistortion};
pub use planar::{PlanarPnP, PlanarPnPParams};
pub use pnp::{NumericTol, PnPError, PnPResult, PnPSolver};
pub use rectangle::{RectPnPSolver, TargetSize};
pub use refine::LMParams;
