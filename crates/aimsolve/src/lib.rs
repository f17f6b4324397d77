#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Angle solving
//!
//! Turns a rotated rectangle reported by a target detector into the yaw and
//! pitch a gimbal has to turn to, in degrees.
//!
//! The pipeline for one detection is:
//!
//! 1. order the rectangle corners top-left, top-right, bottom-right, bottom-left;
//! 2. solve the target pose from the corners and the known target size;
//! 3. scale the depth by an empirical correction and check it against the valid band;
//! 4. move the position from the camera frame to the gimbal frame;
//! 5. compensate gravity drop and the barrel offset.
//!
//! ## Example
//!
//! ```rust
//! use aimsolve::{AngleSolver, AngleSolverFactory, RotatedRect, TargetType};
//! use aimsolve_pnp::{CameraIntrinsics, CameraModel};
//!
//! let camera = CameraModel::pinhole(CameraIntrinsics::new(1000.0, 1000.0, 320.0, 240.0));
//! let mut factory = AngleSolverFactory::with_solver(AngleSolver::new(camera));
//! factory.set_target_size(135.0, 55.0, TargetType::SmallArmor);
//!
//! let rect = RotatedRect::new([320.0, 240.0], 100.0, 40.0, 0.0);
//! let angles = factory.get_angle(&rect, TargetType::SmallArmor, 15.0, 0.0, [0.0, 0.0])?;
//! assert!(angles.angle_x.abs() < 1e-6);
//! // aims up to counter the drop
//! assert!(angles.angle_y < 0.0);
//! # Ok::<(), aimsolve::AimError>(())
//! ```

/// Gravity-drop and barrel-offset compensation.
pub mod ballistics;

/// Loading solver settings from JSON.
pub mod config;

/// Error types.
pub mod error;

/// Canonical corner ordering for detected rectangles.
pub mod extract;

/// Per-target-type dispatch.
pub mod factory;

/// Rotated rectangles as reported by detectors.
pub mod rect;

/// The angle solver pipeline.
pub mod solver;

/// Camera-to-gimbal frame transform.
pub mod transform;

pub use ballistics::{AimAngles, BarrelCompensator};
pub use config::{AimConfig, ConfigError};
pub use error::AimError;
pub use extract::target_points;
pub use factory::{AngleSolverFactory, TargetType};
pub use rect::{RotatedRect, Size2};
pub use solver::{AimSolution, AngleSolver, DistanceRange, RangePolicy};
pub use transform::CameraToGimbal;
