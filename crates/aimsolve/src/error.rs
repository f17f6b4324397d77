use aimsolve_pnp::PnPError;
use thiserror::Error;

/// An error type for the angle solver.
#[derive(Error, Debug)]
pub enum AimError {
    /// The detected rectangle is too small to solve against.
    #[error("Detected rectangle height {height} is below one pixel")]
    DegenerateRect {
        /// Height of the rectangle in pixels.
        height: f64,
    },

    /// A corner of the detected rectangle is NaN or infinite.
    #[error("Detected rectangle has non-finite corners {corners:?}")]
    NonFiniteCorners {
        /// Corners after ordering and offset, in pixels.
        corners: [[f64; 2]; 4],
    },

    /// The factory has no angle solver to delegate to.
    #[error("No angle solver attached")]
    SolverNotAttached,

    /// The solved distance is outside the configured band and the policy rejects it.
    #[error("Solved distance {distance} is outside [{min}, {max}]")]
    OutOfRange {
        /// Depth-corrected distance along the optical axis.
        distance: f64,
        /// Lower bound of the band.
        min: f64,
        /// Upper bound of the band.
        max: f64,
    },

    /// The target is not in front of the gimbal, so no aim direction exists.
    #[error("Target forward distance {z} in gimbal frame is not positive")]
    NonPositiveDepth {
        /// Forward coordinate in the gimbal frame.
        z: f64,
    },

    /// Error from the pose solver.
    #[error(transparent)]
    Pose(#[from] PnPError),
}
