use aimsolve_pnp::{CameraModel, PlanarPnPParams, PnPResult, RectPnPSolver, TargetSize};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::ballistics::{AimAngles, BarrelCompensator};
use crate::error::AimError;
use crate::extract::target_points;
use crate::rect::RotatedRect;
use crate::transform::CameraToGimbal;

/// Empirical scale applied to the solved depth.
///
/// Compensates the systematic under-estimate of distance when a target is seen
/// at an angle and still assumed to be flat and fronto-parallel.
pub const DEFAULT_DEPTH_CORRECTION: f64 = 1.51;

/// Smallest detected rectangle height, in pixels, worth solving.
pub const MIN_RECT_HEIGHT: f64 = 1.0;

/// What to do when the solved distance is outside the valid band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Log a warning and still produce angles.
    #[default]
    Warn,
    /// Refuse to produce angles.
    Reject,
}

/// Valid band for the depth-corrected distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Default for DistanceRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10000.0,
        }
    }
}

impl DistanceRange {
    /// Whether `distance` lies inside the band, bounds included.
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.min && distance <= self.max
    }
}

/// Everything computed for one detected target.
#[derive(Debug, Clone)]
pub struct AimSolution {
    /// Angles to send to the gimbal.
    pub angles: AimAngles,
    /// Image corners fed to the pose solver.
    pub corners: [[f64; 2]; 4],
    /// Raw pose of the target in the camera frame.
    pub pose: PnPResult,
    /// Target position in the camera frame, depth-corrected.
    pub position_camera: DVec3,
    /// Target position in the gimbal frame.
    pub position_gimbal: DVec3,
    /// Whether the distance was inside the valid band.
    pub in_range: bool,
}

/// Computes gimbal angles for a detected rectangular target.
///
/// Runs corner extraction, pose estimation, depth correction, the
/// camera-to-gimbal transform and ballistic compensation in that order.
#[derive(Debug, Clone)]
pub struct AngleSolver {
    pose_solver: RectPnPSolver,
    camera_to_gimbal: CameraToGimbal,
    compensator: BarrelCompensator,
    distance_range: DistanceRange,
    range_policy: RangePolicy,
    depth_correction: f64,
}

impl AngleSolver {
    /// Create a solver for a calibrated camera.
    ///
    /// The camera-gimbal relation starts as identity with no barrel offset and
    /// the target size starts unset.
    pub fn new(camera: CameraModel) -> Self {
        Self {
            pose_solver: RectPnPSolver::new(camera),
            camera_to_gimbal: CameraToGimbal::default(),
            compensator: BarrelCompensator::default(),
            distance_range: DistanceRange::default(),
            range_policy: RangePolicy::default(),
            depth_correction: DEFAULT_DEPTH_CORRECTION,
        }
    }

    /// Replace the pose solver parameters.
    pub fn with_pnp_params(mut self, params: PlanarPnPParams) -> Self {
        self.pose_solver = self.pose_solver.with_params(params);
        self
    }

    /// Set the fixed camera-to-gimbal relation and the barrel offset.
    pub fn set_relation_pose_camera_ptz(
        &mut self,
        rotation: [[f64; 3]; 3],
        translation: [f64; 3],
        y_offset_barrel_ptz: f64,
    ) {
        self.camera_to_gimbal = CameraToGimbal::new(rotation, translation);
        self.compensator = BarrelCompensator::new(y_offset_barrel_ptz);
    }

    /// Set the valid distance band.
    pub fn set_distance_range(&mut self, min: f64, max: f64) {
        self.distance_range = DistanceRange { min, max };
    }

    /// Set what happens to out-of-range solutions.
    pub fn set_range_policy(&mut self, policy: RangePolicy) {
        self.range_policy = policy;
    }

    /// Set the scale applied to the solved depth.
    pub fn set_depth_correction(&mut self, factor: f64) {
        self.depth_correction = factor;
    }

    /// Set the physical size of the target being aimed at.
    pub fn set_target_size(&mut self, width: f64, height: f64) {
        self.pose_solver.set_target_size(width, height);
    }

    /// Current target size.
    pub fn target_size(&self) -> TargetSize {
        self.pose_solver.target_size()
    }

    /// The camera-to-gimbal relation.
    pub fn camera_to_gimbal(&self) -> &CameraToGimbal {
        &self.camera_to_gimbal
    }

    /// The valid distance band.
    pub fn distance_range(&self) -> DistanceRange {
        self.distance_range
    }

    /// Angles to aim at `rect`.
    ///
    /// # Arguments
    ///
    /// * `rect` - Detected target, in region-of-interest coordinates.
    /// * `bullet_speed` - Muzzle speed; near zero disables drop compensation.
    /// * `current_ptz_angle` - Angle reported by the gimbal, currently unused.
    /// * `offset` - Position of the region of interest in the full image.
    pub fn get_angle(
        &self,
        rect: &RotatedRect,
        bullet_speed: f64,
        current_ptz_angle: f64,
        offset: [f64; 2],
    ) -> Result<AimAngles, AimError> {
        self.solve_frame(rect, bullet_speed, current_ptz_angle, offset)
            .map(|solution| solution.angles)
    }

    /// Same as [`AngleSolver::get_angle`] but returns every intermediate result.
    pub fn solve_frame(
        &self,
        rect: &RotatedRect,
        bullet_speed: f64,
        current_ptz_angle: f64,
        offset: [f64; 2],
    ) -> Result<AimSolution, AimError> {
        let height = rect.size.height;
        if height.is_nan() || height < MIN_RECT_HEIGHT {
            return Err(AimError::DegenerateRect { height });
        }

        let corners = target_points(rect, offset);
        if corners.iter().flatten().any(|v| !v.is_finite()) {
            return Err(AimError::NonFiniteCorners { corners });
        }
        let pose = self.pose_solver.solve(&corners)?;

        let [x, y, z] = pose.translation;
        let position_camera = DVec3::new(x, y, z * self.depth_correction);

        let distance = position_camera.z;
        let in_range = self.distance_range.contains(distance);
        if !in_range {
            let DistanceRange { min, max } = self.distance_range;
            log::warn!("out of range: {distance:.1} not in [{min}, {max}]");
            if self.range_policy == RangePolicy::Reject {
                return Err(AimError::OutOfRange { distance, min, max });
            }
        }

        let position_gimbal = self.camera_to_gimbal.apply(position_camera);
        log::debug!("target in camera {position_camera:?}, in gimbal {position_gimbal:?}");

        let angles = self
            .compensator
            .aim(position_gimbal, bullet_speed, current_ptz_angle)?;

        Ok(AimSolution {
            angles,
            corners,
            pose,
            position_camera,
            position_gimbal,
            in_range,
        })
    }
}
