//! Pose of a rectangular target from its four image corners.

use crate::camera::CameraModel;
use crate::planar::{PlanarPnP, PlanarPnPParams};
use crate::pnp::{PnPError, PnPResult, PnPSolver};

/// Sizes below this are treated as unset.
pub const MIN_TARGET_SIZE: f64 = 10e-5;

/// Physical width and height of a rectangular target.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetSize {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl TargetSize {
    /// Create a new target size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are large enough to solve against.
    pub fn is_valid(&self) -> bool {
        self.width >= MIN_TARGET_SIZE && self.height >= MIN_TARGET_SIZE
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Corner coordinates on the target plane, centred on the target.
    ///
    /// Order is top-left, top-right, bottom-right, bottom-left with y pointing down,
    /// the same order the image corners must be given in.
    pub fn model_points(&self) -> [[f64; 3]; 4] {
        let half_x = self.width / 2.0;
        let half_y = self.height / 2.0;
        [
            [-half_x, -half_y, 0.0],
            [half_x, -half_y, 0.0],
            [half_x, half_y, 0.0],
            [-half_x, half_y, 0.0],
        ]
    }
}

/// Solves the pose of a rectangle of known size seen by a calibrated camera.
#[derive(Debug, Clone)]
pub struct RectPnPSolver {
    camera: CameraModel,
    target: TargetSize,
    params: PlanarPnPParams,
}

impl RectPnPSolver {
    /// Create a solver for the given camera. The target size starts unset.
    pub fn new(camera: CameraModel) -> Self {
        Self {
            camera,
            target: TargetSize::default(),
            params: PlanarPnPParams::default(),
        }
    }

    /// Replace the solver parameters.
    pub fn with_params(mut self, params: PlanarPnPParams) -> Self {
        self.params = params;
        self
    }

    /// Set the physical size of the rectangle.
    pub fn set_target_size(&mut self, width: f64, height: f64) {
        self.target = TargetSize::new(width, height);
    }

    /// Current target size.
    pub fn target_size(&self) -> TargetSize {
        self.target
    }

    /// The camera model.
    pub fn camera(&self) -> &CameraModel {
        &self.camera
    }

    /// Solve the target pose from corners ordered top-left, top-right,
    /// bottom-right, bottom-left.
    ///
    /// An unset target size gives the identity pose without running the solver.
    pub fn solve(&self, corners: &[[f64; 2]; 4]) -> Result<PnPResult, PnPError> {
        if !self.target.is_valid() {
            return Ok(PnPResult::identity());
        }
        let model = self.target.model_points();
        PlanarPnP::solve(&model, corners, &self.camera, &self.params)
    }
}
