//! JSON configuration for the angle solver.
//!
//! Every field except the camera matrix is optional:
//!
//! ```json
//! {
//!   "camera_matrix": [[1000.0, 0.0, 320.0], [0.0, 1000.0, 240.0], [0.0, 0.0, 1.0]],
//!   "distortion": [-0.1, 0.01, 0.0, 0.0, 0.0],
//!   "camera_to_gimbal": {
//!     "rotation": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
//!     "translation": [0.0, -50.0, 0.0]
//!   },
//!   "barrel_offset_y": 30.0,
//!   "target_sizes": { "small_armor": { "width": 135.0, "height": 55.0 } },
//!   "distance_range": { "min": 500.0, "max": 8000.0 },
//!   "range_policy": "reject",
//!   "depth_correction": 1.51
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use aimsolve_pnp::{CameraError, CameraIntrinsics, CameraModel, PolynomialDistortion, TargetSize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::factory::{AngleSolverFactory, TargetType};
use crate::solver::{AngleSolver, DistanceRange, RangePolicy, DEFAULT_DEPTH_CORRECTION};
use crate::transform::CameraToGimbal;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The document is not valid JSON or has the wrong shape.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// The calibration values are unusable.
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// Lens distortion, either by name or as a calibration-tool coefficient vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistortionConfig {
    /// `[k1, k2, p1, p2]`, `[k1, k2, p1, p2, k3]` or the 8-term rational model.
    Coeffs(Vec<f64>),
    /// Named coefficients.
    Named(PolynomialDistortion),
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self::Coeffs(Vec::new())
    }
}

impl DistortionConfig {
    /// Resolve to distortion parameters.
    pub fn resolve(&self) -> Result<PolynomialDistortion, CameraError> {
        match self {
            Self::Coeffs(coeffs) => PolynomialDistortion::from_coeffs(coeffs),
            Self::Named(d) => Ok(*d),
        }
    }
}

/// Calibration and tuning needed to build an [`AngleSolverFactory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AimConfig {
    /// Row-major camera intrinsics matrix.
    pub camera_matrix: [[f64; 3]; 3],
    /// Lens distortion.
    #[serde(default)]
    pub distortion: DistortionConfig,
    /// Camera-to-gimbal relation.
    #[serde(default)]
    pub camera_to_gimbal: CameraToGimbal,
    /// Vertical offset between the gimbal pivot and the barrel.
    #[serde(default)]
    pub barrel_offset_y: f64,
    /// Physical size per target type. Types left out keep their defaults.
    #[serde(default)]
    pub target_sizes: HashMap<TargetType, TargetSize>,
    /// Valid band for the solved distance.
    #[serde(default)]
    pub distance_range: DistanceRange,
    /// What to do with out-of-range solutions.
    #[serde(default)]
    pub range_policy: RangePolicy,
    /// Scale applied to the solved depth.
    #[serde(default = "default_depth_correction")]
    pub depth_correction: f64,
}

fn default_depth_correction() -> f64 {
    DEFAULT_DEPTH_CORRECTION
}

/// Standard size of a target type, in millimetres.
pub fn default_target_size(target_type: TargetType) -> TargetSize {
    match target_type {
        TargetType::LargeArmor => TargetSize::new(230.0, 55.0),
        TargetType::SmallArmor => TargetSize::new(135.0, 55.0),
        TargetType::Rune => TargetSize::new(230.0, 127.0),
    }
}

impl AimConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The camera model described by this configuration.
    pub fn camera(&self) -> Result<CameraModel, ConfigError> {
        let intrinsics = CameraIntrinsics::from_matrix(&self.camera_matrix)?;
        let distortion = self.distortion.resolve()?;
        Ok(if distortion.has_distortion() {
            CameraModel::with_distortion(intrinsics, distortion)
        } else {
            CameraModel::pinhole(intrinsics)
        })
    }

    /// Size used for a target type: the configured one, else the standard one.
    pub fn target_size(&self, target_type: TargetType) -> TargetSize {
        self.target_sizes
            .get(&target_type)
            .copied()
            .unwrap_or_else(|| default_target_size(target_type))
    }

    /// A configured angle solver.
    pub fn build_solver(&self) -> Result<AngleSolver, ConfigError> {
        let mut solver = AngleSolver::new(self.camera()?);
        solver.set_relation_pose_camera_ptz(
            self.camera_to_gimbal.rotation,
            self.camera_to_gimbal.translation,
            self.barrel_offset_y,
        );
        solver.set_distance_range(self.distance_range.min, self.distance_range.max);
        solver.set_range_policy(self.range_policy);
        solver.set_depth_correction(self.depth_correction);
        Ok(solver)
    }

    /// A factory owning a configured solver, with a size for every target type.
    pub fn build_factory(&self) -> Result<AngleSolverFactory, ConfigError> {
        let mut factory = AngleSolverFactory::with_solver(self.build_solver()?);
        for target_type in TargetType::ALL {
            let size = self.target_size(target_type);
            factory.set_target_size(size.width, size.height, target_type);
        }
        log::debug!("angle solver factory built from config: {self:?}");
        Ok(factory)
    }
}
