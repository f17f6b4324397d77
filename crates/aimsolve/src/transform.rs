use aimsolve_pnp::so3::mat3_from_rows;
use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Fixed rigid relation between the camera and the gimbal.
///
/// A camera-frame point maps to the gimbal frame as `R * p - T`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraToGimbal {
    /// Row-major rotation `R`.
    pub rotation: [[f64; 3]; 3],
    /// Translation `T`, subtracted after rotating.
    pub translation: [f64; 3],
}

impl Default for CameraToGimbal {
    fn default() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }
}

impl CameraToGimbal {
    /// Create a new camera-to-gimbal transform.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Re-express a camera-frame position in the gimbal frame.
    pub fn apply(&self, camera_position: DVec3) -> DVec3 {
        self.rotation_matrix() * camera_position - DVec3::from_array(self.translation)
    }

    fn rotation_matrix(&self) -> DMat3 {
        mat3_from_rows(&self.rotation)
    }
}
