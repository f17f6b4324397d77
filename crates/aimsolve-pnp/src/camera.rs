//! Pinhole camera model with Brown-Conrady lens distortion.
use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Invalid camera intrinsics matrix
    #[error("Invalid camera intrinsics matrix: {0}")]
    InvalidIntrinsics(String),

    /// Invalid distortion parameters
    #[error("Invalid distortion parameters: {0}")]
    InvalidDistortion(String),

    /// Point lies on or behind the camera plane and cannot be projected
    #[error("Cannot project point with depth {0}")]
    BehindCamera(f64),
}

/// Result type for camera operations.
pub type CameraResult<T> = Result<T, CameraError>;

/// Represents the intrinsic parameters of a pinhole camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in x direction
    pub fx: f64,
    /// Focal length in y direction
    pub fy: f64,
    /// Principal point x coordinate
    pub cx: f64,
    /// Principal point y coordinate
    pub cy: f64,
}

impl CameraIntrinsics {
    /// Create camera intrinsics from focal lengths and principal point.
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Create camera intrinsics from a 3x3 intrinsics matrix.
    ///
    /// Skew is not supported and the focal lengths must be positive.
    pub fn from_matrix(k: &[[f64; 3]; 3]) -> CameraResult<Self> {
        if k[0][1] != 0.0 || k[1][0] != 0.0 || k[2][0] != 0.0 || k[2][1] != 0.0 || k[2][2] != 1.0
        {
            return Err(CameraError::InvalidIntrinsics(
                "matrix must have form [[fx, 0, cx], [0, fy, cy], [0, 0, 1]]".to_string(),
            ));
        }
        if k[0][0] <= 0.0 || k[1][1] <= 0.0 {
            return Err(CameraError::InvalidIntrinsics(format!(
                "focal lengths must be positive, got fx={} fy={}",
                k[0][0], k[1][1]
            )));
        }

        Ok(Self {
            fx: k[0][0],
            fy: k[1][1],
            cx: k[0][2],
            cy: k[1][2],
        })
    }

    /// Convert to 3x3 intrinsics matrix.
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}

/// Polynomial distortion parameters using the Brown-Conrady model.
///
/// Coefficient naming follows the rational model: `k1..k3` numerator radial terms,
/// `k4..k6` denominator radial terms, `p1, p2` tangential terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct PolynomialDistortion {
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub k4: f64,
    pub k5: f64,
    pub k6: f64,
    pub p1: f64,
    pub p2: f64,
}

impl PolynomialDistortion {
    /// Create distortion parameters with all coefficients set to zero (no distortion).
    pub fn none() -> Self {
        Self::default()
    }

    /// Create distortion parameters with radial and tangential coefficients.
    pub fn radial_tangential(k1: f64, k2: f64, p1: f64, p2: f64) -> Self {
        Self {
            k1,
            k2,
            p1,
            p2,
            ..Self::default()
        }
    }

    /// Build from a coefficient vector in the usual calibration-tool order
    /// `[k1, k2, p1, p2, k3, k4, k5, k6]`.
    ///
    /// Lengths 4, 5 and 8 are accepted; an empty slice means no distortion.
    pub fn from_coeffs(coeffs: &[f64]) -> CameraResult<Self> {
        let mut d = Self::default();
        match coeffs.len() {
            0 => return Ok(d),
            4 | 5 | 8 => {}
            n => {
                return Err(CameraError::InvalidDistortion(format!(
                    "expected 0, 4, 5 or 8 coefficients, got {n}"
                )))
            }
        }
        d.k1 = coeffs[0];
        d.k2 = coeffs[1];
        d.p1 = coeffs[2];
        d.p2 = coeffs[3];
        if let Some(&k3) = coeffs.get(4) {
            d.k3 = k3;
        }
        if coeffs.len() == 8 {
            d.k4 = coeffs[5];
            d.k5 = coeffs[6];
            d.k6 = coeffs[7];
        }
        Ok(d)
    }

    /// Check if there is any distortion.
    pub fn has_distortion(&self) -> bool {
        [
            self.k1, self.k2, self.k3, self.k4, self.k5, self.k6, self.p1, self.p2,
        ]
        .iter()
        .any(|&c| c != 0.0)
    }

    /// Apply distortion to normalized image coordinates.
    pub fn distort_normalized(&self, x: f64, y: f64) -> (f64, f64) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let kr = (1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6)
            / (1.0 + self.k4 * r2 + self.k5 * r4 + self.k6 * r6);

        let xd = x * kr + 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let yd = y * kr + self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        (xd, yd)
    }

    /// Invert the distortion on normalized coordinates by fixed-point iteration.
    pub fn undistort_normalized(&self, xd: f64, yd: f64) -> (f64, f64) {
        const MAX_ITERATIONS: usize = 20;
        const EPSILON: f64 = 1e-14;

        let (mut x, mut y) = (xd, yd);
        for _ in 0..MAX_ITERATIONS {
            let (px, py) = self.distort_normalized(x, y);
            let dx = xd - px;
            let dy = yd - py;
            x += dx;
            y += dy;
            if dx.abs() < EPSILON && dy.abs() < EPSILON {
                break;
            }
        }
        (x, y)
    }
}

/// A complete camera model with intrinsics and optional distortion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraModel {
    /// Camera intrinsics
    pub intrinsics: CameraIntrinsics,
    /// Distortion parameters (None for no distortion)
    #[serde(default)]
    pub distortion: Option<PolynomialDistortion>,
}

impl CameraModel {
    /// Create a camera model without distortion.
    pub fn pinhole(intrinsics: CameraIntrinsics) -> Self {
        Self {
            intrinsics,
            distortion: None,
        }
    }

    /// Create a camera model with distortion.
    pub fn with_distortion(intrinsics: CameraIntrinsics, distortion: PolynomialDistortion) -> Self {
        Self {
            intrinsics,
            distortion: Some(distortion),
        }
    }

    /// Check if the camera has distortion.
    pub fn has_distortion(&self) -> bool {
        self.distortion.as_ref().is_some_and(|d| d.has_distortion())
    }

    /// Map an observed pixel to undistorted normalized coordinates (`K^-1` applied).
    pub fn normalize_point(&self, u: f64, v: f64) -> [f64; 2] {
        let CameraIntrinsics { fx, fy, cx, cy } = self.intrinsics;
        let xd = (u - cx) / fx;
        let yd = (v - cy) / fy;
        match &self.distortion {
            Some(d) if d.has_distortion() => {
                let (x, y) = d.undistort_normalized(xd, yd);
                [x, y]
            }
            _ => [xd, yd],
        }
    }

    /// Map observed pixels to undistorted normalized coordinates.
    pub fn normalize_points(&self, points: &[[f64; 2]]) -> Vec<[f64; 2]> {
        points.iter().map(|&[u, v]| self.normalize_point(u, v)).collect()
    }

    /// Project a camera-frame point to (distorted) pixel coordinates.
    pub fn project(&self, p: DVec3) -> CameraResult<[f64; 2]> {
        if p.z <= 0.0 {
            return Err(CameraError::BehindCamera(p.z));
        }
        let inv_z = 1.0 / p.z;
        Ok(self.project_normalized(p.x * inv_z, p.y * inv_z))
    }

    /// Distort normalized coordinates and map them to pixels.
    pub fn project_normalized(&self, x: f64, y: f64) -> [f64; 2] {
        let (xd, yd) = match &self.distortion {
            Some(d) => d.distort_normalized(x, y),
            None => (x, y),
        };
        let CameraIntrinsics { fx, fy, cx, cy } = self.intrinsics;
        [fx.mul_add(xd, cx), fy.mul_add(yd, cy)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_intrinsics_from_matrix() -> CameraResult<()> {
        let k = [[1000.0, 0.0, 640.0], [0.0, 1000.0, 480.0], [0.0, 0.0, 1.0]];
        let intrinsics = CameraIntrinsics::from_matrix(&k)?;
        assert_eq!(intrinsics, CameraIntrinsics::new(1000.0, 1000.0, 640.0, 480.0));
        assert_eq!(intrinsics.to_matrix(), k);
        Ok(())
    }

    #[test]
    fn test_camera_intrinsics_rejects_skew() {
        let k = [[1000.0, 2.0, 640.0], [0.0, 1000.0, 480.0], [0.0, 0.0, 1.0]];
        assert!(CameraIntrinsics::from_matrix(&k).is_err());
    }

    #[test]
    fn test_distortion_from_coeffs() -> CameraResult<()> {
        let d = PolynomialDistortion::from_coeffs(&[0.1, -0.2, 0.001, 0.002, 0.05])?;
        assert_eq!(d.k1, 0.1);
        assert_eq!(d.k2, -0.2);
        assert_eq!(d.p1, 0.001);
        assert_eq!(d.p2, 0.002);
        assert_eq!(d.k3, 0.05);
        assert_eq!(d.k4, 0.0);

        assert!(!PolynomialDistortion::from_coeffs(&[])?.has_distortion());
        assert!(PolynomialDistortion::from_coeffs(&[0.1, 0.2, 0.3]).is_err());
        Ok(())
    }

    #[test]
    fn test_camera_model_with_distortion() {
        let intrinsics = CameraIntrinsics::new(1000.0, 1000.0, 640.0, 480.0);
        let camera = CameraModel::pinhole(intrinsics);
        assert!(!camera.has_distortion());

        let camera = CameraModel::with_distortion(intrinsics, PolynomialDistortion::none());
        assert!(!camera.has_distortion());

        let d = PolynomialDistortion::radial_tangential(0.1, 0.01, 0.0, 0.0);
        let camera = CameraModel::with_distortion(intrinsics, d);
        assert!(camera.has_distortion());
    }

    #[test]
    fn test_project_normalize_roundtrip() -> CameraResult<()> {
        let intrinsics = CameraIntrinsics::new(1000.0, 1000.0, 640.0, 480.0);
        let d = PolynomialDistortion::radial_tangential(-0.2, 0.05, 1e-3, -5e-4);
        let camera = CameraModel::with_distortion(intrinsics, d);

        let p = DVec3::new(0.3, -0.2, 2.0);
        let [u, v] = camera.project(p)?;
        let [x, y] = camera.normalize_point(u, v);

        assert_relative_eq!(x, 0.15, epsilon = 1e-9);
        assert_relative_eq!(y, -0.1, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_project_behind_camera() {
        let camera = CameraModel::pinhole(CameraIntrinsics::new(800.0, 800.0, 320.0, 240.0));
        assert!(camera.project(DVec3::new(0.0, 0.0, -1.0)).is_err());
        assert!(camera.project(DVec3::new(0.0, 0.0, 0.0)).is_err());
    }
}
