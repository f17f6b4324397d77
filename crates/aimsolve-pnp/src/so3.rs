//! Minimal SO(3) rotation group backed by a unit quaternion.

use glam::{DMat3, DQuat, DVec3};

/// A 3D rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SO3 {
    /// Unit quaternion.
    pub q: DQuat,
}

impl SO3 {
    /// Build from a proper rotation matrix.
    pub fn from_matrix(mat: &DMat3) -> Self {
        Self {
            q: DQuat::from_mat3(mat).normalize(),
        }
    }

    /// Build from a row-major 3x3 rotation matrix.
    pub fn from_rows(r: &[[f64; 3]; 3]) -> Self {
        Self::from_matrix(&mat3_from_rows(r))
    }

    /// Rotation matrix.
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_quat(self.q)
    }

    /// Lie algebra -> Lie group (Rodrigues formula).
    pub fn exp(v: DVec3) -> Self {
        let theta = v.length();
        let half = 0.5 * theta;
        // sin(theta/2)/theta -> 1/2 as theta -> 0
        let b = if theta > 1e-12 {
            half.sin() / theta
        } else {
            0.5 - theta * theta / 48.0
        };
        let xyz = v * b;
        Self {
            q: DQuat::from_xyzw(xyz.x, xyz.y, xyz.z, half.cos()),
        }
    }

    /// Lie group -> Lie algebra (axis-angle vector).
    pub fn log(&self) -> DVec3 {
        // keep the rotation angle in [0, pi]
        let q = if self.q.w < 0.0 { -self.q } else { self.q };
        let vec = DVec3::new(q.x, q.y, q.z);
        let sin_half = vec.length();
        if sin_half < 1e-12 {
            return vec * 2.0;
        }
        let theta = 2.0 * sin_half.atan2(q.w);
        vec * (theta / sin_half)
    }
}

/// Convert a row-major array to a glam (column-major) matrix.
pub fn mat3_from_rows(r: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(r).transpose()
}

/// Convert a glam matrix to a row-major array.
pub fn mat3_to_rows(m: &DMat3) -> [[f64; 3]; 3] {
    m.transpose().to_cols_array_2d()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exp_identity() {
        let s = SO3::exp(DVec3::ZERO);
        assert_eq!(s.q, DQuat::IDENTITY);
    }

    #[test]
    fn test_exp_log() {
        for v in [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.1, -0.2, 0.3),
            DVec3::new(0.0, 3.0, 0.0),
            DVec3::new(1e-9, 0.0, -1e-9),
        ] {
            let log = SO3::exp(v).log();
            assert!((log - v).length() < 1e-9, "{log:?} != {v:?}");
        }
    }

    #[test]
    fn test_exp_matches_rodrigues() {
        let v = DVec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let m = SO3::exp(v).matrix();
        let p = m * DVec3::X;
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_row_major_roundtrip() {
        let r = [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let m = mat3_from_rows(&r);
        // first column of r is (0, 1, 0)
        assert_eq!(m * DVec3::X, DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(mat3_to_rows(&m), r);
        let s = SO3::from_rows(&r);
        assert!((s.matrix() - m).abs_diff_eq(DMat3::ZERO, 1e-12));
    }
}
