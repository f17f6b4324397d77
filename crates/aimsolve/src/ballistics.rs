//! Gravity-drop and barrel-offset compensation.
//!
//! Positions are in the gimbal frame: x right, y down, z forward, in the same
//! length unit as the target sizes (millimetres in practice). The drop model
//! is a flat-fire parabola with no drag.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::AimError;

/// Gravitational acceleration used by the drop model.
pub const GRAVITY: f64 = 9.8;

/// Converts between position units and the unit of the speed/gravity terms.
pub const UNIT_SCALE: f64 = 100.0;

/// Bullet speeds at or below this mean no flight time and no drop.
pub const MIN_BULLET_SPEED: f64 = 10e-3;

/// Aim command in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AimAngles {
    /// Horizontal angle (yaw), positive towards +x.
    pub angle_x: f64,
    /// Vertical angle (pitch), negative means aim up.
    pub angle_y: f64,
}

/// Turns a gimbal-frame target position into gimbal angles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BarrelCompensator {
    /// Vertical distance between the gimbal pivot and the barrel axis.
    pub barrel_offset_y: f64,
}

impl BarrelCompensator {
    /// Create a compensator for the given barrel offset.
    pub fn new(barrel_offset_y: f64) -> Self {
        Self { barrel_offset_y }
    }

    /// Time of flight to cover the forward distance `z`.
    pub fn flight_time(z: f64, bullet_speed: f64) -> f64 {
        if bullet_speed > MIN_BULLET_SPEED {
            z / UNIT_SCALE / bullet_speed
        } else {
            0.0
        }
    }

    /// Vertical drop accumulated over `t`, in position units.
    pub fn gravity_drop(t: f64) -> f64 {
        0.5 * GRAVITY * t * t * UNIT_SCALE
    }

    /// Angles that put the bullet on `position`.
    ///
    /// `_current_ptz_angle` is the angle reported by the gimbal; it is accepted
    /// for a future feed-forward term and does not affect the result.
    pub fn aim(
        &self,
        position: DVec3,
        bullet_speed: f64,
        _current_ptz_angle: f64,
    ) -> Result<AimAngles, AimError> {
        if position.z.is_nan() || position.z <= 0.0 {
            return Err(AimError::NonPositiveDepth { z: position.z });
        }

        let t = Self::flight_time(position.z, bullet_speed);
        let x = position.x;
        let y = position.y - Self::gravity_drop(t);
        let z = position.z;

        let angle_y = self.pitch(y, z);
        let angle_x = x.atan2(z);

        Ok(AimAngles {
            angle_x: angle_x.to_degrees(),
            angle_y: angle_y.to_degrees(),
        })
    }

    /// Pitch in radians for a drop-compensated height `y` at forward distance `z`.
    fn pitch(&self, y: f64, z: f64) -> f64 {
        let off = self.barrel_offset_y;
        // |off| > range only happens for targets inside the barrel offset; clamp to a
        // straight-up/down aim instead of returning NaN
        let alpha = (off / y.hypot(z)).clamp(-1.0, 1.0).asin();

        if y < 0.0 {
            let theta = (-y / z).atan();
            -(alpha + theta)
        } else if y < off {
            let theta = (y / z).atan();
            -(alpha - theta)
        } else {
            let theta = (y / z).atan();
            theta - alpha
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_speed_no_drop() {
        assert_eq!(BarrelCompensator::flight_time(5000.0, 0.0), 0.0);
        assert_eq!(BarrelCompensator::flight_time(5000.0, 10e-3), 0.0);
        assert_eq!(BarrelCompensator::gravity_drop(0.0), 0.0);

        let comp = BarrelCompensator::new(0.0);
        let p = DVec3::new(0.0, 100.0, 1000.0);
        let angles = comp.aim(p, 0.0, 0.0).expect("target in front");
        assert_relative_eq!(angles.angle_y, (0.1f64).atan().to_degrees(), epsilon = 1e-12);
    }

    #[test]
    fn test_drop_tilts_up() {
        let comp = BarrelCompensator::new(0.0);
        let p = DVec3::new(0.0, 0.0, 3000.0);
        // t = 3000 / 100 / 15 = 2, drop = 0.5 * 9.8 * 4 * 100 = 1960
        assert_relative_eq!(BarrelCompensator::flight_time(3000.0, 15.0), 2.0);
        assert_relative_eq!(BarrelCompensator::gravity_drop(2.0), 1960.0, epsilon = 1e-9);

        let angles = comp.aim(p, 15.0, 0.0).expect("target in front");
        assert_relative_eq!(
            angles.angle_y,
            -(1960.0f64 / 3000.0).atan().to_degrees(),
            epsilon = 1e-9
        );
        assert_eq!(angles.angle_x, 0.0);
    }

    #[test]
    fn test_yaw_is_bearing() {
        let comp = BarrelCompensator::new(30.0);
        let angles = comp.aim(DVec3::new(1000.0, 0.0, 1000.0), 0.0, 0.0).expect("front");
        assert_relative_eq!(angles.angle_x, 45.0, epsilon = 1e-12);
        let angles = comp.aim(DVec3::new(-500.0, 0.0, 1000.0), 0.0, 0.0).expect("front");
        assert!(angles.angle_x < 0.0);
    }

    #[test]
    fn test_branches_continuous() {
        let off = 40.0;
        let comp = BarrelCompensator::new(off);
        let z = 2500.0;
        let eps = 1e-9;

        // at y == off
        let below = comp.pitch(off - eps, z);
        let at = comp.pitch(off, z);
        let above = comp.pitch(off + eps, z);
        assert_relative_eq!(below, at, epsilon = 1e-9);
        assert_relative_eq!(above, at, epsilon = 1e-9);

        // at y == 0
        let neg = comp.pitch(-eps, z);
        let zero = comp.pitch(0.0, z);
        assert_relative_eq!(neg, zero, epsilon = 1e-9);
    }

    #[test]
    fn test_barrel_offset_raises_aim() {
        let z = 2000.0;
        let without = BarrelCompensator::new(0.0).pitch(0.0, z);
        let with = BarrelCompensator::new(50.0).pitch(0.0, z);
        assert_eq!(without, 0.0);
        assert_relative_eq!(with, -(50.0f64 / z).asin(), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_depth() {
        let comp = BarrelCompensator::new(10.0);
        for z in [0.0, -100.0, f64::NAN] {
            let res = comp.aim(DVec3::new(0.0, 0.0, z), 15.0, 0.0);
            assert!(matches!(res, Err(AimError::NonPositiveDepth { .. })));
        }
    }
}
