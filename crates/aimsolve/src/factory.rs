use std::collections::HashMap;

use aimsolve_pnp::TargetSize;
use serde::{Deserialize, Serialize};

use crate::ballistics::AimAngles;
use crate::error::AimError;
use crate::rect::RotatedRect;
use crate::solver::{AimSolution, AngleSolver};

/// Kinds of target with a known physical size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Large armor plate.
    LargeArmor,
    /// Small armor plate.
    SmallArmor,
    /// Rune (buff) target.
    Rune,
}

impl TargetType {
    /// All target types.
    pub const ALL: [TargetType; 3] = [Self::LargeArmor, Self::SmallArmor, Self::Rune];
}

/// Dispatches detections of different target types to one [`AngleSolver`].
///
/// Before delegating, the detected rectangle is reshaped to the aspect ratio of
/// the target type and the solver is switched to that type's size.
#[derive(Debug, Clone, Default)]
pub struct AngleSolverFactory {
    solver: Option<AngleSolver>,
    sizes: HashMap<TargetType, TargetSize>,
}

impl AngleSolverFactory {
    /// Create a factory with no solver and no target sizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory that owns `solver`.
    pub fn with_solver(solver: AngleSolver) -> Self {
        Self {
            solver: Some(solver),
            sizes: HashMap::new(),
        }
    }

    /// Attach a solver, returning the previous one if any.
    pub fn attach_solver(&mut self, solver: AngleSolver) -> Option<AngleSolver> {
        self.solver.replace(solver)
    }

    /// Take the solver out of the factory.
    pub fn detach_solver(&mut self) -> Option<AngleSolver> {
        self.solver.take()
    }

    /// The attached solver.
    pub fn solver(&self) -> Option<&AngleSolver> {
        self.solver.as_ref()
    }

    /// The attached solver, mutably.
    pub fn solver_mut(&mut self) -> Option<&mut AngleSolver> {
        self.solver.as_mut()
    }

    /// Set the physical size of a target type.
    pub fn set_target_size(&mut self, width: f64, height: f64, target_type: TargetType) {
        self.sizes
            .insert(target_type, TargetSize::new(width, height));
    }

    /// Physical size of a target type; unset types report a zero size.
    pub fn target_size(&self, target_type: TargetType) -> TargetSize {
        self.sizes.get(&target_type).copied().unwrap_or_default()
    }

    /// Angles to aim at a detected target of the given type.
    ///
    /// See [`AngleSolver::get_angle`] for the remaining arguments.
    pub fn get_angle(
        &mut self,
        rect: &RotatedRect,
        target_type: TargetType,
        bullet_speed: f64,
        current_ptz_angle: f64,
        offset: [f64; 2],
    ) -> Result<AimAngles, AimError> {
        self.solve_frame(rect, target_type, bullet_speed, current_ptz_angle, offset)
            .map(|solution| solution.angles)
    }

    /// Same as [`AngleSolverFactory::get_angle`] but returns every intermediate result.
    pub fn solve_frame(
        &mut self,
        rect: &RotatedRect,
        target_type: TargetType,
        bullet_speed: f64,
        current_ptz_angle: f64,
        offset: [f64; 2],
    ) -> Result<AimSolution, AimError> {
        let size = self.target_size(target_type);
        let Some(solver) = self.solver.as_mut() else {
            log::error!("no angle solver attached, cannot aim at {target_type:?}");
            return Err(AimError::SolverNotAttached);
        };

        // an unset size has no ratio; the solver then falls back to the identity pose
        let rect = if size.is_valid() {
            rect.with_aspect_ratio(size.aspect_ratio())
        } else {
            *rect
        };

        solver.set_target_size(size.width, size.height);
        solver.solve_frame(&rect, bullet_speed, current_ptz_angle, offset)
    }
}
