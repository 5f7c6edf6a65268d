//! Command-velocity shaping cost

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{TrajCostFn, TrajScore};
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Six independent coefficients penalising each signed velocity component.
///
/// This is a behavioural tuning hook, not a safety constraint: for example a
/// large `nx` discourages reversing without forbidding it.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CmdVelCoeffs {
    /// Penalty per unit of positive x velocity
    pub px: f64,

    /// Penalty per unit of negative x velocity
    pub nx: f64,

    /// Penalty per unit of positive y velocity
    pub py: f64,

    /// Penalty per unit of negative y velocity
    pub ny: f64,

    /// Penalty per unit of positive rotation
    pub pth: f64,

    /// Penalty per unit of negative rotation
    pub nth: f64,
}

/// Penalises the originating velocity command of a trajectory component by
/// component, with separate coefficients per sign.
#[derive(Debug, Clone, Default)]
pub struct CmdVelCost {
    scale: f64,
    coeffs: CmdVelCoeffs,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdVelCost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn set_coefficients(&mut self, coeffs: CmdVelCoeffs) {
        self.coeffs = coeffs;
    }
}

impl TrajCostFn for CmdVelCost {
    fn score(&self, traj: &Trajectory) -> TrajScore {
        let vel = traj.vel;
        let c = &self.coeffs;

        TrajScore::Cost(
            c.px * vel.x_ms.max(0.0)
                + c.nx * (-vel.x_ms).max(0.0)
                + c.py * vel.y_ms.max(0.0)
                + c.ny * (-vel.y_ms).max(0.0)
                + c.pth * vel.yaw_rads.max(0.0)
                + c.nth * (-vel.yaw_rads).max(0.0),
        )
    }

    fn scale(&self) -> f64 {
        self.scale
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
