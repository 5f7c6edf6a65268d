//! # Trajectory cost functions
//!
//! Each cost function independently scores a candidate trajectory, returning
//! either a non-negative contribution or a rejection which makes the whole
//! trajectory inadmissible. The search multiplies each contribution by the
//! function's scale, which the planner state machine retunes every cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cmd_vel;
pub mod goal;
pub mod heading;
pub mod obstacle;
pub mod plan;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::traj::Trajectory;

pub use cmd_vel::{CmdVelCoeffs, CmdVelCost};
pub use goal::GoalDistCost;
pub use heading::HeadingAlignCost;
pub use obstacle::ObstacleCost;
pub use plan::PlanDistCost;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Why a cost function rejected a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("The footprint touches an obstacle")]
    LethalFootprint,

    #[error("The footprint touches unknown space")]
    UnknownFootprint,

    #[error("The command is too fast this close to obstacles")]
    OverSpeedNearObstacle,

    #[error("No footprint has been set")]
    MissingFootprint,

    #[error("No target has been set")]
    MissingTarget,
}

/// The score a single cost function assigns to a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrajScore {
    /// Non-negative cost contribution, lower is better
    Cost(f64),

    /// The trajectory must not be executed
    Rejected(Rejection),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The capability shared by all trajectory cost functions.
pub trait TrajCostFn {
    /// Score one candidate trajectory.
    fn score(&self, traj: &Trajectory) -> TrajScore;

    /// The scale the search applies to this function's contribution.
    fn scale(&self) -> f64;
}
