//! # Dynamic Window trajectory control library
//!
//! This crate implements a local motion-velocity planner for a wheeled mobile
//! robot. Given a short-horizon path, the robot's current pose and velocity,
//! and a local obstacle map, it chooses a feasible `(vx, vy, omega)` command
//! which keeps the robot moving along the path while avoiding collisions.
//!
//! The planner works by sampling candidate velocity commands inside the
//! robot's dynamic window (the velocities reachable within one control period
//! under the acceleration limits), forward simulating each candidate into a
//! trajectory, and scoring every trajectory with a suite of cost functions.
//! The lowest cost admissible trajectory wins. Which cost function dominates
//! depends on the planner state:
//!
//! - `Default` - normal path following
//! - `Align` - large heading error to the path, prioritise turning in
//! - `Arrive` - close to the goal, prioritise the goal pose
//!
//! The per-cycle entry point is [`planner::DwaPlanner::plan_cycle`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cost;
pub mod costmap;
pub mod generator;
pub mod limits;
pub mod params;
pub mod path;
pub mod planner;
pub mod search;
pub mod state;
pub mod traj;

// ---------------------------------------------------------------------------
// RE-EXPORTS
// ---------------------------------------------------------------------------

pub use costmap::{CellCost, GridCostMap, ObstacleMap, UnknownPolicy};
pub use params::{ConfigError, Params};
pub use path::{LocalPlan, PlanError, Waypoint};
pub use planner::{CycleInput, CycleOutput, DwaPlanner, PlannerError, StatusReport};
pub use state::PlannerState;
pub use traj::{Pose2, TrajPoint, Trajectory, Vel2};
