//! # Planner state machine
//!
//! The planner classifies the current situation into one of three states
//! which select how the cost functions are weighted. The classification is a
//! pure function of the current error metrics plus one bit of memory: the
//! previous state, which widens the Align exit threshold to stop the state
//! toggling when the heading error hovers near the switch value.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::cost::CmdVelCoeffs;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The operating state of the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannerState {
    /// Normal path following
    Default,

    /// Large heading error to the path, prioritise turning in
    Align,

    /// Close to the goal, prioritise the goal pose
    Arrive,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Thresholds driving the state transitions.
#[derive(Debug, Clone, Copy)]
pub struct Switches {
    /// Heading error above which Align is entered
    pub yaw_error_rad: f64,

    /// Goal distance below which Arrive is entered
    pub goal_distance_m: f64,

    /// Plan distance threshold, currently informational only
    pub plan_distance_m: f64,
}

/// The cost function scales and shaping coefficients one state activates.
#[derive(Debug, Clone, Deserialize)]
pub struct CostProfile {
    /// Scale of the heading alignment cost
    pub align_scale: f64,

    /// Scale of the path distance cost
    pub plan_scale: f64,

    /// Scale of the goal distance cost
    pub goal_scale: f64,

    /// Scale of the obstacle proximity cost
    pub obstacle_scale: f64,

    /// Command velocity shaping coefficients
    pub cmd_vel: CmdVelCoeffs,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Classify the planner state for this cycle.
///
/// The plan distance is accepted for symmetry with the other error metrics
/// but takes no part in the transitions yet.
pub fn determine_state(
    prev: PlannerState,
    yaw_error_rad: f64,
    _plan_distance_m: f64,
    goal_distance_m: f64,
    switches: &Switches,
) -> PlannerState {
    if goal_distance_m < switches.goal_distance_m {
        PlannerState::Arrive
    } else if yaw_error_rad.abs() > switches.yaw_error_rad
        || (prev == PlannerState::Align && yaw_error_rad.abs() > switches.yaw_error_rad / 2.0)
    {
        PlannerState::Align
    } else {
        PlannerState::Default
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl std::fmt::Display for PlannerState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PlannerState::Default => write!(f, "Default"),
            PlannerState::Align => write!(f, "Align"),
            PlannerState::Arrive => write!(f, "Arrive"),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn switches() -> Switches {
        Switches {
            yaw_error_rad: 0.5,
            goal_distance_m: 0.5,
            plan_distance_m: 1.0,
        }
    }

    #[test]
    fn test_arrive_dominates() {
        // Close to the goal the state is Arrive regardless of heading error
        let state = determine_state(PlannerState::Default, 2.0, 1.0, 0.3, &switches());
        assert_eq!(state, PlannerState::Arrive);
    }

    #[test]
    fn test_align_entry_and_exit() {
        let sw = switches();

        // Above the threshold enters Align, from either side
        assert_eq!(
            determine_state(PlannerState::Default, 1.2, 1.0, 5.0, &sw),
            PlannerState::Align
        );
        assert_eq!(
            determine_state(PlannerState::Default, -1.2, 1.0, 5.0, &sw),
            PlannerState::Align
        );

        // Below half the threshold exits to Default
        assert_eq!(
            determine_state(PlannerState::Align, 0.2, 1.0, 5.0, &sw),
            PlannerState::Default
        );
    }

    #[test]
    fn test_hysteresis_band() {
        let sw = switches();

        // In (T/2, T] the result depends on the previous state
        for &err in &[0.26, 0.4, 0.5] {
            assert_eq!(
                determine_state(PlannerState::Align, err, 1.0, 5.0, &sw),
                PlannerState::Align
            );
            assert_eq!(
                determine_state(PlannerState::Default, err, 1.0, 5.0, &sw),
                PlannerState::Default
            );
        }
    }

    #[test]
    fn test_idempotent_outside_band() {
        let sw = switches();

        // Feeding the same errors twice yields the same state
        for &err in &[0.0, 0.1, 0.7, 1.5] {
            let first = determine_state(PlannerState::Default, err, 1.0, 5.0, &sw);
            let second = determine_state(first, err, 1.0, 5.0, &sw);
            assert_eq!(first, second);
        }
    }
}
