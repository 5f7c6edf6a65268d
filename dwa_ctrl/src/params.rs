//! Planner parameters
//!
//! All tunable values of the planner live in one [`Params`] struct, loaded
//! from a TOML file via [`util::params::load`] and validated before use. The
//! set captured at construction can be restored with
//! [`crate::planner::DwaPlanner::restore_defaults`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::costmap::UnknownPolicy;
use crate::state::{CostProfile, PlannerState, Switches};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the DWA planner
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- Trajectory generation ----
    /// Number of velocity samples along the body x axis
    pub vx_samples: usize,

    /// Number of velocity samples along the body y axis
    pub vy_samples: usize,

    /// Number of velocity samples for the rotational axis
    pub vth_samples: usize,

    /// Forward simulation horizon
    pub sim_time_s: f64,

    /// Control period, which bounds the dynamic window
    pub sim_period_s: f64,

    /// Distance between simulated trajectory samples
    pub sim_granularity_m: f64,

    /// Angular distance between simulated trajectory samples, so that turns
    /// on the spot are still sampled at a sensible resolution
    pub angular_sim_granularity_rad: f64,

    /// If true samples are restricted to the dynamic window and the
    /// simulated velocity ramps towards the sample under the acceleration
    /// limits. If false the full velocity range is sampled and held.
    pub use_dwa: bool,

    /// If true an axis with a single sample collapses to the current
    /// velocity rather than to zero.
    pub single_sample_holds_current: bool,

    // ---- Velocity bounds ----
    /// Minimum commanded translational speed
    pub min_trans_speed_ms: f64,

    /// Maximum commanded translational speed
    pub max_trans_speed_ms: f64,

    pub min_vel_x_ms: f64,
    pub max_vel_x_ms: f64,

    pub min_vel_y_ms: f64,
    pub max_vel_y_ms: f64,

    /// Minimum magnitude of a commanded rotation
    pub min_rot_speed_rads: f64,

    /// Maximum magnitude of a commanded rotation
    pub max_rot_speed_rads: f64,

    // ---- Acceleration limits ----
    pub acc_lim_x_mss: f64,
    pub acc_lim_y_mss: f64,
    pub acc_lim_theta_radss: f64,

    /// Combined translational acceleration limit
    pub acc_lim_trans_mss: f64,

    // ---- Tolerances ----
    pub goal_tolerance_m: f64,
    pub yaw_tolerance_rad: f64,
    pub trans_stopped_speed_ms: f64,
    pub rot_stopped_speed_rads: f64,

    // ---- State switches ----
    /// Heading error above which the planner switches into Align
    pub switch_yaw_error_rad: f64,

    /// Goal distance below which the planner switches into Arrive
    pub switch_goal_distance_m: f64,

    /// Plan distance switch, carried in the status report
    pub switch_plan_distance_m: f64,

    // ---- Local plan ----
    /// Maximum separation between consecutive plan waypoints, above which
    /// the plan is rejected as discontinuous
    pub max_waypoint_sep_m: f64,

    // ---- Obstacle handling ----
    /// Policy for unknown space in the obstacle map
    pub unknown_policy: UnknownPolicy,

    // ---- Per-state cost profiles ----
    pub default_profile: CostProfile,
    pub align_profile: CostProfile,
    pub arrive_profile: CostProfile,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when validating a parameter set.
///
/// An invalid set is rejected atomically: the previously active
/// configuration stays in effect.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("`{name}` range is inverted: min {min} > max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("`{name}` must be positive, found {value}")]
    NonPositive { name: &'static str, value: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check this parameter set for contradictions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_range("trans_speed", self.min_trans_speed_ms, self.max_trans_speed_ms)?;
        Self::check_range("vel_x", self.min_vel_x_ms, self.max_vel_x_ms)?;
        Self::check_range("vel_y", self.min_vel_y_ms, self.max_vel_y_ms)?;
        Self::check_range("rot_speed", self.min_rot_speed_rads, self.max_rot_speed_rads)?;

        Self::check_positive("sim_time_s", self.sim_time_s)?;
        Self::check_positive("sim_period_s", self.sim_period_s)?;
        Self::check_positive("sim_granularity_m", self.sim_granularity_m)?;
        Self::check_positive(
            "angular_sim_granularity_rad",
            self.angular_sim_granularity_rad,
        )?;
        Self::check_positive("acc_lim_x_mss", self.acc_lim_x_mss)?;
        Self::check_positive("acc_lim_y_mss", self.acc_lim_y_mss)?;
        Self::check_positive("acc_lim_theta_radss", self.acc_lim_theta_radss)?;
        Self::check_positive("acc_lim_trans_mss", self.acc_lim_trans_mss)?;
        Self::check_positive("max_waypoint_sep_m", self.max_waypoint_sep_m)?;
        Self::check_positive("switch_yaw_error_rad", self.switch_yaw_error_rad)?;
        Self::check_positive("switch_goal_distance_m", self.switch_goal_distance_m)?;

        Ok(())
    }

    /// The cost profile active in the given planner state.
    pub fn profile(&self, state: PlannerState) -> &CostProfile {
        match state {
            PlannerState::Default => &self.default_profile,
            PlannerState::Align => &self.align_profile,
            PlannerState::Arrive => &self.arrive_profile,
        }
    }

    /// The state switch thresholds.
    pub fn switches(&self) -> Switches {
        Switches {
            yaw_error_rad: self.switch_yaw_error_rad,
            goal_distance_m: self.switch_goal_distance_m,
            plan_distance_m: self.switch_plan_distance_m,
        }
    }

    /// Distance ahead of the robot at which the plan is pruned for the goal
    /// cost, one simulation horizon at maximum speed.
    pub fn lookahead_m(&self) -> f64 {
        self.max_trans_speed_ms * self.sim_time_s
    }

    fn check_range(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
        if min > max {
            Err(ConfigError::InvertedRange { name, min, max })
        } else {
            Ok(())
        }
    }

    fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value <= 0.0 {
            Err(ConfigError::NonPositive { name, value })
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// TEST UTILITIES
// ---------------------------------------------------------------------------

/// A small but representative parameter set used by the crate's unit tests.
#[cfg(test)]
pub(crate) fn test_params() -> Params {
    use crate::cost::cmd_vel::CmdVelCoeffs;

    let profile = CostProfile {
        align_scale: 1.0,
        plan_scale: 1.0,
        goal_scale: 1.0,
        obstacle_scale: 1.0,
        cmd_vel: CmdVelCoeffs {
            px: 0.0,
            nx: 1.0,
            py: 0.0,
            ny: 0.0,
            pth: 0.0,
            nth: 0.0,
        },
    };

    Params {
        vx_samples: 5,
        vy_samples: 1,
        vth_samples: 7,
        sim_time_s: 1.5,
        sim_period_s: 0.2,
        sim_granularity_m: 0.05,
        angular_sim_granularity_rad: 0.025,
        use_dwa: true,
        single_sample_holds_current: false,
        min_trans_speed_ms: 0.0,
        max_trans_speed_ms: 0.5,
        min_vel_x_ms: -0.2,
        max_vel_x_ms: 0.5,
        min_vel_y_ms: 0.0,
        max_vel_y_ms: 0.0,
        min_rot_speed_rads: 0.1,
        max_rot_speed_rads: 1.0,
        acc_lim_x_mss: 1.0,
        acc_lim_y_mss: 1.0,
        acc_lim_theta_radss: 2.0,
        acc_lim_trans_mss: 1.0,
        goal_tolerance_m: 0.1,
        yaw_tolerance_rad: 0.1,
        trans_stopped_speed_ms: 0.05,
        rot_stopped_speed_rads: 0.05,
        switch_yaw_error_rad: 0.5,
        switch_goal_distance_m: 0.5,
        switch_plan_distance_m: 1.0,
        max_waypoint_sep_m: 0.5,
        unknown_policy: UnknownPolicy::Refuse,
        default_profile: profile.clone(),
        align_profile: profile.clone(),
        arrive_profile: profile,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut params = test_params();
        params.min_vel_x_ms = 1.0;
        params.max_vel_x_ms = -1.0;

        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvertedRange { name: "vel_x", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let mut params = test_params();
        params.sim_time_s = 0.0;

        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonPositive {
                name: "sim_time_s",
                ..
            })
        ));
    }

    #[test]
    fn test_valid_params_pass() {
        assert!(test_params().validate().is_ok());
    }
}
