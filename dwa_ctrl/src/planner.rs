//! # Planner façade
//!
//! [`DwaPlanner`] ties the rest of the crate together. Each control cycle it:
//!
//! 1. Validates the local plan for this cycle.
//! 2. Computes the error metrics (heading error to the path, distance along
//!    the plan, distance to the goal).
//! 3. Classifies the planner state and applies that state's cost profile to
//!    the cost function suite.
//! 4. Builds a trajectory generator over the dynamic window and searches the
//!    candidates for the lowest cost admissible trajectory.
//!
//! The active configuration and cost functions live behind a mutex, held for
//! the duration of a cycle, so a [`DwaPlanner::reconfigure`] from another
//! thread can never interleave with a running cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::Vector2;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

// Internal
use crate::cost::{
    CmdVelCost, GoalDistCost, HeadingAlignCost, ObstacleCost, PlanDistCost, TrajCostFn,
};
use crate::costmap::ObstacleMap;
use crate::generator::{GeneratorConfig, TrajGenerator};
use crate::limits::VelocityLimits;
use crate::params::{ConfigError, Params};
use crate::path::{LocalPlan, PlanError};
use crate::search;
use crate::state::{determine_state, PlannerState};
use crate::traj::{Pose2, Trajectory, Vel2};
use util::maths::ang_dist;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The per-cycle inputs to the planner.
///
/// The plan and footprint are borrowed: the planner reads them during the
/// cycle and copies only what it must keep.
pub struct CycleInput<'p> {
    /// The robot's pose in the planning frame
    pub pose: Pose2,

    /// The robot's current velocity in the body frame
    pub vel: Vel2,

    /// The local plan to follow, in the planning frame
    pub plan: &'p LocalPlan,

    /// Footprint polygon vertices in the body frame
    pub footprint: &'p [Vector2<f64>],

    /// The state the planner was in last cycle
    pub prev_state: PlannerState,

    /// Retain every scored trajectory in the output, for diagnostics
    pub keep_explored: bool,
}

/// Everything one planning cycle produces.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutput {
    /// The state the planner settled in this cycle
    pub state: PlannerState,

    /// Diagnostic summary of the cycle
    pub report: StatusReport,

    /// The velocity command to execute, or `None` when no admissible
    /// trajectory exists and the caller must stop the robot
    pub cmd: Option<Vel2>,

    /// The trajectory behind `cmd`
    pub selected: Option<Trajectory>,

    /// Every scored trajectory, present when requested in the input
    pub explored: Option<Vec<Trajectory>>,
}

/// Diagnostic numbers summarising one planning cycle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Heading error between the robot and the next waypoint
    pub yaw_error_rad: f64,

    /// Distance from the robot to the next waypoint
    pub plan_distance_m: f64,

    /// Distance from the robot to the goal waypoint
    pub goal_distance_m: f64,

    /// The orientation the heading cost is steering towards
    pub desired_heading_rad: f64,

    /// True if the state differs from the previous cycle's
    pub state_changed: bool,

    /// Number of candidate trajectories scored
    pub num_evaluated: usize,

    /// Number of candidate trajectories rejected
    pub num_rejected: usize,
}

/// The configuration and cost function suite guarded by the planner's mutex.
struct Inner {
    params: Params,

    goal_cost: GoalDistCost,
    plan_cost: PlanDistCost,
    obstacle_cost: ObstacleCost,
    heading_cost: HeadingAlignCost,
    cmd_vel_cost: CmdVelCost,
}

/// The Dynamic Window Approach local planner.
///
/// Construct one per robot with [`DwaPlanner::new`], then call
/// [`DwaPlanner::plan_cycle`] once per control period.
pub struct DwaPlanner {
    /// The parameter set captured at construction
    defaults: Params,

    inner: Mutex<Inner>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors a planning cycle or reconfiguration can raise.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid local plan: {0}")]
    Plan(#[from] PlanError),

    #[error("The planner mutex was poisoned by a panicking thread")]
    ConfigPoisoned,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DwaPlanner {
    /// Create a planner over the given obstacle map.
    ///
    /// The parameter set is validated and then captured as the defaults for
    /// [`DwaPlanner::restore_defaults`].
    pub fn new(
        params: Params,
        map: Arc<dyn ObstacleMap + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;

        info!(
            "DWA planner initialised: {} x {} x {} samples over a {} s horizon",
            params.vx_samples, params.vy_samples, params.vth_samples, params.sim_time_s
        );

        let inner = Inner {
            params: params.clone(),
            goal_cost: GoalDistCost::new(),
            plan_cost: PlanDistCost::new(),
            obstacle_cost: ObstacleCost::new(map),
            heading_cost: HeadingAlignCost::new(),
            cmd_vel_cost: CmdVelCost::new(),
        };

        Ok(Self {
            defaults: params,
            inner: Mutex::new(inner),
        })
    }

    /// Atomically replace the active configuration.
    ///
    /// The new set is validated first: on failure the previous configuration
    /// stays in effect and the error is returned.
    pub fn reconfigure(&self, params: Params) -> Result<(), PlannerError> {
        params.validate()?;

        let mut inner = self.lock()?;
        inner.params = params;

        info!(
            "DWA planner reconfigured: {} x {} x {} samples, {} s horizon, \
             switches (yaw {} rad, goal {} m)",
            inner.params.vx_samples,
            inner.params.vy_samples,
            inner.params.vth_samples,
            inner.params.sim_time_s,
            inner.params.switch_yaw_error_rad,
            inner.params.switch_goal_distance_m
        );
        Ok(())
    }

    /// Restore the configuration captured at construction.
    pub fn restore_defaults(&self) -> Result<(), PlannerError> {
        let mut inner = self.lock()?;
        inner.params = self.defaults.clone();

        info!("DWA planner configuration restored to defaults");
        Ok(())
    }

    /// The currently active parameter set.
    pub fn params(&self) -> Result<Params, PlannerError> {
        Ok(self.lock()?.params.clone())
    }

    /// Run one planning cycle.
    ///
    /// On success the output always carries the state and status report;
    /// `cmd` is `None` when every candidate was rejected, which the caller
    /// must treat as a command to stop.
    pub fn plan_cycle(&self, input: &CycleInput) -> Result<CycleOutput, PlannerError> {
        let mut inner = self.lock()?;

        input
            .plan
            .validate_continuity(inner.params.max_waypoint_sep_m)?;

        // Error metrics against the plan's head and tail
        let position_m = input.pose.position_m;
        let next_wp = input.plan.first();
        let goal_wp = input.plan.last();

        let yaw_error_rad = ang_dist(input.pose.heading_rad, next_wp.heading_rad);
        let plan_distance_m = (next_wp.position_m - position_m).norm();
        let goal_distance_m = (goal_wp.position_m - position_m).norm();

        let state = determine_state(
            input.prev_state,
            yaw_error_rad,
            plan_distance_m,
            goal_distance_m,
            &inner.params.switches(),
        );

        let state_changed = state != input.prev_state;
        if state_changed {
            info!("Planner state: {} -> {}", input.prev_state, state);
        }

        // Retune the cost suite for this cycle
        let desired_heading_rad = match state {
            PlannerState::Arrive => goal_wp.heading_rad,
            _ => next_wp.heading_rad,
        };
        let target_m = input
            .plan
            .lookahead_pruned(position_m, inner.params.lookahead_m())
            .last()
            .position_m;

        let profile = inner.params.profile(state).clone();

        inner.heading_cost.set_scale(profile.align_scale);
        inner.heading_cost.set_desired_orientation(desired_heading_rad);

        inner.plan_cost.set_scale(profile.plan_scale);
        inner.plan_cost.set_plan(input.plan.clone());

        inner.goal_cost.set_scale(profile.goal_scale);
        inner.goal_cost.set_target(target_m);

        let (acc_x, acc_y, max_trans, unknown) = (
            inner.params.acc_lim_x_mss,
            inner.params.acc_lim_y_mss,
            inner.params.max_trans_speed_ms,
            inner.params.unknown_policy,
        );
        inner.obstacle_cost.set_scale(profile.obstacle_scale);
        inner
            .obstacle_cost
            .set_params(acc_x, acc_y, max_trans, unknown);
        if inner.obstacle_cost.refresh_footprint(input.footprint) {
            debug!("Footprint updated ({} vertices)", input.footprint.len());
        }

        inner.cmd_vel_cost.set_scale(1.0);
        inner.cmd_vel_cost.set_coefficients(profile.cmd_vel);

        // Generate and search the candidate set
        let generator = TrajGenerator::new(
            GeneratorConfig::from_params(&inner.params),
            VelocityLimits::from_params(&inner.params),
            input.pose,
            input.vel,
        );

        debug!(
            "Cycle in state {}: {} candidates, yaw error {:.3} rad, goal {:.3} m",
            state,
            generator.num_candidates(),
            yaw_error_rad,
            goal_distance_m
        );

        let cost_fns: [&dyn TrajCostFn; 5] = [
            &inner.goal_cost,
            &inner.obstacle_cost,
            &inner.plan_cost,
            &inner.heading_cost,
            &inner.cmd_vel_cost,
        ];

        let outcome = search::find_best(generator, &cost_fns, input.keep_explored);

        if outcome.best.is_none() {
            warn!(
                "No admissible trajectory ({} candidates, {} rejected), commanding stop",
                outcome.num_evaluated, outcome.num_rejected
            );
        }

        Ok(CycleOutput {
            state,
            report: StatusReport {
                yaw_error_rad,
                plan_distance_m,
                goal_distance_m,
                desired_heading_rad,
                state_changed,
                num_evaluated: outcome.num_evaluated,
                num_rejected: outcome.num_rejected,
            },
            cmd: outcome.best.as_ref().map(|t| t.vel),
            selected: outcome.best,
            explored: outcome.explored,
        })
    }

    /// Lock the inner state, mapping a poisoned mutex to a typed error.
    fn lock(&self) -> Result<MutexGuard<Inner>, PlannerError> {
        self.inner.lock().map_err(|_| PlannerError::ConfigPoisoned)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
