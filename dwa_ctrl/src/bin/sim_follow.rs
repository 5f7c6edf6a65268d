//! # Simulated path-following demo
//!
//! Runs the DWA planner in a closed loop against a synthetic obstacle map: a
//! straight corridor with one obstacle block beside the path. Each cycle the
//! selected command is integrated forward for one control period and fed back
//! as the next cycle's current velocity, until the robot reaches the goal or
//! the cycle budget runs out.
//!
//! The cycle-by-cycle trace is written to `sim_follow_trace.json` for offline
//! inspection.
//!
//! Parameters are loaded from `params/dwa_ctrl.toml`, either relative to the
//! `DWA_SW_ROOT` environment variable or to the working directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::eyre, Report};
use log::{info, warn, LevelFilter};
use nalgebra::Vector2;
use serde::Serialize;
use std::sync::Arc;

// Internal
use dwa_ctrl::{
    CellCost, CycleInput, DwaPlanner, GridCostMap, LocalPlan, Params, PlannerState, Pose2, Vel2,
    Waypoint,
};
use util::logger::logger_init;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of control cycles before the run is abandoned.
const MAX_CYCLES: usize = 600;

/// Output path of the cycle trace.
const TRACE_PATH: &str = "sim_follow_trace.json";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One entry of the cycle trace.
#[derive(Serialize)]
struct TraceEntry {
    cycle: usize,
    time_s: f64,
    pose: Pose2,
    cmd: Option<Vel2>,
    state: PlannerState,
    goal_distance_m: f64,
}

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;
    logger_init(LevelFilter::Info, None)?;

    let params = load_params()?;
    let sim_period_s = params.sim_period_s;
    let goal_tolerance_m = params.goal_tolerance_m;

    // A 6 x 2 m corridor with an obstacle block beside the path
    let mut map = GridCostMap::new(0.05, Vector2::new(120, 40), Vector2::new(0.0, 0.0));
    map.set_region(
        Vector2::new(2.5, 1.4),
        Vector2::new(3.0, 2.0),
        CellCost::Lethal,
    );
    map.set_region(
        Vector2::new(2.3, 1.2),
        Vector2::new(3.2, 1.4),
        CellCost::Cost(0.4),
    );

    // Straight plan down the corridor centre line
    let plan = LocalPlan::new(
        (0..51)
            .map(|i| Waypoint::new(0.5 + i as f64 * 0.1, 1.0, 0.0))
            .collect::<Vec<_>>(),
    )?;
    let goal = *plan.last();

    let footprint = [
        Vector2::new(0.15, 0.1),
        Vector2::new(-0.15, 0.1),
        Vector2::new(-0.15, -0.1),
        Vector2::new(0.15, -0.1),
    ];

    let planner = DwaPlanner::new(params, Arc::new(map))?;

    let mut pose = Pose2::new(0.5, 1.0, 0.0);
    let mut vel = Vel2::zero();
    let mut state = PlannerState::Default;
    let mut trace = Vec::with_capacity(MAX_CYCLES);

    info!(
        "Following a {:.1} m plan to ({:.2}, {:.2})",
        (goal.position_m - pose.position_m).norm(),
        goal.position_m[0],
        goal.position_m[1]
    );

    for cycle in 0..MAX_CYCLES {
        let output = planner.plan_cycle(&CycleInput {
            pose,
            vel,
            plan: &plan,
            footprint: &footprint,
            prev_state: state,
            keep_explored: false,
        })?;

        state = output.state;

        trace.push(TraceEntry {
            cycle,
            time_s: cycle as f64 * sim_period_s,
            pose,
            cmd: output.cmd,
            state,
            goal_distance_m: output.report.goal_distance_m,
        });

        match output.cmd {
            Some(cmd) => {
                pose = integrate(pose, cmd, sim_period_s);
                vel = cmd;
            }
            None => {
                warn!("No admissible trajectory at cycle {}, stopping", cycle);
                vel = Vel2::zero();
            }
        }

        if (goal.position_m - pose.position_m).norm() < goal_tolerance_m {
            info!(
                "Goal reached after {} cycles ({:.1} s)",
                cycle + 1,
                (cycle + 1) as f64 * sim_period_s
            );
            write_trace(&trace)?;
            return Ok(());
        }
    }

    write_trace(&trace)?;
    Err(eyre!("Goal not reached within {} cycles", MAX_CYCLES))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Load the planner parameters, preferring the software root if one is set.
fn load_params() -> Result<Params, Report> {
    let params = if std::env::var("DWA_SW_ROOT").is_ok() {
        util::params::load("dwa_ctrl.toml")?
    } else {
        util::params::load_path("params/dwa_ctrl.toml")?
    };

    Ok(params)
}

/// Integrate the holonomic motion model over one control period.
fn integrate(pose: Pose2, vel: Vel2, dt_s: f64) -> Pose2 {
    let (sin_h, cos_h) = pose.heading_rad.sin_cos();

    Pose2 {
        position_m: pose.position_m
            + Vector2::new(
                (vel.x_ms * cos_h - vel.y_ms * sin_h) * dt_s,
                (vel.x_ms * sin_h + vel.y_ms * cos_h) * dt_s,
            ),
        heading_rad: pose.heading_rad + vel.yaw_rads * dt_s,
    }
}

/// Write the cycle trace out as JSON.
fn write_trace(trace: &[TraceEntry]) -> Result<(), Report> {
    std::fs::write(TRACE_PATH, serde_json::to_string_pretty(trace)?)?;
    info!("Wrote {} trace entries to {}", trace.len(), TRACE_PATH);

    Ok(())
}
