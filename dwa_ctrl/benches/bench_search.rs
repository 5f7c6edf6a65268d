//! Benchmark of a full planning cycle in free space.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Vector2;
use std::sync::Arc;

// Internal
use dwa_ctrl::cost::CmdVelCoeffs;
use dwa_ctrl::state::CostProfile;
use dwa_ctrl::{
    CycleInput, DwaPlanner, GridCostMap, LocalPlan, Params, PlannerState, Pose2, UnknownPolicy,
    Vel2, Waypoint,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn bench_params() -> Params {
    let profile = CostProfile {
        align_scale: 1.0,
        plan_scale: 2.0,
        goal_scale: 1.0,
        obstacle_scale: 0.5,
        cmd_vel: CmdVelCoeffs {
            px: 0.0,
            nx: 0.2,
            py: 0.0,
            ny: 0.0,
            pth: 0.0,
            nth: 0.0,
        },
    };

    Params {
        vx_samples: 10,
        vy_samples: 1,
        vth_samples: 20,
        sim_time_s: 1.7,
        sim_period_s: 0.1,
        sim_granularity_m: 0.025,
        angular_sim_granularity_rad: 0.1,
        use_dwa: true,
        single_sample_holds_current: false,
        min_trans_speed_ms: 0.0,
        max_trans_speed_ms: 0.55,
        min_vel_x_ms: -0.1,
        max_vel_x_ms: 0.55,
        min_vel_y_ms: 0.0,
        max_vel_y_ms: 0.0,
        min_rot_speed_rads: 0.1,
        max_rot_speed_rads: 1.0,
        acc_lim_x_mss: 2.5,
        acc_lim_y_mss: 2.5,
        acc_lim_theta_radss: 3.2,
        acc_lim_trans_mss: 2.5,
        goal_tolerance_m: 0.1,
        yaw_tolerance_rad: 0.1,
        trans_stopped_speed_ms: 0.05,
        rot_stopped_speed_rads: 0.05,
        switch_yaw_error_rad: 0.5,
        switch_goal_distance_m: 0.4,
        switch_plan_distance_m: 1.0,
        max_waypoint_sep_m: 0.5,
        unknown_policy: UnknownPolicy::Refuse,
        default_profile: profile.clone(),
        align_profile: profile.clone(),
        arrive_profile: profile,
    }
}

fn bench_plan_cycle(c: &mut Criterion) {
    let map = GridCostMap::new(0.05, Vector2::new(120, 40), Vector2::new(0.0, 0.0));
    let planner = DwaPlanner::new(bench_params(), Arc::new(map)).unwrap();

    let plan = LocalPlan::new(
        (0..51)
            .map(|i| Waypoint::new(0.5 + i as f64 * 0.1, 1.0, 0.0))
            .collect::<Vec<_>>(),
    )
    .unwrap();

    let footprint = [
        Vector2::new(0.15, 0.1),
        Vector2::new(-0.15, 0.1),
        Vector2::new(-0.15, -0.1),
        Vector2::new(0.15, -0.1),
    ];

    c.bench_function("plan_cycle free space", |b| {
        b.iter(|| {
            planner
                .plan_cycle(&CycleInput {
                    pose: Pose2::new(0.5, 1.0, 0.0),
                    vel: Vel2::new(0.3, 0.0, 0.0),
                    plan: &plan,
                    footprint: &footprint,
                    prev_state: PlannerState::Default,
                    keep_explored: false,
                })
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_plan_cycle);
criterion_main!(benches);
