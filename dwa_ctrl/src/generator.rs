//! # Trajectory generator
//!
//! Enumerates a discretised grid of candidate velocity commands inside the
//! active sampling window and forward simulates each candidate into a
//! time-sampled trajectory. The generator is a finite, restartable iterator
//! so the search can stop early without materialising every candidate.
//!
//! Candidates are enumerated in a fixed vx -> vy -> omega order (x outermost)
//! which, together with the search's first-minimum tie-break, makes the
//! selected trajectory reproducible.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::limits::VelocityLimits;
use crate::params::Params;
use crate::traj::{Pose2, TrajPoint, Trajectory, Vel2};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generation parameters, a per-cycle snapshot of the planner configuration.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    /// Number of samples per axis (vx, vy, omega), clamped to at least 1
    pub samples: [usize; 3],

    /// Forward simulation horizon
    pub sim_time_s: f64,

    /// Control period bounding the dynamic window
    pub sim_period_s: f64,

    /// Distance between simulated pose samples
    pub sim_granularity_m: f64,

    /// Angular distance between simulated pose samples
    pub angular_sim_granularity_rad: f64,

    /// Restrict sampling to the dynamic window and ramp the simulated
    /// velocity towards the sample under the acceleration limits
    pub use_dwa: bool,

    /// Collapse single-sample axes to the current velocity instead of zero
    pub single_sample_holds_current: bool,
}

/// Generator of (velocity sample, simulated trajectory) candidates.
pub struct TrajGenerator {
    config: GeneratorConfig,
    limits: VelocityLimits,
    pose: Pose2,
    vel: Vel2,

    /// Velocity samples in enumeration order
    samples: Vec<Vel2>,

    /// Index of the next sample to simulate
    next_sample: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeneratorConfig {
    pub fn from_params(params: &Params) -> Self {
        Self {
            samples: [
                params.vx_samples.max(1),
                params.vy_samples.max(1),
                params.vth_samples.max(1),
            ],
            sim_time_s: params.sim_time_s,
            sim_period_s: params.sim_period_s,
            sim_granularity_m: params.sim_granularity_m,
            angular_sim_granularity_rad: params.angular_sim_granularity_rad,
            use_dwa: params.use_dwa,
            single_sample_holds_current: params.single_sample_holds_current,
        }
    }
}

impl TrajGenerator {
    /// Create a generator for one cycle, enumerating the velocity grid
    /// reachable from `vel` at `pose`.
    pub fn new(config: GeneratorConfig, limits: VelocityLimits, pose: Pose2, vel: Vel2) -> Self {
        let xs = Self::axis_samples(
            limits.window_x(vel.x_ms, config.use_dwa, config.sim_period_s),
            config.samples[0],
            vel.x_ms,
            config.single_sample_holds_current,
        );
        let ys = Self::axis_samples(
            limits.window_y(vel.y_ms, config.use_dwa, config.sim_period_s),
            config.samples[1],
            vel.y_ms,
            config.single_sample_holds_current,
        );
        let ths = Self::axis_samples(
            limits.window_theta(vel.yaw_rads, config.use_dwa, config.sim_period_s),
            config.samples[2],
            vel.yaw_rads,
            config.single_sample_holds_current,
        );

        let mut samples = Vec::with_capacity(xs.len() * ys.len() * ths.len());

        for &x in &xs {
            for &y in &ys {
                for &th in &ths {
                    let sample = Vel2::new(x, y, th);
                    let speed_ms = sample.trans_speed_ms();

                    // Over the combined speed limit
                    if speed_ms > limits.max_trans_speed_ms {
                        continue;
                    }

                    // Below the minimum speed without a meaningful rotation
                    if speed_ms < limits.min_trans_speed_ms
                        && th.abs() < limits.min_rot_speed_rads
                    {
                        continue;
                    }

                    samples.push(sample);
                }
            }
        }

        Self {
            config,
            limits,
            pose,
            vel,
            samples,
            next_sample: 0,
        }
    }

    /// Number of candidates this generator will produce.
    pub fn num_candidates(&self) -> usize {
        self.samples.len()
    }

    /// Restart enumeration from the first candidate.
    pub fn reset(&mut self) {
        self.next_sample = 0;
    }

    /// Discretise one axis interval into `num` samples.
    ///
    /// An empty interval produces no samples. A single-sample axis collapses
    /// to zero (or the current velocity, per configuration) clamped into the
    /// interval.
    fn axis_samples((min, max): (f64, f64), num: usize, current: f64, hold: bool) -> Vec<f64> {
        if min > max {
            return Vec::new();
        }

        if num <= 1 {
            let collapsed = if hold { current } else { 0.0 };
            return vec![clamp(&collapsed, &min, &max)];
        }

        let step = (max - min) / (num - 1) as f64;
        (0..num).map(|i| min + step * i as f64).collect()
    }

    /// Forward simulate one velocity sample into a trajectory.
    fn simulate(&self, sample: Vel2) -> Trajectory {
        // Step count from whichever granularity is the binding one
        let trans_steps =
            self.config.sim_time_s * sample.trans_speed_ms() / self.config.sim_granularity_m;
        let ang_steps = self.config.sim_time_s * sample.yaw_rads.abs()
            / self.config.angular_sim_granularity_rad;
        let num_steps = (trans_steps.max(ang_steps).ceil() as usize).max(1);

        let dt = self.config.sim_time_s / num_steps as f64;

        let mut traj = Trajectory::new(sample, num_steps);
        let mut pose = self.pose;

        // With the dynamic window active the velocity ramps from the current
        // velocity towards the sample under the acceleration limits, and
        // holds the sample thereafter. Otherwise the sample is held from the
        // first step.
        let mut vel = if self.config.use_dwa { self.vel } else { sample };

        for step in 0..num_steps {
            if self.config.use_dwa {
                vel = self.step_velocity(vel, sample, dt);
            }

            pose = Self::step_pose(pose, vel, dt);

            traj.points.push(TrajPoint {
                pose,
                time_s: (step + 1) as f64 * dt,
            });
        }

        traj
    }

    /// Move `vel` towards `target` honouring per-axis acceleration limits
    /// and the combined translational limit.
    fn step_velocity(&self, vel: Vel2, target: Vel2, dt: f64) -> Vel2 {
        let mut dx = Self::step_toward(vel.x_ms, target.x_ms, self.limits.acc_lim_x_mss * dt);
        let mut dy = Self::step_toward(vel.y_ms, target.y_ms, self.limits.acc_lim_y_mss * dt);
        let dth = Self::step_toward(
            vel.yaw_rads,
            target.yaw_rads,
            self.limits.acc_lim_theta_radss * dt,
        );

        // Scale the translational delta down if it exceeds the combined limit
        let trans_delta = dx.hypot(dy);
        let max_trans_delta = self.limits.acc_lim_trans_mss * dt;
        if trans_delta > max_trans_delta {
            let scale = max_trans_delta / trans_delta;
            dx *= scale;
            dy *= scale;
        }

        Vel2::new(vel.x_ms + dx, vel.y_ms + dy, vel.yaw_rads + dth)
    }

    fn step_toward(current: f64, target: f64, max_delta: f64) -> f64 {
        clamp(&(target - current), &-max_delta, &max_delta)
    }

    /// Integrate a holonomic motion model over one step.
    fn step_pose(pose: Pose2, vel: Vel2, dt: f64) -> Pose2 {
        let (sin_h, cos_h) = pose.heading_rad.sin_cos();

        Pose2 {
            position_m: pose.position_m
                + nalgebra::Vector2::new(
                    (vel.x_ms * cos_h - vel.y_ms * sin_h) * dt,
                    (vel.x_ms * sin_h + vel.y_ms * cos_h) * dt,
                ),
            heading_rad: pose.heading_rad + vel.yaw_rads * dt,
        }
    }
}

impl Iterator for TrajGenerator {
    type Item = Trajectory;

    fn next(&mut self) -> Option<Trajectory> {
        let sample = *self.samples.get(self.next_sample)?;
        self.next_sample += 1;

        Some(self.simulate(sample))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::test_params;

    fn generator_for(vel: Vel2) -> TrajGenerator {
        let params = test_params();
        TrajGenerator::new(
            GeneratorConfig::from_params(&params),
            VelocityLimits::from_params(&params),
            Pose2::new(0.0, 0.0, 0.0),
            vel,
        )
    }

    #[test]
    fn test_dynamic_window_bound() {
        let current = Vel2::new(0.2, 0.0, 0.1);
        let params = test_params();
        let gen = generator_for(current);

        assert!(gen.num_candidates() > 0);

        for traj in gen {
            assert!(
                (traj.vel.x_ms - current.x_ms).abs()
                    <= params.acc_lim_x_mss * params.sim_period_s + 1e-9
            );
            assert!(
                (traj.vel.yaw_rads - current.yaw_rads).abs()
                    <= params.acc_lim_theta_radss * params.sim_period_s + 1e-9
            );
        }
    }

    #[test]
    fn test_enumeration_order_is_deterministic() {
        let current = Vel2::new(0.2, 0.0, 0.0);
        let first: Vec<Vel2> = generator_for(current).map(|t| t.vel).collect();
        let second: Vec<Vel2> = generator_for(current).map(|t| t.vel).collect();

        assert_eq!(first, second);

        // vx is the outermost axis: it must be non-decreasing
        for pair in first.windows(2) {
            assert!(pair[1].x_ms >= pair[0].x_ms - 1e-12);
        }
    }

    #[test]
    fn test_reset_restarts_enumeration() {
        let mut gen = generator_for(Vel2::new(0.2, 0.0, 0.0));

        let first = gen.next().map(|t| t.vel);
        gen.reset();
        assert_eq!(gen.next().map(|t| t.vel), first);
    }

    #[test]
    fn test_straight_sample_simulates_straight() {
        let params = test_params();
        let gen = generator_for(Vel2::new(0.3, 0.0, 0.0));

        // Find the candidate that keeps driving straight
        let traj = gen
            .into_iter()
            .find(|t| t.vel.yaw_rads.abs() < 1e-9 && t.vel.x_ms > 0.25)
            .expect("no straight candidate generated");

        let end = traj.final_pose().unwrap();
        assert!(end.position_m[0] > 0.0);
        assert!(end.position_m[1].abs() < 1e-6);
        assert!(end.heading_rad.abs() < 1e-6);

        // Last sample sits at the simulation horizon
        assert!((traj.points.last().unwrap().time_s - params.sim_time_s).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_window_yields_no_candidates() {
        let mut params = test_params();
        // A current velocity far outside the configured range with a tiny
        // window leaves no valid x samples
        params.min_trans_speed_ms = 0.4;
        params.min_rot_speed_rads = 10.0;
        params.max_trans_speed_ms = 0.5;
        params.min_vel_x_ms = 0.0;
        params.max_vel_x_ms = 0.1;

        let gen = TrajGenerator::new(
            GeneratorConfig::from_params(&params),
            VelocityLimits::from_params(&params),
            Pose2::new(0.0, 0.0, 0.0),
            Vel2::zero(),
        );

        // Every candidate is filtered: too slow to translate, too slow to
        // rotate
        assert_eq!(gen.num_candidates(), 0);
    }
}
