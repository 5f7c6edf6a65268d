//! Per-cycle kinematic and dynamic limits

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::params::Params;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Admissible velocity and acceleration bounds for one control cycle.
///
/// These are derived from [`Params`] at the start of each cycle. The
/// `window_*` functions intersect the configured velocity range with the
/// dynamic window, i.e. the velocities reachable from the current velocity
/// within one control period under the acceleration limits.
#[derive(Debug, Clone, Copy)]
pub struct VelocityLimits {
    /// Minimum commanded translational speed
    pub min_trans_speed_ms: f64,

    /// Maximum commanded translational speed
    pub max_trans_speed_ms: f64,

    pub min_vel_x_ms: f64,
    pub max_vel_x_ms: f64,

    pub min_vel_y_ms: f64,
    pub max_vel_y_ms: f64,

    /// Minimum magnitude of a commanded rotation, below which a rotation is
    /// considered stopped when filtering slow candidates
    pub min_rot_speed_rads: f64,

    /// Maximum magnitude of a commanded rotation
    pub max_rot_speed_rads: f64,

    /// Acceleration limit along the body x axis
    pub acc_lim_x_mss: f64,

    /// Acceleration limit along the body y axis
    pub acc_lim_y_mss: f64,

    /// Rotational acceleration limit
    pub acc_lim_theta_radss: f64,

    /// Combined translational acceleration limit
    pub acc_lim_trans_mss: f64,

    /// Distance from the goal within which the goal is considered reached
    pub goal_tolerance_m: f64,

    /// Heading error from the goal within which the goal heading is
    /// considered reached
    pub yaw_tolerance_rad: f64,

    /// Translational speed below which the robot is considered stopped
    pub trans_stopped_speed_ms: f64,

    /// Rotational speed below which the robot is considered stopped
    pub rot_stopped_speed_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VelocityLimits {
    /// Derive the limits for this cycle from the active configuration.
    pub fn from_params(params: &Params) -> Self {
        Self {
            min_trans_speed_ms: params.min_trans_speed_ms,
            max_trans_speed_ms: params.max_trans_speed_ms,
            min_vel_x_ms: params.min_vel_x_ms,
            max_vel_x_ms: params.max_vel_x_ms,
            min_vel_y_ms: params.min_vel_y_ms,
            max_vel_y_ms: params.max_vel_y_ms,
            min_rot_speed_rads: params.min_rot_speed_rads,
            max_rot_speed_rads: params.max_rot_speed_rads,
            acc_lim_x_mss: params.acc_lim_x_mss,
            acc_lim_y_mss: params.acc_lim_y_mss,
            acc_lim_theta_radss: params.acc_lim_theta_radss,
            acc_lim_trans_mss: params.acc_lim_trans_mss,
            goal_tolerance_m: params.goal_tolerance_m,
            yaw_tolerance_rad: params.yaw_tolerance_rad,
            trans_stopped_speed_ms: params.trans_stopped_speed_ms,
            rot_stopped_speed_rads: params.rot_stopped_speed_rads,
        }
    }

    /// Sampling interval for the body x axis.
    ///
    /// Returns the full configured range, or its intersection with the
    /// dynamic window when `use_dwa` is set. The interval may be empty
    /// (min > max) if the current velocity is outside the configured range.
    pub fn window_x(&self, current_ms: f64, use_dwa: bool, period_s: f64) -> (f64, f64) {
        Self::window(
            (self.min_vel_x_ms, self.max_vel_x_ms),
            current_ms,
            self.acc_lim_x_mss,
            use_dwa,
            period_s,
        )
    }

    /// Sampling interval for the body y axis.
    pub fn window_y(&self, current_ms: f64, use_dwa: bool, period_s: f64) -> (f64, f64) {
        Self::window(
            (self.min_vel_y_ms, self.max_vel_y_ms),
            current_ms,
            self.acc_lim_y_mss,
            use_dwa,
            period_s,
        )
    }

    /// Sampling interval for the rotational axis.
    pub fn window_theta(&self, current_rads: f64, use_dwa: bool, period_s: f64) -> (f64, f64) {
        Self::window(
            (-self.max_rot_speed_rads, self.max_rot_speed_rads),
            current_rads,
            self.acc_lim_theta_radss,
            use_dwa,
            period_s,
        )
    }

    fn window(
        range: (f64, f64),
        current: f64,
        acc_lim: f64,
        use_dwa: bool,
        period_s: f64,
    ) -> (f64, f64) {
        if use_dwa {
            let reach = acc_lim * period_s;
            (
                clamp(&(current - reach), &range.0, &range.1),
                clamp(&(current + reach), &range.0, &range.1),
            )
        } else {
            range
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::test_params;

    #[test]
    fn test_dynamic_window() {
        let limits = VelocityLimits::from_params(&test_params());

        // Window about a mid-range velocity is centred on it
        let (lo, hi) = limits.window_x(0.2, true, 0.2);
        assert!((lo - (0.2 - limits.acc_lim_x_mss * 0.2)).abs() < 1e-9);
        assert!((hi - (0.2 + limits.acc_lim_x_mss * 0.2)).abs() < 1e-9);

        // Window never exceeds the configured range
        let (lo, hi) = limits.window_x(limits.max_vel_x_ms, true, 10.0);
        assert!(lo >= limits.min_vel_x_ms);
        assert!(hi <= limits.max_vel_x_ms);

        // Full range sampling ignores the current velocity
        let (lo, hi) = limits.window_x(0.2, false, 0.2);
        assert_eq!(lo, limits.min_vel_x_ms);
        assert_eq!(hi, limits.max_vel_x_ms);
    }
}
