//! Trajectory and velocity value types

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A planar pose in the planning frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pose2 {
    /// Position in the planning frame
    pub position_m: Vector2<f64>,

    /// Heading (angle to the +ve x axis of the planning frame)
    pub heading_rad: f64,
}

/// A commanded or measured planar velocity.
///
/// Velocities are expressed in the robot's body frame, x forward, y left,
/// positive rotation anticlockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vel2 {
    /// Velocity along the body x axis
    pub x_ms: f64,

    /// Velocity along the body y axis
    pub y_ms: f64,

    /// Rotational velocity about the body z axis
    pub yaw_rads: f64,
}

/// One time-stamped pose sample along a simulated trajectory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrajPoint {
    pub pose: Pose2,

    /// Time offset of this sample from the start of the trajectory
    pub time_s: f64,
}

/// A forward-simulated candidate trajectory.
///
/// The trajectory is produced by holding (or ramping towards, see
/// [`crate::generator`]) the originating velocity command `vel` for the
/// simulation horizon. The `cost` is written once by the search when the
/// trajectory is scored: a negative cost means the trajectory was rejected
/// and must not be executed, a non-negative cost means the trajectory is
/// admissible, lower being better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    /// Time ordered pose samples
    pub points: Vec<TrajPoint>,

    /// The velocity command this trajectory was simulated from
    pub vel: Vel2,

    /// Total cost of the trajectory, negative if rejected
    pub cost: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2 {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }
}

impl Vel2 {
    pub fn new(x_ms: f64, y_ms: f64, yaw_rads: f64) -> Self {
        Self {
            x_ms,
            y_ms,
            yaw_rads,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Magnitude of the translational component of this velocity.
    pub fn trans_speed_ms(&self) -> f64 {
        self.x_ms.hypot(self.y_ms)
    }
}

impl Trajectory {
    /// Create a new unscored trajectory for the given velocity command.
    pub(crate) fn new(vel: Vel2, capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            vel,
            cost: -1.0,
        }
    }

    /// The final simulated pose, or `None` for an empty trajectory.
    pub fn final_pose(&self) -> Option<Pose2> {
        self.points.last().map(|p| p.pose)
    }

    /// True if this trajectory was scored and not rejected.
    pub fn is_admissible(&self) -> bool {
        self.cost >= 0.0
    }
}
