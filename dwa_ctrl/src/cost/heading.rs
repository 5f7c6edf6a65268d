//! Heading-alignment cost

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{TrajCostFn, TrajScore};
use crate::traj::Trajectory;
use util::maths::ang_dist;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Penalises the angular deviation between the trajectory's final heading
/// and the desired orientation, which the state machine sets to the next
/// waypoint's heading (Default/Align) or the goal heading (Arrive).
#[derive(Debug, Clone, Default)]
pub struct HeadingAlignCost {
    scale: f64,
    desired_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingAlignCost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn set_desired_orientation(&mut self, desired_rad: f64) {
        self.desired_rad = desired_rad;
    }

    pub fn desired_orientation(&self) -> f64 {
        self.desired_rad
    }
}

impl TrajCostFn for HeadingAlignCost {
    fn score(&self, traj: &Trajectory) -> TrajScore {
        match traj.final_pose() {
            Some(pose) => {
                TrajScore::Cost(ang_dist(pose.heading_rad, self.desired_rad).abs())
            }
            None => TrajScore::Cost(0.0),
        }
    }

    fn scale(&self) -> f64 {
        self.scale
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::traj::{Pose2, TrajPoint, Vel2};
    use std::f64::consts::PI;

    fn traj_with_heading(heading_rad: f64) -> Trajectory {
        let mut traj = Trajectory::new(Vel2::zero(), 1);
        traj.points.push(TrajPoint {
            pose: Pose2::new(0.0, 0.0, heading_rad),
            time_s: 1.0,
        });
        traj
    }

    #[test]
    fn test_deviation_penalised_with_wrapping() {
        let mut cost = HeadingAlignCost::new();
        cost.set_scale(1.0);
        cost.set_desired_orientation(0.0);

        assert_eq!(cost.score(&traj_with_heading(0.0)), TrajScore::Cost(0.0));
        assert_eq!(cost.score(&traj_with_heading(0.5)), TrajScore::Cost(0.5));

        // Just past -pi wraps to just under pi
        match cost.score(&traj_with_heading(2.0 * PI - 0.25)) {
            TrajScore::Cost(c) => assert!((c - 0.25).abs() < 1e-9),
            s => panic!("expected cost, got {:?}", s),
        }
    }
}
