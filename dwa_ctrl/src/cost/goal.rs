//! Progress-to-goal cost

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::{Rejection, TrajCostFn, TrajScore};
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Scores a trajectory by the distance from its final pose to the endpoint
/// of the lookahead-pruned local plan. Closer is cheaper, so candidates that
/// make progress towards the local goal are preferred.
#[derive(Debug, Clone, Default)]
pub struct GoalDistCost {
    scale: f64,
    target_m: Option<Vector2<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalDistCost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Set the target position, the endpoint of the pruned plan.
    pub fn set_target(&mut self, target_m: Vector2<f64>) {
        self.target_m = Some(target_m);
    }
}

impl TrajCostFn for GoalDistCost {
    fn score(&self, traj: &Trajectory) -> TrajScore {
        let target_m = match self.target_m {
            Some(t) => t,
            None => return TrajScore::Rejected(Rejection::MissingTarget),
        };

        match traj.final_pose() {
            Some(pose) => TrajScore::Cost((target_m - pose.position_m).norm()),
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

    fn traj_ending_at(x_m: f64, y_m: f64) -> Trajectory {
        let mut traj = Trajectory::new(Vel2::zero(), 1);
        traj.points.push(TrajPoint {
            pose: Pose2::new(x_m, y_m, 0.0),
            time_s: 1.0,
        });
        traj
    }

    #[test]
    fn test_closer_end_scores_lower() {
        let mut cost = GoalDistCost::new();
        cost.set_scale(1.0);
        cost.set_target(Vector2::new(5.0, 0.0));

        let near = cost.score(&traj_ending_at(4.0, 0.0));
        let far = cost.score(&traj_ending_at(1.0, 0.0));

        match (near, far) {
            (TrajScore::Cost(n), TrajScore::Cost(f)) => assert!(n < f),
            _ => panic!("expected costs, got {:?} and {:?}", near, far),
        }
    }

    #[test]
    fn test_missing_target_rejects() {
        let cost = GoalDistCost::new();
        assert_eq!(
            cost.score(&traj_ending_at(0.0, 0.0)),
            TrajScore::Rejected(Rejection::MissingTarget)
        );
    }
}
