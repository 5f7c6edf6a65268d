//! Path-alignment cost

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{Rejection, TrajCostFn, TrajScore};
use crate::path::LocalPlan;
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Scores a trajectory by the distance from its final pose to the full
/// (non-pruned) local plan polyline, penalising drift away from the path
/// rather than only from its endpoint.
#[derive(Debug, Clone, Default)]
pub struct PlanDistCost {
    scale: f64,
    plan: Option<LocalPlan>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PlanDistCost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn set_plan(&mut self, plan: LocalPlan) {
        self.plan = Some(plan);
    }
}

impl TrajCostFn for PlanDistCost {
    fn score(&self, traj: &Trajectory) -> TrajScore {
        let plan = match &self.plan {
            Some(p) => p,
            None => return TrajScore::Rejected(Rejection::MissingTarget),
        };

        match traj.final_pose() {
            Some(pose) => TrajScore::Cost(plan.distance_to(pose.position_m)),
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
    use crate::path::Waypoint;
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
    fn test_drift_from_path_penalised() {
        let plan = LocalPlan::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(2.0, 0.0, 0.0),
        ])
        .unwrap();

        let mut cost = PlanDistCost::new();
        cost.set_scale(1.0);
        cost.set_plan(plan);

        // On the path is free, off the path costs its lateral offset
        assert_eq!(cost.score(&traj_ending_at(1.0, 0.0)), TrajScore::Cost(0.0));
        assert_eq!(cost.score(&traj_ending_at(1.0, 0.4)), TrajScore::Cost(0.4));
    }
}
