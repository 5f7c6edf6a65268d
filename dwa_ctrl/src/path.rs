//! # Local plan
//!
//! The planner consumes a short-horizon path, already transformed into the
//! planning frame, as an ordered sequence of waypoints. The plan itself is
//! owned by the enclosing system; this module only reads it, validates it,
//! and derives the lookahead-pruned view used by the goal cost.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One waypoint of a local plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position in the planning frame
    pub position_m: Vector2<f64>,

    /// Desired heading at this waypoint
    pub heading_rad: f64,
}

/// An ordered, non-empty sequence of waypoints for the planner to follow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalPlan {
    waypoints: Vec<Waypoint>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a local plan cannot be planned against this cycle.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("The local plan contains no waypoints")]
    Empty,

    #[error(
        "The local plan is discontinuous: the waypoint after index {index} is \
         {separation_m} m away (limit {limit_m} m)"
    )]
    Discontinuous {
        index: usize,
        separation_m: f64,
        limit_m: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }
}

impl LocalPlan {
    /// Create a plan from a waypoint sequence. Empty sequences are rejected.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, PlanError> {
        if waypoints.is_empty() {
            return Err(PlanError::Empty);
        }

        Ok(Self { waypoints })
    }

    /// The next waypoint for the robot to track.
    pub fn first(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    /// The final waypoint, i.e. the local goal.
    pub fn last(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn num_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    /// Check that no two consecutive waypoints are further apart than the
    /// given limit.
    pub fn validate_continuity(&self, max_separation_m: f64) -> Result<(), PlanError> {
        for (i, pair) in self.waypoints.windows(2).enumerate() {
            let separation_m = (pair[1].position_m - pair[0].position_m).norm();

            if separation_m > max_separation_m {
                return Err(PlanError::Discontinuous {
                    index: i,
                    separation_m,
                    limit_m: max_separation_m,
                });
            }
        }

        Ok(())
    }

    /// Produce a front-truncated copy of the plan, cut at the given
    /// lookahead distance ahead of the robot.
    ///
    /// Walking starts at the waypoint closest to `from` and accumulates
    /// segment lengths until the lookahead is exceeded. At least one
    /// waypoint is always retained, so the pruned plan is never empty.
    pub fn lookahead_pruned(&self, from: Vector2<f64>, lookahead_m: f64) -> LocalPlan {
        let start = self.closest_waypoint_index(from);

        let mut waypoints = vec![self.waypoints[start]];
        let mut dist_m = 0.0;

        for i in (start + 1)..self.waypoints.len() {
            dist_m += (self.waypoints[i].position_m - self.waypoints[i - 1].position_m).norm();

            if dist_m > lookahead_m {
                break;
            }

            waypoints.push(self.waypoints[i]);
        }

        LocalPlan { waypoints }
    }

    /// Minimum distance from a point to the plan polyline.
    pub fn distance_to(&self, point_m: Vector2<f64>) -> f64 {
        // A single waypoint degenerates to a point distance
        if self.waypoints.len() == 1 {
            return (point_m - self.waypoints[0].position_m).norm();
        }

        let mut min_dist_m = f64::INFINITY;

        for pair in self.waypoints.windows(2) {
            let dist_m = Self::segment_distance(point_m, pair[0].position_m, pair[1].position_m);

            if dist_m < min_dist_m {
                min_dist_m = dist_m;
            }
        }

        min_dist_m
    }

    /// Distance from a point to the segment between `start` and `end`.
    fn segment_distance(point_m: Vector2<f64>, start_m: Vector2<f64>, end_m: Vector2<f64>) -> f64 {
        let seg = end_m - start_m;
        let len_sq = seg.norm_squared();

        // Degenerate segment, use the distance to its start
        if len_sq <= f64::EPSILON {
            return (point_m - start_m).norm();
        }

        // Project onto the segment and clamp to its ends
        let t = ((point_m - start_m).dot(&seg) / len_sq).max(0.0).min(1.0);

        (point_m - (start_m + seg * t)).norm()
    }

    fn closest_waypoint_index(&self, from: Vector2<f64>) -> usize {
        let mut closest = 0;
        let mut min_dist_m = f64::INFINITY;

        for (i, wp) in self.waypoints.iter().enumerate() {
            let dist_m = (wp.position_m - from).norm();

            if dist_m < min_dist_m {
                min_dist_m = dist_m;
                closest = i;
            }
        }

        closest
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A straight plan along +x with waypoints every 0.1 m.
    fn straight_plan(length_m: f64) -> LocalPlan {
        let num = (length_m / 0.1) as usize + 1;
        LocalPlan::new(
            (0..num)
                .map(|i| Waypoint::new(i as f64 * 0.1, 0.0, 0.0))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_plan_rejected() {
        assert!(matches!(LocalPlan::new(vec![]), Err(PlanError::Empty)));
    }

    #[test]
    fn test_continuity() {
        let plan = straight_plan(2.0);
        assert!(plan.validate_continuity(0.2).is_ok());

        let broken = LocalPlan::new(vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(5.0, 0.0, 0.0),
        ])
        .unwrap();
        assert!(matches!(
            broken.validate_continuity(0.2),
            Err(PlanError::Discontinuous { index: 0, .. })
        ));
    }

    #[test]
    fn test_lookahead_prune() {
        let plan = straight_plan(5.0);

        // Pruned at 1 m from the origin the plan should end near x = 1
        let pruned = plan.lookahead_pruned(Vector2::new(0.0, 0.0), 1.0);
        assert!((pruned.last().position_m[0] - 1.0).abs() < 0.11);

        // Pruning beyond the plan end keeps the whole plan
        let pruned = plan.lookahead_pruned(Vector2::new(0.0, 0.0), 100.0);
        assert_eq!(pruned.num_waypoints(), plan.num_waypoints());

        // Pruning starts at the waypoint closest to the robot
        let pruned = plan.lookahead_pruned(Vector2::new(2.0, 0.3), 1.0);
        assert!((pruned.first().position_m[0] - 2.0).abs() < 0.06);
    }

    #[test]
    fn test_distance_to() {
        let plan = straight_plan(2.0);

        // Off to the side of the polyline
        assert!((plan.distance_to(Vector2::new(1.0, 0.5)) - 0.5).abs() < 1e-9);

        // Beyond the end the distance is to the final waypoint
        let expected = (Vector2::<f64>::new(3.0, 1.0) - Vector2::new(2.0, 0.0)).norm();
        assert!((plan.distance_to(Vector2::new(3.0, 1.0)) - expected).abs() < 1e-9);
    }
}
