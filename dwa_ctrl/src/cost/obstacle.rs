//! Obstacle-proximity cost

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use std::sync::Arc;

// Internal
use super::{Rejection, TrajCostFn, TrajScore};
use crate::costmap::{CellCost, ObstacleMap, UnknownPolicy};
use crate::traj::Trajectory;
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Cell cost above which the speed cap bottoms out at its minimum.
const SPEED_CAP_COST_THRESHOLD: f64 = 0.5;

/// Fraction of the maximum translational speed still allowed in the highest
/// cost cells.
const SPEED_CAP_MIN_FRACTION: f64 = 0.2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Queries the obstacle map for the cost of placing the robot's footprint at
/// every pose of a trajectory.
///
/// Two safety behaviours beyond the plain query:
///
/// - The footprint is extended along the direction of motion by the robot's
///   stopping distance (`0.5 v^2 / a` per axis), so a fast trajectory must
///   keep the space it needs to stop clear.
/// - The permitted speed shrinks as cell cost rises: commands faster than
///   the cap for the worst cell they cross are rejected outright.
pub struct ObstacleCost {
    map: Arc<dyn ObstacleMap + Send + Sync>,
    scale: f64,

    /// Footprint polygon in the robot's body frame
    footprint_m: Vec<Vector2<f64>>,

    acc_lim_x_mss: f64,
    acc_lim_y_mss: f64,
    max_trans_speed_ms: f64,
    unknown_policy: UnknownPolicy,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ObstacleCost {
    pub fn new(map: Arc<dyn ObstacleMap + Send + Sync>) -> Self {
        Self {
            map,
            scale: 0.0,
            footprint_m: Vec::new(),
            acc_lim_x_mss: 1.0,
            acc_lim_y_mss: 1.0,
            max_trans_speed_ms: 0.0,
            unknown_policy: UnknownPolicy::Refuse,
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Update the acceleration limits and speed bound used for the stopping
    /// distance extension and the speed cap.
    pub fn set_params(
        &mut self,
        acc_lim_x_mss: f64,
        acc_lim_y_mss: f64,
        max_trans_speed_ms: f64,
        unknown_policy: UnknownPolicy,
    ) {
        self.acc_lim_x_mss = acc_lim_x_mss;
        self.acc_lim_y_mss = acc_lim_y_mss;
        self.max_trans_speed_ms = max_trans_speed_ms;
        self.unknown_policy = unknown_policy;
    }

    /// Replace the footprint if it changed. Returns true when an update
    /// happened.
    pub fn refresh_footprint(&mut self, footprint_m: &[Vector2<f64>]) -> bool {
        if self.footprint_m.as_slice() == footprint_m {
            return false;
        }

        self.footprint_m = footprint_m.to_vec();
        true
    }

    /// Resolve a raw map answer into a finite cost or a rejection.
    fn resolve(&self, cost: CellCost) -> Result<f64, Rejection> {
        match cost {
            CellCost::Cost(c) => Ok(c),
            CellCost::Lethal => Err(Rejection::LethalFootprint),
            CellCost::Unknown => match self.unknown_policy {
                UnknownPolicy::Refuse => Err(Rejection::UnknownFootprint),
                UnknownPolicy::TreatAsFree => Ok(0.0),
            },
        }
    }

    /// The footprint polygon in the planning frame for one trajectory pose,
    /// with each vertex pushed out by the stopping distance along the
    /// direction of motion.
    fn oriented_footprint(
        &self,
        position_m: Vector2<f64>,
        heading_rad: f64,
        vel_x_ms: f64,
        vel_y_ms: f64,
    ) -> Vec<Vector2<f64>> {
        let (sin_h, cos_h) = heading_rad.sin_cos();

        // Stopping distances per body axis
        let stop_x_m = 0.5 * vel_x_ms * vel_x_ms / self.acc_lim_x_mss;
        let stop_y_m = 0.5 * vel_y_ms * vel_y_ms / self.acc_lim_y_mss;

        self.footprint_m
            .iter()
            .map(|vertex| {
                // Only the leading vertices get pushed out
                let mut ext = *vertex;
                if vertex[0] > 0.0 && vel_x_ms > 0.0 {
                    ext[0] += stop_x_m;
                } else if vertex[0] < 0.0 && vel_x_ms < 0.0 {
                    ext[0] -= stop_x_m;
                }
                if vertex[1] > 0.0 && vel_y_ms > 0.0 {
                    ext[1] += stop_y_m;
                } else if vertex[1] < 0.0 && vel_y_ms < 0.0 {
                    ext[1] -= stop_y_m;
                }

                position_m
                    + Vector2::new(ext[0] * cos_h - ext[1] * sin_h, ext[0] * sin_h + ext[1] * cos_h)
            })
            .collect()
    }

    /// The maximum translational speed permitted over a cell of the given
    /// cost. Decays linearly from the configured maximum down to
    /// [`SPEED_CAP_MIN_FRACTION`] of it as the cost approaches
    /// [`SPEED_CAP_COST_THRESHOLD`].
    fn speed_cap_ms(&self, cell_cost: f64) -> f64 {
        let floor_ms = SPEED_CAP_MIN_FRACTION * self.max_trans_speed_ms;

        if cell_cost < SPEED_CAP_COST_THRESHOLD {
            lin_map(
                (0.0, SPEED_CAP_COST_THRESHOLD),
                (self.max_trans_speed_ms, floor_ms),
                cell_cost,
            )
        } else {
            floor_ms
        }
    }
}

impl TrajCostFn for ObstacleCost {
    fn score(&self, traj: &Trajectory) -> TrajScore {
        if self.footprint_m.is_empty() {
            return TrajScore::Rejected(Rejection::MissingFootprint);
        }

        let speed_ms = traj.vel.trans_speed_ms();
        let mut max_cost = 0.0f64;

        for point in &traj.points {
            let position_m = point.pose.position_m;
            let footprint = self.oriented_footprint(
                position_m,
                point.pose.heading_rad,
                traj.vel.x_ms,
                traj.vel.y_ms,
            );

            // Worst of the footprint boundary and the centre cell
            let worst = self
                .map
                .footprint_cost(position_m, &footprint)
                .worse(self.map.point_cost(position_m));

            let cell_cost = match self.resolve(worst) {
                Ok(c) => c,
                Err(rejection) => return TrajScore::Rejected(rejection),
            };

            if speed_ms > self.speed_cap_ms(cell_cost) {
                return TrajScore::Rejected(Rejection::OverSpeedNearObstacle);
            }

            max_cost = max_cost.max(cell_cost);
        }

        TrajScore::Cost(max_cost)
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
    use crate::costmap::GridCostMap;
    use crate::traj::{Pose2, TrajPoint, Vel2};

    fn body_footprint(half_m: f64) -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(half_m, half_m),
            Vector2::new(-half_m, half_m),
            Vector2::new(-half_m, -half_m),
            Vector2::new(half_m, -half_m),
        ]
    }

    /// A straight trajectory along +x from the origin.
    fn straight_traj(vel_x_ms: f64, length_m: f64) -> Trajectory {
        let num = 10;
        let mut traj = Trajectory::new(Vel2::new(vel_x_ms, 0.0, 0.0), num);

        for i in 1..=num {
            let x = length_m * i as f64 / num as f64;
            traj.points.push(TrajPoint {
                pose: Pose2::new(x, 1.0, 0.0),
                time_s: i as f64 * 0.1,
            });
        }

        traj
    }

    fn cost_over(map: GridCostMap, policy: UnknownPolicy) -> ObstacleCost {
        let mut cost = ObstacleCost::new(Arc::new(map));
        cost.set_scale(1.0);
        cost.set_params(1.0, 1.0, 0.5, policy);
        cost.refresh_footprint(&body_footprint(0.05));
        cost
    }

    fn free_map() -> GridCostMap {
        GridCostMap::new(0.1, Vector2::new(40, 20), Vector2::new(0.0, 0.0))
    }

    #[test]
    fn test_free_space_scores_zero() {
        let cost = cost_over(free_map(), UnknownPolicy::Refuse);

        assert_eq!(
            cost.score(&straight_traj(0.1, 2.0)),
            TrajScore::Cost(0.0)
        );
    }

    #[test]
    fn test_lethal_rejects() {
        let mut map = free_map();
        map.set_region(
            Vector2::new(1.0, 0.0),
            Vector2::new(1.3, 2.0),
            CellCost::Lethal,
        );

        assert_eq!(
            cost_over(map, UnknownPolicy::Refuse).score(&straight_traj(0.1, 2.0)),
            TrajScore::Rejected(Rejection::LethalFootprint)
        );
    }

    #[test]
    fn test_unknown_policy() {
        // Trajectory running off the map edge
        let traj = straight_traj(0.1, 6.0);

        assert_eq!(
            cost_over(free_map(), UnknownPolicy::Refuse).score(&traj),
            TrajScore::Rejected(Rejection::UnknownFootprint)
        );
        assert_eq!(
            cost_over(free_map(), UnknownPolicy::TreatAsFree).score(&traj),
            TrajScore::Cost(0.0)
        );
    }

    #[test]
    fn test_max_cost_and_speed_cap() {
        let mut map = free_map();
        map.set_region(
            Vector2::new(1.0, 0.0),
            Vector2::new(1.3, 2.0),
            CellCost::Cost(0.4),
        );
        let cost = cost_over(map, UnknownPolicy::Refuse);

        // Slow enough: admissible, scoring the worst crossed cell
        assert_eq!(cost.score(&straight_traj(0.1, 2.0)), TrajScore::Cost(0.4));

        // The cap at cost 0.4 is 0.18 m/s for a 0.5 m/s maximum, so 0.3 m/s
        // is too fast
        assert_eq!(
            cost.score(&straight_traj(0.3, 2.0)),
            TrajScore::Rejected(Rejection::OverSpeedNearObstacle)
        );
    }

    #[test]
    fn test_missing_footprint_rejects() {
        let cost = ObstacleCost::new(Arc::new(free_map()));
        assert_eq!(
            cost.score(&straight_traj(0.1, 1.0)),
            TrajScore::Rejected(Rejection::MissingFootprint)
        );
    }
}
