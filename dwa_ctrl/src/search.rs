//! # Scored sampling search
//!
//! Drives the trajectory generator through the cost function suite and keeps
//! the lowest cost admissible trajectory. Between equal cost candidates the
//! first one encountered wins, so with the generator's fixed enumeration
//! order the result is deterministic.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use crate::cost::{TrajCostFn, TrajScore};
use crate::traj::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The result of one search over the candidate set.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// The lowest cost admissible trajectory, or `None` if every candidate
    /// was rejected (including the empty candidate set)
    pub best: Option<Trajectory>,

    /// Every scored trajectory, retained only when requested
    pub explored: Option<Vec<Trajectory>>,

    /// Number of candidates evaluated
    pub num_evaluated: usize,

    /// Number of candidates rejected by some cost function
    pub num_rejected: usize,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Search the candidate sequence for the lowest cost admissible trajectory.
///
/// Each candidate is scored by the cost functions in order, aborting on the
/// first rejection. The final cost is the scale-weighted sum of the
/// contributions and is independent of the evaluation order. A zero scale
/// silences a function's contribution but not its power to reject.
pub fn find_best<I>(
    candidates: I,
    cost_fns: &[&dyn TrajCostFn],
    keep_explored: bool,
) -> SearchOutcome
where
    I: Iterator<Item = Trajectory>,
{
    let mut outcome = SearchOutcome {
        explored: if keep_explored {
            Some(Vec::new())
        } else {
            None
        },
        ..Default::default()
    };

    let mut best_cost = f64::INFINITY;

    for mut traj in candidates {
        outcome.num_evaluated += 1;

        let mut total_cost = 0.0;
        let mut rejected = false;

        for cost_fn in cost_fns {
            match cost_fn.score(&traj) {
                TrajScore::Cost(c) => total_cost += cost_fn.scale() * c,
                TrajScore::Rejected(r) => {
                    trace!("Candidate {:?} rejected: {}", traj.vel, r);
                    rejected = true;
                    break;
                }
            }
        }

        traj.cost = if rejected {
            outcome.num_rejected += 1;
            -1.0
        } else {
            total_cost
        };

        // Strict comparison keeps the first of equal cost candidates
        if !rejected && traj.cost < best_cost {
            best_cost = traj.cost;
            outcome.best = Some(traj.clone());
        }

        if let Some(ref mut explored) = outcome.explored {
            explored.push(traj);
        }
    }

    outcome
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::cost::Rejection;
    use crate::traj::Vel2;

    /// Scores the candidate's x velocity directly, rejecting negatives.
    struct VelXCost {
        scale: f64,
    }

    impl TrajCostFn for VelXCost {
        fn score(&self, traj: &Trajectory) -> TrajScore {
            if traj.vel.x_ms < 0.0 {
                TrajScore::Rejected(Rejection::MissingTarget)
            } else {
                TrajScore::Cost(traj.vel.x_ms)
            }
        }

        fn scale(&self) -> f64 {
            self.scale
        }
    }

    fn candidates(vels: &[f64]) -> Vec<Trajectory> {
        vels.iter()
            .map(|&v| Trajectory::new(Vel2::new(v, 0.0, 0.0), 0))
            .collect()
    }

    #[test]
    fn test_selects_true_minimum() {
        let cost = VelXCost { scale: 2.0 };
        let outcome = find_best(
            candidates(&[0.5, 0.2, 0.8, 0.3]).into_iter(),
            &[&cost],
            true,
        );

        let best = outcome.best.unwrap();
        assert_eq!(best.vel.x_ms, 0.2);
        assert_eq!(best.cost, 0.4);

        // The selected cost is a true minimum over the admissible explored
        // set
        for traj in outcome.explored.unwrap() {
            if traj.is_admissible() {
                assert!(best.cost <= traj.cost);
            }
        }
    }

    #[test]
    fn test_first_of_equal_costs_wins() {
        let cost = VelXCost { scale: 1.0 };

        // Two candidates with equal cost but distinguishable by yaw
        let mut ties = candidates(&[0.2, 0.2]);
        ties[0].vel.yaw_rads = 1.0;
        ties[1].vel.yaw_rads = 2.0;

        let outcome = find_best(ties.into_iter(), &[&cost], false);
        assert_eq!(outcome.best.unwrap().vel.yaw_rads, 1.0);
    }

    #[test]
    fn test_all_rejected_is_infeasible() {
        let cost = VelXCost { scale: 1.0 };
        let outcome = find_best(candidates(&[-0.1, -0.5]).into_iter(), &[&cost], true);

        assert!(outcome.best.is_none());
        assert_eq!(outcome.num_evaluated, 2);
        assert_eq!(outcome.num_rejected, 2);

        // Rejected trajectories carry a negative cost, never a valid one
        for traj in outcome.explored.unwrap() {
            assert!(!traj.is_admissible());
        }
    }

    #[test]
    fn test_empty_candidate_set_is_infeasible() {
        let cost = VelXCost { scale: 1.0 };
        let outcome = find_best(candidates(&[]).into_iter(), &[&cost], false);

        assert!(outcome.best.is_none());
        assert_eq!(outcome.num_evaluated, 0);
    }

    #[test]
    fn test_zero_scale_still_rejects() {
        // A zero scale silences the contribution but not the rejection
        let cost = VelXCost { scale: 0.0 };

        let outcome = find_best(candidates(&[0.4]).into_iter(), &[&cost], false);
        assert_eq!(outcome.best.unwrap().cost, 0.0);

        let outcome = find_best(candidates(&[-0.1]).into_iter(), &[&cost], false);
        assert!(outcome.best.is_none());
    }
}
