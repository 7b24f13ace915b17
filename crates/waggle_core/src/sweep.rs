use serde::Serialize;

use crate::error::Result;
use crate::trajectory::Trajectory;

/// A satisfying candidate found by [`threshold_search`].
#[derive(Debug, Clone, Serialize)]
pub struct SweepHit {
    /// The first candidate value whose trajectory satisfied the predicate.
    pub value: f64,
    /// Index of that candidate in the sweep order.
    pub index: usize,
    /// The satisfying trajectory, kept so callers can render it without
    /// re-simulating.
    pub trajectory: Trajectory,
}

/// Linear parameter sweep: simulates each candidate in the given (ascending)
/// order and returns the first one whose trajectory satisfies the predicate,
/// or `None` if the sweep is exhausted.
///
/// The scan is deliberately linear rather than bisecting: monotonicity of
/// the predicate in the parameter is assumed, not verified. Ties go to the
/// smallest candidate because of the scan order.
pub fn threshold_search(
    candidates: &[f64],
    mut run: impl FnMut(f64) -> Result<Trajectory>,
    mut predicate: impl FnMut(&Trajectory) -> bool,
) -> Result<Option<SweepHit>> {
    for (index, &value) in candidates.iter().enumerate() {
        let trajectory = run(value)?;
        if predicate(&trajectory) {
            return Ok(Some(SweepHit {
                value,
                index,
                trajectory,
            }));
        }
    }
    Ok(None)
}

/// Bisecting variant for predicates known to be monotone in the parameter
/// (failing below some cutoff, satisfying at and above it). Returns the same
/// first-satisfying-candidate answer as [`threshold_search`] in O(log n)
/// simulations. Only use once monotonicity has been confirmed; the linear
/// scan remains the default.
pub fn threshold_search_bisect(
    candidates: &[f64],
    mut run: impl FnMut(f64) -> Result<Trajectory>,
    mut predicate: impl FnMut(&Trajectory) -> bool,
) -> Result<Option<SweepHit>> {
    if candidates.is_empty() {
        return Ok(None);
    }

    let last = candidates.len() - 1;
    let last_traj = run(candidates[last])?;
    if !predicate(&last_traj) {
        return Ok(None);
    }

    // Invariant: hi always satisfies the predicate and everything below lo
    // has either failed or not been ruled in yet.
    let mut lo = 0usize;
    let mut hi = last;
    let mut hi_traj = last_traj;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let traj = run(candidates[mid])?;
        if predicate(&traj) {
            hi = mid;
            hi_traj = traj;
        } else {
            lo = mid + 1;
        }
    }

    Ok(Some(SweepHit {
        value: candidates[hi],
        index: hi,
        trajectory: hi_traj,
    }))
}

#[cfg(test)]
mod tests {
    use super::{threshold_search, threshold_search_bisect};
    use crate::trajectory::Trajectory;

    /// Stand-in trajectory whose single component is the candidate value at
    /// both samples.
    fn constant_trajectory(value: f64) -> crate::error::Result<Trajectory> {
        Trajectory::new(1, vec![0.0, 1.0], vec![value, value])
    }

    #[test]
    fn returns_first_satisfying_candidate_ascending() {
        let candidates = [1.0, 2.0, 3.0, 4.0, 5.0];
        let hit = threshold_search(&candidates, constant_trajectory, |traj| {
            traj.last_state()[0] >= 3.0
        })
        .unwrap()
        .expect("candidates >= 3.0 satisfy the predicate");
        assert_eq!(hit.value, 3.0);
        assert_eq!(hit.index, 2);
    }

    #[test]
    fn exhausted_sweep_is_none_not_a_panic() {
        let candidates = [1.0, 2.0, 3.0, 4.0, 5.0];
        let hit = threshold_search(&candidates, constant_trajectory, |traj| {
            traj.last_state()[0] >= 100.0
        })
        .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn bisect_agrees_with_linear_scan_on_monotone_predicate() {
        let candidates: Vec<f64> = (0..100).map(|i| 5.5 + i as f64 * 0.01).collect();
        let predicate = |traj: &Trajectory| traj.last_state()[0] >= 6.037;

        let linear = threshold_search(&candidates, constant_trajectory, predicate)
            .unwrap()
            .unwrap();
        let bisect = threshold_search_bisect(&candidates, constant_trajectory, predicate)
            .unwrap()
            .unwrap();
        assert_eq!(linear.index, bisect.index);
        assert_eq!(linear.value, bisect.value);
    }

    #[test]
    fn bisect_on_all_failing_candidates_is_none() {
        let candidates = [1.0, 2.0, 3.0];
        let hit = threshold_search_bisect(&candidates, constant_trajectory, |_| false).unwrap();
        assert!(hit.is_none());
    }
}
