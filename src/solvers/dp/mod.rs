//! Dynamic Programming Solver
//!
//! Exact closest-sum search over a bounded catalog:
//!
//! 1. Each candidate's quantity is split into power-of-two portions ([`crate::splits`]),
//!    turning the bounded problem into a 0/1 subset sum.
//! 2. A [`ReachabilityTable`] records every sum from `0` to `target + max_unit_price`
//!    reachable using each split at most once. Searching past the target by one unit of
//!    the most expensive item is enough: any larger sum can drop a unit and stay above
//!    the target while getting closer.
//! 3. The reachable sum nearest the target wins (ties go to the larger sum) and the
//!    back-pointers are traced into per-item unit counts.
//!
//! Time is `O(splits × upper_bound)` and memory `O(upper_bound)`, all owned by one call.

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    solvers::{Problem, Solver, SolverError, SolverResult},
    splits::expand,
};

pub mod table;

pub use table::{Origin, ReachabilityTable};

/// Default cap on the number of sums tracked by one solve.
pub const DEFAULT_MAX_SEARCH_WIDTH: u64 = 20_000_000;

/// Exact solver using 0/1 subset-sum dynamic programming.
#[derive(Debug, Clone, Copy)]
pub struct DynamicProgrammingSolver {
    max_search_width: u64,
}

impl DynamicProgrammingSolver {
    /// Create a solver that refuses problems whose search space exceeds
    /// `max_search_width` sums.
    pub fn new(max_search_width: u64) -> Self {
        Self { max_search_width }
    }

    /// The configured search width limit.
    pub fn max_search_width(&self) -> u64 {
        self.max_search_width
    }

    fn upper_bound(&self, problem: &Problem) -> Result<usize, SolverError> {
        let upper_bound = problem
            .target()
            .checked_add(problem.max_unit_price())
            .ok_or(SolverError::SearchSpaceTooLarge {
                upper_bound: u64::MAX,
                limit: self.max_search_width,
            })?;

        let too_large = SolverError::SearchSpaceTooLarge {
            upper_bound,
            limit: self.max_search_width,
        };

        if upper_bound > self.max_search_width {
            return Err(too_large);
        }

        usize::try_from(upper_bound).map_err(|_err| too_large)
    }
}

impl Default for DynamicProgrammingSolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SEARCH_WIDTH)
    }
}

impl Solver for DynamicProgrammingSolver {
    fn solve(&self, problem: &Problem) -> Result<Option<SolverResult>, SolverError> {
        if problem.target() == 0 || problem.candidates().is_empty() {
            return Ok(None);
        }

        let upper_bound = self.upper_bound(problem)?;
        let splits = expand(problem.candidates())?;

        if splits.is_empty() {
            return Ok(None);
        }

        let mut table = ReachabilityTable::new(upper_bound);

        for split in &splits {
            table.add(split.price)?;
        }

        let target = usize::try_from(problem.target()).map_err(|_err| {
            SolverError::InvariantViolation {
                message: "target exceeds the search bound",
            }
        })?;

        let best = table.closest_to(target);

        debug!(
            target,
            upper_bound,
            splits = splits.len(),
            best,
            "closest reachable sum"
        );

        if best == 0 {
            return Ok(None);
        }

        let mut counts: SmallVec<[(usize, u32); 10]> = SmallVec::new();

        for step in table.trace(best)? {
            let split = splits
                .get(step.split)
                .ok_or(SolverError::InvariantViolation {
                    message: "back-pointer references an unknown split",
                })?;

            match counts.iter_mut().find(|(idx, _)| *idx == split.item_idx) {
                Some((_, count)) => *count += split.portion,
                None => counts.push((split.item_idx, split.portion)),
            }
        }

        counts.sort_unstable_by_key(|(idx, _)| *idx);

        let total = u64::try_from(best).map_err(|_err| SolverError::InvariantViolation {
            message: "best sum does not fit in u64",
        })?;

        Ok(Some(SolverResult { total, counts }))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::solvers::Candidate;

    use super::*;

    fn candidate(item_idx: usize, unit_price: u64, quantity: u32) -> Candidate {
        Candidate {
            item_idx,
            unit_price,
            quantity,
        }
    }

    #[test]
    fn finds_an_exact_match() -> TestResult {
        let problem = Problem::new(1_000, [candidate(0, 300, 2), candidate(1, 700, 1)]);

        let result = DynamicProgrammingSolver::default()
            .solve(&problem)?
            .ok_or("expected a selection")?;

        assert_eq!(result.total, 1_000);
        assert_eq!(result.counts.as_slice(), &[(0, 1), (1, 1)]);

        Ok(())
    }

    #[test]
    fn overshoots_when_closer() -> TestResult {
        let problem = Problem::new(100, [candidate(0, 130, 3)]);

        let result = DynamicProgrammingSolver::default()
            .solve(&problem)?
            .ok_or("expected a selection")?;

        assert_eq!(result.total, 130);
        assert_eq!(result.counts.as_slice(), &[(0, 1)]);

        Ok(())
    }

    #[test]
    fn prefers_overshoot_on_equal_distance() -> TestResult {
        let problem = Problem::new(1_000, [candidate(0, 900, 1), candidate(1, 1_100, 1)]);

        let result = DynamicProgrammingSolver::default()
            .solve(&problem)?
            .ok_or("expected a selection")?;

        assert_eq!(result.total, 1_100);
        assert_eq!(result.counts.as_slice(), &[(1, 1)]);

        Ok(())
    }

    #[test]
    fn uses_large_quantities_through_splits() -> TestResult {
        let problem = Problem::new(1_234_500, [candidate(0, 100, 100_000)]);

        let result = DynamicProgrammingSolver::default()
            .solve(&problem)?
            .ok_or("expected a selection")?;

        assert_eq!(result.total, 1_234_500);
        assert_eq!(result.counts.as_slice(), &[(0, 12_345)]);

        Ok(())
    }

    #[test]
    fn never_exceeds_available_quantity() -> TestResult {
        let problem = Problem::new(10_000, [candidate(0, 300, 3), candidate(1, 500, 2)]);

        let result = DynamicProgrammingSolver::default()
            .solve(&problem)?
            .ok_or("expected a selection")?;

        assert_eq!(result.total, 1_900);
        assert_eq!(result.counts.as_slice(), &[(0, 3), (1, 2)]);

        Ok(())
    }

    #[test]
    fn nothing_closer_than_zero_is_no_result() -> TestResult {
        let problem = Problem::new(100, [candidate(0, 900, 5)]);

        assert_eq!(DynamicProgrammingSolver::default().solve(&problem)?, None);

        Ok(())
    }

    #[test]
    fn empty_problem_is_no_result() -> TestResult {
        assert_eq!(
            DynamicProgrammingSolver::default().solve(&Problem::new(500, []))?,
            None
        );
        assert_eq!(
            DynamicProgrammingSolver::default().solve(&Problem::new(0, [candidate(0, 1, 1)]))?,
            None
        );

        Ok(())
    }

    #[test]
    fn rejects_search_spaces_over_the_limit() {
        let problem = Problem::new(10_000, [candidate(0, 1_000, 1)]);

        let result = DynamicProgrammingSolver::new(10_999).solve(&problem);

        assert_eq!(
            result,
            Err(SolverError::SearchSpaceTooLarge {
                upper_bound: 11_000,
                limit: 10_999,
            })
        );
    }

    #[test]
    fn repeated_solves_are_identical() -> TestResult {
        let problem = Problem::new(
            2_345,
            [
                candidate(0, 125, 7),
                candidate(1, 250, 3),
                candidate(2, 375, 2),
                candidate(4, 99, 11),
            ],
        );
        let solver = DynamicProgrammingSolver::default();

        let first = solver.solve(&problem)?;

        for _ in 0..5 {
            assert_eq!(solver.solve(&problem)?, first);
        }

        Ok(())
    }
}
