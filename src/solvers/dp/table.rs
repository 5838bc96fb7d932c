//! Reachability Table

use crate::solvers::SolverError;

/// Back-pointer value for sums no split has reached.
const NO_ORIGIN: u32 = u32::MAX;

/// How a reachable sum was first reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Origin {
    /// Index of the split unit that was added
    pub split: usize,

    /// The sum before the split was added
    pub prev_sum: usize,
}

/// Reachable subset sums from `0` to an upper bound, with one back-pointer per sum.
///
/// Only the split index is stored per sum, as a `u32` with `u32::MAX` marking
/// unset slots; the prior sum is recovered from the split's price.
#[derive(Debug)]
pub struct ReachabilityTable {
    reachable: Vec<bool>,
    origin: Vec<u32>,
    prices: Vec<usize>,
}

impl ReachabilityTable {
    /// Create a table where only the empty sum is reachable.
    pub fn new(upper_bound: usize) -> Self {
        let len = upper_bound.saturating_add(1);
        let mut reachable = vec![false; len];

        if let Some(zero) = reachable.first_mut() {
            *zero = true;
        }

        Self {
            reachable,
            origin: vec![NO_ORIGIN; len],
            prices: Vec::new(),
        }
    }

    /// Largest sum tracked by the table.
    pub fn upper_bound(&self) -> usize {
        self.reachable.len().saturating_sub(1)
    }

    /// Whether `sum` is reachable.
    pub fn is_reachable(&self, sum: usize) -> bool {
        self.reachable.get(sum).copied().unwrap_or(false)
    }

    /// How `sum` was reached, if it was reached by adding a split.
    pub fn origin(&self, sum: usize) -> Option<Origin> {
        let tag = *self.origin.get(sum)?;

        if tag == NO_ORIGIN {
            return None;
        }

        let split = usize::try_from(tag).ok()?;
        let price = self.prices.get(split)?;

        Some(Origin {
            split,
            prev_sum: sum.checked_sub(*price)?,
        })
    }

    /// Add the next split unit with the given price, using it at most once.
    ///
    /// Splits must be added in index order; the returned index is the one recorded in
    /// back-pointers. Sums are visited from the top down so a sum reached in this pass is
    /// never extended again by the same split.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvariantViolation`] if the split count no longer fits the
    /// back-pointer width.
    pub fn add(&mut self, price: u64) -> Result<usize, SolverError> {
        let split = self.prices.len();
        let tag = u32::try_from(split)
            .ok()
            .filter(|&tag| tag != NO_ORIGIN)
            .ok_or(SolverError::InvariantViolation {
                message: "too many split units for the reachability table",
            })?;

        // A split priced beyond the bound can never land inside the table.
        let price = usize::try_from(price).unwrap_or(usize::MAX);
        self.prices.push(price);

        if price == 0 || price > self.upper_bound() {
            return Ok(split);
        }

        for sum in (price..=self.upper_bound()).rev() {
            if self.is_reachable(sum) || !self.is_reachable(sum - price) {
                continue;
            }

            if let Some(slot) = self.reachable.get_mut(sum) {
                *slot = true;
            }

            if let Some(slot) = self.origin.get_mut(sum) {
                *slot = tag;
            }
        }

        Ok(split)
    }

    /// The reachable sum closest to `target`. Equal distances prefer the larger sum.
    ///
    /// Returns `0` when nothing beats the empty selection.
    pub fn closest_to(&self, target: usize) -> usize {
        let mut best = 0;
        let mut best_distance = target;

        for (sum, _) in self
            .reachable
            .iter()
            .enumerate()
            .filter(|(_, reachable)| **reachable)
        {
            let distance = sum.abs_diff(target);

            if distance <= best_distance {
                best = sum;
                best_distance = distance;
            }
        }

        best
    }

    /// Walk the back-pointers from `sum` down to zero.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvariantViolation`] if `sum` is not reachable or the chain is
    /// broken.
    pub fn trace(&self, sum: usize) -> Result<Vec<Origin>, SolverError> {
        if !self.is_reachable(sum) {
            return Err(SolverError::InvariantViolation {
                message: "traced sum is not reachable",
            });
        }

        let mut steps = Vec::new();
        let mut current = sum;

        while current > 0 {
            let step = self
                .origin(current)
                .ok_or(SolverError::InvariantViolation {
                    message: "reachable sum has no back-pointer",
                })?;

            steps.push(step);
            current = step.prev_sum;
        }

        Ok(steps)
    }
}
