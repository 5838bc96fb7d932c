//! Binary Splitting
//!
//! Rewrites a bounded quantity of an item into power-of-two sized portions so the
//! bounded problem can be solved as a 0/1 subset sum. A quantity of 13 becomes the
//! portions 1, 2, 4 and 6; every count from 0 to 13 is the sum of exactly one subset
//! of those portions.

use smallvec::SmallVec;

use crate::solvers::{Candidate, SolverError};

/// Portions for one item quantity; 32 is enough for any `u32`.
pub type Portions = SmallVec<[u32; 32]>;

/// A 0/1 pseudo-item representing `portion` units of one catalog item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitUnit {
    /// Index of the originating item in the catalog
    pub item_idx: usize,

    /// Price of the whole portion in minor units
    pub price: u64,

    /// Number of item units this split stands for
    pub portion: u32,
}

/// Split `quantity` into portions `1, 2, 4, ...` with the last one truncated to the
/// remainder.
pub fn binary_portions(quantity: u32) -> Portions {
    let mut portions = Portions::new();
    let mut remaining = quantity;
    let mut power: u32 = 1;

    while remaining > 0 {
        let portion = remaining.min(power);

        portions.push(portion);

        remaining -= portion;
        power = power.saturating_mul(2);
    }

    portions
}

/// Expand every candidate into its split units, in candidate order.
///
/// # Errors
///
/// Returns [`SolverError::PriceOverflow`] if a portion's total price does not fit in a
/// `u64`.
pub fn expand(candidates: &[Candidate]) -> Result<Vec<SplitUnit>, SolverError> {
    let mut splits = Vec::with_capacity(candidates.len() * 4);

    for candidate in candidates {
        for portion in binary_portions(candidate.quantity) {
            let price = candidate
                .unit_price
                .checked_mul(u64::from(portion))
                .ok_or(SolverError::PriceOverflow {
                    item_idx: candidate.item_idx,
                })?;

            splits.push(SplitUnit {
                item_idx: candidate.item_idx,
                price,
                portion,
            });
        }
    }

    Ok(splits)
}
