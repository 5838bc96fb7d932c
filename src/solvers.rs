//! Solvers for closest-sum selection

use smallvec::SmallVec;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};

pub mod dp;

/// Solver Errors
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    /// The price of a split portion does not fit in a `u64` of minor units.
    #[error("price of item {item_idx} overflows when multiplied by its portion")]
    PriceOverflow {
        /// Catalog index of the item
        item_idx: usize,
    },

    /// The reachability table would exceed the configured width.
    #[error("search space of {upper_bound} sums exceeds the limit of {limit}")]
    SearchSpaceTooLarge {
        /// Largest sum the solver would have to track
        upper_bound: u64,
        /// Configured maximum width
        limit: u64,
    },

    /// Wrapped catalog lookup error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// An item the solver may draw units from, in minor units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Index of the item in the catalog
    pub item_idx: usize,

    /// Unit price in minor units, greater than zero
    pub unit_price: u64,

    /// Units available, greater than zero
    pub quantity: u32,
}

/// An owned, currency-free closest-sum problem.
///
/// Holds no references into the catalog so it can be moved onto a blocking worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    target: u64,
    candidates: SmallVec<[Candidate; 10]>,
}

impl Problem {
    /// Create a problem from explicit candidates.
    pub fn new(target: u64, candidates: impl IntoIterator<Item = Candidate>) -> Self {
        Self {
            target,
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Build a problem from the catalog's candidates (stock and price above zero).
    pub fn from_catalog(catalog: &Catalog<'_>, target: u64) -> Self {
        let candidates = catalog.candidates().filter_map(|(item_idx, item)| {
            u64::try_from(item.unit_price_minor())
                .ok()
                .map(|unit_price| Candidate {
                    item_idx,
                    unit_price,
                    quantity: item.quantity(),
                })
        });

        Self::new(target, candidates)
    }

    /// Target sum in minor units
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Candidates in catalog order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Price of the most expensive single unit, or zero when there are no candidates.
    pub fn max_unit_price(&self) -> u64 {
        self.candidates
            .iter()
            .map(|candidate| candidate.unit_price)
            .max()
            .unwrap_or(0)
    }
}

/// The best reachable sum and the item counts that produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult {
    /// Achieved total in minor units
    pub total: u64,

    /// `(catalog index, units)` pairs sorted by catalog index
    pub counts: SmallVec<[(usize, u32); 10]>,
}

impl SolverResult {
    /// Distance between the achieved total and `target`.
    pub fn distance_to(&self, target: u64) -> u64 {
        self.total.abs_diff(target)
    }
}

/// Trait for solving closest-sum problems.
pub trait Solver {
    /// Find the reachable sum closest to the problem's target.
    ///
    /// Returns `Ok(None)` when no non-empty combination beats selecting nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the problem cannot be solved within the solver's
    /// limits.
    fn solve(&self, problem: &Problem) -> Result<Option<SolverResult>, SolverError>;
}
