//! Selections

use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{
    catalog::{Catalog, CatalogItem, ItemId},
    quantize::dequantize,
    solvers::{SolverError, SolverResult},
};

/// One selected unit of a catalog item.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit<'a> {
    /// Id of the originating item
    pub id: ItemId,

    /// Display name of the item
    pub name: String,

    /// Price of this unit
    pub unit_price: Money<'a, Currency>,
}

impl<'a> From<&CatalogItem<'a>> for Unit<'a> {
    /// The unit is priced at the item's price rounded to whole minor units, the same
    /// amount the solver summed.
    fn from(item: &CatalogItem<'a>) -> Self {
        Self {
            id: item.id().clone(),
            name: item.name().to_string(),
            unit_price: dequantize(item.unit_price_minor(), item.unit_price().currency()),
        }
    }
}

/// An ordered list of selected units; repeated ids are repeated units.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection<'a> {
    units: Vec<Unit<'a>>,
    total: Money<'a, Currency>,
}

impl<'a> Selection<'a> {
    /// Build a selection from units, summing their prices.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if a unit is priced in a different currency.
    pub fn new(units: Vec<Unit<'a>>, currency: &'a Currency) -> Result<Self, MoneyError> {
        let total = units
            .iter()
            .try_fold(Money::from_minor(0, currency), |acc, unit| {
                acc.add(unit.unit_price)
            })?;

        Ok(Self { units, total })
    }

    /// Total price of all units
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Number of units selected for `id`.
    pub fn count_of(&self, id: &ItemId) -> usize {
        self.units.iter().filter(|unit| &unit.id == id).count()
    }

    /// Iterate over the units in order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit<'a>> {
        self.units.iter()
    }

    /// The units as a slice
    pub fn units(&self) -> &[Unit<'a>] {
        &self.units
    }

    /// Consume the selection, returning its units.
    pub fn into_units(self) -> Vec<Unit<'a>> {
        self.units
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no units were selected
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Successful result of a solve request.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<'a> {
    /// Units were selected.
    Selected(Selection<'a>),

    /// Nothing needs to be selected (zero target).
    Empty,
}

impl<'a> Outcome<'a> {
    /// The selection, if any.
    pub fn selection(&self) -> Option<&Selection<'a>> {
        match self {
            Outcome::Selected(selection) => Some(selection),
            Outcome::Empty => None,
        }
    }
}

/// Expand solver counts into concrete units, in catalog order.
///
/// # Errors
///
/// Returns a [`SolverError`] if a count references a missing item, exceeds the item's
/// available quantity, or the total disagrees with the solver's.
pub fn materialize<'a>(
    catalog: &Catalog<'a>,
    result: &SolverResult,
) -> Result<Selection<'a>, SolverError> {
    let mut units = Vec::new();

    for &(item_idx, count) in &result.counts {
        let item = catalog.get_item(item_idx)?;

        if count > item.quantity() {
            return Err(SolverError::InvariantViolation {
                message: "selected more units than the item has available",
            });
        }

        units.extend((0..count).map(|_| Unit::from(item)));
    }

    let selection = Selection::new(units, catalog.currency()).map_err(|_err| {
        SolverError::InvariantViolation {
            message: "selected units disagree on currency",
        }
    })?;

    if u64::try_from(selection.total().to_minor_units()).ok() != Some(result.total) {
        return Err(SolverError::InvariantViolation {
            message: "materialized total differs from the solved total",
        });
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    fn catalog<'a>() -> Result<Catalog<'a>, crate::catalog::CatalogError> {
        Catalog::with_items(
            [
                CatalogItem::new("A", "Pen", Money::from_minor(300, EUR), 2),
                CatalogItem::new("B", "Binder", Money::from_minor(700, EUR), 1),
            ],
            EUR,
        )
    }

    #[test]
    fn materialize_repeats_units_per_count() -> TestResult {
        let catalog = catalog()?;
        let result = SolverResult {
            total: 1_300,
            counts: smallvec![(0, 2), (1, 1)],
        };

        let selection = materialize(&catalog, &result)?;

        let ids: Vec<&str> = selection.iter().map(|unit| unit.id.as_str()).collect();

        assert_eq!(ids, vec!["A", "A", "B"]);
        assert_eq!(selection.total(), Money::from_minor(1_300, EUR));
        assert_eq!(selection.count_of(&ItemId::new("A")), 2);
        assert_eq!(selection.len(), 3);

        Ok(())
    }

    #[test]
    fn materialize_rejects_overuse() -> TestResult {
        let catalog = catalog()?;
        let result = SolverResult {
            total: 900,
            counts: smallvec![(0, 3)],
        };

        assert!(matches!(
            materialize(&catalog, &result),
            Err(SolverError::InvariantViolation { .. })
        ));

        Ok(())
    }

    #[test]
    fn materialize_rejects_unknown_items() -> TestResult {
        let catalog = catalog()?;
        let result = SolverResult {
            total: 300,
            counts: smallvec![(5, 1)],
        };

        assert!(matches!(
            materialize(&catalog, &result),
            Err(SolverError::Catalog(_))
        ));

        Ok(())
    }

    #[test]
    fn materialize_checks_the_total() -> TestResult {
        let catalog = catalog()?;
        let result = SolverResult {
            total: 1_000,
            counts: smallvec![(0, 1)],
        };

        assert!(matches!(
            materialize(&catalog, &result),
            Err(SolverError::InvariantViolation { .. })
        ));

        Ok(())
    }

    #[test]
    fn empty_outcome_has_no_selection() -> TestResult {
        let selection = Selection::new(Vec::new(), EUR)?;

        assert!(selection.is_empty());
        assert_eq!(Outcome::Empty.selection(), None);
        assert_eq!(
            Outcome::Selected(selection.clone()).selection(),
            Some(&selection)
        );

        Ok(())
    }
}
