//! Catalog

use jiff::civil::Date;
use rustc_hash::FxHashSet;
use rusty_money::iso::Currency;
use thiserror::Error;

pub mod item;

pub use item::{CatalogItem, CatalogRecord, ItemId};

/// Errors related to catalog construction.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// An item's currency differs from the catalog currency (index, item currency, catalog currency).
    #[error("Item {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// The same id appears more than once.
    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),

    /// An item record failed validation.
    #[error("Invalid item {id}: {reason}")]
    InvalidItem {
        /// Id of the offending record
        id: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// An item was not found in the catalog.
    #[error("Item {0} not found")]
    ItemNotFound(usize),
}

/// A single-currency set of items with unique ids.
#[derive(Clone, Debug)]
pub struct Catalog<'a> {
    items: Vec<CatalogItem<'a>>,
    currency: &'a Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new(currency: &'a Currency) -> Self {
        Catalog {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new catalog with the given items.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if an item is priced in another currency, has a negative
    /// price, or reuses an id.
    pub fn with_items(
        items: impl Into<Vec<CatalogItem<'a>>>,
        currency: &'a Currency,
    ) -> Result<Self, CatalogError> {
        let items = items.into();
        let mut seen = FxHashSet::default();

        for (i, item) in items.iter().enumerate() {
            let item_currency = item.unit_price().currency();

            if item_currency != currency {
                return Err(CatalogError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.unit_price().is_negative() {
                return Err(CatalogError::InvalidItem {
                    id: item.id().to_string(),
                    reason: "negative unit price",
                });
            }

            if !seen.insert(item.id()) {
                return Err(CatalogError::DuplicateId(item.id().clone()));
            }
        }

        Ok(Catalog { items, currency })
    }

    /// Build a catalog from untrusted records.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if any record is invalid or ids repeat.
    pub fn from_records(
        records: impl IntoIterator<Item = CatalogRecord>,
        currency: &'a Currency,
    ) -> Result<Self, CatalogError> {
        let items = records
            .into_iter()
            .map(|record| record.into_item(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Self::with_items(items, currency)
    }

    /// Returns a catalog holding only the items eligible on `date`.
    #[must_use]
    pub fn eligible_on(&self, date: Date) -> Self {
        self.filtered(|item| item.is_eligible_on(date))
    }

    /// Returns a catalog holding the items matching `predicate`, in order.
    #[must_use]
    pub fn filtered(&self, predicate: impl Fn(&CatalogItem<'a>) -> bool) -> Self {
        Catalog {
            items: self
                .items
                .iter()
                .filter(|item| predicate(item))
                .cloned()
                .collect(),
            currency: self.currency,
        }
    }

    /// Indexes and items that can contribute to a selection (stock and price above zero),
    /// in catalog order.
    pub fn candidates(&self) -> impl Iterator<Item = (usize, &CatalogItem<'a>)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_candidate())
    }

    /// Get an item by its index.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError::ItemNotFound` if the item is not found.
    pub fn get_item(&self, idx: usize) -> Result<&CatalogItem<'a>, CatalogError> {
        self.items.get(idx).ok_or(CatalogError::ItemNotFound(idx))
    }

    /// Find an item and its index by id.
    pub fn find(&self, id: &ItemId) -> Option<(usize, &CatalogItem<'a>)> {
        self.items
            .iter()
            .enumerate()
            .find(|(_, item)| item.id() == id)
    }

    /// Iterate over the items in the catalog.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem<'a>> {
        self.items.iter()
    }

    /// Get the number of items in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the catalog.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal_macros::dec;
    use rusty_money::{
        Money,
        iso::{EUR, USD},
    };
    use testresult::TestResult;

    use super::*;

    fn test_items<'a>() -> [CatalogItem<'a>; 3] {
        [
            CatalogItem::new("A", "Pen", Money::from_minor(300, EUR), 2),
            CatalogItem::new("B", "Binder", Money::from_minor(700, EUR), 0),
            CatalogItem::new("C", "Sample", Money::from_minor(0, EUR), 5),
        ]
    }

    #[test]
    fn with_items_currency_mismatch_errors() {
        let items = [
            CatalogItem::new("A", "Pen", Money::from_minor(300, EUR), 1),
            CatalogItem::new("B", "Pen", Money::from_minor(300, USD), 1),
        ];

        let result = Catalog::with_items(items, EUR);

        assert_eq!(
            result.err(),
            Some(CatalogError::CurrencyMismatch(
                1,
                USD.iso_alpha_code,
                EUR.iso_alpha_code
            ))
        );
    }

    #[test]
    fn with_items_rejects_duplicate_ids() {
        let items = [
            CatalogItem::new("A", "Pen", Money::from_minor(300, EUR), 1),
            CatalogItem::new("A", "Pen (blue)", Money::from_minor(310, EUR), 1),
        ];

        let result = Catalog::with_items(items, EUR);

        assert_eq!(result.err(), Some(CatalogError::DuplicateId(ItemId::new("A"))));
    }

    #[test]
    fn with_items_rejects_negative_prices() {
        let items = [CatalogItem::new("A", "Refund", Money::from_minor(-1, EUR), 1)];

        let result = Catalog::with_items(items, EUR);

        assert!(matches!(result, Err(CatalogError::InvalidItem { .. })));
    }

    #[test]
    fn from_records_validates_every_record() {
        let records = [
            CatalogRecord {
                id: "A".to_string(),
                name: "Pen".to_string(),
                unit_price: dec!(3),
                quantity: 1,
                acquired_on: None,
            },
            CatalogRecord {
                id: "B".to_string(),
                name: "Binder".to_string(),
                unit_price: dec!(7),
                quantity: -4,
                acquired_on: None,
            },
        ];

        let result = Catalog::from_records(records, EUR);

        assert!(matches!(
            result,
            Err(CatalogError::InvalidItem { id, .. }) if id == "B"
        ));
    }

    #[test]
    fn candidates_skip_empty_and_free_items() -> TestResult {
        let catalog = Catalog::with_items(test_items(), EUR)?;

        let ids: Vec<(usize, &str)> = catalog
            .candidates()
            .map(|(idx, item)| (idx, item.id().as_str()))
            .collect();

        assert_eq!(ids, vec![(0, "A")]);

        Ok(())
    }

    #[test]
    fn eligible_on_filters_by_acquisition_date() -> TestResult {
        let items = [
            CatalogItem::new("A", "Pen", Money::from_minor(300, EUR), 2)
                .acquired_on(date(2024, 1, 10)),
            CatalogItem::new("B", "Binder", Money::from_minor(700, EUR), 1)
                .acquired_on(date(2024, 3, 1)),
            CatalogItem::new("C", "Paper", Money::from_minor(450, EUR), 1),
        ];
        let catalog = Catalog::with_items(items, EUR)?;

        let eligible = catalog.eligible_on(date(2024, 2, 1));
        let ids: Vec<&str> = eligible.iter().map(|item| item.id().as_str()).collect();

        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(eligible.currency(), EUR);

        Ok(())
    }

    #[test]
    fn find_and_get_item() -> TestResult {
        let catalog = Catalog::with_items(test_items(), EUR)?;

        let (idx, item) = catalog.find(&ItemId::new("B")).ok_or("missing B")?;

        assert_eq!(idx, 1);
        assert_eq!(item.name(), "Binder");
        assert_eq!(catalog.get_item(1)?.id().as_str(), "B");
        assert!(matches!(
            catalog.get_item(9),
            Err(CatalogError::ItemNotFound(9))
        ));
        assert!(catalog.find(&ItemId::new("Z")).is_none());

        Ok(())
    }

    #[test]
    fn new_catalog_is_empty() {
        let catalog = Catalog::new(EUR);

        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }
}
