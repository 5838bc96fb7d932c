//! Catalog Items

use std::fmt;

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{catalog::CatalogError, quantize::quantize_money};

/// Opaque identifier of a catalog item, supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new item id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A priced, quantity-limited item the solver may pick units from.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogItem<'a> {
    id: ItemId,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    acquired_on: Option<Date>,
}

impl<'a> CatalogItem<'a> {
    /// Creates a new catalog item.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
            acquired_on: None,
        }
    }

    /// Sets the date the stock was acquired, used for eligibility filtering.
    #[must_use]
    pub fn acquired_on(mut self, date: Date) -> Self {
        self.acquired_on = Some(date);
        self
    }

    /// Returns the item id
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the price of a single unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the number of units available
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the acquisition date, if known
    pub fn acquisition_date(&self) -> Option<Date> {
        self.acquired_on
    }

    /// Unit price in minor currency units.
    pub fn unit_price_minor(&self) -> i64 {
        quantize_money(&self.unit_price)
    }

    /// Whether the item can contribute to a selection at all.
    pub fn is_candidate(&self) -> bool {
        self.quantity > 0 && self.unit_price_minor() > 0
    }

    /// Whether the item may be used on `date`. Items without an acquisition date are
    /// always eligible.
    pub fn is_eligible_on(&self, date: Date) -> bool {
        self.acquired_on.is_none_or(|acquired| acquired <= date)
    }
}

/// Untrusted catalog record as received from a caller (JSON, YAML, forms).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Item id
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price in major units, e.g. `12.50`
    pub unit_price: Decimal,

    /// Available quantity; negative values are rejected
    pub quantity: i64,

    /// Acquisition date
    #[serde(default)]
    pub acquired_on: Option<Date>,
}

impl CatalogRecord {
    /// Validate the record and convert it into a [`CatalogItem`] priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidItem`] if the price or quantity is negative or the
    /// quantity does not fit in a `u32`.
    pub fn into_item(self, currency: &Currency) -> Result<CatalogItem<'_>, CatalogError> {
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(CatalogError::InvalidItem {
                id: self.id,
                reason: "negative unit price",
            });
        }

        let Ok(quantity) = u32::try_from(self.quantity) else {
            return Err(CatalogError::InvalidItem {
                id: self.id,
                reason: if self.quantity < 0 {
                    "negative quantity"
                } else {
                    "quantity out of range"
                },
            });
        };

        let item = CatalogItem::new(
            self.id,
            self.name,
            Money::from_decimal(self.unit_price, currency),
            quantity,
        );

        Ok(match self.acquired_on {
            Some(date) => item.acquired_on(date),
            None => item,
        })
    }
}
