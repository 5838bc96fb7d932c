//! Catalog Fixtures

use jiff::civil::Date;
use rust_decimal::Decimal;
use rusty_money::iso::{Currency, EUR, GBP, MAD, USD};
use serde::Deserialize;

use crate::{
    catalog::{Catalog, CatalogRecord},
    fixtures::FixtureError,
};

/// Catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Currency code, required only when there are no items
    #[serde(default)]
    pub currency: Option<String>,

    /// Items in catalog order
    pub items: Vec<ItemFixture>,
}

/// Item Fixture
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Item id
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price (e.g., "2.99 GBP")
    pub price: String,

    /// Units in stock
    pub quantity: i64,

    /// Acquisition date
    #[serde(default)]
    pub acquired_on: Option<Date>,
}

impl CatalogFixture {
    /// Convert into a validated catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is invalid, currencies differ, or the records are not a
    /// valid catalog.
    pub fn into_catalog(self) -> Result<Catalog<'static>, FixtureError> {
        let mut currency = self.currency.as_deref().map(find_currency).transpose()?;
        let mut records = Vec::with_capacity(self.items.len());

        for item in self.items {
            let (unit_price, item_currency) = parse_price(&item.price)?;

            if let Some(existing_currency) = currency
                && existing_currency != item_currency
            {
                return Err(FixtureError::CurrencyMismatch(
                    existing_currency.iso_alpha_code.to_string(),
                    item_currency.iso_alpha_code.to_string(),
                ));
            }

            currency = Some(item_currency);

            records.push(CatalogRecord {
                id: item.id,
                name: item.name,
                unit_price,
                quantity: item.quantity,
                acquired_on: item.acquired_on,
            });
        }

        let currency = currency.ok_or(FixtureError::NoCurrency)?;

        Ok(Catalog::from_records(records, currency)?)
    }
}

/// Parse price string (e.g., "2.99 GBP") into a major-unit amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount
/// is not a decimal number, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((amount, find_currency(currency_code)?))
}

fn find_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "MAD" => Ok(MAD),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
