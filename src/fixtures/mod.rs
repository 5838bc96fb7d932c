//! Fixtures

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};

pub mod catalogs;

pub use catalogs::{CatalogFixture, ItemFixture, parse_price};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between items
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No items and no currency given
    #[error("No items loaded; currency unknown")]
    NoCurrency,

    /// The items do not form a valid catalog
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Loads catalogs from `<base>/catalogs/<name>.yml`.
#[derive(Debug, Clone)]
pub struct Fixture {
    base_path: PathBuf,
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a named catalog fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the items are invalid.
    pub fn load_catalog(&self, name: &str) -> Result<Catalog<'static>, FixtureError> {
        load_catalog_file(self.base_path.join("catalogs").join(format!("{name}.yml")))
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a catalog fixture from an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the items are invalid.
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<Catalog<'static>, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse_catalog(&contents)
}

/// Parse catalog fixture YAML.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price is invalid, or the items are not a
/// valid single-currency catalog.
pub fn parse_catalog(yaml: &str) -> Result<Catalog<'static>, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

    fixture.into_catalog()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use jiff::civil::date;
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::catalog::ItemId;

    use super::*;

    const STATIONERY: &str = r"
items:
  - id: pen
    name: Ballpoint pen
    price: 1.25 GBP
    quantity: 40
  - id: binder
    name: Ring binder
    price: 4.99 GBP
    quantity: 6
    acquired_on: 2024-03-01
";

    #[test]
    fn parses_items_in_file_order() -> TestResult {
        let catalog = parse_catalog(STATIONERY)?;

        let ids: Vec<&str> = catalog.iter().map(|item| item.id().as_str()).collect();

        assert_eq!(ids, vec!["pen", "binder"]);
        assert_eq!(catalog.currency(), GBP);

        let (_, binder) = catalog
            .find(&ItemId::new("binder"))
            .ok_or("missing binder")?;

        assert_eq!(binder.unit_price(), &Money::from_minor(499, GBP));
        assert_eq!(binder.quantity(), 6);
        assert_eq!(binder.acquisition_date(), Some(date(2024, 3, 1)));

        Ok(())
    }

    #[test]
    fn empty_fixture_needs_a_currency() -> TestResult {
        assert!(matches!(
            parse_catalog("items: []"),
            Err(FixtureError::NoCurrency)
        ));

        let catalog = parse_catalog("currency: EUR\nitems: []")?;

        assert!(catalog.is_empty());

        Ok(())
    }

    #[test]
    fn rejects_mixed_currencies() {
        let yaml = r"
items:
  - id: a
    name: A
    price: 1.00 GBP
    quantity: 1
  - id: b
    name: B
    price: 1.00 EUR
    quantity: 1
";

        assert!(matches!(
            parse_catalog(yaml),
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "GBP" && found == "EUR"
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let yaml = r"
items:
  - id: a
    name: A
    price: 1.00 GBP
    quantity: 1
  - id: a
    name: A again
    price: 2.00 GBP
    quantity: 1
";

        assert!(matches!(
            parse_catalog(yaml),
            Err(FixtureError::Catalog(CatalogError::DuplicateId(_)))
        ));
    }

    #[test]
    fn loads_from_named_fixture_directory() -> TestResult {
        let dir = tempfile::tempdir()?;

        fs::create_dir(dir.path().join("catalogs"))?;

        let mut file = fs::File::create(dir.path().join("catalogs").join("stationery.yml"))?;

        file.write_all(STATIONERY.as_bytes())?;

        let catalog = Fixture::with_base_path(dir.path()).load_catalog("stationery")?;

        assert_eq!(catalog.len(), 2);

        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Fixture::with_base_path("/nonexistent").load_catalog("nothing");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }
}
