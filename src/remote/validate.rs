//! Remote response parsing and validation

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogItem, ItemId},
    quantize::quantize,
    selection::Unit,
};

/// The response did not have the agreed shape.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The body is not JSON at all.
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is JSON but not a list.
    #[error("response is not a list")]
    NotAList,

    /// One of the entries is missing a usable id or price.
    #[error("entry {index} is invalid: {reason}")]
    InvalidEntry {
        /// Position of the entry in the list
        index: usize,
        /// What was wrong with it
        reason: String,
    },
}

/// The response is well-formed but inconsistent with the inventory.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The response used an item that was not offered.
    #[error("unknown item {0}")]
    UnknownItem(ItemId),

    /// The response used more units of an item than are available.
    #[error("item {id} requested {requested} units but only {available} are available")]
    QuantityExceeded {
        /// Item id
        id: ItemId,
        /// Units in the response
        requested: u64,
        /// Units in stock
        available: u32,
    },

    /// The response priced a unit differently from the catalog.
    #[error("item {id} priced at {received} minor units, catalog price is {expected}")]
    PriceMismatch {
        /// Item id
        id: ItemId,
        /// Catalog price in minor units
        expected: i64,
        /// Response price in minor units
        received: i64,
    },
}

/// One unit as returned by the remote solver.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ResponseUnit {
    /// Item id
    pub id: String,

    /// Unit price in major units
    #[serde(rename = "unitPrice", alias = "price")]
    pub unit_price: Decimal,
}

/// Parse a raw response body into units.
///
/// # Errors
///
/// Returns a [`ProtocolError`] if the body is not a JSON list, or any entry lacks a
/// non-empty string id or a non-negative numeric price.
pub fn parse_response(raw: &str) -> Result<Vec<ResponseUnit>, ProtocolError> {
    let Value::Array(entries) = serde_json::from_str::<Value>(raw)? else {
        return Err(ProtocolError::NotAList);
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let unit: ResponseUnit =
                serde_json::from_value(entry).map_err(|err| ProtocolError::InvalidEntry {
                    index,
                    reason: err.to_string(),
                })?;

            if unit.id.trim().is_empty() {
                return Err(ProtocolError::InvalidEntry {
                    index,
                    reason: "empty id".to_string(),
                });
            }

            if unit.unit_price.is_sign_negative() && !unit.unit_price.is_zero() {
                return Err(ProtocolError::InvalidEntry {
                    index,
                    reason: "negative price".to_string(),
                });
            }

            Ok(unit)
        })
        .collect()
}

/// Check a parsed response against the catalog it was produced from and expand it 1:1
/// into units, in response order.
///
/// Never repairs: an unknown id, a unit count above stock, or a price that differs from
/// the catalog price rejects the whole response.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate<'a>(
    catalog: &Catalog<'a>,
    response: &[ResponseUnit],
) -> Result<Vec<Unit<'a>>, ValidationError> {
    let exponent = catalog.currency().exponent;
    let mut tally: Vec<(usize, &CatalogItem<'a>, u64)> = Vec::new();
    let mut units = Vec::with_capacity(response.len());

    for entry in response {
        let id = ItemId::new(entry.id.as_str());

        let Some((idx, item)) = catalog.find(&id) else {
            return Err(ValidationError::UnknownItem(id));
        };

        let received = quantize(entry.unit_price, exponent);
        let expected = item.unit_price_minor();

        if received != expected {
            return Err(ValidationError::PriceMismatch {
                id,
                expected,
                received,
            });
        }

        match tally.iter_mut().find(|(seen, _, _)| *seen == idx) {
            Some((_, _, requested)) => *requested += 1,
            None => tally.push((idx, item, 1)),
        }

        units.push(Unit::from(item));
    }

    for (_, item, requested) in tally {
        if requested > u64::from(item.quantity()) {
            return Err(ValidationError::QuantityExceeded {
                id: item.id().clone(),
                requested,
                available: item.quantity(),
            });
        }
    }

    Ok(units)
}
