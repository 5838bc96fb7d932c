//! Remote Solver Contract
//!
//! An external approximate solver receives the candidate items and the target and
//! answers with a flat list of units. Nothing it returns is trusted: responses are parsed
//! strictly ([`validate::parse_response`]) and checked against the catalog
//! ([`validate::validate`]) before they become a selection.

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::Catalog;

pub mod http;
pub mod validate;

pub use http::HttpRemoteSolver;
pub use validate::{ProtocolError, ResponseUnit, ValidationError, parse_response, validate};

/// Errors reaching the remote solver.
#[derive(Debug, Error)]
pub enum RemoteTransportError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote solver answered with a non-success status.
    #[error("remote solver responded with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnosis
        body: String,
    },
}

/// A candidate item as sent to the remote solver.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteItem {
    /// Item id
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price in major units
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_price: Decimal,

    /// Units available
    pub quantity: u32,
}

/// Request body for the remote solver.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRequest {
    /// Items the remote solver may choose from
    pub candidate_items: Vec<RemoteItem>,

    /// Target sum in major units
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub target: Decimal,
}

impl RemoteRequest {
    /// Build a request from every item of `catalog`, with prices and target expressed in
    /// the catalog currency's major units.
    pub fn new(catalog: &Catalog<'_>, target_minor: u64) -> Self {
        let exponent = catalog.currency().exponent;

        let candidate_items = catalog
            .iter()
            .map(|item| RemoteItem {
                id: item.id().to_string(),
                name: item.name().to_string(),
                unit_price: Decimal::new(item.unit_price_minor(), exponent),
                quantity: item.quantity(),
            })
            .collect();

        let target = i64::try_from(target_minor)
            .map_or(Decimal::MAX, |minor| Decimal::new(minor, exponent));

        Self {
            candidate_items,
            target,
        }
    }
}

/// Returns the subset of `catalog` worth sending to a remote solver: candidates priced
/// at or below the target. Anything dearer can never be part of a closest sum.
pub fn remote_candidates<'a>(catalog: &Catalog<'a>, target_minor: u64) -> Catalog<'a> {
    catalog.filtered(|item| {
        item.is_candidate()
            && u64::try_from(item.unit_price_minor()).is_ok_and(|price| price <= target_minor)
    })
}

/// An external solver answering closest-sum requests.
///
/// Implementations only move bytes; the raw response body is returned so it can be
/// validated (and logged verbatim when malformed).
#[automock]
#[async_trait]
pub trait RemoteSolver: Send + Sync {
    /// Submit a request and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteTransportError`] if the call fails before a body is received.
    async fn submit(&self, request: &RemoteRequest) -> Result<String, RemoteTransportError>;
}
