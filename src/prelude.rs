//! Assortment prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{Catalog, CatalogError, CatalogItem, CatalogRecord, ItemId},
    config::DispatchConfig,
    dispatch::{Dispatcher, FailureKind, Route, SolveError, decide},
    quantize::{dequantize, quantize, quantize_money},
    remote::{HttpRemoteSolver, RemoteRequest, RemoteSolver, RemoteTransportError},
    selection::{Outcome, Selection, Unit, materialize},
    solvers::{Problem, Solver, SolverError, SolverResult, dp::DynamicProgrammingSolver},
    summary::{Summary, SummaryError, target_from_gross},
};
