//! Assortment
//!
//! Assortment picks units from a priced, quantity-limited catalog so that their total is
//! as close as possible to a target amount. Small problems are solved exactly in-process;
//! very large ones may be routed to a remote solver whose answers are checked against
//! the inventory before they are accepted.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod fixtures;
pub mod prelude;
pub mod quantize;
pub mod remote;
pub mod selection;
pub mod solvers;
pub mod splits;
pub mod summary;
