//! Dispatch configuration

use std::time::Duration;

use clap::Args;

use crate::solvers::dp::DEFAULT_MAX_SEARCH_WIDTH;

/// Default largest target, in minor units, always solved locally.
pub const DEFAULT_LOCAL_TARGET_THRESHOLD: u64 = 10_000_000;

/// Default largest candidate count always solved locally.
pub const DEFAULT_HYBRID_ITEM_THRESHOLD: usize = 50;

/// Default remote call timeout in milliseconds.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 30_000;

/// Default number of concurrent remote calls.
pub const DEFAULT_REMOTE_MAX_IN_FLIGHT: usize = 4;

/// Settings for choosing and running a solver.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct DispatchConfig {
    /// Targets up to this many minor units are always solved locally
    #[arg(
        long,
        env = "LOCAL_TARGET_THRESHOLD",
        default_value_t = DEFAULT_LOCAL_TARGET_THRESHOLD
    )]
    pub local_target_threshold: u64,

    /// Catalogs with up to this many candidate items are always solved locally
    #[arg(
        long,
        env = "HYBRID_ITEM_THRESHOLD",
        default_value_t = DEFAULT_HYBRID_ITEM_THRESHOLD
    )]
    pub hybrid_item_threshold: usize,

    /// Remote solver timeout in milliseconds
    #[arg(long, env = "REMOTE_TIMEOUT_MS", default_value_t = DEFAULT_REMOTE_TIMEOUT_MS)]
    pub remote_timeout_ms: u64,

    /// Maximum concurrent remote solver calls
    #[arg(
        long,
        env = "REMOTE_MAX_IN_FLIGHT",
        default_value_t = DEFAULT_REMOTE_MAX_IN_FLIGHT
    )]
    pub remote_max_in_flight: usize,

    /// Largest number of sums the local solver may track
    #[arg(long, env = "MAX_SEARCH_WIDTH", default_value_t = DEFAULT_MAX_SEARCH_WIDTH)]
    pub max_search_width: u64,

    /// Remote solver endpoint; without it every request is solved locally
    #[arg(long, env = "REMOTE_SOLVER_URL")]
    pub remote_solver_url: Option<String>,
}

impl DispatchConfig {
    /// The remote call timeout
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            local_target_threshold: DEFAULT_LOCAL_TARGET_THRESHOLD,
            hybrid_item_threshold: DEFAULT_HYBRID_ITEM_THRESHOLD,
            remote_timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
            remote_max_in_flight: DEFAULT_REMOTE_MAX_IN_FLIGHT,
            max_search_width: DEFAULT_MAX_SEARCH_WIDTH,
            remote_solver_url: None,
        }
    }
}
