//! Solver Dispatcher
//!
//! Routes each solve request to the exact local solver or, for problems that are both
//! wide (large target) and broad (many candidates), to a remote solver whose output is
//! validated against the inventory before it is returned.

use std::{fmt, sync::Arc};

use rusty_money::{Money, iso::Currency};
use tokio::sync::Semaphore;
use tracing::{Span, info, warn};

use crate::{
    catalog::Catalog,
    config::DispatchConfig,
    quantize::quantize_money,
    remote::{
        HttpRemoteSolver, RemoteRequest, RemoteSolver, parse_response, remote_candidates,
        validate,
    },
    selection::{Outcome, Selection, materialize},
    solvers::{Problem, Solver, SolverError, SolverResult, dp::DynamicProgrammingSolver},
};

mod errors;

pub use errors::{FailureKind, SolveError};

/// Where a request is solved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Exact in-process solver
    Local,

    /// External approximate solver
    Remote,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Local => f.write_str("local"),
            Route::Remote => f.write_str("remote"),
        }
    }
}

/// Choose a route. Both thresholds are inclusive: a request goes remote only when the
/// target exceeds `local_target_threshold` and the candidate count exceeds
/// `hybrid_item_threshold`.
pub fn decide(target_minor: u64, candidate_count: usize, config: &DispatchConfig) -> Route {
    if target_minor <= config.local_target_threshold
        || candidate_count <= config.hybrid_item_threshold
    {
        Route::Local
    } else {
        Route::Remote
    }
}

/// Runs solve requests according to a [`DispatchConfig`].
#[derive(Debug)]
pub struct Dispatcher<R = HttpRemoteSolver> {
    config: DispatchConfig,
    solver: DynamicProgrammingSolver,
    remote: Option<R>,
    in_flight: Arc<Semaphore>,
}

impl Dispatcher<HttpRemoteSolver> {
    /// A dispatcher that always solves locally.
    #[must_use]
    pub fn local(config: DispatchConfig) -> Self {
        Self::build(config, None)
    }

    /// A dispatcher using the HTTP remote solver at `remote_solver_url`, if configured.
    #[must_use]
    pub fn from_config(config: DispatchConfig) -> Self {
        let remote = config
            .remote_solver_url
            .as_deref()
            .map(HttpRemoteSolver::new);

        Self::build(config, remote)
    }
}

impl<R: RemoteSolver> Dispatcher<R> {
    /// A dispatcher using `remote` for requests routed remotely.
    #[must_use]
    pub fn with_remote(config: DispatchConfig, remote: R) -> Self {
        Self::build(config, Some(remote))
    }

    fn build(config: DispatchConfig, remote: Option<R>) -> Self {
        let permits = config
            .remote_max_in_flight
            .clamp(1, Semaphore::MAX_PERMITS);

        Self {
            solver: DynamicProgrammingSolver::new(config.max_search_width),
            in_flight: Arc::new(Semaphore::new(permits)),
            config,
            remote,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Remote call slots currently free.
    pub fn available_remote_permits(&self) -> usize {
        self.in_flight.available_permits()
    }

    /// Select units from `catalog` whose total is as close as possible to `target`.
    ///
    /// Local selections follow catalog order; remote selections follow the order the
    /// remote solver returned.
    ///
    /// # Errors
    ///
    /// Returns a [`SolveError`]; see [`SolveError::kind`] for the flat reason.
    #[tracing::instrument(
        name = "dispatch.solve",
        skip(self, catalog, target),
        fields(
            target_minor = tracing::field::Empty,
            candidate_count = tracing::field::Empty,
            route = tracing::field::Empty
        ),
        err
    )]
    pub async fn solve<'a>(
        &self,
        catalog: &Catalog<'a>,
        target: Money<'a, Currency>,
    ) -> Result<Outcome<'a>, SolveError> {
        let Some(target_minor) = checked_target(catalog, &target)? else {
            return Ok(Outcome::Empty);
        };

        let candidate_count = catalog.candidates().count();
        let route = decide(target_minor, candidate_count, &self.config);

        let span = Span::current();

        span.record("target_minor", target_minor);
        span.record("candidate_count", candidate_count);
        span.record("route", tracing::field::display(route));

        let outcome = match (route, &self.remote) {
            (Route::Remote, Some(remote)) => {
                self.solve_remote(remote, catalog, target_minor).await?
            }
            (Route::Remote, None) => {
                warn!("no remote solver configured, solving locally");

                self.solve_on_worker(catalog, target_minor).await?
            }
            (Route::Local, _) => self.solve_on_worker(catalog, target_minor).await?,
        };

        if let Some(selection) = outcome.selection() {
            info!(
                %route,
                units = selection.len(),
                total = %selection.total(),
                "selection found"
            );
        }

        Ok(outcome)
    }

    /// Solve on the calling thread with the exact solver, ignoring the route.
    ///
    /// # Errors
    ///
    /// Returns a [`SolveError`] for invalid input, an oversized search space, or when no
    /// combination beats selecting nothing.
    pub fn solve_local<'a>(
        &self,
        catalog: &Catalog<'a>,
        target: Money<'a, Currency>,
    ) -> Result<Outcome<'a>, SolveError> {
        let Some(target_minor) = checked_target(catalog, &target)? else {
            return Ok(Outcome::Empty);
        };

        let problem = Problem::from_catalog(catalog, target_minor);
        let result = self.solver.solve(&problem)?;

        local_outcome(catalog, result)
    }

    async fn solve_on_worker<'a>(
        &self,
        catalog: &Catalog<'a>,
        target_minor: u64,
    ) -> Result<Outcome<'a>, SolveError> {
        let problem = Problem::from_catalog(catalog, target_minor);
        let solver = self.solver;

        let result = tokio::task::spawn_blocking(move || solver.solve(&problem)).await??;

        local_outcome(catalog, result)
    }

    async fn solve_remote<'a>(
        &self,
        remote: &R,
        catalog: &Catalog<'a>,
        target_minor: u64,
    ) -> Result<Outcome<'a>, SolveError> {
        let eligible = remote_candidates(catalog, target_minor);

        if eligible.is_empty() {
            return Err(SolveError::NoCombinationFound);
        }

        let request = RemoteRequest::new(&eligible, target_minor);
        let timeout = self.config.remote_timeout();
        let in_flight = Arc::clone(&self.in_flight);

        let call = async move {
            let Ok(_permit) = in_flight.acquire_owned().await else {
                return Err(SolveError::from(SolverError::InvariantViolation {
                    message: "remote call slots closed while the dispatcher is alive",
                }));
            };

            remote.submit(&request).await.map_err(SolveError::from)
        };

        let payload = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(payload)) => payload,
            Ok(Err(error)) => {
                warn!(%error, "remote solver call failed");

                return Err(error);
            }
            Err(_elapsed) => {
                warn!(?timeout, "remote solver timed out");

                return Err(SolveError::RemoteTimeout { timeout });
            }
        };

        let response = match parse_response(&payload) {
            Ok(response) => response,
            Err(source) => {
                warn!(error = %source, %payload, "malformed remote solver response");

                return Err(SolveError::RemoteProtocol { source, payload });
            }
        };

        let units = validate(&eligible, &response).inspect_err(|error| {
            warn!(%error, "remote solver response rejected");
        })?;

        if units.is_empty() {
            return Err(SolveError::NoCombinationFound);
        }

        let selection = Selection::new(units, catalog.currency()).map_err(|_err| {
            SolverError::InvariantViolation {
                message: "validated units disagree on currency",
            }
        })?;

        Ok(Outcome::Selected(selection))
    }
}

/// Quantize and check a target. `None` means nothing needs to be selected.
fn checked_target(
    catalog: &Catalog<'_>,
    target: &Money<'_, Currency>,
) -> Result<Option<u64>, SolveError> {
    if target.currency() != catalog.currency() {
        return Err(SolveError::invalid_input(format!(
            "target is in {}, catalog is in {}",
            target.currency().iso_alpha_code,
            catalog.currency().iso_alpha_code
        )));
    }

    let minor = quantize_money(target);

    if minor < 0 {
        return Err(SolveError::invalid_input("target is negative"));
    }

    if minor == 0 {
        return Ok(None);
    }

    u64::try_from(minor)
        .map(Some)
        .map_err(|_err| SolveError::invalid_input("target out of range"))
}

fn local_outcome<'a>(
    catalog: &Catalog<'a>,
    result: Option<SolverResult>,
) -> Result<Outcome<'a>, SolveError> {
    let Some(result) = result else {
        return Err(SolveError::NoCombinationFound);
    };

    Ok(Outcome::Selected(materialize(catalog, &result)?))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use crate::{catalog::CatalogItem, remote::MockRemoteSolver};

    use super::*;

    fn config() -> DispatchConfig {
        DispatchConfig {
            local_target_threshold: 1_000,
            hybrid_item_threshold: 2,
            ..DispatchConfig::default()
        }
    }

    fn catalog<'a>() -> Result<Catalog<'a>, crate::catalog::CatalogError> {
        Catalog::with_items(
            [
                CatalogItem::new("A", "Pen", Money::from_minor(300, EUR), 2),
                CatalogItem::new("B", "Binder", Money::from_minor(700, EUR), 1),
                CatalogItem::new("C", "Stapler", Money::from_minor(1_250, EUR), 4),
            ],
            EUR,
        )
    }

    #[test]
    fn decide_is_inclusive_at_both_thresholds() {
        let config = config();

        assert_eq!(decide(1_000, 10, &config), Route::Local);
        assert_eq!(decide(1_001, 10, &config), Route::Remote);
        assert_eq!(decide(1_001, 2, &config), Route::Local);
        assert_eq!(decide(1_001, 3, &config), Route::Remote);
    }

    #[test]
    fn solve_local_finds_the_exact_sum() -> TestResult {
        let catalog = catalog()?;
        let dispatcher = Dispatcher::local(config());

        let outcome = dispatcher.solve_local(&catalog, Money::from_minor(1_000, EUR))?;
        let selection = outcome.selection().ok_or("expected a selection")?;

        let ids: Vec<&str> = selection.iter().map(|unit| unit.id.as_str()).collect();

        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(selection.total(), Money::from_minor(1_000, EUR));

        Ok(())
    }

    #[test]
    fn zero_target_is_empty() -> TestResult {
        let catalog = catalog()?;
        let dispatcher = Dispatcher::local(config());

        assert_eq!(
            dispatcher.solve_local(&catalog, Money::from_minor(0, EUR))?,
            Outcome::Empty
        );

        Ok(())
    }

    #[test]
    fn negative_and_foreign_targets_are_invalid() -> TestResult {
        let catalog = catalog()?;
        let dispatcher = Dispatcher::local(config());

        let negative = dispatcher.solve_local(&catalog, Money::from_minor(-1, EUR));
        let foreign = dispatcher.solve_local(&catalog, Money::from_minor(100, USD));

        assert!(matches!(negative, Err(SolveError::InvalidInput { .. })));
        assert!(matches!(foreign, Err(SolveError::InvalidInput { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn remote_route_without_remote_solves_locally() -> TestResult {
        let catalog = catalog()?;
        let dispatcher = Dispatcher::local(config());

        let outcome = dispatcher
            .solve(&catalog, Money::from_minor(2_500, EUR))
            .await?;

        let selection = outcome.selection().ok_or("expected a selection")?;

        assert_eq!(selection.total(), Money::from_minor(2_500, EUR));

        Ok(())
    }

    #[tokio::test]
    async fn remote_route_uses_only_items_priced_within_target() -> TestResult {
        let catalog = Catalog::with_items(
            [
                CatalogItem::new("A", "Pen", Money::from_minor(300, EUR), 2),
                CatalogItem::new("B", "Binder", Money::from_minor(700, EUR), 1),
                CatalogItem::new("C", "Stapler", Money::from_minor(1_250, EUR), 4),
                CatalogItem::new("D", "Desk", Money::from_minor(99_000, EUR), 1),
            ],
            EUR,
        )?;

        let mut remote = MockRemoteSolver::new();

        remote
            .expect_submit()
            .withf(|request| {
                request
                    .candidate_items
                    .iter()
                    .map(|item| item.id.as_str())
                    .eq(["A", "B", "C"])
            })
            .times(1)
            .returning(|_| {
                Ok(r#"[{"id":"C","unitPrice":12.5},{"id":"A","unitPrice":3}]"#.to_string())
            });

        let dispatcher = Dispatcher::with_remote(config(), remote);

        let outcome = dispatcher
            .solve(&catalog, Money::from_minor(1_600, EUR))
            .await?;
        let selection = outcome.selection().ok_or("expected a selection")?;

        let ids: Vec<&str> = selection.iter().map(|unit| unit.id.as_str()).collect();

        assert_eq!(ids, vec!["C", "A"]);
        assert_eq!(selection.total(), Money::from_minor(1_550, EUR));
        assert_eq!(dispatcher.available_remote_permits(), 4);

        Ok(())
    }
}
