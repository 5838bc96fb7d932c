//! Solve request errors.

use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinError;

use crate::{
    remote::{ProtocolError, RemoteTransportError, ValidationError},
    solvers::SolverError,
};

/// Why a solve request failed, without the details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Caller bug: bad target or catalog.
    InvalidInput,

    /// Nothing closer to the target than selecting nothing.
    NoCombinationFound,

    /// The remote solver did not answer in time.
    RemoteTimeout,

    /// The remote solver could not be reached.
    RemoteUnavailable,

    /// The remote solver answered with the wrong shape.
    RemoteProtocolError,

    /// The remote solver answered with a selection the inventory cannot honour.
    RemoteValidationFailed,

    /// The local search space is larger than the configured limit.
    SearchSpaceTooLarge,

    /// A bug in the solver or its worker.
    Internal,
}

/// Errors returned from a solve request.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The target or catalog is unusable.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    /// No selection is closer to the target than selecting nothing.
    #[error("no combination found")]
    NoCombinationFound,

    /// The remote call exceeded its timeout.
    #[error("remote solver timed out after {timeout:?}")]
    RemoteTimeout {
        /// Configured timeout
        timeout: Duration,
    },

    /// The remote call failed before a response body arrived.
    #[error("remote solver unavailable")]
    RemoteUnavailable(#[source] RemoteTransportError),

    /// The remote response was not a well-formed unit list.
    #[error("remote solver protocol error: {source}")]
    RemoteProtocol {
        /// Parse failure
        #[source]
        source: ProtocolError,
        /// Raw response body
        payload: String,
    },

    /// The remote response did not match the inventory.
    #[error("remote solver output rejected: {0}")]
    RemoteValidation(#[from] ValidationError),

    /// The local search space exceeds the configured width.
    #[error("search space of {upper_bound} sums exceeds the limit of {limit}")]
    SearchSpaceTooLarge {
        /// Largest sum the solver would have to track
        upper_bound: u64,
        /// Configured maximum width
        limit: u64,
    },

    /// The local solver failed.
    #[error("solver error")]
    Solver(#[source] SolverError),

    /// The blocking solve task panicked or was cancelled.
    #[error("solver worker failed")]
    Worker(#[from] JoinError),
}

impl SolveError {
    /// The flat failure reason for this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            SolveError::InvalidInput { .. } => FailureKind::InvalidInput,
            SolveError::NoCombinationFound => FailureKind::NoCombinationFound,
            SolveError::RemoteTimeout { .. } => FailureKind::RemoteTimeout,
            SolveError::RemoteUnavailable(_) => FailureKind::RemoteUnavailable,
            SolveError::RemoteProtocol { .. } => FailureKind::RemoteProtocolError,
            SolveError::RemoteValidation(_) => FailureKind::RemoteValidationFailed,
            SolveError::SearchSpaceTooLarge { .. } => FailureKind::SearchSpaceTooLarge,
            SolveError::Solver(_) | SolveError::Worker(_) => FailureKind::Internal,
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        SolveError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<SolverError> for SolveError {
    fn from(error: SolverError) -> Self {
        match error {
            SolverError::SearchSpaceTooLarge { upper_bound, limit } => {
                SolveError::SearchSpaceTooLarge { upper_bound, limit }
            }
            other => SolveError::Solver(other),
        }
    }
}

impl From<RemoteTransportError> for SolveError {
    fn from(error: RemoteTransportError) -> Self {
        SolveError::RemoteUnavailable(error)
    }
}
