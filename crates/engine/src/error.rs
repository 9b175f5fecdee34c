//! The module contains the errors the engine can produce.
//!
//! Every fallible engine operation returns a structured error with a stable
//! kind string, so API clients can branch on [`EngineError::kind`] instead of
//! parsing messages.

use sea_orm::DbErr;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An entity (user, account, linked edge, tip, config) does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// A malformed or missing parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The operation requires state the caller has not established yet,
    /// e.g. a primary linked account.
    #[error("{0}")]
    PreconditionFailed(String),
    /// The external ledger rejected an operation. The message is the
    /// ledger's own, human readable.
    #[error("{0}")]
    ServiceFailure(String),
    /// The write collides with existing state (account already linked,
    /// username taken).
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Stable kind string for client-side branching.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not-found",
            Self::InvalidArgument(_) => "invalid-argument",
            Self::PreconditionFailed(_) => "failed-precondition",
            Self::ServiceFailure(_) => "service-failure",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "internal",
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        Self::ServiceFailure(err.to_string())
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::PreconditionFailed(a), Self::PreconditionFailed(b)) => a == b,
            (Self::ServiceFailure(a), Self::ServiceFailure(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
