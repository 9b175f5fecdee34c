//! HTTP API for the tip engine.
//!
//! Exposes the callable entry points (registration, consent, account
//! linking, withdrawals, tip processing, ledger balance callback) behind
//! basic-auth middleware. Every failure is a structured error with a stable
//! `kind` string for client-side branching.

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use serde::Serialize;

pub use server::{run, run_with_listener, spawn_with_listener};

mod accounts;
mod server;
mod tip;
mod user;
mod withdrawals;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        EngineError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
        EngineError::ServiceFailure(_) => StatusCode::BAD_GATEWAY,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Engine(err) => {
                let status = status_for_engine_error(&err);
                let body = ErrorBody {
                    error: err.to_string(),
                    kind: err.kind(),
                };
                (status, Json(body)).into_response()
            }
            Self::Generic(message) => {
                let body = ErrorBody {
                    error: message,
                    kind: "internal",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}
