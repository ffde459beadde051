//! Error taxonomy for the trading engine.
//!
//! Everything here is handled at a task boundary; nothing is allowed to
//! crash a task runner. Idempotent re-deliveries (already-processed
//! signals, already-closed operations) are not errors and are reported
//! as no-op outcomes by the services instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed inbound payload, rejected synchronously.
    #[error("validation error: {0}")]
    Validation(String),

    /// The user has no usable exchange credentials. Logged, never retried.
    #[error("exchange credentials not configured for user {0}")]
    CredentialsMissing(i64),

    /// Transport or API failure talking to the exchange, timeouts included.
    /// The triggering task ends without mutating persisted state.
    #[error("exchange error: {0}")]
    Exchange(String),

    /// A referenced record is gone; the task ends without effect.
    #[error("{0} {1} not found")]
    NotFound(&'static str, i64),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Exchange(format!("request timed out: {err}"))
        } else {
            Error::Exchange(err.to_string())
        }
    }
}
