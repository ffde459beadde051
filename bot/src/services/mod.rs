//! Engine services. Each unit of work (ingest, consensus check,
//! confirmation, open, close, monitor pass) is one task; causally
//! dependent steps hand off to each other via [`spawn_task`], and every
//! task ends in a logged terminal outcome instead of propagating.

pub mod bot_service;
pub mod consensus;
pub mod dispatcher;
pub mod monitor;
pub mod position_service;
pub mod signal_service;
pub mod user_locks;

use std::future::Future;

use shared::Error;
use tracing::{error, info, warn};

/// Terminal outcome of one unit of work.
///
/// `Noop` covers idempotent re-deliveries (already-processed signals,
/// already-closed operations) which are successes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(String),
    Noop(String),
    Failed(String),
}

impl Outcome {
    pub fn log(&self, task: &str) {
        match self {
            Outcome::Completed(msg) => info!("{task}: {msg}"),
            Outcome::Noop(msg) => info!("{task}: no-op: {msg}"),
            Outcome::Failed(msg) => warn!("{task}: failed: {msg}"),
        }
    }
}

/// Spawns a unit of work; errors stop at this boundary.
pub fn spawn_task<F>(task: &'static str, fut: F)
where
    F: Future<Output = Result<Outcome, Error>> + Send + 'static,
{
    tokio::spawn(async move {
        match fut.await {
            Ok(outcome) => outcome.log(task),
            Err(err) => error!("{task}: {err}"),
        }
    });
}
