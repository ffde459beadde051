//! Signal intake: persistence, idempotent ingestion, and the pending
//! sweep backstop.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use shared::entity::signals;
use shared::{Error, OrderSide};

use crate::services::{consensus, spawn_task, Outcome};
use crate::state::AppState;

/// Persists a new signal and hands it off to ingestion.
pub async fn submit(
    state: &Arc<AppState>,
    ticker: &str,
    side: OrderSide,
    timeframe: &str,
    strategy: &str,
    price: f64,
) -> Result<u64, Error> {
    let price = Decimal::from_f64(price)
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| Error::Validation(format!("invalid signal price: {price}")))?;

    let signal = signals::ActiveModel {
        ticker: ActiveValue::Set(ticker.to_string()),
        side: ActiveValue::Set(side.as_str().to_string()),
        timeframe: ActiveValue::Set(timeframe.to_string()),
        strategy: ActiveValue::Set(strategy.to_string()),
        price: ActiveValue::Set(price),
        processed: ActiveValue::Set(false),
        created_at: ActiveValue::Set(Some(Utc::now())),
        ..Default::default()
    };
    let signal_id = signals::Entity::insert(signal)
        .exec(state.db.as_ref())
        .await?
        .last_insert_id;

    let state = state.clone();
    spawn_task("ingest_signal", async move {
        ingest(&state, signal_id).await
    });

    Ok(signal_id)
}

/// Marks the signal processed and triggers the consensus check.
///
/// The flip is an atomic conditional update, so a redelivered ingest
/// finds zero affected rows and never triggers a second check.
pub async fn ingest(state: &Arc<AppState>, signal_id: u64) -> Result<Outcome, Error> {
    let Some(signal) = signals::Entity::find_by_id(signal_id)
        .one(state.db.as_ref())
        .await?
    else {
        return Err(Error::NotFound("signal", signal_id as i64));
    };

    let flipped = signals::Entity::update_many()
        .col_expr(signals::Column::Processed, Expr::value(true))
        .filter(signals::Column::Id.eq(signal_id))
        .filter(signals::Column::Processed.eq(false))
        .exec(state.db.as_ref())
        .await?;
    if flipped.rows_affected == 0 {
        return Ok(Outcome::Noop(format!("signal {signal_id} already processed")));
    }

    let ticker = signal.ticker.clone();
    let state = state.clone();
    spawn_task("check_consecutive", async move {
        consensus::check_consecutive(&state, &ticker).await
    });

    Ok(Outcome::Completed(format!("signal {signal_id} processed")))
}

/// Re-enqueues ingestion for signals still marked unprocessed. Redelivery
/// backstop only; the normal path is the submit → ingest hand-off.
pub async fn sweep_pending(state: &Arc<AppState>) -> Result<Outcome, Error> {
    let pending = signals::Entity::find()
        .filter(signals::Column::Processed.eq(false))
        .all(state.db.as_ref())
        .await?;

    let count = pending.len();
    for signal in pending {
        let state = state.clone();
        spawn_task("ingest_signal", async move {
            ingest(&state, signal.id).await
        });
    }
    Ok(Outcome::Completed(format!("re-enqueued {count} pending signals")))
}

/// Periodic driver for [`sweep_pending`].
pub fn spawn_sweeper(state: Arc<AppState>, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            match sweep_pending(&state).await {
                Ok(outcome) => outcome.log("sweep_pending"),
                Err(err) => tracing::error!("sweep_pending: {err}"),
            }
        }
    })
}
