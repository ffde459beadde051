//! Position monitor: a fixed-interval scan of every open operation,
//! closing the ones whose leveraged P/L crossed their take-profit or
//! stop-loss threshold.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use shared::entity::operations;
use shared::{Error, OperationDirection, OperationStatus};
use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::services::position_service;
use crate::state::AppState;

/// Pure threshold check; returns which threshold was crossed, if any.
pub fn breached_threshold(profit_pct: f64, take_profit: i32, stop_loss: i32) -> Option<&'static str> {
    if profit_pct >= take_profit as f64 {
        Some("take profit")
    } else if profit_pct <= -(stop_loss as f64) {
        Some("stop loss")
    } else {
        None
    }
}

pub fn spawn_monitor(state: Arc<AppState>, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            if let Err(err) = scan_open_operations(&state).await {
                error!("check_positions: scan aborted: {err}");
            }
        }
    })
}

/// One pass over every open operation. A failure on one operation is
/// logged and does not abort the rest of the scan.
pub async fn scan_open_operations(state: &Arc<AppState>) -> Result<(), Error> {
    let open = operations::Entity::find()
        .filter(operations::Column::Status.eq(OperationStatus::Open.as_str()))
        .all(state.db.as_ref())
        .await?;

    for operation in open {
        if let Err(err) = check_operation(state, &operation).await {
            error!("check_positions: operation {}: {err}", operation.id);
        }
    }
    Ok(())
}

async fn check_operation(
    state: &Arc<AppState>,
    operation: &operations::Model,
) -> Result<(), Error> {
    let settings = position_service::settings_for(state.db.as_ref(), operation.user_id).await?;
    let credentials = match position_service::unseal_credentials(state, &settings) {
        Ok(credentials) => credentials,
        // Nothing to do for users without usable credentials.
        Err(Error::CredentialsMissing(_)) => return Ok(()),
        Err(err) => return Err(err),
    };
    let client = state.exchange.client(credentials);

    let direction = OperationDirection::from_str(&operation.direction)
        .map_err(|err| Error::Validation(format!("operation {}: {err}", operation.id)))?;
    let entry_price = operation.entry_price.to_f64().unwrap_or(0.0);
    let current_price = client.current_price(&operation.symbol).await?;
    let profit_pct =
        position_service::leveraged_profit_pct(entry_price, current_price, direction, operation.leverage);

    if let Some(trigger) = breached_threshold(profit_pct, operation.take_profit, operation.stop_loss) {
        info!(
            "{trigger} reached for operation {}: {profit_pct:.2}%",
            operation.id
        );
        let _guard = state.locks.acquire(operation.user_id).await;
        position_service::close_position(state, operation.id)
            .await?
            .log("close_position");
    }
    Ok(())
}
