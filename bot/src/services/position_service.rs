//! Position lifecycle against the exchange: sizing, opening, closing and
//! the P/L math. Callers hold the user guard around both mutation paths.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use shared::crypto;
use shared::entity::{operations, signal_groups, trading_settings};
use shared::{Error, OperationDirection, OperationStatus};
use tracing::{debug, info};

use crate::exchange::ExchangeCredentials;
use crate::notify;
use crate::services::{bot_service, Outcome};
use crate::state::AppState;

/// Percentage change of the underlying between entry and exit, sign-
/// inverted for shorts, amplified by leverage. Entry 100 → exit 110 long
/// at x10 is +100; the same prices short are −100.
pub fn leveraged_profit_pct(
    entry_price: f64,
    current_price: f64,
    direction: OperationDirection,
    leverage: i32,
) -> f64 {
    let mut price_change = (current_price - entry_price) / entry_price * 100.0;
    if direction == OperationDirection::Short {
        price_change = -price_change;
    }
    price_change * leverage as f64
}

/// Rounds an order quantity down to the exchange's declared precision.
pub fn round_quantity(quantity: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (quantity * factor).floor() / factor
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

pub async fn settings_for(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<trading_settings::Model, Error> {
    trading_settings::Entity::find()
        .filter(trading_settings::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound("trading settings", user_id))
}

/// Unseals the user's API credentials; anything short of two usable
/// plaintexts is `CredentialsMissing`.
pub fn unseal_credentials(
    state: &AppState,
    settings: &trading_settings::Model,
) -> Result<ExchangeCredentials, Error> {
    let (Some(sealed_key), Some(sealed_secret)) = (&settings.api_key, &settings.api_secret) else {
        return Err(Error::CredentialsMissing(settings.user_id));
    };

    let api_key = crypto::unseal(&state.credentials_key, sealed_key)
        .map_err(|_| Error::CredentialsMissing(settings.user_id))?;
    let api_secret = crypto::unseal(&state.credentials_key, sealed_secret)
        .map_err(|_| Error::CredentialsMissing(settings.user_id))?;
    Ok(ExchangeCredentials { api_key, api_secret })
}

/// Opens a market position and records it. Nothing is persisted and the
/// bot is left untouched unless the exchange accepted the order, so a
/// later signal group can safely retry after an exchange failure.
#[allow(clippy::too_many_arguments)]
pub async fn open_position(
    state: &Arc<AppState>,
    user_id: i64,
    symbol: &str,
    direction: OperationDirection,
    investment_percentage: i32,
    leverage: i32,
    take_profit: i32,
    stop_loss: i32,
    signal_group_id: Option<u64>,
) -> Result<Outcome, Error> {
    let settings = settings_for(state.db.as_ref(), user_id).await?;
    let credentials = unseal_credentials(state, &settings)?;
    let client = state.exchange.client(credentials);

    client.set_leverage(symbol, leverage).await?;

    let available_balance = client.available_balance().await?;
    info!("Available balance for user {user_id}: {available_balance}");

    let position_size = available_balance * investment_percentage as f64 / 100.0;
    let current_price = client.current_price(symbol).await?;
    let precision = client.quantity_precision(symbol).await?;
    let quantity = round_quantity(position_size / current_price, precision);

    let side = direction.entry_side();
    info!("Opening position for user {user_id}: {symbol} {side} {quantity}");
    client.place_market_order(symbol, side, quantity).await?;

    let operation = operations::ActiveModel {
        user_id: ActiveValue::Set(user_id),
        symbol: ActiveValue::Set(symbol.to_string()),
        direction: ActiveValue::Set(direction.as_str().to_string()),
        status: ActiveValue::Set(OperationStatus::Open.as_str().to_string()),
        entry_price: ActiveValue::Set(decimal(current_price)),
        quantity: ActiveValue::Set(decimal(quantity)),
        leverage: ActiveValue::Set(leverage),
        investment: ActiveValue::Set(decimal(position_size)),
        take_profit: ActiveValue::Set(take_profit),
        stop_loss: ActiveValue::Set(stop_loss),
        opened_at: ActiveValue::Set(Some(Utc::now())),
        ..Default::default()
    };
    let operation_id = operations::Entity::insert(operation)
        .exec(state.db.as_ref())
        .await?
        .last_insert_id;

    bot_service::mark_operating(state.db.as_ref(), user_id, operation_id).await?;

    if let Some(group_id) = signal_group_id {
        attach_group(state.db.as_ref(), group_id, operation_id).await?;
    }

    if let Some(opened) = operations::Entity::find_by_id(operation_id)
        .one(state.db.as_ref())
        .await?
    {
        notify::send_or_log(state, &settings, notify::format_opened(&opened)).await;
    }

    info!("Position opened for user {user_id}: {symbol} {direction}");
    Ok(Outcome::Completed(format!("position opened: {operation_id}")))
}

/// Attaches the operation to its source group, write-once.
async fn attach_group(
    db: &DatabaseConnection,
    group_id: u64,
    operation_id: u64,
) -> Result<(), Error> {
    let updated = signal_groups::Entity::update_many()
        .col_expr(signal_groups::Column::OperationId, Expr::value(operation_id))
        .filter(signal_groups::Column::Id.eq(group_id))
        .filter(signal_groups::Column::OperationId.is_null())
        .exec(db)
        .await?;
    if updated.rows_affected == 0 {
        debug!("signal group {group_id} already attached to an operation");
    }
    Ok(())
}

/// Closes an open position and records the realized result. A redelivered
/// close finds no open row and acknowledges as a no-op. Caller holds the
/// user guard.
pub async fn close_position(state: &Arc<AppState>, operation_id: u64) -> Result<Outcome, Error> {
    let Some(operation) = operations::Entity::find_by_id(operation_id)
        .filter(operations::Column::Status.eq(OperationStatus::Open.as_str()))
        .one(state.db.as_ref())
        .await?
    else {
        return Ok(Outcome::Noop(format!(
            "operation {operation_id} not found or already closed"
        )));
    };

    let settings = settings_for(state.db.as_ref(), operation.user_id).await?;
    let credentials = unseal_credentials(state, &settings)?;
    let client = state.exchange.client(credentials);

    let direction = OperationDirection::from_str(&operation.direction)
        .map_err(|err| Error::Validation(format!("operation {operation_id}: {err}")))?;

    let current_price = client.current_price(&operation.symbol).await?;
    let side = direction.exit_side();
    let quantity = operation.quantity.to_f64().unwrap_or(0.0);
    info!(
        "Closing position for user {}: {} {side}",
        operation.user_id, operation.symbol
    );
    client
        .place_market_order(&operation.symbol, side, quantity)
        .await?;

    let entry_price = operation.entry_price.to_f64().unwrap_or(0.0);
    let profit_pct = leveraged_profit_pct(entry_price, current_price, direction, operation.leverage);
    let investment = operation.investment.to_f64().unwrap_or(0.0);
    let profit = investment * profit_pct / 100.0;

    let user_id = operation.user_id;
    let mut update: operations::ActiveModel = operation.into();
    update.status = ActiveValue::Set(OperationStatus::Closed.as_str().to_string());
    update.exit_price = ActiveValue::Set(Some(decimal(current_price)));
    update.profit_loss = ActiveValue::Set(Some(decimal(profit)));
    update.profit_loss_percentage = ActiveValue::Set(Some(decimal(profit_pct).round_dp(2)));
    update.closed_at = ActiveValue::Set(Some(Utc::now()));
    let closed = operations::Entity::update(update)
        .exec(state.db.as_ref())
        .await?;

    bot_service::release_operation(state.db.as_ref(), user_id, operation_id).await?;

    notify::send_or_log(state, &settings, notify::format_closed(&closed)).await;

    info!("Position closed for user {user_id}: {}", closed.symbol);
    Ok(Outcome::Completed(format!("position closed: {operation_id}")))
}
