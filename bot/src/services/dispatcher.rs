//! Confirmation dispatch: what a user's bot does with a confirmed signal
//! group. The whole handler runs inside the user's guard; the decision
//! itself is a pure function.

use std::str::FromStr;
use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder};
use shared::entity::{operations, signal_group_signals, signal_groups, signals};
use shared::{BotPhase, Error, OperationDirection, OperationStatus, OrderSide};
use tracing::{info, warn};

use crate::services::{bot_service, position_service, Outcome};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationAction {
    Ignore(&'static str),
    Open,
    /// Close the current operation, then open in the new direction after
    /// the settle delay.
    Reverse,
}

pub fn decide(
    phase: BotPhase,
    open_direction: Option<OperationDirection>,
    confirmed: OrderSide,
) -> ConfirmationAction {
    if phase == BotPhase::Idle {
        // A stopped bot never reacts.
        return ConfirmationAction::Ignore("bot is idle");
    }

    match open_direction {
        Some(direction) if direction.entry_side() == confirmed => {
            // No pyramiding onto an existing position.
            ConfirmationAction::Ignore("already positioned in this direction")
        }
        Some(_) => ConfirmationAction::Reverse,
        None => ConfirmationAction::Open,
    }
}

pub async fn handle_confirmation(
    state: &Arc<AppState>,
    user_id: i64,
    group_id: u64,
    direction: OrderSide,
) -> Result<Outcome, Error> {
    let _guard = state.locks.acquire(user_id).await;

    let bot = bot_service::get_or_create(state.db.as_ref(), user_id).await?;
    let phase = BotPhase::from_str(&bot.status)
        .map_err(|err| Error::Validation(format!("bot {user_id}: {err}")))?;

    // Only a still-open operation counts; a stale pointer behaves as flat.
    let current = match bot.current_operation_id {
        Some(operation_id) => {
            operations::Entity::find_by_id(operation_id)
                .filter(operations::Column::Status.eq(OperationStatus::Open.as_str()))
                .one(state.db.as_ref())
                .await?
        }
        None => None,
    };
    let open_direction = current
        .as_ref()
        .and_then(|op| OperationDirection::from_str(&op.direction).ok());

    match (decide(phase, open_direction, direction), current) {
        (ConfirmationAction::Ignore(reason), _) => {
            Ok(Outcome::Noop(format!("user {user_id}: {reason}")))
        }
        (ConfirmationAction::Reverse, Some(operation)) => {
            info!(
                "user {user_id}: closing {} operation {} to reverse into {direction}",
                operation.direction, operation.id
            );
            position_service::close_position(state, operation.id)
                .await?
                .log("close_position");
            schedule_reversal_open(state, user_id, group_id);
            Ok(Outcome::Completed(format!(
                "user {user_id}: reversal into {direction} scheduled for group {group_id}"
            )))
        }
        (ConfirmationAction::Reverse, None) | (ConfirmationAction::Open, _) => {
            open_from_group(state, user_id, group_id).await
        }
    }
}

/// The open half of a reversal, deferred so the close can settle.
///
/// Not transactional with the close: a crash in between leaves the user
/// flat with an un-acted group, which is accepted and logged.
fn schedule_reversal_open(state: &Arc<AppState>, user_id: i64, group_id: u64) {
    let delay = std::time::Duration::from_secs(state.reversal_delay_secs);
    let state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _guard = state.locks.acquire(user_id).await;
        match open_from_group(&state, user_id, group_id).await {
            Ok(outcome) => outcome.log("open_reversal"),
            Err(err) => warn!("open_reversal: user {user_id} group {group_id} left un-acted: {err}"),
        }
    });
}

/// Opens a position for the group's direction, sized by the user's
/// settings. Caller holds the user guard.
pub async fn open_from_group(
    state: &Arc<AppState>,
    user_id: i64,
    group_id: u64,
) -> Result<Outcome, Error> {
    let Some(group) = signal_groups::Entity::find_by_id(group_id)
        .one(state.db.as_ref())
        .await?
    else {
        return Err(Error::NotFound("signal group", group_id as i64));
    };

    let direction = OrderSide::from_str(&group.direction)
        .ok()
        .and_then(OperationDirection::from_side)
        .ok_or_else(|| {
            Error::Validation(format!("signal group {group_id} has no tradable direction"))
        })?;

    let settings = position_service::settings_for(state.db.as_ref(), user_id).await?;

    // The traded symbol comes from the earliest member signal.
    let members = signal_group_signals::Entity::find()
        .filter(signal_group_signals::Column::SignalGroupId.eq(group_id))
        .all(state.db.as_ref())
        .await?;
    let signal_ids: Vec<u64> = members.iter().map(|m| m.signal_id).collect();
    let member_signals = signals::Entity::find()
        .filter(signals::Column::Id.is_in(signal_ids))
        .order_by(signals::Column::CreatedAt, Order::Asc)
        .order_by(signals::Column::Id, Order::Asc)
        .all(state.db.as_ref())
        .await?;
    let Some(first) = member_signals.first() else {
        return Err(Error::NotFound("signal group members", group_id as i64));
    };

    position_service::open_position(
        state,
        user_id,
        &first.ticker,
        direction,
        settings.investment_percentage,
        settings.leverage,
        settings.take_profit,
        settings.stop_loss,
        Some(group_id),
    )
    .await
}
