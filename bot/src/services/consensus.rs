//! Consensus detection: five consecutive same-direction signals from five
//! distinct strategies inside the trailing window.
//!
//! The scan itself is a pure function over an ordered slice so it can be
//! tested without a store. Signals already consumed by a group are
//! excluded before scanning, so one consensus never yields two groups.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder};
use shared::entity::{signal_group_signals, signal_groups, signals, trading_settings};
use shared::{Error, OrderSide};
use tracing::info;

use crate::services::{dispatcher, spawn_task, Outcome};
use crate::state::AppState;

pub const CONSENSUS_SIZE: usize = 5;

/// One signal as seen by the pure scan.
#[derive(Debug, Clone)]
pub struct ScanSignal {
    pub id: u64,
    pub side: OrderSide,
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consensus {
    pub direction: OrderSide,
    /// Exactly [`CONSENSUS_SIZE`] member ids, in scan order.
    pub member_ids: Vec<u64>,
}

/// Scans chronologically ordered signals for a qualifying run.
///
/// A buy extends the buy run and breaks the sell run, a sell does the
/// opposite, and a hold breaks both. Once a run reaches five entries its
/// first five are checked for distinct strategies; on a collision the run
/// keeps growing and is re-checked (bounded by the caller's window).
pub fn find_consensus(signals: &[ScanSignal]) -> Option<Consensus> {
    let mut buy_run: Vec<&ScanSignal> = Vec::new();
    let mut sell_run: Vec<&ScanSignal> = Vec::new();

    for signal in signals {
        match signal.side {
            OrderSide::Buy => {
                buy_run.push(signal);
                sell_run.clear();
            }
            OrderSide::Sell => {
                sell_run.push(signal);
                buy_run.clear();
            }
            OrderSide::Hold => {
                buy_run.clear();
                sell_run.clear();
            }
        }

        for (run, direction) in [(&buy_run, OrderSide::Buy), (&sell_run, OrderSide::Sell)] {
            if run.len() < CONSENSUS_SIZE {
                continue;
            }
            let window = &run[..CONSENSUS_SIZE];
            let strategies: HashSet<&str> = window.iter().map(|s| s.strategy.as_str()).collect();
            if strategies.len() == CONSENSUS_SIZE {
                return Some(Consensus {
                    direction,
                    member_ids: window.iter().map(|s| s.id).collect(),
                });
            }
        }
    }

    None
}

/// Checks the ticker's trailing window for consensus and, on a hit,
/// materializes the group and fans confirmations out to every subscribed
/// user.
pub async fn check_consecutive(state: &Arc<AppState>, ticker: &str) -> Result<Outcome, Error> {
    let cutoff = Utc::now() - Duration::minutes(state.consensus_window_minutes);
    let recent = signals::Entity::find()
        .filter(signals::Column::Ticker.eq(ticker))
        .filter(signals::Column::CreatedAt.gte(cutoff))
        .order_by(signals::Column::CreatedAt, Order::Asc)
        .order_by(signals::Column::Id, Order::Asc)
        .all(state.db.as_ref())
        .await?;

    if recent.len() < CONSENSUS_SIZE {
        return Ok(Outcome::Noop(format!("not enough recent signals for {ticker}")));
    }

    let ids: Vec<u64> = recent.iter().map(|s| s.id).collect();
    let consumed: HashSet<u64> = signal_group_signals::Entity::find()
        .filter(signal_group_signals::Column::SignalId.is_in(ids))
        .all(state.db.as_ref())
        .await?
        .into_iter()
        .map(|m| m.signal_id)
        .collect();

    let scan: Vec<ScanSignal> = recent
        .iter()
        .filter(|s| !consumed.contains(&s.id))
        .filter_map(|s| {
            let side = s.side.parse().ok()?;
            Some(ScanSignal {
                id: s.id,
                side,
                strategy: s.strategy.clone(),
            })
        })
        .collect();

    let Some(consensus) = find_consensus(&scan) else {
        return Ok(Outcome::Noop(format!(
            "no consecutive signal pattern for {ticker}"
        )));
    };

    let group = signal_groups::ActiveModel {
        direction: ActiveValue::Set(consensus.direction.as_str().to_string()),
        created_at: ActiveValue::Set(Some(Utc::now())),
        ..Default::default()
    };
    let group_id = signal_groups::Entity::insert(group)
        .exec(state.db.as_ref())
        .await?
        .last_insert_id;

    let members: Vec<signal_group_signals::ActiveModel> = consensus
        .member_ids
        .iter()
        .map(|signal_id| signal_group_signals::ActiveModel {
            signal_group_id: ActiveValue::Set(group_id),
            signal_id: ActiveValue::Set(*signal_id),
            ..Default::default()
        })
        .collect();
    signal_group_signals::Entity::insert_many(members)
        .exec(state.db.as_ref())
        .await?;

    info!("{} signal group {group_id} created for {ticker}", consensus.direction);

    let subscribers = trading_settings::Entity::find()
        .filter(trading_settings::Column::Symbol.eq(ticker))
        .all(state.db.as_ref())
        .await?;

    let direction = consensus.direction;
    for settings in &subscribers {
        let user_id = settings.user_id;
        let state = state.clone();
        spawn_task("handle_confirmation", async move {
            dispatcher::handle_confirmation(&state, user_id, group_id, direction).await
        });
    }

    Ok(Outcome::Completed(format!(
        "{direction} group {group_id} for {ticker}, {} subscribers notified",
        subscribers.len()
    )))
}
