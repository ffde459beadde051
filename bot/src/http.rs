//! HTTP surface: the inbound signal webhook and the bot control
//! endpoints. The webhook acknowledges receipt; it never waits for the
//! consensus result.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use sea_orm::EntityTrait;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::entity::operations;
use shared::{Error, OrderSide};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::services::{bot_service, position_service, signal_service, spawn_task};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/signal", post(receive_signal))
        .route("/bot/start", post(start_bot))
        .route("/bot/stop", post(stop_bot))
        .route("/bot/restart", post(restart_bot))
        .route("/operations/:id/close", post(close_operation))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Inbound webhook payload; every field is required.
#[derive(Debug, Deserialize)]
pub struct SignalPayload {
    pub ticker: Option<String>,
    pub signal: Option<String>,
    pub timeframe: Option<String>,
    pub strategy: Option<String>,
    pub price_close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidSignal {
    pub ticker: String,
    pub side: OrderSide,
    pub timeframe: String,
    pub strategy: String,
    pub price: f64,
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Validation(format!("missing field: {field}")))
}

impl SignalPayload {
    pub fn validate(self) -> Result<ValidSignal, Error> {
        let ticker = required(self.ticker, "ticker")?;
        let raw_side = required(self.signal, "signal")?;
        let side = OrderSide::from_str(&raw_side)
            .map_err(|err| Error::Validation(err.to_string()))?;
        let timeframe = required(self.timeframe, "timeframe")?;
        let strategy = required(self.strategy, "strategy")?;
        let price = self
            .price_close
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| Error::Validation("missing or invalid field: price_close".to_string()))?;

        Ok(ValidSignal {
            ticker,
            side,
            timeframe,
            strategy,
            price,
        })
    }
}

async fn receive_signal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignalPayload>,
) -> Json<Value> {
    let valid = match payload.validate() {
        Ok(valid) => valid,
        Err(err) => {
            return Json(json!({ "status": "error", "message": err.to_string() }));
        }
    };

    match signal_service::submit(
        &state,
        &valid.ticker,
        valid.side,
        &valid.timeframe,
        &valid.strategy,
        valid.price,
    )
    .await
    {
        Ok(_) => Json(json!({
            "status": "success",
            "message": "Signal received and processing"
        })),
        Err(err) => {
            error!("webhook signal rejected: {err}");
            Json(json!({ "status": "error", "message": err.to_string() }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct BotControlPayload {
    user_id: i64,
}

async fn start_bot(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BotControlPayload>,
) -> Json<Value> {
    match bot_service::start(state.db.as_ref(), payload.user_id).await {
        Ok(bot) => Json(json!({ "status": "success", "bot_status": bot.status })),
        Err(err) => Json(json!({ "status": "error", "message": err.to_string() })),
    }
}

async fn stop_bot(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BotControlPayload>,
) -> Json<Value> {
    match bot_service::stop(state.db.as_ref(), payload.user_id).await {
        Ok(bot) => Json(json!({ "status": "success", "bot_status": bot.status })),
        Err(err) => Json(json!({ "status": "error", "message": err.to_string() })),
    }
}

async fn restart_bot(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BotControlPayload>,
) -> Json<Value> {
    match bot_service::restart(state.db.as_ref(), payload.user_id).await {
        Ok(bot) => Json(json!({ "status": "success", "bot_status": bot.status })),
        Err(err) => Json(json!({ "status": "error", "message": err.to_string() })),
    }
}

/// Manual close; the work happens asynchronously under the user's guard
/// and the request is acknowledged immediately.
async fn close_operation(
    State(state): State<Arc<AppState>>,
    Path(operation_id): Path<u64>,
) -> Json<Value> {
    let state = state.clone();
    spawn_task("close_position", async move {
        let Some(operation) = operations::Entity::find_by_id(operation_id)
            .one(state.db.as_ref())
            .await?
        else {
            return Err(Error::NotFound("operation", operation_id as i64));
        };
        let _guard = state.locks.acquire(operation.user_id).await;
        position_service::close_position(&state, operation_id).await
    });

    Json(json!({
        "status": "success",
        "message": "Operation closing request sent"
    }))
}
