//! Outbound notifications for opened and closed positions.
//!
//! Delivery failures are logged and swallowed; they never block position
//! logic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use shared::entity::{operations, trading_settings};
use shared::OperationDirection;
use std::str::FromStr;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::warn;

use crate::state::AppState;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, target: &str, text: &str) -> Result<(), anyhow::Error>;
}

pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, target: &str, text: &str) -> Result<(), anyhow::Error> {
        let chat_id: i64 = target.trim().parse()?;
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }
}

/// Used when no bot token is configured.
pub struct NoopNotifier;

#[async_trait]
impl NotificationSink for NoopNotifier {
    async fn send(&self, _target: &str, _text: &str) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

pub async fn send_or_log(state: &AppState, settings: &trading_settings::Model, text: String) {
    let Some(target) = settings.telegram_chat_id.as_deref() else {
        return;
    };
    if let Err(err) = state.notifier.send(target, &text).await {
        warn!("notification to user {} failed: {err}", settings.user_id);
    }
}

fn entry_label(direction: &str) -> &'static str {
    match OperationDirection::from_str(direction) {
        Ok(OperationDirection::Long) => "BUY",
        _ => "SELL",
    }
}

/// Summary of a freshly opened position.
pub fn format_opened(operation: &operations::Model) -> String {
    let investment = operation.investment.to_f64().unwrap_or(0.0);
    let elapsed = format_elapsed(operation.opened_at.unwrap_or_else(Utc::now), Utc::now());

    format!(
        "Broker: BINANCE\n\
         Asset: {}\n\
         Direction: {}\n\
         Leverage: x{}\n\
         Investment: USD {investment:.2}\n\
         Entry: {}\n\
         Take Profit: {}%\n\
         Stop Loss: {}%\n\
         Time: {elapsed}",
        operation.symbol,
        entry_label(&operation.direction),
        operation.leverage,
        operation.entry_price,
        operation.take_profit,
        operation.stop_loss,
    )
}

/// Result summary of a closed position.
pub fn format_closed(operation: &operations::Model) -> String {
    let investment = operation.investment.to_f64().unwrap_or(0.0);
    let profit = operation
        .profit_loss
        .as_ref()
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0);
    let roi = operation
        .profit_loss_percentage
        .as_ref()
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0);
    let roi_prefix = if roi >= 0.0 { "+" } else { "" };
    let variation = (roi / operation.leverage.max(1) as f64).abs();

    let opened_at = operation.opened_at.unwrap_or_else(Utc::now);
    let closed_at = operation.closed_at.unwrap_or_else(Utc::now);
    let exit = operation
        .exit_price
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_default();

    format!(
        "Broker: BINANCE\n\
         Asset: {}\n\
         Direction: {}\n\
         Leverage: x{}\n\
         Investment: USD {investment:.2}\n\
         ROI: {roi_prefix}{roi:.2}%\n\
         Profit: USD {profit:.2}\n\
         Entry: {}\n\
         Last: {exit}\n\
         Variation: {variation:.2}%\n\
         Time: {}",
        operation.symbol,
        entry_label(&operation.direction),
        operation.leverage,
        operation.entry_price,
        format_elapsed(opened_at, closed_at),
    )
}

/// "2D 3h 4m" / "3h 4m" / "4m", whichever is shortest.
fn format_elapsed(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let diff = end - start;
    let days = diff.num_days();
    let hours = diff.num_hours() % 24;
    let minutes = diff.num_minutes() % 60;

    if days > 0 {
        format!("{days}D {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn sample_operation() -> operations::Model {
        let opened = Utc::now() - Duration::minutes(95);
        operations::Model {
            id: 7,
            user_id: 42,
            symbol: "BTCUSDT".to_string(),
            direction: "long".to_string(),
            status: "closed".to_string(),
            entry_price: Decimal::new(100, 0),
            exit_price: Some(Decimal::new(110, 0)),
            quantity: Decimal::new(5, 1),
            leverage: 10,
            investment: Decimal::new(500, 0),
            take_profit: 25,
            stop_loss: 25,
            profit_loss: Some(Decimal::new(500, 0)),
            profit_loss_percentage: Some(Decimal::new(10000, 2)),
            opened_at: Some(opened),
            closed_at: Some(opened + Duration::minutes(90)),
        }
    }

    #[test]
    fn opened_summary_shows_entry_side_and_thresholds() {
        let text = format_opened(&sample_operation());
        assert!(text.contains("Asset: BTCUSDT"));
        assert!(text.contains("Direction: BUY"));
        assert!(text.contains("Leverage: x10"));
        assert!(text.contains("Take Profit: 25%"));
        assert!(text.contains("Stop Loss: 25%"));
    }

    #[test]
    fn closed_summary_reports_roi_and_underlying_variation() {
        let text = format_closed(&sample_operation());
        assert!(text.contains("ROI: +100.00%"));
        assert!(text.contains("Profit: USD 500.00"));
        // 100% leveraged ROI at x10 is a 10% move in the underlying.
        assert!(text.contains("Variation: 10.00%"));
        assert!(text.contains("Time: 1h 30m"));
    }

    #[test]
    fn short_positions_render_as_sell() {
        let mut operation = sample_operation();
        operation.direction = "short".to_string();
        assert!(format_opened(&operation).contains("Direction: SELL"));
    }

    #[test]
    fn elapsed_formats_collapse_empty_units() {
        let start = Utc::now();
        assert_eq!(format_elapsed(start, start + Duration::minutes(5)), "5m");
        assert_eq!(
            format_elapsed(start, start + Duration::minutes(65)),
            "1h 5m"
        );
        assert_eq!(
            format_elapsed(start, start + Duration::days(2) + Duration::minutes(61)),
            "2D 1h 1m"
        );
    }
}
