use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use shared::{get_db_connection, Config};
use tracing::warn;

use crate::exchange::binance::BinanceFutures;
use crate::exchange::ExchangeGateway;
use crate::notify::{NoopNotifier, NotificationSink, TelegramNotifier};
use crate::services::user_locks::UserLocks;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub exchange: Arc<dyn ExchangeGateway>,
    pub notifier: Arc<dyn NotificationSink>,
    pub locks: UserLocks,
    pub bind_addr: String,
    pub credentials_key: String,
    pub consensus_window_minutes: i64,
    pub reversal_delay_secs: u64,
    pub monitor_interval_secs: u64,
    pub sweep_interval_secs: u64,
}

impl AppState {
    pub async fn new() -> Result<Self, anyhow::Error> {
        let config = Config::from_env()?;
        let db = get_db_connection(&config.database_url).await?;
        tracing::info!("Connected to database successfully");

        let exchange = Arc::new(BinanceFutures::new(
            &config.exchange_base_url,
            Duration::from_secs(config.exchange_timeout_secs),
        )?);

        let notifier: Arc<dyn NotificationSink> = match &config.bot_token {
            Some(token) => Arc::new(TelegramNotifier::new(token)),
            None => {
                warn!("BOT_TOKEN not set, position notifications are disabled");
                Arc::new(NoopNotifier)
            }
        };

        Ok(AppState {
            db: Arc::new(db),
            exchange,
            notifier,
            locks: UserLocks::new(),
            bind_addr: config.bind_addr,
            credentials_key: config.credentials_key,
            consensus_window_minutes: config.consensus_window_minutes,
            reversal_delay_secs: config.reversal_delay_secs,
            monitor_interval_secs: config.monitor_interval_secs,
            sweep_interval_secs: config.sweep_interval_secs,
        })
    }
}
