//! Strategy seam. Concrete strategies are plug-ins living outside the
//! engine; each one reduces to "given recent market data, produce a
//! directional recommendation with a reference price".

use std::sync::Arc;

use async_trait::async_trait;
use shared::{Error, OrderSide};
use tracing::warn;

use crate::services::{signal_service, Outcome};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct MarketData {
    pub ticker: String,
    pub timeframe: String,
    pub candles: Vec<Candle>,
}

impl MarketData {
    /// Close of the most recent candle; the usual reference price.
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub side: OrderSide,
    pub price: f64,
}

pub trait Strategy: Send + Sync {
    /// Stable identifier; consensus counts distinct values of this.
    fn name(&self) -> &str;

    fn evaluate(&self, data: &MarketData) -> Recommendation;
}

/// Collaborator boundary: fetches recent candles for a ticker/timeframe.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    async fn fetch(&self, ticker: &str, timeframe: &str) -> Result<MarketData, Error>;
}

/// Evaluates every strategy once over the same data snapshot.
pub fn collect_recommendations<'a>(
    strategies: &'a [Box<dyn Strategy>],
    data: &MarketData,
) -> Vec<(&'a str, Recommendation)> {
    strategies
        .iter()
        .map(|strategy| (strategy.name(), strategy.evaluate(data)))
        .collect()
}

/// Fetches market data once and submits one signal per registered
/// strategy. A rejected signal does not block the remaining strategies.
pub async fn run_strategies(
    state: &Arc<AppState>,
    feed: &dyn MarketDataFeed,
    strategies: &[Box<dyn Strategy>],
    ticker: &str,
    timeframe: &str,
) -> Result<Outcome, Error> {
    let data = feed.fetch(ticker, timeframe).await?;

    let mut submitted = 0;
    for (name, recommendation) in collect_recommendations(strategies, &data) {
        match signal_service::submit(
            state,
            ticker,
            recommendation.side,
            timeframe,
            name,
            recommendation.price,
        )
        .await
        {
            Ok(_) => submitted += 1,
            Err(err) => warn!("strategy {name}: signal rejected: {err}"),
        }
    }

    Ok(Outcome::Completed(format!(
        "submitted {submitted} signals for {ticker}"
    )))
}
