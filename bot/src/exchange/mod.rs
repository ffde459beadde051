//! The slice of an exchange the engine consumes.
//!
//! Every call goes out with a bounded timeout; a timeout surfaces as
//! `Error::Exchange` like any other transport failure.

pub mod binance;

use std::sync::Arc;

use async_trait::async_trait;
use shared::{Error, OrderSide};

/// Plaintext API credentials, already unsealed by `shared::crypto`.
#[derive(Clone)]
pub struct ExchangeCredentials {
    pub api_key: String,
    pub api_secret: String,
}

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn available_balance(&self) -> Result<f64, Error>;

    async fn current_price(&self, symbol: &str) -> Result<f64, Error>;

    /// Number of decimal places the exchange accepts in order quantities.
    async fn quantity_precision(&self, symbol: &str) -> Result<i32, Error>;

    async fn set_leverage(&self, symbol: &str, leverage: i32) -> Result<(), Error>;

    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<(), Error>;
}

/// Builds per-user clients; credentials differ per user, the HTTP pool
/// is shared.
pub trait ExchangeGateway: Send + Sync {
    fn client(&self, credentials: ExchangeCredentials) -> Arc<dyn ExchangeClient>;
}
