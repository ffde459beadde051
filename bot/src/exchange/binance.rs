//! Binance USDⓈ-M futures REST client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use shared::{Error, OrderSide};

use super::{ExchangeClient, ExchangeCredentials, ExchangeGateway};

type HmacSha256 = Hmac<Sha256>;

const RECV_WINDOW_MS: u32 = 5_000;

/// Gateway holding the shared HTTP pool; per-user clients are cheap
/// handles carrying their own credentials.
pub struct BinanceFutures {
    http: reqwest::Client,
    base_url: String,
}

impl BinanceFutures {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ExchangeGateway for BinanceFutures {
    fn client(&self, credentials: ExchangeCredentials) -> Arc<dyn ExchangeClient> {
        Arc::new(BinanceFuturesClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            credentials,
        })
    }
}

struct BinanceFuturesClient {
    http: reqwest::Client,
    base_url: String,
    credentials: ExchangeCredentials,
}

fn sign(secret: &str, query: &str) -> Result<String, Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| Error::Exchange(format!("failed to init signer: {err}")))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

impl BinanceFuturesClient {
    fn signed_query(&self, params: &[(&str, String)]) -> Result<String, Error> {
        let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.push(format!("timestamp={}", Utc::now().timestamp_millis()));
        pairs.push(format!("recvWindow={RECV_WINDOW_MS}"));
        let query = pairs.join("&");

        let signature = sign(&self.credentials.api_secret, &query)?;
        Ok(format!("{query}&signature={signature}"))
    }

    async fn parse<T>(path: &str, response: reqwest::Response) -> Result<T, Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Exchange(format!("{path} returned {status}: {body}")));
        }
        response.json::<T>().await.map_err(Error::from)
    }

    async fn get_public<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = self.http.get(format!("{}{path}", self.base_url)).query(params);
        Self::parse(path, request.send().await?).await
    }

    async fn get_signed<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        let query = self.signed_query(params)?;
        let url = format!("{}{path}?{query}", self.base_url);
        let request = self
            .http
            .get(url)
            .header("X-MBX-APIKEY", &self.credentials.api_key);
        Self::parse(path, request.send().await?).await
    }

    async fn post_signed(&self, path: &str, params: &[(&str, String)]) -> Result<(), Error> {
        let query = self.signed_query(params)?;
        let url = format!("{}{path}?{query}", self.base_url);
        let response = self
            .http
            .post(url)
            .header("X-MBX-APIKEY", &self.credentials.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Exchange(format!("{path} returned {status}: {body}")));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "availableBalance")]
    available_balance: String,
}

#[derive(Debug, Deserialize)]
struct TickerPriceResponse {
    price: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfoResponse {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    #[serde(rename = "quantityPrecision")]
    quantity_precision: i32,
}

#[async_trait]
impl ExchangeClient for BinanceFuturesClient {
    async fn available_balance(&self) -> Result<f64, Error> {
        let account: AccountResponse = self.get_signed("/fapi/v2/account", &[]).await?;
        account
            .available_balance
            .parse()
            .map_err(|_| Error::Exchange(format!("unparseable balance: {}", account.available_balance)))
    }

    async fn current_price(&self, symbol: &str) -> Result<f64, Error> {
        let ticker: TickerPriceResponse = self
            .get_public("/fapi/v1/ticker/price", &[("symbol", symbol.to_string())])
            .await?;
        ticker
            .price
            .parse()
            .map_err(|_| Error::Exchange(format!("unparseable price: {}", ticker.price)))
    }

    async fn quantity_precision(&self, symbol: &str) -> Result<i32, Error> {
        let info: ExchangeInfoResponse = self.get_public("/fapi/v1/exchangeInfo", &[]).await?;
        info.symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .map(|s| s.quantity_precision)
            .ok_or_else(|| Error::Exchange(format!("symbol {symbol} missing from exchange info")))
    }

    async fn set_leverage(&self, symbol: &str, leverage: i32) -> Result<(), Error> {
        self.post_signed(
            "/fapi/v1/leverage",
            &[
                ("symbol", symbol.to_string()),
                ("leverage", leverage.to_string()),
            ],
        )
        .await
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: f64,
    ) -> Result<(), Error> {
        let side = match side {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
            OrderSide::Hold => {
                return Err(Error::Validation("hold is not an order side".to_string()))
            }
        };

        self.post_signed(
            "/fapi/v1/order",
            &[
                ("symbol", symbol.to_string()),
                ("side", side.to_string()),
                ("type", "MARKET".to_string()),
                ("quantity", quantity.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4231 test case 2 for HMAC-SHA256.
    #[test]
    fn sign_matches_known_vector() {
        let signature = sign("Jefe", "what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn gateway_normalizes_base_url() {
        let gateway =
            BinanceFutures::new("https://fapi.binance.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(gateway.base_url, "https://fapi.binance.com");
    }
}
