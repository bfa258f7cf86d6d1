// =============================================================================
// gold-api.com client — spot prices in USD per troy ounce
// =============================================================================
//
// GET https://api.gold-api.com/price/{apiSymbol} returns a JSON object whose
// numeric `price` field is the spot price. No authentication.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::retry::RetryPolicy;
use super::{fetch_json, SpotPriceSource};

const BASE_URL: &str = "https://api.gold-api.com";

/// HTTP client for the gold-api.com spot price endpoint.
pub struct GoldApiClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl GoldApiClient {
    /// Create a client with its own HTTP connection pool and request timeout.
    pub fn new(timeout: std::time::Duration, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build reqwest client for GoldApiClient"),
            base_url: BASE_URL.to_string(),
            retry,
        }
    }
}

#[async_trait]
impl SpotPriceSource for GoldApiClient {
    async fn fetch_spot(&self, api_symbol: &str) -> Result<f64> {
        let url = format!("{}/price/{}", self.base_url, api_symbol);
        let body = fetch_json(&self.client, &url, &self.retry)
            .await
            .with_context(|| format!("spot price fetch for {api_symbol} failed"))?;

        let price = parse_spot_price(&body)
            .with_context(|| format!("spot price response for {api_symbol} is malformed"))?;

        debug!(symbol = api_symbol, price, "spot price fetched");
        Ok(price)
    }
}

/// Extract the numeric `price` field from a response body.
fn parse_spot_price(body: &serde_json::Value) -> Result<f64> {
    body["price"]
        .as_f64()
        .context("missing or non-numeric 'price' field")
}

impl std::fmt::Debug for GoldApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoldApiClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}
