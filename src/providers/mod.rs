// =============================================================================
// Price Providers Module
// =============================================================================
//
// The two external collaborators of the ingestion cycle, behind traits so the
// tick logic stays independent of any concrete upstream:
//
//   SpotPriceSource    — spot price in USD per troy ounce for one metal
//   ExchangeRateSource — base→quote currency rate
//
// Concrete clients talk to free public APIs (gold-api.com and
// frankfurter.dev) over plain GET + JSON. Both share one bounded-backoff
// fetch helper driven by a `RetryPolicy` value, so the ingestion cycle never
// sees or chooses retry behavior.

pub mod frankfurter;
pub mod gold_api;
pub mod retry;

pub use frankfurter::FrankfurterClient;
pub use gold_api::GoldApiClient;
pub use retry::RetryPolicy;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::warn;

/// Fetches the current spot price for one metal, in USD per troy ounce.
#[async_trait]
pub trait SpotPriceSource: Send + Sync {
    async fn fetch_spot(&self, api_symbol: &str) -> Result<f64>;
}

/// Fetches the current base→quote currency exchange rate.
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64>;
}

/// GET `url` and parse the body as JSON, retrying per `retry`.
///
/// Transport errors, non-2xx statuses and unparseable bodies all count as a
/// failed attempt; the last error is returned once the policy is exhausted.
pub(crate) async fn fetch_json(
    client: &reqwest::Client,
    url: &str,
    retry: &RetryPolicy,
) -> Result<serde_json::Value> {
    let mut attempt: u32 = 0;
    loop {
        match try_get_json(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) if attempt < retry.max_retries => {
                let delay = retry.delay_for_attempt(attempt);
                warn!(
                    url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "request failed — retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One GET attempt: status check with a body snippet in the error, then JSON
/// parse.
async fn try_get_json(client: &reqwest::Client, url: &str) -> Result<serde_json::Value> {
    let resp = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?;

    let status = resp.status();
    let text = resp
        .text()
        .await
        .with_context(|| format!("failed to read response body from {url}"))?;

    if !status.is_success() {
        let snippet: String = text.chars().take(200).collect();
        anyhow::bail!("GET {url} returned {status}: {snippet}");
    }

    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON from {url}"))
}
