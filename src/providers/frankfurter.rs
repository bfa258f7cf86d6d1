// =============================================================================
// frankfurter.dev client — currency exchange rates
// =============================================================================
//
// GET https://api.frankfurter.dev/v1/latest?base={base}&symbols={quote}
// returns `{ "rates": { "{quote}": <f64> } }`. No authentication.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::retry::RetryPolicy;
use super::{fetch_json, ExchangeRateSource};

const BASE_URL: &str = "https://api.frankfurter.dev";

/// HTTP client for the frankfurter.dev latest-rates endpoint.
pub struct FrankfurterClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl FrankfurterClient {
    /// Create a client with its own HTTP connection pool and request timeout.
    pub fn new(timeout: std::time::Duration, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build reqwest client for FrankfurterClient"),
            base_url: BASE_URL.to_string(),
            retry,
        }
    }
}

#[async_trait]
impl ExchangeRateSource for FrankfurterClient {
    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64> {
        let url = format!(
            "{}/v1/latest?base={}&symbols={}",
            self.base_url, base, quote
        );
        let body = fetch_json(&self.client, &url, &self.retry)
            .await
            .with_context(|| format!("exchange rate fetch {base}->{quote} failed"))?;

        let rate = parse_rate(&body, quote)
            .with_context(|| format!("exchange rate response for {base}->{quote} is malformed"))?;

        debug!(base, quote, rate, "exchange rate fetched");
        Ok(rate)
    }
}

/// Extract the numeric `rates.{quote}` field from a response body.
fn parse_rate(body: &serde_json::Value, quote: &str) -> Result<f64> {
    body["rates"][quote]
        .as_f64()
        .with_context(|| format!("missing or non-numeric 'rates.{quote}' field"))
}

impl std::fmt::Debug for FrankfurterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrankfurterClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quote_rate() {
        let body = serde_json::json!({
            "amount": 1.0,
            "base": "USD",
            "date": "2024-07-01",
            "rates": { "BRL": 5.43 }
        });
        assert!((parse_rate(&body, "BRL").unwrap() - 5.43).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_missing_quote() {
        let body = serde_json::json!({ "rates": { "EUR": 0.93 } });
        assert!(parse_rate(&body, "BRL").is_err());
        assert!(parse_rate(&serde_json::json!({}), "BRL").is_err());
    }
}
