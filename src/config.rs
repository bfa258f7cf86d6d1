// =============================================================================
// Tracker Configuration — tunable settings with per-field serde defaults
// =============================================================================
//
// Every field carries `#[serde(default)]` so that adding new fields never
// breaks loading an older config file. `main` falls back to the full default
// set with a warning when the file is missing or unparseable.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::providers::RetryPolicy;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_quote_currency() -> String {
    "BRL".to_string()
}

fn default_metals() -> Vec<String> {
    vec![
        "XAU".to_string(),
        "XAG".to_string(),
        "XPT".to_string(),
        "XPD".to_string(),
        "XCU".to_string(),
    ]
}

fn default_max_age_days() -> i64 {
    120
}

fn default_max_points() -> usize {
    60_000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_pause_between_requests_ms() -> u64 {
    180
}

// =============================================================================
// TrackerConfig
// =============================================================================

/// Top-level configuration for the tracker binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Directory holding the series files and the latest snapshot.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Currency the spot prices are quoted in.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// Currency the per-tick conversion targets.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    /// Storage symbols of the metals to track each tick.
    #[serde(default = "default_metals")]
    pub metals: Vec<String>,

    /// Retention: points older than this many days are pruned.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,

    /// Retention: hard cap on points per series (oldest truncated first).
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Per-request HTTP timeout, seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Bounded backoff applied inside the fetch collaborators.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Politeness pause between per-metal requests, milliseconds.
    #[serde(default = "default_pause_between_requests_ms")]
    pub pause_between_requests_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            base_currency: default_base_currency(),
            quote_currency: default_quote_currency(),
            metals: default_metals(),
            max_age_days: default_max_age_days(),
            max_points: default_max_points(),
            request_timeout_secs: default_request_timeout_secs(),
            retry: RetryPolicy::default(),
            pause_between_requests_ms: default_pause_between_requests_ms(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tracker config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse tracker config from {}", path.display()))?;

        info!(
            path = %path.display(),
            metals = ?config.metals,
            data_dir = %config.data_dir,
            "tracker config loaded"
        );

        Ok(config)
    }
}
