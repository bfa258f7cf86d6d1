// =============================================================================
// Metal Spot Tracker — Main Entry Point
// =============================================================================
//
// The binary runs exactly one ingestion tick and exits: an external scheduler
// (cron, systemd timer, CI) provides the cadence. A fatal tick error — the
// currency rate could not be fetched — propagates out of `main`, so the
// scheduler sees a non-zero exit and unchanged persisted state.
// =============================================================================

use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use metal_spot_tracker::config::TrackerConfig;
use metal_spot_tracker::ingest;
use metal_spot_tracker::providers::{FrankfurterClient, GoldApiClient};
use metal_spot_tracker::storage::SeriesStorage;
use metal_spot_tracker::types::Metal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Metal Spot Tracker — Ingestion Tick               ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("METALS_CONFIG").unwrap_or_else(|_| "tracker_config.json".into());
    let mut config = TrackerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        TrackerConfig::default()
    });

    // Override data dir and metal list from env if available.
    if let Ok(dir) = std::env::var("METALS_DATA_DIR") {
        if !dir.trim().is_empty() {
            config.data_dir = dir;
        }
    }
    if let Ok(syms) = std::env::var("METALS_SYMBOLS") {
        config.metals = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // Resolve symbols against the known metal table; unknown entries are
    // warned and skipped, an empty result falls back to the full set.
    let mut metals: Vec<Metal> = Vec::new();
    for symbol in &config.metals {
        match Metal::parse(symbol) {
            Some(metal) if !metals.contains(&metal) => metals.push(metal),
            Some(_) => {}
            None => warn!(symbol = %symbol, "unknown metal symbol in config — skipping"),
        }
    }
    if metals.is_empty() {
        metals = Metal::ALL.to_vec();
    }

    info!(metals = ?metals.iter().map(|m| m.storage_symbol()).collect::<Vec<_>>(), "Configured metals");
    info!(
        data_dir = %config.data_dir,
        base = %config.base_currency,
        quote = %config.quote_currency,
        "Persisting to flat JSON store"
    );

    // ── 2. Build providers & storage ─────────────────────────────────────
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let prices = GoldApiClient::new(timeout, config.retry.clone());
    let rates = FrankfurterClient::new(timeout, config.retry.clone());
    let storage = SeriesStorage::new(&config.data_dir);

    // ── 3. Run one tick ──────────────────────────────────────────────────
    let now_sec = chrono::Utc::now().timestamp();
    let report = ingest::run_tick(&config, &metals, &prices, &rates, &storage, now_sec).await?;

    info!(
        tick_id = %report.tick_id,
        timestamp = report.timestamp,
        rate = report.usd_to_brl,
        appended = report.appended,
        skipped = report.skipped,
        metals = report.metals,
        "Tick complete"
    );

    Ok(())
}
