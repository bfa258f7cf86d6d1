// =============================================================================
// Ingestion Cycle — one sampling tick across all configured metals
// =============================================================================
//
// FAILURE POLICY: the currency rate is fetched once, first, and a failure
// there aborts the whole tick before anything is persisted — a rate-free
// snapshot must never overwrite a consistent one. Individual metal fetches
// fail in isolation: the affected metal gets null quote fields and no new
// point, every other metal still proceeds and the snapshot is still written.
//
// Re-running a tick for the same sampling instant is safe: the per-series
// append is idempotent, so the persisted files come out byte-for-byte
// identical.
// =============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::providers::{ExchangeRateSource, SpotPriceSource};
use crate::series::PricePoint;
use crate::storage::SeriesStorage;
use crate::types::{usd_oz_to_usd_gram, LatestSnapshot, Metal, MetalQuote};
use crate::window;

/// Look-back age for the 1-hour change metric.
const CHANGE_1H_MS: i64 = 60 * 60 * 1000;

/// Look-back age for the 24-hour change metric.
const CHANGE_24H_MS: i64 = 24 * 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Summary of a single ingestion tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    /// Unique identifier of this tick run (UUID v4).
    pub tick_id: String,
    /// Tick timestamp, unix seconds UTC.
    pub timestamp: i64,
    /// The rate every per-metal conversion used.
    pub usd_to_brl: f64,
    /// Metals that stored a new point this tick.
    pub appended: u32,
    /// Metals whose price was missing or invalid this tick.
    pub skipped: u32,
    /// Total metals processed.
    pub metals: u32,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run one full sampling tick at `now_sec`.
///
/// 1. Fetch the base→quote rate — fatal on failure or a non-finite value.
/// 2. Per metal: fetch the spot price (failures isolated), derive per-gram
///    and local-currency fields, append + prune the stored series, compute
///    the 1h/24h change metrics, persist the series.
/// 3. Overwrite the consolidated snapshot, partial data included.
pub async fn run_tick(
    config: &TrackerConfig,
    metals: &[Metal],
    prices: &dyn SpotPriceSource,
    rates: &dyn ExchangeRateSource,
    storage: &SeriesStorage,
    now_sec: i64,
) -> Result<TickReport> {
    let tick_id = uuid::Uuid::new_v4().to_string();
    info!(tick_id = %tick_id, timestamp = now_sec, metals = metals.len(), "ingestion tick started");

    storage.ensure_dir()?;

    // -----------------------------------------------------------------
    // 1. Currency rate — hard ordering barrier, fatal on failure
    // -----------------------------------------------------------------
    let usd_to_brl = rates
        .fetch_rate(&config.base_currency, &config.quote_currency)
        .await
        .context("tick aborted: currency rate fetch failed")?;

    if !usd_to_brl.is_finite() {
        anyhow::bail!(
            "tick aborted: {}→{} rate is not finite: {usd_to_brl}",
            config.base_currency,
            config.quote_currency
        );
    }

    debug!(rate = usd_to_brl, "currency rate fetched");

    let mut snapshot = LatestSnapshot {
        timestamp: now_sec,
        usd_to_brl,
        metals: BTreeMap::new(),
    };

    let mut appended: u32 = 0;
    let mut skipped: u32 = 0;

    // -----------------------------------------------------------------
    // 2. Per-metal fetch, append, prune, change metrics, persist
    // -----------------------------------------------------------------
    for (idx, metal) in metals.iter().enumerate() {
        let usd_oz = match prices.fetch_spot(metal.api_symbol()).await {
            Ok(price) if price.is_finite() && price > 0.0 => Some(price),
            Ok(price) => {
                warn!(metal = %metal, price, "spot price is not a positive finite number — treating as missing");
                None
            }
            Err(e) => {
                warn!(metal = %metal, error = %e, "spot price fetch failed — treating as missing");
                None
            }
        };
        if usd_oz.is_none() {
            skipped += 1;
        }

        // Derived fields inherit absence from the source price.
        let usd_g = usd_oz.map(usd_oz_to_usd_gram);
        let brl_oz = usd_oz.map(|v| v * usd_to_brl);
        let brl_g = usd_g.map(|v| v * usd_to_brl);

        let mut series = storage.read_series(metal.storage_symbol());

        let stored = match usd_oz {
            Some(price) => series.append(PricePoint {
                ts: now_sec,
                usd_oz: price,
            }),
            None => false,
        };
        if stored {
            appended += 1;
        }

        let pruned = series.prune(now_sec * 1000, config.max_age_days, config.max_points);

        let chg_1h = window::compute_change_pct(series.points(), CHANGE_1H_MS);
        let chg_24h = window::compute_change_pct(series.points(), CHANGE_24H_MS);

        storage
            .write_series(metal.storage_symbol(), &series)
            .with_context(|| format!("failed to persist series for {metal}"))?;

        debug!(
            metal = %metal,
            points = series.len(),
            appended = stored,
            pruned,
            chg_1h = ?chg_1h,
            chg_24h = ?chg_24h,
            "metal processed"
        );

        snapshot.metals.insert(
            metal.storage_symbol().to_string(),
            MetalQuote {
                name: metal.display_name().to_string(),
                usd_oz,
                usd_g,
                brl_oz,
                brl_g,
                chg_1h,
                chg_24h,
            },
        );

        // Politeness pause toward the free upstream API.
        if config.pause_between_requests_ms > 0 && idx + 1 < metals.len() {
            tokio::time::sleep(Duration::from_millis(config.pause_between_requests_ms)).await;
        }
    }

    // -----------------------------------------------------------------
    // 3. Consolidated snapshot — full overwrite, partial data allowed
    // -----------------------------------------------------------------
    storage
        .write_latest(&snapshot)
        .context("failed to persist latest snapshot")?;

    let report = TickReport {
        tick_id,
        timestamp: now_sec,
        usd_to_brl,
        appended,
        skipped,
        metals: metals.len() as u32,
    };

    info!(
        tick_id = %report.tick_id,
        appended = report.appended,
        skipped = report.skipped,
        metals = report.metals,
        rate = report.usd_to_brl,
        "ingestion tick completed"
    );

    Ok(report)
}
