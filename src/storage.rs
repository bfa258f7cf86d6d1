// =============================================================================
// SeriesStorage — flat JSON blob store, one file per metal plus the snapshot
// =============================================================================
//
// Layout under the data directory:
//
//   <SYMBOL>.json  — array of `{ "ts": …, "usd_oz": … }`, ascending by ts
//   latest.json    — the consolidated snapshot, overwritten wholesale
//
// Files are pretty-printed with a trailing newline and written via an atomic
// tmp + rename so a crash mid-write never corrupts the previous state. A
// missing series file is a normal first run; an unreadable or malformed one
// is recovered by starting that series fresh — never fatal.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::series::{PricePoint, PriceSeries};
use crate::types::LatestSnapshot;

/// Flat JSON storage rooted at one data directory.
#[derive(Debug, Clone)]
pub struct SeriesStorage {
    data_dir: PathBuf,
}

impl SeriesStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory (and parents) if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("failed to create data directory {}", self.data_dir.display())
        })
    }

    pub fn series_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}.json"))
    }

    pub fn latest_path(&self) -> PathBuf {
        self.data_dir.join("latest.json")
    }

    /// Read the stored series for `symbol`.
    ///
    /// Missing file → empty series (normal first run). Unreadable or
    /// malformed file → empty series with a warning; a broken file must never
    /// take the ingestion cycle down.
    pub fn read_series(&self, symbol: &str) -> PriceSeries {
        let path = self.series_path(symbol);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "series file not found — starting empty");
                return PriceSeries::new();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read series file — starting empty");
                return PriceSeries::new();
            }
        };

        match serde_json::from_str::<Vec<PricePoint>>(&content) {
            Ok(points) => PriceSeries::from(points),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed series file — starting empty");
                PriceSeries::new()
            }
        }
    }

    /// Persist the series for `symbol` atomically.
    pub fn write_series(&self, symbol: &str, series: &PriceSeries) -> Result<()> {
        let path = self.series_path(symbol);
        let content = serde_json::to_string_pretty(series.points())
            .with_context(|| format!("failed to serialise series {symbol} to JSON"))?;
        write_atomic(&path, &content)
    }

    /// Read the consolidated snapshot, `None` if missing or malformed.
    pub fn read_latest(&self) -> Option<LatestSnapshot> {
        let path = self.latest_path();
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed latest snapshot — ignoring");
                None
            }
        }
    }

    /// Overwrite the consolidated snapshot atomically.
    pub fn write_latest(&self, snapshot: &LatestSnapshot) -> Result<()> {
        let content = serde_json::to_string_pretty(snapshot)
            .context("failed to serialise latest snapshot to JSON")?;
        write_atomic(&self.latest_path(), &content)
    }
}

/// Write `content` plus a trailing newline to a temporary sibling file, then
/// rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    std::fs::write(&tmp_path, format!("{content}\n"))
        .with_context(|| format!("failed to write tmp file {}", tmp_path.display()))?;

    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename tmp file to {}", path.display()))?;

    Ok(())
}
