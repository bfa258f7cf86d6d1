// =============================================================================
// Window Engine — pure transforms from a stored series to a bounded view
// =============================================================================
//
// Side-effect-free functions shared by the ingestion cycle (change metrics)
// and any display consumer (chart windows). Both sides MUST go through this
// module: bucket-boundary and nearest-neighbor tie-break rules live here and
// nowhere else.
//
//   filter_window      — trailing time window anchored to the latest point
//   downsample_avg     — bucketed mean, output ts = last point in bucket
//   nearest_by_age     — baseline point for "change over the last N ms"
//   compute_change_pct — percentage change vs. the nearest-by-age baseline
//
// All functions take `&[PricePoint]` ascending by `ts` and never mutate their
// input, so they are safe to call from any number of concurrent readers.
// =============================================================================

use crate::series::PricePoint;

/// Number of windowed points above which `chart_series` starts averaging into
/// buckets. Below this a chart renders every raw point.
pub const MAX_RAW_CHART_POINTS: usize = 250;

/// A named viewing window: how far back to look and how wide the downsampling
/// buckets are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub duration_ms: i64,
    pub bucket_ms: i64,
}

impl WindowSpec {
    /// The viewing windows offered by the dashboards.
    pub const PRESETS: [(&'static str, WindowSpec); 9] = [
        ("30m", WindowSpec { duration_ms: 30 * 60 * 1000, bucket_ms: 60 * 1000 }),
        ("1h", WindowSpec { duration_ms: 60 * 60 * 1000, bucket_ms: 2 * 60 * 1000 }),
        ("3h", WindowSpec { duration_ms: 3 * 60 * 60 * 1000, bucket_ms: 5 * 60 * 1000 }),
        ("6h", WindowSpec { duration_ms: 6 * 60 * 60 * 1000, bucket_ms: 10 * 60 * 1000 }),
        ("12h", WindowSpec { duration_ms: 12 * 60 * 60 * 1000, bucket_ms: 15 * 60 * 1000 }),
        ("24h", WindowSpec { duration_ms: 24 * 60 * 60 * 1000, bucket_ms: 5 * 60 * 1000 }),
        ("7d", WindowSpec { duration_ms: 7 * 24 * 60 * 60 * 1000, bucket_ms: 30 * 60 * 1000 }),
        ("30d", WindowSpec { duration_ms: 30 * 24 * 60 * 60 * 1000, bucket_ms: 2 * 60 * 60 * 1000 }),
        ("90d", WindowSpec { duration_ms: 90 * 24 * 60 * 60 * 1000, bucket_ms: 6 * 60 * 60 * 1000 }),
    ];

    /// Look up a preset by its key ("30m", "1h", … "90d").
    pub fn preset(key: &str) -> Option<WindowSpec> {
        Self::PRESETS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, spec)| *spec)
    }
}

/// Keep only the points inside the trailing `duration_ms` window.
///
/// The window is anchored to the latest stored point, not wall-clock time, so
/// a stale series still yields a non-empty window when data is merely delayed.
/// An empty input yields an empty output; `duration_ms == 0` keeps exactly the
/// anchor point.
pub fn filter_window(points: &[PricePoint], duration_ms: i64) -> Vec<PricePoint> {
    let Some(last) = points.last() else {
        return Vec::new();
    };
    let cutoff_ms = last.ts * 1000 - duration_ms;
    points
        .iter()
        .filter(|p| p.ts * 1000 >= cutoff_ms)
        .copied()
        .collect()
}

/// Average consecutive points into fixed-width time buckets.
///
/// A point belongs to bucket `floor(ts_ms / bucket_ms)`. Buckets are emitted
/// by walking the input in order and closing the current bucket when a point's
/// index differs — time-ordered input is a precondition, out-of-order input
/// produces more buckets than expected. Each emitted point carries
/// `usd_oz = mean(bucket)` and the timestamp of the last point encountered in
/// that bucket (recency bias for the visible label). The final partial bucket
/// is always flushed.
///
/// `bucket_ms <= 0` makes partitioning undefined; the input is returned
/// unchanged.
pub fn downsample_avg(points: &[PricePoint], bucket_ms: i64) -> Vec<PricePoint> {
    if points.is_empty() {
        return Vec::new();
    }
    if bucket_ms <= 0 {
        return points.to_vec();
    }

    let mut out = Vec::new();
    let mut current_bucket = (points[0].ts * 1000).div_euclid(bucket_ms);
    let mut sum = 0.0;
    let mut count: usize = 0;
    let mut last_ts = points[0].ts;

    for p in points {
        let bucket = (p.ts * 1000).div_euclid(bucket_ms);
        if bucket != current_bucket {
            out.push(PricePoint {
                ts: last_ts,
                usd_oz: sum / count as f64,
            });
            current_bucket = bucket;
            sum = 0.0;
            count = 0;
        }
        sum += p.usd_oz;
        count += 1;
        last_ts = p.ts;
    }

    if count > 0 {
        out.push(PricePoint {
            ts: last_ts,
            usd_oz: sum / count as f64,
        });
    }
    out
}

/// Find the point whose timestamp is closest to `latest.ts - age_ms`.
///
/// Linear scan keeping the first strictly smaller absolute distance, so an
/// exact tie resolves to the earliest point. Returns `None` for an empty
/// series.
pub fn nearest_by_age(points: &[PricePoint], age_ms: i64) -> Option<&PricePoint> {
    let last = points.last()?;
    let target_ms = last.ts * 1000 - age_ms;

    let mut best = &points[0];
    let mut best_diff = (points[0].ts * 1000 - target_ms).abs();

    for p in points {
        let diff = (p.ts * 1000 - target_ms).abs();
        if diff < best_diff {
            best = p;
            best_diff = diff;
        }
    }
    Some(best)
}

/// Percentage change of the latest point vs. the nearest-by-age baseline.
///
/// `None` when the series has fewer than two points, when the baseline price
/// is zero or non-finite (undefined change, never `Infinity`), or when the
/// result itself is non-finite.
pub fn compute_change_pct(points: &[PricePoint], age_ms: i64) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let latest = points.last()?;
    let reference = nearest_by_age(points, age_ms)?;
    pct_change(reference.usd_oz, latest.usd_oz)
}

/// Percentage change from `from` to `to`, `None` on a zero or non-finite base.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() {
        return None;
    }
    let pct = ((to - from) / from) * 100.0;
    if pct.is_finite() {
        Some(pct)
    } else {
        None
    }
}

/// The canonical chart pipeline: window first, then downsample only when the
/// windowed subsequence is larger than `max_raw_points` (callers usually pass
/// [`MAX_RAW_CHART_POINTS`]). The engine itself stays threshold-agnostic.
pub fn chart_series(points: &[PricePoint], spec: WindowSpec, max_raw_points: usize) -> Vec<PricePoint> {
    let windowed = filter_window(points, spec.duration_ms);
    if windowed.len() > max_raw_points {
        downsample_avg(&windowed, spec.bucket_ms)
    } else {
        windowed
    }
}
