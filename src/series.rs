// =============================================================================
// PriceSeries — bounded, ordered historical log for one instrument
// =============================================================================
//
// One series holds the full retained history of `(ts, usd_oz)` observations
// for a single metal, ascending by timestamp with unique timestamps. Only the
// two operations here mutate a series:
//
//   append — at most one point per sampling tick (re-running a tick for the
//            same instant is a no-op), invalid prices silently dropped.
//   prune  — age cutoff first, then oldest-truncation down to the point cap.
//
// Both preserve the ordering invariant. Everything downstream (window
// filtering, change metrics, persistence) treats the series as read-only.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Milliseconds in one day, used by the age cutoff.
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// One observed spot price: unix seconds UTC + USD per troy ounce.
///
/// `ts` and `usd_oz` are the exact field names of the persisted wire format.
/// Derived series (e.g. the gold/silver ratio) reuse `usd_oz` to carry their
/// dimensionless value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: i64,
    pub usd_oz: f64,
}

/// The retained historical log for one metal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// All retained points, oldest first.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }

    /// Append one observation for the current tick. Returns whether the point
    /// was actually stored.
    ///
    /// * Same timestamp as the last stored point — no-op. This is the per-tick
    ///   idempotency contract: re-running an ingestion tick for the same
    ///   sampling instant never creates a duplicate entry.
    /// * Timestamp older than the last stored point — no-op, the ascending
    ///   invariant wins over a clock-skewed caller.
    /// * Non-finite or non-positive price — silently dropped, so a bad
    ///   upstream value never corrupts or shortens the existing history.
    pub fn append(&mut self, candidate: PricePoint) -> bool {
        if let Some(last) = self.points.last() {
            if candidate.ts <= last.ts {
                return false;
            }
        }
        if !candidate.usd_oz.is_finite() || candidate.usd_oz <= 0.0 {
            return false;
        }
        self.points.push(candidate);
        true
    }

    /// Apply the retention policy: drop points older than `max_age_days`
    /// relative to `now_ms`, then keep only the newest `max_points` entries.
    /// Returns the number of points removed.
    pub fn prune(&mut self, now_ms: i64, max_age_days: i64, max_points: usize) -> usize {
        let before = self.points.len();

        let cutoff_ms = now_ms - max_age_days * DAY_MS;
        self.points.retain(|p| p.ts * 1000 >= cutoff_ms);

        if self.points.len() > max_points {
            let excess = self.points.len() - max_points;
            self.points.drain(..excess);
        }

        before - self.points.len()
    }
}

impl From<Vec<PricePoint>> for PriceSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        Self { points }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn point(ts: i64, usd_oz: f64) -> PricePoint {
        PricePoint { ts, usd_oz }
    }

    fn series_at(ts_list: &[i64]) -> PriceSeries {
        let mut s = PriceSeries::new();
        for &ts in ts_list {
            assert!(s.append(point(ts, 100.0 + ts as f64)));
        }
        s
    }

    #[test]
    fn append_to_empty_series() {
        let mut s = PriceSeries::new();
        assert!(s.append(point(1_700_000_000, 1999.5)));
        assert_eq!(s.len(), 1);
        assert_eq!(s.last().unwrap().ts, 1_700_000_000);
    }

    #[test]
    fn append_duplicate_timestamp_is_noop() {
        let mut s = series_at(&[100, 200]);
        let before = s.clone();

        assert!(!s.append(point(200, 9999.0)));
        assert_eq!(s, before);
    }

    #[test]
    fn append_newer_point_grows_by_one_and_stays_ascending() {
        let mut s = series_at(&[100, 200, 300]);
        assert!(s.append(point(400, 123.0)));
        assert_eq!(s.len(), 4);

        let pts = s.points();
        for pair in pts.windows(2) {
            assert!(pair[0].ts < pair[1].ts);
        }
    }

    #[test]
    fn append_rejects_older_timestamp() {
        let mut s = series_at(&[100, 200]);
        assert!(!s.append(point(150, 50.0)));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn append_drops_invalid_prices() {
        let mut s = series_at(&[100]);
        assert!(!s.append(point(200, f64::NAN)));
        assert!(!s.append(point(200, f64::INFINITY)));
        assert!(!s.append(point(200, 0.0)));
        assert!(!s.append(point(200, -3.5)));
        // History untouched, and the slot at ts=200 stays open for a retry.
        assert_eq!(s.len(), 1);
        assert!(s.append(point(200, 42.0)));
    }

    #[test]
    fn prune_drops_points_older_than_max_age() {
        // Points every hour for 10 hours, now at the last point.
        let ts_list: Vec<i64> = (0..10).map(|i| i * 3600).collect();
        let mut s = series_at(&ts_list);
        let now_ms = 9 * 3600 * 1000;

        // Max age of 0 days keeps only points at exactly now or later.
        let removed = s.prune(now_ms, 0, 1000);
        assert_eq!(removed, 9);
        assert_eq!(s.len(), 1);
        assert_eq!(s.last().unwrap().ts, 9 * 3600);
    }

    #[test]
    fn prune_truncates_oldest_beyond_max_points() {
        let ts_list: Vec<i64> = (0..20).map(|i| i * 60).collect();
        let mut s = series_at(&ts_list);

        let removed = s.prune(19 * 60 * 1000, 120, 5);
        assert_eq!(removed, 15);
        assert_eq!(s.len(), 5);
        // Newest five survive, oldest first.
        assert_eq!(s.points()[0].ts, 15 * 60);
        assert_eq!(s.last().unwrap().ts, 19 * 60);
    }

    #[test]
    fn prune_within_budget_removes_nothing() {
        let mut s = series_at(&[0, 60, 120]);
        let removed = s.prune(120_000, 120, 100);
        assert_eq!(removed, 0);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn prune_result_never_exceeds_max_points() {
        let ts_list: Vec<i64> = (0..500).map(|i| i * 300).collect();
        let mut s = series_at(&ts_list);
        s.prune(500 * 300 * 1000, 120, 64);
        assert!(s.len() <= 64);
    }

    #[test]
    fn from_points_roundtrip() {
        let pts = vec![point(1, 10.0), point(2, 11.0)];
        let s = PriceSeries::from(pts.clone());
        assert_eq!(s.points(), pts.as_slice());
        assert_eq!(s.into_points(), pts);
    }
}
