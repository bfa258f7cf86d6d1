// =============================================================================
// Ratio Engine — derived gold/silver style ratio series
// =============================================================================
//
// Joins two stored series by timestamp and divides the prices. The result
// reuses `PricePoint` with `usd_oz` carrying the dimensionless ratio, so the
// window engine applies to it unchanged.

use std::collections::HashMap;

use crate::series::PricePoint;

/// Build a ratio series from two price series.
///
/// Strict join: a ratio point is emitted only for timestamps present in both
/// series, and only when both prices are finite and positive. The output is
/// sorted ascending by timestamp.
pub fn ratio_series(numerator: &[PricePoint], denominator: &[PricePoint]) -> Vec<PricePoint> {
    let denominator_by_ts: HashMap<i64, f64> = denominator
        .iter()
        .filter(|p| p.usd_oz.is_finite() && p.usd_oz > 0.0)
        .map(|p| (p.ts, p.usd_oz))
        .collect();

    let mut out: Vec<PricePoint> = Vec::new();
    for n in numerator {
        if !n.usd_oz.is_finite() || n.usd_oz <= 0.0 {
            continue;
        }
        if let Some(&d) = denominator_by_ts.get(&n.ts) {
            out.push(PricePoint {
                ts: n.ts,
                usd_oz: n.usd_oz / d,
            });
        }
    }

    out.sort_by_key(|p| p.ts);
    out
}

/// Ratio of two latest quotes, e.g. for a dashboard card.
///
/// `None` unless both values are present, finite and positive.
pub fn spot_ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let n = numerator?;
    let d = denominator?;
    if !n.is_finite() || !d.is_finite() || n <= 0.0 || d <= 0.0 {
        return None;
    }
    Some(n / d)
}
