//! Moving-average momentum
//!
//! Compares a short and a long moving average over the non-empty bucket
//! means. The short average crossing above the long one by more than the
//! configured margin reads as bullish, below as bearish.

use crate::config::AnalyticsConfig;
use crate::types::{Bucket, MomentumResult, MomentumSignal};

/// Compute momentum indicators over a bucket series.
///
/// Empty buckets are skipped; the averages run over whatever non-empty data
/// exists, shrinking the window when the series is shorter than configured.
/// A series with no data at all yields a neutral signal with empty averages.
pub fn calculate(keyword: &str, buckets: &[Bucket], config: &AnalyticsConfig) -> MomentumResult {
    let points: Vec<(chrono::DateTime<chrono::Utc>, f64)> = buckets
        .iter()
        .filter_map(|b| b.mean_sentiment.map(|m| (b.window_start, m)))
        .collect();
    let means: Vec<f64> = points.iter().map(|(_, m)| *m).collect();

    let short_ma = trailing_mean(&means, config.short_window);
    let long_ma = trailing_mean(&means, config.long_window);

    let signal = match (short_ma, long_ma) {
        (Some(short), Some(long)) => {
            let gap = short - long;
            if gap > config.momentum_margin {
                MomentumSignal::Bullish
            } else if gap < -config.momentum_margin {
                MomentumSignal::Bearish
            } else {
                MomentumSignal::Neutral
            }
        }
        _ => MomentumSignal::Neutral,
    };

    let volatility = delta_stddev(&means);

    // Rate of change compares the short MA now against the short MA one
    // non-empty bucket earlier, per hour actually elapsed between those two
    // buckets. Gaps widen the denominator instead of inflating the rate.
    let rate_of_change = match (short_ma, points.len()) {
        (Some(current), n) if n >= 2 => {
            let previous = trailing_mean(&means[..n - 1], config.short_window);
            let elapsed = points[n - 1].0 - points[n - 2].0;
            let hours = elapsed.num_seconds() as f64 / 3600.0;
            match previous {
                Some(prev) if hours > 0.0 => (current - prev) / hours,
                _ => 0.0,
            }
        }
        _ => 0.0,
    };

    MomentumResult {
        keyword: keyword.to_string(),
        short_ma,
        long_ma,
        signal,
        volatility,
        rate_of_change,
    }
}

/// Mean of the trailing `window` values, or all of them when fewer exist.
fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let start = values.len().saturating_sub(window);
    let tail = &values[start..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}

/// Sample standard deviation of consecutive deltas. Zero when the series is
/// too short to have two deltas.
fn delta_stddev(values: &[f64]) -> f64 {
    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    if deltas.len() < 2 {
        return 0.0;
    }
    let n = deltas.len() as f64;
    let mean = deltas.iter().sum::<f64>() / n;
    let var = deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}
