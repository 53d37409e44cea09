//! Volume/sentiment correlation within one keyword
//!
//! Measures whether bursts of posting activity coincide with sentiment moves
//! for a single keyword, across its own bucket series. The cross-keyword
//! counterpart lives in `compare`.

use super::compare::pearson;
use crate::types::{Bucket, CorrelationStrength, VolumeCorrelation, VolumeTrend};

/// Correlate post volume against mean sentiment over non-empty buckets.
///
/// With fewer than two non-empty buckets (or zero variance on either axis)
/// the correlation is undefined, not zero; the remaining fields still report
/// what the data supports.
pub fn correlate(keyword: &str, buckets: &[Bucket]) -> VolumeCorrelation {
    let populated: Vec<&Bucket> = buckets.iter().filter(|b| !b.is_empty()).collect();

    let pairs: Vec<(f64, f64)> = populated
        .iter()
        .filter_map(|b| b.mean_sentiment.map(|m| (b.post_count as f64, m)))
        .collect();
    let correlation = pearson(&pairs);
    let strength = correlation.map(|r| {
        if r.abs() > 0.7 {
            CorrelationStrength::Strong
        } else if r.abs() > 0.3 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    });

    let volume_trend = match (populated.first(), populated.last()) {
        (Some(first), Some(last)) if populated.len() >= 2 => {
            Some(if last.post_count > first.post_count {
                VolumeTrend::Increasing
            } else {
                VolumeTrend::Decreasing
            })
        }
        _ => None,
    };

    let peak_volume_window = populated
        .iter()
        .max_by_key(|b| b.post_count)
        .map(|b| b.window_start);
    let peak_sentiment_window = populated
        .iter()
        .filter_map(|b| b.mean_sentiment.map(|m| (b.window_start, m)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(start, _)| start);

    let avg_bucket_volume = if populated.is_empty() {
        0.0
    } else {
        populated.iter().map(|b| b.post_count as f64).sum::<f64>() / populated.len() as f64
    };

    VolumeCorrelation {
        keyword: keyword.to_string(),
        correlation,
        strength,
        volume_trend,
        peak_volume_window,
        peak_sentiment_window,
        avg_bucket_volume,
    }
}
