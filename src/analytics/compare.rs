//! Cross-keyword comparison
//!
//! Ranks keywords over a shared window and measures whether attention
//! (post volume) moves with sentiment across them.

use crate::types::{ComparisonResult, KeywordStats};
use std::cmp::Ordering;

/// Rank keyword aggregates and compute the volume/sentiment correlation.
///
/// Keywords with no records in the window sort last but are kept in the
/// ranking so a silent keyword is visible rather than missing.
pub fn compare(mut stats: Vec<KeywordStats>) -> ComparisonResult {
    stats.sort_by(|a, b| {
        match (a.mean_sentiment, b.mean_sentiment) {
            (Some(x), Some(y)) => y
                .partial_cmp(&x)
                .unwrap_or(Ordering::Equal)
                .then(b.total_volume.cmp(&a.total_volume))
                .then(a.keyword.cmp(&b.keyword)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b
                .total_volume
                .cmp(&a.total_volume)
                .then(a.keyword.cmp(&b.keyword)),
        }
    });

    let scored: Vec<&KeywordStats> = stats.iter().filter(|s| s.mean_sentiment.is_some()).collect();

    let best_by_sentiment = scored.first().map(|s| s.keyword.clone());
    let worst_by_sentiment = scored.last().map(|s| s.keyword.clone());

    let mut by_volume: Vec<&KeywordStats> = stats.iter().collect();
    by_volume.sort_by(|a, b| {
        b.total_volume
            .cmp(&a.total_volume)
            .then(a.keyword.cmp(&b.keyword))
    });
    let best_by_volume = by_volume.first().map(|s| s.keyword.clone());
    let worst_by_volume = by_volume.last().map(|s| s.keyword.clone());

    let volume_sentiment_correlation = pearson(
        &scored
            .iter()
            .map(|s| (s.total_volume as f64, s.mean_sentiment.unwrap_or(0.0)))
            .collect::<Vec<_>>(),
    );

    ComparisonResult {
        ranking: stats,
        best_by_sentiment,
        worst_by_sentiment,
        best_by_volume,
        worst_by_volume,
        volume_sentiment_correlation,
    }
}

/// Pearson correlation over (x, y) pairs. None when undefined: fewer than
/// two pairs, or zero variance on either axis.
pub(crate) fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < f64::EPSILON || var_y < f64::EPSILON {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
