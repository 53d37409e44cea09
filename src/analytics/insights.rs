//! Insight report assembly
//!
//! Folds the individual analyses into one report per keyword and derives
//! plain-language recommendations from them.

use crate::types::{
    AnomalyRecord, AnomalySeverity, MomentumResult, MomentumSignal, SentimentSummary, TrendDirection,
    TrendResult,
};

/// At most this many recommendations per report; the most urgent come first.
const MAX_RECOMMENDATIONS: usize = 5;

/// Derive recommendations from the combined analyses.
pub fn recommendations(
    summary: &SentimentSummary,
    trend: &TrendResult,
    momentum: &MomentumResult,
    anomalies: &[AnomalyRecord],
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(avg) = summary.avg_sentiment {
        if avg < -0.5 {
            out.push(format!(
                "Overall sentiment for '{}' is strongly negative; review recent posts and respond to the main complaints.",
                summary.keyword
            ));
        }
    }

    match trend.direction {
        TrendDirection::Declining if trend.strength > 0.5 => out.push(format!(
            "Sentiment for '{}' is falling quickly (change {:+.2}); identify what changed in this period.",
            summary.keyword, trend.sentiment_change
        )),
        TrendDirection::Declining => out.push(format!(
            "Sentiment for '{}' is drifting downward; keep watching before drawing conclusions.",
            summary.keyword
        )),
        TrendDirection::Improving if trend.strength > 0.5 => out.push(format!(
            "Sentiment for '{}' is improving strongly; this is a good moment to amplify positive coverage.",
            summary.keyword
        )),
        _ => {}
    }

    if momentum.signal == MomentumSignal::Bearish {
        out.push(format!(
            "Short-term momentum for '{}' has turned negative ahead of the longer average.",
            summary.keyword
        ));
    }

    if momentum.volatility > 0.3 {
        out.push(format!(
            "Sentiment for '{}' is highly volatile; single-window readings are unreliable.",
            summary.keyword
        ));
    }

    let severe = anomalies
        .iter()
        .filter(|a| a.severity == AnomalySeverity::High)
        .count();
    if severe > 0 {
        out.push(format!(
            "{severe} severe sentiment spike(s) detected for '{}'; inspect the flagged windows for triggering events.",
            summary.keyword
        ));
    } else if !anomalies.is_empty() {
        out.push(format!(
            "Unusual sentiment movement detected for '{}'; worth a closer look.",
            summary.keyword
        ));
    }

    if summary.total_posts < 5 {
        out.push(format!(
            "Only {} post(s) for '{}' in this period; widen the window for a firmer picture.",
            summary.total_posts, summary.keyword
        ));
    }

    out.truncate(MAX_RECOMMENDATIONS);
    out
}
