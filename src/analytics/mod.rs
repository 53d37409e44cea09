//! Analytics over stored ensemble records
//!
//! The [`AnalyticsEngine`] is the only entry point: it validates inputs,
//! fetches each keyword's records exactly once per operation, and hands the
//! resulting bucket series to the pure analysis functions in the submodules.

pub mod anomaly;
pub mod compare;
pub mod insights;
pub mod momentum;
pub mod series;
pub mod trend;
pub mod volume;

#[cfg(test)]
mod tests;

pub use series::TimeSeriesAggregator;

use crate::alerts;
use crate::config::Config;
use crate::error::{MonitorError, Result};
use crate::storage::RecordStore;
use crate::types::{
    AnomalyRecord, Bucket, ComparisonResult, EnsembleRecord, InsightReport, KeywordStats,
    MomentumResult, SentimentSummary, TrendResult, VolumeCorrelation,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Facade over all analytics operations for a configured store.
pub struct AnalyticsEngine {
    store: Arc<dyn RecordStore>,
    config: Config,
}

/// One keyword's records and derived bucket series, fetched once so every
/// analysis within an operation sees identical data.
struct Snapshot {
    records: Vec<EnsembleRecord>,
    buckets: Vec<Bucket>,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self { store, config }
    }

    /// Regression trend over the last `hours`.
    pub async fn analyze_trend(&self, keyword: &str, hours: i64) -> Result<TrendResult> {
        let keyword = validate_keyword(keyword)?;
        let lookback = validate_hours(hours)?;
        let snapshot = self.snapshot(keyword, Utc::now(), lookback).await?;
        Ok(trend::analyze(
            keyword,
            &snapshot.buckets,
            hours,
            &self.config.analytics,
        ))
    }

    /// Moving-average momentum over the last `hours`.
    pub async fn calculate_momentum(&self, keyword: &str, hours: i64) -> Result<MomentumResult> {
        let keyword = validate_keyword(keyword)?;
        let lookback = validate_hours(hours)?;
        let snapshot = self.snapshot(keyword, Utc::now(), lookback).await?;
        Ok(momentum::calculate(
            keyword,
            &snapshot.buckets,
            &self.config.analytics,
        ))
    }

    /// Rolling z-score anomalies over the last `hours`.
    pub async fn detect_anomalies(&self, keyword: &str, hours: i64) -> Result<Vec<AnomalyRecord>> {
        let keyword = validate_keyword(keyword)?;
        let lookback = validate_hours(hours)?;
        let snapshot = self.snapshot(keyword, Utc::now(), lookback).await?;
        Ok(anomaly::detect(
            keyword,
            &snapshot.buckets,
            &self.config.analytics,
        ))
    }

    /// Volume/sentiment correlation within one keyword over the last `hours`.
    pub async fn analyze_volume_correlation(
        &self,
        keyword: &str,
        hours: i64,
    ) -> Result<VolumeCorrelation> {
        let keyword = validate_keyword(keyword)?;
        let lookback = validate_hours(hours)?;
        let snapshot = self.snapshot(keyword, Utc::now(), lookback).await?;
        Ok(volume::correlate(keyword, &snapshot.buckets))
    }

    /// Rank several keywords over a shared window.
    pub async fn compare_keywords(
        &self,
        keywords: &[String],
        hours: i64,
    ) -> Result<ComparisonResult> {
        let lookback = validate_hours(hours)?;
        if keywords.is_empty() {
            return Err(MonitorError::Validation(
                "at least one keyword is required".to_string(),
            ));
        }

        let now = Utc::now();
        let mut stats = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let keyword = validate_keyword(keyword)?;
            let snapshot = self.snapshot(keyword, now, lookback).await?;
            let n = snapshot.records.len();
            let mean = (n > 0).then(|| {
                snapshot
                    .records
                    .iter()
                    .map(|r| r.weighted_compound)
                    .sum::<f64>()
                    / n as f64
            });
            stats.push(KeywordStats {
                keyword: keyword.to_string(),
                mean_sentiment: mean,
                total_volume: n,
            });
        }

        Ok(compare::compare(stats))
    }

    /// Full report for one keyword: summary, trend, momentum, anomalies,
    /// alerts, and recommendations, all computed from one snapshot.
    pub async fn generate_insights(&self, keyword: &str, hours: i64) -> Result<InsightReport> {
        let keyword = validate_keyword(keyword)?;
        let lookback = validate_hours(hours)?;
        let now = Utc::now();
        let snapshot = self.snapshot(keyword, now, lookback).await?;

        let summary = summarize(keyword, &snapshot.records);
        let trend = trend::analyze(keyword, &snapshot.buckets, hours, &self.config.analytics);
        let momentum = momentum::calculate(keyword, &snapshot.buckets, &self.config.analytics);
        let volume_correlation = volume::correlate(keyword, &snapshot.buckets);
        let anomalies = anomaly::detect(keyword, &snapshot.buckets, &self.config.analytics);

        let alerts = alerts::check(
            &self.config.alerts,
            keyword,
            summary.avg_sentiment,
            summary.total_posts,
            trend.sentiment_change,
        );

        let recommendations =
            insights::recommendations(&summary, &trend, &momentum, &anomalies);

        Ok(InsightReport {
            keyword: keyword.to_string(),
            period_hours: hours,
            generated_at: now,
            summary,
            trend,
            momentum,
            volume_correlation,
            anomalies,
            alerts,
            recommendations,
        })
    }

    async fn snapshot(
        &self,
        keyword: &str,
        now: DateTime<Utc>,
        lookback: Duration,
    ) -> Result<Snapshot> {
        let aggregator = TimeSeriesAggregator::new(self.config.analytics.bucket_width_secs);
        // Fetch over the aligned grid, not the raw lookback, so records in
        // the partially elapsed current bucket are included.
        let (start, end) = aggregator.grid_bounds(now, lookback);

        let records = self
            .store
            .fetch_ensemble_records(keyword, start, end)
            .await?;

        let min_confidence = self.config.sentiment.min_confidence;
        let records: Vec<EnsembleRecord> = records
            .into_iter()
            .filter(|r| r.aggregate_confidence >= min_confidence)
            .collect();

        let buckets = aggregator.aggregate(keyword, &records, now, lookback);
        Ok(Snapshot { records, buckets })
    }
}

fn validate_keyword(keyword: &str) -> Result<&str> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return Err(MonitorError::Validation(
            "keyword must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

fn validate_hours(hours: i64) -> Result<Duration> {
    if hours <= 0 {
        return Err(MonitorError::Validation(format!(
            "analysis period must be positive, got {hours}"
        )));
    }
    Ok(Duration::hours(hours))
}

/// Aggregate summary over confidence-filtered records.
fn summarize(keyword: &str, records: &[EnsembleRecord]) -> SentimentSummary {
    let n = records.len();
    if n == 0 {
        return SentimentSummary {
            keyword: keyword.to_string(),
            ..SentimentSummary::default()
        };
    }

    let mut positive = 0;
    let mut negative = 0;
    let mut sentiment_sum = 0.0;
    let mut confidence_sum = 0.0;
    for r in records {
        if r.weighted_compound > 0.1 {
            positive += 1;
        } else if r.weighted_compound < -0.1 {
            negative += 1;
        }
        sentiment_sum += r.weighted_compound;
        confidence_sum += r.aggregate_confidence;
    }

    SentimentSummary {
        keyword: keyword.to_string(),
        total_posts: n,
        avg_sentiment: Some(sentiment_sum / n as f64),
        avg_confidence: Some(confidence_sum / n as f64),
        positive_count: positive,
        negative_count: negative,
        neutral_count: n - positive - negative,
    }
}
