//! Core data types shared across the scoring and analytics pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A collected post before any scoring has happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPost {
    /// Platform-assigned post ID
    pub external_id: String,
    /// Source platform name (e.g. "reddit", "hackernews")
    pub platform: String,
    /// Tracked keyword this post matched
    pub keyword: String,
    pub title: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub posted_at: DateTime<Utc>,
    /// Upvotes, points, or similar engagement count
    #[serde(default)]
    pub engagement: i64,
}

impl RawPost {
    /// Title and body joined for scoring.
    pub fn full_text(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => format!("{}. {}", title, self.content),
            _ => self.content.clone(),
        }
    }
}

/// One model's sentiment reading for one post. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPost {
    pub post_id: String,
    pub keyword: String,
    pub timestamp: DateTime<Utc>,
    /// Overall sentiment in [-1, 1]
    pub compound_score: f64,
    /// Model's self-reported certainty in [0, 1]
    pub confidence: f64,
    pub model_name: String,
    /// Engagement-derived weight for volume analytics
    pub volume_weight: f64,
}

/// The single combined sentiment reading for one post after merging all
/// contributing model outputs. Absent entirely when no model responded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleRecord {
    pub post_id: String,
    pub keyword: String,
    pub timestamp: DateTime<Utc>,
    /// Confidence- and weight-adjusted compound score in [-1, 1]
    pub weighted_compound: f64,
    /// Weighted mean of contributing confidences in [0, 1]
    pub aggregate_confidence: f64,
    /// Names of models that contributed, sorted for determinism
    pub contributing_models: Vec<String>,
}

/// Discrete sentiment label derived from a compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

/// A fixed-width time window over one keyword's ensemble records.
///
/// Empty windows are retained with `post_count == 0` and no mean so the
/// series stays evenly spaced for regression and moving averages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub keyword: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub mean_sentiment: Option<f64>,
    pub post_count: usize,
    pub score_stddev: Option<f64>,
}

impl Bucket {
    pub fn is_empty(&self) -> bool {
        self.post_count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Result of regression-based trend classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub keyword: String,
    pub period_hours: i64,
    pub direction: TrendDirection,
    /// Clipped to [0, 1]
    pub strength: f64,
    /// Last minus first non-empty bucket mean
    pub sentiment_change: f64,
    /// Goodness of fit; 0 when the fit is undefined
    pub confidence: f64,
    /// Non-empty buckets that entered the regression
    pub data_points: usize,
    pub r_squared: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumSignal {
    Bullish,
    Bearish,
    Neutral,
}

/// Moving-average momentum indicators for one keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumResult {
    pub keyword: String,
    /// None when the series has no non-empty buckets
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub signal: MomentumSignal,
    /// Sample stddev of bucket-to-bucket sentiment deltas
    pub volatility: f64,
    /// Change in the short MA per hour
    pub rate_of_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyDirection {
    SpikePositive,
    SpikeNegative,
}

/// A bucket whose sentiment deviates from its rolling local mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub keyword: String,
    pub window_start: DateTime<Utc>,
    pub z_score: f64,
    pub severity: AnomalySeverity,
    pub direction: AnomalyDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
}

/// How post volume moves with sentiment within one keyword's bucket series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeCorrelation {
    pub keyword: String,
    /// Pearson coefficient over (post_count, mean_sentiment) per non-empty
    /// bucket; None when undefined
    pub correlation: Option<f64>,
    pub strength: Option<CorrelationStrength>,
    /// Last non-empty bucket's volume versus the first's; None below two
    /// non-empty buckets
    pub volume_trend: Option<VolumeTrend>,
    pub peak_volume_window: Option<DateTime<Utc>>,
    pub peak_sentiment_window: Option<DateTime<Utc>>,
    /// Mean post count over non-empty buckets
    pub avg_bucket_volume: f64,
}

/// Per-keyword aggregate used for cross-keyword ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordStats {
    pub keyword: String,
    /// None when the keyword had no records in the window
    pub mean_sentiment: Option<f64>,
    pub total_volume: usize,
}

/// Side-by-side ranking of keywords over a shared window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Sorted by mean sentiment desc, volume desc, then keyword
    pub ranking: Vec<KeywordStats>,
    pub best_by_sentiment: Option<String>,
    pub worst_by_sentiment: Option<String>,
    pub best_by_volume: Option<String>,
    pub worst_by_volume: Option<String>,
    /// Pearson coefficient across keywords; None when undefined
    pub volume_sentiment_correlation: Option<f64>,
}

/// Aggregate statistics for one keyword over a window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub keyword: String,
    pub total_posts: usize,
    pub avg_sentiment: Option<f64>,
    pub avg_confidence: Option<f64>,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
}

/// Composite per-keyword report merging all sub-analyses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub keyword: String,
    pub period_hours: i64,
    pub generated_at: DateTime<Utc>,
    pub summary: SentimentSummary,
    pub trend: TrendResult,
    pub momentum: MomentumResult,
    pub volume_correlation: VolumeCorrelation,
    pub anomalies: Vec<AnomalyRecord>,
    pub alerts: Vec<crate::alerts::AlertCondition>,
    pub recommendations: Vec<String>,
}
