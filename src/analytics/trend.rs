//! Trend classification via least-squares regression
//!
//! Fits a line through the non-empty bucket means (bucket index as the x
//! axis) and reads the direction off the slope. The fit's r-squared doubles
//! as the confidence of the classification.

use crate::config::AnalyticsConfig;
use crate::types::{Bucket, TrendDirection, TrendResult};

/// Classify the sentiment trend over a bucket series.
///
/// Fewer than two non-empty buckets cannot support a fit; the result is
/// stable with zero strength and confidence rather than an error.
pub fn analyze(
    keyword: &str,
    buckets: &[Bucket],
    period_hours: i64,
    config: &AnalyticsConfig,
) -> TrendResult {
    let points: Vec<(f64, f64)> = buckets
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.mean_sentiment.map(|m| (i as f64, m)))
        .collect();

    let n = points.len();
    if n < 2 {
        return TrendResult {
            keyword: keyword.to_string(),
            period_hours,
            direction: TrendDirection::Stable,
            strength: 0.0,
            sentiment_change: 0.0,
            confidence: 0.0,
            data_points: n,
            r_squared: 0.0,
        };
    }

    let (slope, r_squared) = linear_fit(&points);

    let direction = if slope > config.trend_epsilon {
        TrendDirection::Improving
    } else if slope < -config.trend_epsilon {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    let strength = (slope.abs() * n as f64 / config.strength_norm).min(1.0);
    let sentiment_change = points[n - 1].1 - points[0].1;

    TrendResult {
        keyword: keyword.to_string(),
        period_hours,
        direction,
        strength,
        sentiment_change,
        confidence: r_squared,
        data_points: n,
        r_squared,
    }
}

/// Ordinary least squares over (x, y) pairs. Returns (slope, r_squared).
///
/// A series with no y variance fits a flat line exactly but carries no
/// explanatory power; both values come back zero.
fn linear_fit(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let mean_x: f64 = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y: f64 = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    for (x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        ss_xy += dx * dy;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
    }

    if ss_xx < f64::EPSILON || ss_yy < f64::EPSILON {
        return (0.0, 0.0);
    }

    let slope = ss_xy / ss_xx;
    let r_squared = (ss_xy * ss_xy) / (ss_xx * ss_yy);
    (slope, r_squared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(means: &[Option<f64>]) -> Vec<Bucket> {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        means
            .iter()
            .enumerate()
            .map(|(i, mean)| Bucket {
                keyword: "acme".to_string(),
                window_start: base + Duration::hours(i as i64),
                window_end: base + Duration::hours(i as i64 + 1),
                mean_sentiment: *mean,
                post_count: if mean.is_some() { 3 } else { 0 },
                score_stddev: None,
            })
            .collect()
    }

    #[test]
    fn monotonic_rise_is_improving_with_tight_fit() {
        let buckets = series(&[Some(-0.5), Some(-0.2), Some(0.1), Some(0.4)]);
        let result = analyze("acme", &buckets, 4, &AnalyticsConfig::default());

        assert_eq!(result.direction, TrendDirection::Improving);
        assert!(result.r_squared > 0.999);
        assert!((result.sentiment_change - 0.9).abs() < 1e-12);
        assert_eq!(result.data_points, 4);
        assert!(result.strength > 0.0);
    }

    #[test]
    fn monotonic_fall_is_declining() {
        let buckets = series(&[Some(0.4), Some(0.1), Some(-0.2), Some(-0.5)]);
        let result = analyze("acme", &buckets, 4, &AnalyticsConfig::default());
        assert_eq!(result.direction, TrendDirection::Declining);
        assert!((result.sentiment_change + 0.9).abs() < 1e-12);
    }

    #[test]
    fn flat_series_is_stable_with_zero_confidence() {
        let buckets = series(&[Some(0.2), Some(0.2), Some(0.2), Some(0.2)]);
        let result = analyze("acme", &buckets, 4, &AnalyticsConfig::default());

        assert_eq!(result.direction, TrendDirection::Stable);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.r_squared, 0.0);
        assert_eq!(result.strength, 0.0);
    }

    #[test]
    fn single_point_cannot_support_a_fit() {
        let buckets = series(&[None, Some(0.3), None]);
        let result = analyze("acme", &buckets, 3, &AnalyticsConfig::default());

        assert_eq!(result.direction, TrendDirection::Stable);
        assert_eq!(result.data_points, 1);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn empty_buckets_are_skipped_not_zeroed() {
        // Gaps must not drag the fit toward zero.
        let buckets = series(&[Some(0.1), None, Some(0.3), None, Some(0.5)]);
        let result = analyze("acme", &buckets, 5, &AnalyticsConfig::default());

        assert_eq!(result.direction, TrendDirection::Improving);
        assert_eq!(result.data_points, 3);
        assert!((result.sentiment_change - 0.4).abs() < 1e-12);
    }

    #[test]
    fn strength_is_clipped_to_one() {
        let buckets = series(&[Some(-1.0), Some(-0.3), Some(0.3), Some(1.0)]);
        let mut config = AnalyticsConfig::default();
        config.strength_norm = 0.01;
        let result = analyze("acme", &buckets, 4, &config);
        assert_eq!(result.strength, 1.0);
    }

    #[test]
    fn slope_within_epsilon_is_stable() {
        let buckets = series(&[Some(0.2000), Some(0.2001), Some(0.2002)]);
        let result = analyze("acme", &buckets, 3, &AnalyticsConfig::default());
        assert_eq!(result.direction, TrendDirection::Stable);
    }
}
