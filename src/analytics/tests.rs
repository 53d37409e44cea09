use super::*;
use crate::config::{Config, DatabaseConfig};
use crate::storage::MockRecordStore;
use crate::types::{MomentumSignal, TrendDirection};
use chrono::{Duration, Utc};

fn test_config() -> Config {
    Config {
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        sentiment: Default::default(),
        analytics: Default::default(),
        alerts: Default::default(),
        text: Default::default(),
        remote_model: None,
    }
}

fn record(keyword: &str, age: Duration, compound: f64, confidence: f64) -> EnsembleRecord {
    let ts = Utc::now() - age;
    EnsembleRecord {
        post_id: format!("p-{}", ts.timestamp_micros()),
        keyword: keyword.to_string(),
        timestamp: ts,
        weighted_compound: compound,
        aggregate_confidence: confidence,
        contributing_models: vec!["lexicon".to_string()],
    }
}

fn engine_with(records: Vec<EnsembleRecord>) -> AnalyticsEngine {
    let mut store = MockRecordStore::new();
    store
        .expect_fetch_ensemble_records()
        .returning(move |_, _, _| Ok(records.clone()));
    AnalyticsEngine::new(Arc::new(store), test_config())
}

#[tokio::test]
async fn empty_keyword_is_rejected() {
    let engine = engine_with(Vec::new());
    let err = engine.analyze_trend("   ", 24).await.unwrap_err();
    assert!(matches!(err, MonitorError::Validation(_)));
}

#[tokio::test]
async fn non_positive_period_is_rejected() {
    let engine = engine_with(Vec::new());
    assert!(engine.analyze_trend("acme", 0).await.is_err());
    assert!(engine.calculate_momentum("acme", -3).await.is_err());
}

#[tokio::test]
async fn comparison_requires_keywords() {
    let engine = engine_with(Vec::new());
    assert!(engine.compare_keywords(&[], 24).await.is_err());
}

#[tokio::test]
async fn rising_records_produce_an_improving_trend() {
    // One record per hour, steadily climbing toward now.
    let records: Vec<EnsembleRecord> = (0..6)
        .map(|i| {
            record(
                "acme",
                Duration::hours(6 - i) - Duration::minutes(30),
                -0.4 + 0.15 * i as f64,
                0.9,
            )
        })
        .collect();
    let engine = engine_with(records);

    let trend = engine.analyze_trend("acme", 8).await.unwrap();
    assert_eq!(trend.direction, TrendDirection::Improving);
    assert_eq!(trend.data_points, 6);
    assert!(trend.sentiment_change > 0.0);
}

#[tokio::test]
async fn low_confidence_records_are_filtered_out() {
    let records = vec![
        record("acme", Duration::minutes(90), 0.8, 0.9),
        record("acme", Duration::minutes(30), -0.9, 0.1),
    ];
    let engine = engine_with(records);

    let report = engine.generate_insights("acme", 4).await.unwrap();
    // The low-confidence reading never enters the summary.
    assert_eq!(report.summary.total_posts, 1);
    assert!((report.summary.avg_sentiment.unwrap() - 0.8).abs() < 1e-12);
}

#[tokio::test]
async fn insights_degrade_gracefully_without_data() {
    let engine = engine_with(Vec::new());

    let report = engine.generate_insights("acme", 24).await.unwrap();
    assert_eq!(report.summary.total_posts, 0);
    assert!(report.summary.avg_sentiment.is_none());
    assert_eq!(report.trend.direction, TrendDirection::Stable);
    assert_eq!(report.trend.confidence, 0.0);
    assert_eq!(report.momentum.signal, MomentumSignal::Neutral);
    assert!(report.volume_correlation.correlation.is_none());
    assert!(report.volume_correlation.volume_trend.is_none());
    assert!(report.anomalies.is_empty());
    assert!(report.alerts.is_empty());
    // Low data volume is itself a finding.
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("widen the window")));
}

#[tokio::test]
async fn insights_include_the_volume_correlation_section() {
    // Volume climbs with sentiment hour over hour. Timestamps are pinned
    // inside epoch-aligned hourly buckets so no group straddles a boundary.
    let current_bucket = Utc::now().timestamp().div_euclid(3600) * 3600;
    let records: Vec<EnsembleRecord> = (0..4i64)
        .flat_map(|hour| {
            let bucket_start = current_bucket - (4 - hour) * 3600;
            (0..=hour).map(move |j| {
                let ts = chrono::DateTime::from_timestamp(bucket_start + 600 + j * 60, 0)
                    .unwrap();
                EnsembleRecord {
                    post_id: format!("p-{hour}-{j}"),
                    keyword: "acme".to_string(),
                    timestamp: ts,
                    weighted_compound: 0.1 + 0.1 * hour as f64,
                    aggregate_confidence: 0.9,
                    contributing_models: vec!["lexicon".to_string()],
                }
            })
        })
        .collect();
    let engine = engine_with(records);

    let report = engine.generate_insights("acme", 8).await.unwrap();
    let vc = &report.volume_correlation;
    assert!((vc.correlation.unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(
        vc.strength,
        Some(crate::types::CorrelationStrength::Strong)
    );
    assert_eq!(vc.volume_trend, Some(crate::types::VolumeTrend::Increasing));
}

#[tokio::test]
async fn insights_fire_alerts_on_negative_volume_spikes() {
    let records: Vec<EnsembleRecord> = (0..15)
        .map(|i| record("acme", Duration::minutes(10 + i * 5), -0.85, 0.9))
        .collect();
    let engine = engine_with(records);

    let report = engine.generate_insights("acme", 4).await.unwrap();
    assert_eq!(report.summary.total_posts, 15);
    assert!(report.alerts.len() >= 2);
    assert!(report
        .alerts
        .iter()
        .any(|a| a.kind == crate::alerts::AlertKind::SentimentThreshold));
    assert!(report
        .alerts
        .iter()
        .any(|a| a.kind == crate::alerts::AlertKind::VolumeSpike));
}

#[tokio::test]
async fn comparison_fetches_each_keyword() {
    let mut store = MockRecordStore::new();
    store
        .expect_fetch_ensemble_records()
        .times(2)
        .returning(|keyword, _, _| {
            let records = match keyword {
                "acme" => vec![
                    record("acme", Duration::minutes(30), 0.6, 0.9),
                    record("acme", Duration::minutes(40), 0.4, 0.9),
                ],
                _ => vec![record("widgets", Duration::minutes(30), -0.2, 0.9)],
            };
            Ok(records)
        });
    let engine = AnalyticsEngine::new(Arc::new(store), test_config());

    let result = engine
        .compare_keywords(&["acme".to_string(), "widgets".to_string()], 4)
        .await
        .unwrap();

    assert_eq!(result.best_by_sentiment.as_deref(), Some("acme"));
    assert_eq!(result.worst_by_sentiment.as_deref(), Some("widgets"));
    assert_eq!(result.best_by_volume.as_deref(), Some("acme"));
    assert_eq!(result.ranking[0].total_volume, 2);
}

#[tokio::test]
async fn store_errors_propagate() {
    let mut store = MockRecordStore::new();
    store
        .expect_fetch_ensemble_records()
        .returning(|_, _, _| Err(MonitorError::Internal("disk gone".to_string())));
    let engine = AnalyticsEngine::new(Arc::new(store), test_config());

    assert!(engine.analyze_trend("acme", 24).await.is_err());
}
