use super::*;
use chrono::{Duration, TimeZone};

async fn temp_db() -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::connect(path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

fn record(keyword: &str, ts: DateTime<Utc>, compound: f64, confidence: f64) -> EnsembleRecord {
    EnsembleRecord {
        post_id: format!("p-{}-{}", keyword, ts.timestamp()),
        keyword: keyword.to_string(),
        timestamp: ts,
        weighted_compound: compound,
        aggregate_confidence: confidence,
        contributing_models: vec!["lexicon".to_string(), "openai".to_string()],
    }
}

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap()
}

#[tokio::test]
async fn keyword_upsert_and_listing() {
    let (db, _dir) = temp_db().await;

    db.upsert_keyword("acme").await.unwrap();
    db.upsert_keyword("widgets").await.unwrap();
    db.upsert_keyword("acme").await.unwrap();

    let keywords = db.fetch_keywords(true).await.unwrap();
    assert_eq!(keywords, vec!["acme", "widgets"]);

    db.deactivate_keyword("acme").await.unwrap();
    assert_eq!(db.fetch_keywords(true).await.unwrap(), vec!["widgets"]);
    assert_eq!(
        db.fetch_keywords(false).await.unwrap(),
        vec!["acme", "widgets"]
    );

    // Re-adding reactivates.
    db.upsert_keyword("acme").await.unwrap();
    assert_eq!(
        db.fetch_keywords(true).await.unwrap(),
        vec!["acme", "widgets"]
    );
}

#[tokio::test]
async fn duplicate_posts_are_ignored() {
    let (db, _dir) = temp_db().await;
    let post = crate::types::RawPost {
        external_id: "x1".to_string(),
        platform: "reddit".to_string(),
        keyword: "acme".to_string(),
        title: None,
        content: "hello".to_string(),
        author: None,
        posted_at: at(10),
        engagement: 5,
    };

    assert!(db.insert_post(&post).await.unwrap());
    assert!(!db.insert_post(&post).await.unwrap());
}

#[tokio::test]
async fn records_roundtrip_with_window_filter_and_ordering() {
    let (db, _dir) = temp_db().await;

    db.insert_record(&record("acme", at(12), 0.3, 0.8)).await.unwrap();
    db.insert_record(&record("acme", at(9), -0.2, 0.7)).await.unwrap();
    db.insert_record(&record("acme", at(15), 0.5, 0.9)).await.unwrap();
    db.insert_record(&record("other", at(12), 0.9, 0.9)).await.unwrap();

    let fetched = db
        .fetch_ensemble_records("acme", at(9), at(15))
        .await
        .unwrap();

    // End of window is exclusive and the other keyword never appears.
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].timestamp, at(9));
    assert_eq!(fetched[1].timestamp, at(12));
    assert!((fetched[1].weighted_compound - 0.3).abs() < 1e-12);
    assert_eq!(
        fetched[0].contributing_models,
        vec!["lexicon".to_string(), "openai".to_string()]
    );
}

#[tokio::test]
async fn per_model_scores_roundtrip_and_replace() {
    let (db, _dir) = temp_db().await;

    let mut lexicon = ScoredPost {
        post_id: "x1".to_string(),
        keyword: "acme".to_string(),
        timestamp: at(10),
        compound_score: 0.4,
        confidence: 0.4,
        model_name: "lexicon".to_string(),
        volume_weight: 1.0,
    };
    let openai = ScoredPost {
        model_name: "openai".to_string(),
        compound_score: 0.6,
        confidence: 0.8,
        ..lexicon.clone()
    };
    db.insert_model_score(&lexicon).await.unwrap();
    db.insert_model_score(&openai).await.unwrap();

    // Rescoring replaces the same model's row instead of duplicating it.
    lexicon.compound_score = 0.5;
    db.insert_model_score(&lexicon).await.unwrap();

    let fetched = db.fetch_model_scores("x1").await.unwrap();
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].model_name, "lexicon");
    assert!((fetched[0].compound_score - 0.5).abs() < 1e-12);
    assert_eq!(fetched[1].model_name, "openai");
    assert_eq!(fetched[1].timestamp, at(10));
}

#[tokio::test]
async fn rescoring_a_post_replaces_its_record() {
    let (db, _dir) = temp_db().await;

    let mut r = record("acme", at(10), 0.2, 0.6);
    db.insert_record(&r).await.unwrap();
    r.weighted_compound = 0.7;
    db.insert_record(&r).await.unwrap();

    let fetched = db
        .fetch_ensemble_records("acme", at(9), at(11))
        .await
        .unwrap();
    assert_eq!(fetched.len(), 1);
    assert!((fetched[0].weighted_compound - 0.7).abs() < 1e-12);
}

#[tokio::test]
async fn summary_counts_label_bands() {
    let (db, _dir) = temp_db().await;

    db.insert_record(&record("acme", at(9), 0.5, 0.8)).await.unwrap();
    db.insert_record(&record("acme", at(10), 0.3, 0.8)).await.unwrap();
    db.insert_record(&record("acme", at(11), -0.4, 0.6)).await.unwrap();
    db.insert_record(&record("acme", at(12), 0.05, 0.7)).await.unwrap();

    let summary = db.sentiment_summary("acme", at(8), at(13)).await.unwrap();

    assert_eq!(summary.total_posts, 4);
    assert_eq!(summary.positive_count, 2);
    assert_eq!(summary.negative_count, 1);
    assert_eq!(summary.neutral_count, 1);
    let avg = summary.avg_sentiment.unwrap();
    assert!((avg - 0.1125).abs() < 1e-9);
}

#[tokio::test]
async fn summary_of_empty_window_has_no_averages() {
    let (db, _dir) = temp_db().await;
    let summary = db
        .sentiment_summary("acme", at(1), at(2) + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(summary.total_posts, 0);
    assert!(summary.avg_sentiment.is_none());
    assert!(summary.avg_confidence.is_none());
}

#[tokio::test]
async fn alerts_are_persisted() {
    let (db, _dir) = temp_db().await;
    let alert = crate::alerts::AlertCondition {
        keyword: "acme".to_string(),
        kind: crate::alerts::AlertKind::VolumeSpike,
        severity: crate::alerts::AlertSeverity::Medium,
        message: "unusual volume".to_string(),
        current_value: 25.0,
        threshold_value: 10.0,
    };
    db.save_alert(&alert).await.unwrap();
}
