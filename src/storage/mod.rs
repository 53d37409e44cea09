//! SQLite persistence
//!
//! Posts, ensemble records, keywords, and fired alerts live in one SQLite
//! file. Timestamps are stored as RFC 3339 text and contributing model
//! lists as JSON text, keeping the schema portable and inspectable.

use crate::error::{MonitorError, Result};
use crate::types::{EnsembleRecord, RawPost, ScoredPost, SentimentSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

#[cfg(test)]
mod tests;

/// Read interface the analytics engine depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ensemble records for one keyword within [start, end), oldest first.
    async fn fetch_ensemble_records(
        &self,
        keyword: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EnsembleRecord>>;

    /// Tracked keywords, optionally only the active ones.
    async fn fetch_keywords(&self, active_only: bool) -> Result<Vec<String>>;
}

/// SQLite-backed store.
pub struct Database {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct EnsembleRow {
    post_id: String,
    keyword: String,
    timestamp: String,
    weighted_compound: f64,
    aggregate_confidence: f64,
    contributing_models: String,
}

impl TryFrom<EnsembleRow> for EnsembleRecord {
    type Error = MonitorError;

    fn try_from(row: EnsembleRow) -> Result<Self> {
        Ok(EnsembleRecord {
            post_id: row.post_id,
            keyword: row.keyword,
            timestamp: DateTime::parse_from_rfc3339(&row.timestamp)
                .map_err(|e| MonitorError::Internal(format!("bad stored timestamp: {e}")))?
                .with_timezone(&Utc),
            weighted_compound: row.weighted_compound,
            aggregate_confidence: row.aggregate_confidence,
            contributing_models: serde_json::from_str(&row.contributing_models)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ModelScoreRow {
    post_id: String,
    keyword: String,
    timestamp: String,
    compound_score: f64,
    confidence: f64,
    model_name: String,
    volume_weight: f64,
}

impl TryFrom<ModelScoreRow> for ScoredPost {
    type Error = MonitorError;

    fn try_from(row: ModelScoreRow) -> Result<Self> {
        Ok(ScoredPost {
            post_id: row.post_id,
            keyword: row.keyword,
            timestamp: DateTime::parse_from_rfc3339(&row.timestamp)
                .map_err(|e| MonitorError::Internal(format!("bad stored timestamp: {e}")))?
                .with_timezone(&Utc),
            compound_score: row.compound_score,
            confidence: row.confidence,
            model_name: row.model_name,
            volume_weight: row.volume_weight,
        })
    }
}

impl Database {
    /// Open (and create if needed) the database at `path` and migrate it.
    pub async fn connect(path: &str) -> Result<Self> {
        let url = format!("sqlite:{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS keywords (
                keyword TEXT PRIMARY KEY,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                keyword TEXT NOT NULL,
                title TEXT,
                content TEXT NOT NULL,
                author TEXT,
                posted_at TEXT NOT NULL,
                engagement INTEGER NOT NULL DEFAULT 0,
                UNIQUE(platform, external_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ensemble_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id TEXT NOT NULL,
                keyword TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                weighted_compound REAL NOT NULL,
                aggregate_confidence REAL NOT NULL,
                contributing_models TEXT NOT NULL,
                UNIQUE(post_id, keyword)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_records_keyword_time
            ON ensemble_records (keyword, timestamp)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS model_scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id TEXT NOT NULL,
                keyword TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                compound_score REAL NOT NULL,
                confidence REAL NOT NULL,
                model_name TEXT NOT NULL,
                volume_weight REAL NOT NULL,
                UNIQUE(post_id, model_name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                keyword TEXT NOT NULL,
                kind TEXT NOT NULL,
                severity TEXT NOT NULL,
                message TEXT NOT NULL,
                current_value REAL NOT NULL,
                threshold_value REAL NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Track a keyword, re-activating it if previously deactivated.
    pub async fn upsert_keyword(&self, keyword: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO keywords (keyword, active, created_at)
            VALUES (?1, 1, ?2)
            ON CONFLICT(keyword) DO UPDATE SET active = 1
            "#,
        )
        .bind(keyword)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn deactivate_keyword(&self, keyword: &str) -> Result<()> {
        sqlx::query("UPDATE keywords SET active = 0 WHERE keyword = ?1")
            .bind(keyword)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert a post; duplicates by (platform, external_id) are ignored.
    /// Returns whether a row was actually written.
    pub async fn insert_post(&self, post: &RawPost) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO posts
                (external_id, platform, keyword, title, content, author, posted_at, engagement)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&post.external_id)
        .bind(&post.platform)
        .bind(&post.keyword)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.posted_at.to_rfc3339())
        .bind(post.engagement)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert or replace the ensemble record for one post.
    pub async fn insert_record(&self, record: &EnsembleRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ensemble_records
                (post_id, keyword, timestamp, weighted_compound,
                 aggregate_confidence, contributing_models)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(post_id, keyword) DO UPDATE SET
                weighted_compound = excluded.weighted_compound,
                aggregate_confidence = excluded.aggregate_confidence,
                contributing_models = excluded.contributing_models
            "#,
        )
        .bind(&record.post_id)
        .bind(&record.keyword)
        .bind(record.timestamp.to_rfc3339())
        .bind(record.weighted_compound)
        .bind(record.aggregate_confidence)
        .bind(serde_json::to_string(&record.contributing_models)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert or replace one model's reading for a post. Kept alongside the
    /// combined record so individual models stay auditable after the fact.
    pub async fn insert_model_score(&self, score: &ScoredPost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO model_scores
                (post_id, keyword, timestamp, compound_score, confidence,
                 model_name, volume_weight)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(post_id, model_name) DO UPDATE SET
                compound_score = excluded.compound_score,
                confidence = excluded.confidence,
                volume_weight = excluded.volume_weight
            "#,
        )
        .bind(&score.post_id)
        .bind(&score.keyword)
        .bind(score.timestamp.to_rfc3339())
        .bind(score.compound_score)
        .bind(score.confidence)
        .bind(&score.model_name)
        .bind(score.volume_weight)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Every model's reading for one post, ordered by model name.
    pub async fn fetch_model_scores(&self, post_id: &str) -> Result<Vec<ScoredPost>> {
        let rows: Vec<ModelScoreRow> = sqlx::query_as(
            r#"
            SELECT post_id, keyword, timestamp, compound_score, confidence,
                   model_name, volume_weight
            FROM model_scores
            WHERE post_id = ?1
            ORDER BY model_name ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ScoredPost::try_from).collect()
    }

    pub async fn save_alert(&self, alert: &crate::alerts::AlertCondition) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO alerts
                (keyword, kind, severity, message, current_value, threshold_value, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&alert.keyword)
        .bind(serde_json::to_string(&alert.kind)?)
        .bind(serde_json::to_string(&alert.severity)?)
        .bind(&alert.message)
        .bind(alert.current_value)
        .bind(alert.threshold_value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Per-keyword aggregate over [start, end).
    pub async fn sentiment_summary(
        &self,
        keyword: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SentimentSummary> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                AVG(weighted_compound) AS avg_sentiment,
                AVG(aggregate_confidence) AS avg_confidence,
                SUM(CASE WHEN weighted_compound > 0.1 THEN 1 ELSE 0 END) AS positive,
                SUM(CASE WHEN weighted_compound < -0.1 THEN 1 ELSE 0 END) AS negative
            FROM ensemble_records
            WHERE keyword = ?1 AND timestamp >= ?2 AND timestamp < ?3
            "#,
        )
        .bind(keyword)
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let total: i64 = row.try_get("total")?;
        let positive: i64 = row.try_get::<Option<i64>, _>("positive")?.unwrap_or(0);
        let negative: i64 = row.try_get::<Option<i64>, _>("negative")?.unwrap_or(0);

        Ok(SentimentSummary {
            keyword: keyword.to_string(),
            total_posts: total as usize,
            avg_sentiment: row.try_get("avg_sentiment")?,
            avg_confidence: row.try_get("avg_confidence")?,
            positive_count: positive as usize,
            negative_count: negative as usize,
            neutral_count: (total - positive - negative) as usize,
        })
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn fetch_ensemble_records(
        &self,
        keyword: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EnsembleRecord>> {
        let rows: Vec<EnsembleRow> = sqlx::query_as(
            r#"
            SELECT post_id, keyword, timestamp, weighted_compound,
                   aggregate_confidence, contributing_models
            FROM ensemble_records
            WHERE keyword = ?1 AND timestamp >= ?2 AND timestamp < ?3
            ORDER BY timestamp ASC
            "#,
        )
        .bind(keyword)
        .bind(start.to_rfc3339())
        .bind(end.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EnsembleRecord::try_from).collect()
    }

    async fn fetch_keywords(&self, active_only: bool) -> Result<Vec<String>> {
        let query = if active_only {
            "SELECT keyword FROM keywords WHERE active = 1 ORDER BY keyword"
        } else {
            "SELECT keyword FROM keywords ORDER BY keyword"
        };
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| r.try_get::<String, _>("keyword").map_err(MonitorError::from))
            .collect()
    }
}
