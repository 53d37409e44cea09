use anyhow::Context;
use clap::{Parser, Subcommand};
use sentiment_monitor::analytics::AnalyticsEngine;
use sentiment_monitor::config::Config;
use sentiment_monitor::model::{EnsembleScorer, LexiconModel, RemoteModel};
use sentiment_monitor::storage::Database;
use sentiment_monitor::text::TextNormalizer;
use sentiment_monitor::types::RawPost;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "sentiment-monitor")]
#[command(about = "Keyword sentiment monitoring and analytics", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tracked keywords
    Keywords {
        #[command(subcommand)]
        action: KeywordAction,
    },
    /// Score a file of posts (one JSON object per line) into the database
    Score {
        /// Path to the JSONL file
        file: String,
    },
    /// Per-keyword aggregate statistics
    Summary {
        keyword: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Regression-based sentiment trend
    Trend {
        keyword: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Moving-average momentum indicators
    Momentum {
        keyword: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Volume/sentiment correlation within one keyword
    Volume {
        keyword: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Sentiment spikes against the rolling baseline
    Anomalies {
        keyword: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Rank several keywords over a shared window
    Compare {
        /// Keywords to compare
        #[arg(required = true, num_args = 2..)]
        keywords: Vec<String>,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Full report: summary, trend, momentum, anomalies, alerts
    Insights {
        keyword: String,
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
}

#[derive(Subcommand)]
enum KeywordAction {
    /// Track a keyword
    Add { keyword: String },
    /// Stop tracking a keyword (its history is kept)
    Remove { keyword: String },
    /// List tracked keywords
    List {
        /// Include deactivated keywords
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentiment_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let db = Arc::new(Database::connect(&config.database.path).await?);

    match cli.command {
        Commands::Keywords { action } => match action {
            KeywordAction::Add { keyword } => {
                db.upsert_keyword(&keyword).await?;
                println!("tracking '{keyword}'");
            }
            KeywordAction::Remove { keyword } => {
                db.deactivate_keyword(&keyword).await?;
                println!("no longer tracking '{keyword}'");
            }
            KeywordAction::List { all } => {
                use sentiment_monitor::storage::RecordStore;
                for keyword in db.fetch_keywords(!all).await? {
                    println!("{keyword}");
                }
            }
        },
        Commands::Score { file } => {
            score_file(&config, &db, &file).await?;
        }
        Commands::Summary { keyword, hours } => {
            let end = chrono::Utc::now();
            let start = end - chrono::Duration::hours(hours);
            let summary = db.sentiment_summary(&keyword, start, end).await?;
            print_json(&summary)?;
        }
        Commands::Trend { keyword, hours } => {
            let engine = AnalyticsEngine::new(db, config);
            print_json(&engine.analyze_trend(&keyword, hours).await?)?;
        }
        Commands::Momentum { keyword, hours } => {
            let engine = AnalyticsEngine::new(db, config);
            print_json(&engine.calculate_momentum(&keyword, hours).await?)?;
        }
        Commands::Volume { keyword, hours } => {
            let engine = AnalyticsEngine::new(db, config);
            print_json(&engine.analyze_volume_correlation(&keyword, hours).await?)?;
        }
        Commands::Anomalies { keyword, hours } => {
            let engine = AnalyticsEngine::new(db, config);
            print_json(&engine.detect_anomalies(&keyword, hours).await?)?;
        }
        Commands::Compare { keywords, hours } => {
            let engine = AnalyticsEngine::new(db, config);
            print_json(&engine.compare_keywords(&keywords, hours).await?)?;
        }
        Commands::Insights { keyword, hours } => {
            let engine = AnalyticsEngine::new(db.clone(), config);
            let report = engine.generate_insights(&keyword, hours).await?;
            for alert in &report.alerts {
                db.save_alert(alert).await?;
            }
            print_json(&report)?;
        }
    }

    Ok(())
}

/// Score every post in a JSONL file and persist the results.
async fn score_file(config: &Config, db: &Database, path: &str) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {path}"))?;

    let normalizer = TextNormalizer::new(config.text.clone());
    let scorer = build_scorer(config)?;

    let mut scored = 0usize;
    let mut skipped = 0usize;
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let post: RawPost = serde_json::from_str(line)
            .with_context(|| format!("parsing {path}:{}", line_no + 1))?;

        db.upsert_keyword(&post.keyword).await?;
        db.insert_post(&post).await?;

        let text = normalizer.normalize(&post.full_text());
        let outcome = scorer.score_post(&post, &text).await;
        for score in &outcome.model_scores {
            db.insert_model_score(score).await?;
        }
        match outcome.record {
            Some(record) => {
                tracing::info!(
                    post_id = %record.post_id,
                    keyword = %record.keyword,
                    compound = record.weighted_compound,
                    label = ?scorer.label(record.weighted_compound),
                    "scored post"
                );
                db.insert_record(&record).await?;
                scored += 1;
            }
            None => {
                tracing::warn!(post_id = %post.external_id, "no model produced a score");
                skipped += 1;
            }
        }
    }

    println!("scored {scored} post(s), skipped {skipped}");
    Ok(())
}

fn build_scorer(config: &Config) -> anyhow::Result<EnsembleScorer> {
    let mut scorer = EnsembleScorer::new(config.sentiment.labels.clone());

    if config.sentiment.lexicon_enabled {
        scorer.add_adapter(Box::new(LexiconModel::new()), config.sentiment.lexicon_weight);
    }
    if config.sentiment.remote_enabled {
        if let Some(remote) = &config.remote_model {
            scorer.add_adapter(
                Box::new(RemoteModel::from_config(remote)?),
                config.sentiment.remote_weight,
            );
        }
    }

    if scorer.adapter_count() == 0 {
        anyhow::bail!("no sentiment models enabled; check the [sentiment] configuration");
    }
    Ok(scorer)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
