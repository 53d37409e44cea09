//! Configuration management

use crate::error::{MonitorError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub text: TextConfig,
    pub remote_model: Option<RemoteModelConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub path: String,
}

/// Per-model ensemble weights and labeling thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Static ensemble weight of the lexicon model, in [0, 1]
    pub lexicon_weight: f64,
    /// Static ensemble weight of the remote model, in [0, 1]
    pub remote_weight: f64,
    pub lexicon_enabled: bool,
    pub remote_enabled: bool,
    /// Minimum per-record confidence for a score to enter analytics
    pub min_confidence: f64,
    pub labels: LabelThresholds,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            lexicon_weight: 0.4,
            remote_weight: 0.6,
            lexicon_enabled: true,
            remote_enabled: true,
            min_confidence: 0.5,
            labels: LabelThresholds::default(),
        }
    }
}

/// Boundaries of the sentiment label ladder. Must be strictly increasing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub very_negative: f64,
    pub negative: f64,
    pub positive: f64,
    pub very_positive: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            very_negative: -0.5,
            negative: -0.05,
            positive: 0.05,
            very_positive: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Width of one aggregation bucket in seconds
    pub bucket_width_secs: u64,
    /// Noise floor below which a regression slope counts as stable
    pub trend_epsilon: f64,
    /// Divisor mapping |slope| * data_points onto [0, 1] strength
    pub strength_norm: f64,
    /// Short moving-average window in buckets
    pub short_window: usize,
    /// Long moving-average window in buckets
    pub long_window: usize,
    /// Minimum short-vs-long MA gap for a non-neutral momentum signal
    pub momentum_margin: f64,
    /// Trailing buckets used for the rolling anomaly baseline
    pub anomaly_window: usize,
    /// |z| at or above which a bucket is anomalous
    pub z_threshold: f64,
    /// |z| at or above which severity becomes high
    pub z_high: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            bucket_width_secs: 3600,
            trend_epsilon: 0.001,
            strength_norm: 1.0,
            short_window: 5,
            long_window: 10,
            momentum_margin: 0.01,
            anomaly_window: 10,
            z_threshold: 2.0,
            z_high: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub enabled: bool,
    pub very_negative: f64,
    pub negative: f64,
    pub positive: f64,
    pub very_positive: f64,
    /// Posts per window above which a volume spike fires
    pub volume_threshold: usize,
    /// Absolute sentiment change above which a rapid-change alert fires
    pub rapid_change_threshold: f64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            very_negative: -0.8,
            negative: -0.3,
            positive: 0.3,
            very_positive: 0.8,
            volume_threshold: 10,
            rapid_change_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub remove_urls: bool,
    pub remove_mentions: bool,
    pub remove_hashtags: bool,
    pub max_text_length: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            remove_urls: true,
            remove_mentions: false,
            remove_hashtags: false,
            max_text_length: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteModelConfig {
    /// Provider name (openai, anthropic, compatible)
    pub provider: String,
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// Model name
    pub model: Option<String>,
    /// Base URL for OpenAI-compatible endpoints
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from file, with `SENTIMENT__`-prefixed env overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path.as_ref().to_str().ok_or_else(
                || MonitorError::Config("non-UTF8 config path".to_string()),
            )?))
            .add_source(config::Environment::with_prefix("SENTIMENT").separator("__"))
            .build()
            .map_err(|e| MonitorError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| MonitorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations.
    pub fn load_default() -> Result<Self> {
        let paths = [
            "config.toml",
            "config.yaml",
            "~/.config/sentiment-monitor/config.toml",
        ];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        Err(MonitorError::Config(
            "no configuration file found".to_string(),
        ))
    }

    /// Validate once at load time so components never re-check per call.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sentiment;
        for (name, w) in [
            ("lexicon_weight", s.lexicon_weight),
            ("remote_weight", s.remote_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(MonitorError::Config(format!(
                    "{name} must be in [0, 1], got {w}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&s.min_confidence) {
            return Err(MonitorError::Config(format!(
                "min_confidence must be in [0, 1], got {}",
                s.min_confidence
            )));
        }

        let l = &s.labels;
        if !(l.very_negative < l.negative
            && l.negative < l.positive
            && l.positive < l.very_positive)
        {
            return Err(MonitorError::Config(
                "label thresholds must be strictly increasing".to_string(),
            ));
        }

        let a = &self.analytics;
        if a.bucket_width_secs == 0 {
            return Err(MonitorError::Config(
                "bucket_width_secs must be positive".to_string(),
            ));
        }
        if a.short_window == 0 || a.long_window == 0 {
            return Err(MonitorError::Config(
                "moving-average windows must be positive".to_string(),
            ));
        }
        if a.short_window > a.long_window {
            return Err(MonitorError::Config(format!(
                "short_window ({}) must not exceed long_window ({})",
                a.short_window, a.long_window
            )));
        }
        if a.z_threshold <= 0.0 || a.z_high < a.z_threshold {
            return Err(MonitorError::Config(
                "z thresholds must satisfy 0 < z_threshold <= z_high".to_string(),
            ));
        }

        Ok(())
    }
}
