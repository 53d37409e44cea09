//! Alert evaluation
//!
//! Pure threshold checks over aggregate sentiment readings. Evaluation never
//! touches storage; callers persist or deliver the resulting conditions.

use crate::config::AlertsConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SentimentThreshold,
    VolumeSpike,
    RapidChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// One fired alert condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCondition {
    pub keyword: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub current_value: f64,
    pub threshold_value: f64,
}

/// Evaluate all alert rules for one keyword's window.
///
/// `sentiment_change` is the change over the analysis window (last minus
/// first non-empty bucket mean). Returns an empty list when alerting is
/// disabled.
pub fn check(
    config: &AlertsConfig,
    keyword: &str,
    avg_sentiment: Option<f64>,
    total_posts: usize,
    sentiment_change: f64,
) -> Vec<AlertCondition> {
    if !config.enabled {
        return Vec::new();
    }

    let mut alerts = Vec::new();

    if let Some(avg) = avg_sentiment {
        if avg <= config.very_negative {
            alerts.push(AlertCondition {
                keyword: keyword.to_string(),
                kind: AlertKind::SentimentThreshold,
                severity: AlertSeverity::Critical,
                message: format!("sentiment for '{keyword}' is critically negative ({avg:.2})"),
                current_value: avg,
                threshold_value: config.very_negative,
            });
        } else if avg <= config.negative {
            alerts.push(AlertCondition {
                keyword: keyword.to_string(),
                kind: AlertKind::SentimentThreshold,
                severity: AlertSeverity::High,
                message: format!("sentiment for '{keyword}' is negative ({avg:.2})"),
                current_value: avg,
                threshold_value: config.negative,
            });
        } else if avg >= config.very_positive {
            alerts.push(AlertCondition {
                keyword: keyword.to_string(),
                kind: AlertKind::SentimentThreshold,
                severity: AlertSeverity::Low,
                message: format!("sentiment for '{keyword}' is strongly positive ({avg:.2})"),
                current_value: avg,
                threshold_value: config.very_positive,
            });
        }
    }

    if total_posts > config.volume_threshold {
        alerts.push(AlertCondition {
            keyword: keyword.to_string(),
            kind: AlertKind::VolumeSpike,
            severity: AlertSeverity::Medium,
            message: format!(
                "unusual volume for '{keyword}': {total_posts} posts in window"
            ),
            current_value: total_posts as f64,
            threshold_value: config.volume_threshold as f64,
        });
    }

    if sentiment_change.abs() > config.rapid_change_threshold {
        let direction = if sentiment_change > 0.0 {
            "improved"
        } else {
            "deteriorated"
        };
        alerts.push(AlertCondition {
            keyword: keyword.to_string(),
            kind: AlertKind::RapidChange,
            severity: AlertSeverity::Medium,
            message: format!(
                "sentiment for '{keyword}' {direction} rapidly ({sentiment_change:+.2})"
            ),
            current_value: sentiment_change,
            threshold_value: config.rapid_change_threshold,
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critically_negative_sentiment_fires_critical() {
        let alerts = check(&AlertsConfig::default(), "acme", Some(-0.85), 3, 0.0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::SentimentThreshold);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn moderately_negative_sentiment_fires_high() {
        let alerts = check(&AlertsConfig::default(), "acme", Some(-0.4), 3, 0.0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
    }

    #[test]
    fn strongly_positive_sentiment_is_informational() {
        let alerts = check(&AlertsConfig::default(), "acme", Some(0.85), 3, 0.0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Low);
    }

    #[test]
    fn ordinary_sentiment_fires_nothing() {
        let alerts = check(&AlertsConfig::default(), "acme", Some(0.1), 3, 0.05);
        assert!(alerts.is_empty());
    }

    #[test]
    fn volume_above_threshold_fires_spike() {
        let alerts = check(&AlertsConfig::default(), "acme", Some(0.1), 25, 0.0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::VolumeSpike);
        assert_eq!(alerts[0].current_value, 25.0);
    }

    #[test]
    fn rapid_change_fires_in_both_directions() {
        let up = check(&AlertsConfig::default(), "acme", Some(0.1), 3, 0.5);
        let down = check(&AlertsConfig::default(), "acme", Some(0.1), 3, -0.5);
        assert_eq!(up[0].kind, AlertKind::RapidChange);
        assert!(up[0].message.contains("improved"));
        assert!(down[0].message.contains("deteriorated"));
    }

    #[test]
    fn multiple_conditions_stack() {
        let alerts = check(&AlertsConfig::default(), "acme", Some(-0.85), 50, -0.6);
        assert_eq!(alerts.len(), 3);
    }

    #[test]
    fn no_sentiment_still_checks_volume() {
        let alerts = check(&AlertsConfig::default(), "acme", None, 50, 0.0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::VolumeSpike);
    }

    #[test]
    fn disabled_config_fires_nothing() {
        let config = AlertsConfig {
            enabled: false,
            ..AlertsConfig::default()
        };
        assert!(check(&config, "acme", Some(-0.9), 100, -0.9).is_empty());
    }
}
