//! Rolling z-score anomaly detection
//!
//! Each non-empty bucket is scored against the mean and spread of the
//! non-empty buckets that precede it, never against itself or anything
//! later, so a detected spike cannot mask itself by inflating its own
//! baseline.

use crate::config::AnalyticsConfig;
use crate::types::{AnomalyDirection, AnomalyRecord, AnomalySeverity, Bucket};

/// Minimum preceding samples required before a bucket can be judged. Two
/// points give a spread so tight that ordinary jitter scores |z| > 2.
const MIN_BASELINE: usize = 3;

/// Scan a bucket series for sentiment spikes.
pub fn detect(keyword: &str, buckets: &[Bucket], config: &AnalyticsConfig) -> Vec<AnomalyRecord> {
    let mut anomalies = Vec::new();

    // Indices of non-empty buckets, in series order.
    let populated: Vec<usize> = buckets
        .iter()
        .enumerate()
        .filter(|(_, b)| b.mean_sentiment.is_some())
        .map(|(i, _)| i)
        .collect();

    for (pos, &idx) in populated.iter().enumerate() {
        if pos < MIN_BASELINE {
            continue;
        }

        let window_start = pos.saturating_sub(config.anomaly_window);
        let baseline: Vec<f64> = populated[window_start..pos]
            .iter()
            .filter_map(|&i| buckets[i].mean_sentiment)
            .collect();
        if baseline.len() < MIN_BASELINE {
            continue;
        }

        let n = baseline.len() as f64;
        let mean = baseline.iter().sum::<f64>() / n;
        let var = baseline.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let stddev = var.sqrt();
        if stddev < f64::EPSILON {
            continue;
        }

        let value = match buckets[idx].mean_sentiment {
            Some(v) => v,
            None => continue,
        };
        let z = (value - mean) / stddev;

        if z.abs() >= config.z_threshold {
            anomalies.push(AnomalyRecord {
                keyword: keyword.to_string(),
                window_start: buckets[idx].window_start,
                z_score: z,
                severity: severity(z.abs(), config),
                direction: if z > 0.0 {
                    AnomalyDirection::SpikePositive
                } else {
                    AnomalyDirection::SpikeNegative
                },
            });
        }
    }

    anomalies
}

fn severity(abs_z: f64, config: &AnalyticsConfig) -> AnomalySeverity {
    let mid = (config.z_threshold + config.z_high) / 2.0;
    if abs_z >= config.z_high {
        AnomalySeverity::High
    } else if abs_z >= mid {
        AnomalySeverity::Medium
    } else {
        AnomalySeverity::Low
    }
}
