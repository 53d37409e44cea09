//! Ensemble scorer
//!
//! Merges the readings of every enabled model adapter into one combined
//! record per post. Scores are weighted both by the model's configured
//! static weight and by its self-reported confidence, so an unsure model
//! pulls less than a sure one at equal configuration.

use super::{ModelAdapter, ModelScore};
use crate::config::LabelThresholds;
use crate::types::{EnsembleRecord, RawPost, ScoredPost, SentimentLabel};
use futures_util::future::join_all;

/// Everything one scoring pass produced for a single post.
#[derive(Debug)]
pub struct ScoringOutcome {
    /// One entry per model that responded successfully
    pub model_scores: Vec<ScoredPost>,
    /// None when every model failed
    pub record: Option<EnsembleRecord>,
}

/// Combines multiple model adapters into a single sentiment reading.
pub struct EnsembleScorer {
    adapters: Vec<(Box<dyn ModelAdapter>, f64)>,
    thresholds: LabelThresholds,
}

impl EnsembleScorer {
    pub fn new(thresholds: LabelThresholds) -> Self {
        Self {
            adapters: Vec::new(),
            thresholds,
        }
    }

    /// Register a model with its static ensemble weight.
    pub fn add_adapter(&mut self, adapter: Box<dyn ModelAdapter>, weight: f64) {
        self.adapters.push((adapter, weight));
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Score one post's normalized text against every registered model.
    ///
    /// Failed models are logged and excluded; the remaining weights are
    /// renormalized implicitly by the weighted-average denominator. With
    /// zero successful models no ensemble record is produced.
    pub async fn score_post(&self, post: &RawPost, text: &str) -> ScoringOutcome {
        let calls = self
            .adapters
            .iter()
            .map(|(adapter, _)| adapter.score(text));
        let results = join_all(calls).await;

        let mut successes: Vec<(&str, f64, ModelScore)> = Vec::new();
        for ((adapter, weight), result) in self.adapters.iter().zip(results) {
            match result {
                Ok(score) => successes.push((adapter.name(), *weight, score)),
                Err(e) => {
                    tracing::warn!(
                        model = adapter.name(),
                        post_id = %post.external_id,
                        "model failed, excluding from ensemble: {e}"
                    );
                }
            }
        }

        let volume_weight = 1.0 + (post.engagement.max(0) as f64).ln_1p();

        let model_scores: Vec<ScoredPost> = successes
            .iter()
            .map(|(name, _, score)| ScoredPost {
                post_id: post.external_id.clone(),
                keyword: post.keyword.clone(),
                timestamp: post.posted_at,
                compound_score: score.compound,
                confidence: score.confidence,
                model_name: name.to_string(),
                volume_weight,
            })
            .collect();

        let record = self.combine(post, &successes);

        ScoringOutcome {
            model_scores,
            record,
        }
    }

    fn combine(
        &self,
        post: &RawPost,
        successes: &[(&str, f64, ModelScore)],
    ) -> Option<EnsembleRecord> {
        if successes.is_empty() {
            return None;
        }

        let mut weighted_sum = 0.0;
        let mut effective_weight = 0.0;
        let mut static_weight = 0.0;
        for (_, weight, score) in successes {
            weighted_sum += weight * score.confidence * score.compound;
            effective_weight += weight * score.confidence;
            static_weight += weight;
        }

        // All contributors reported zero confidence (or zero weight); there
        // is no signal to record.
        if effective_weight < f64::EPSILON {
            return None;
        }

        let mut contributing_models: Vec<String> =
            successes.iter().map(|(name, _, _)| name.to_string()).collect();
        contributing_models.sort();

        Some(EnsembleRecord {
            post_id: post.external_id.clone(),
            keyword: post.keyword.clone(),
            timestamp: post.posted_at,
            weighted_compound: weighted_sum / effective_weight,
            aggregate_confidence: effective_weight / static_weight,
            contributing_models,
        })
    }

    /// Map a compound score onto the discrete label ladder. Boundary values
    /// belong to the milder band.
    pub fn label(&self, compound: f64) -> SentimentLabel {
        let t = &self.thresholds;
        if compound < t.very_negative {
            SentimentLabel::VeryNegative
        } else if compound < t.negative {
            SentimentLabel::Negative
        } else if compound > t.very_positive {
            SentimentLabel::VeryPositive
        } else if compound > t.positive {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        }
    }
}
