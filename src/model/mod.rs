//! Sentiment model adapters and the ensemble scorer
//!
//! Each adapter wraps one opaque sentiment model behind the [`ModelAdapter`]
//! trait; the [`EnsembleScorer`] merges their outputs into one record per
//! post. Adding a model means adding a trait impl, not touching the ensemble.

pub mod ensemble;
pub mod lexicon;
pub mod remote;


pub use ensemble::{EnsembleScorer, ScoringOutcome};
pub use lexicon::LexiconModel;
pub use remote::RemoteModel;

use crate::error::Result;
use async_trait::async_trait;

/// A single model's sentiment estimate for one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    /// Overall sentiment in [-1, 1]
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    /// Self-reported certainty in [0, 1]
    pub confidence: f64,
}

/// Interface for sentiment scoring models.
///
/// A failed call means the model is excluded from the ensemble for that post;
/// it is never treated as a neutral score.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Score normalized text.
    async fn score(&self, text: &str) -> Result<ModelScore>;

    /// Model name for weighting and attribution.
    fn name(&self) -> &str;
}
