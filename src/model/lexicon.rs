//! Lexicon-based sentiment model
//!
//! VADER-style scoring over a word-level valence table with booster and
//! negation handling. Fast, always available, and fully deterministic, so it
//! anchors the ensemble when remote models are down.

use super::{ModelAdapter, ModelScore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Normalization constant for the compound score, following VADER.
const ALPHA: f64 = 15.0;

/// How many preceding words are checked for boosters and negations.
const MODIFIER_WINDOW: usize = 3;

/// Valence table for general social-media English.
const VALENCE: &[(&str, f64)] = &[
    // positive
    ("good", 0.5),
    ("great", 0.7),
    ("excellent", 0.8),
    ("amazing", 0.8),
    ("awesome", 0.7),
    ("fantastic", 0.8),
    ("wonderful", 0.7),
    ("impressive", 0.6),
    ("best", 0.8),
    ("love", 0.6),
    ("loved", 0.6),
    ("like", 0.3),
    ("enjoy", 0.5),
    ("happy", 0.6),
    ("excited", 0.6),
    ("solid", 0.4),
    ("reliable", 0.5),
    ("fast", 0.3),
    ("win", 0.6),
    ("useful", 0.5),
    ("helpful", 0.5),
    ("improved", 0.5),
    ("improvement", 0.5),
    ("success", 0.7),
    ("successful", 0.7),
    ("recommend", 0.6),
    ("promising", 0.5),
    ("innovative", 0.5),
    ("positive", 0.5),
    // negative
    ("bad", -0.5),
    ("terrible", -0.8),
    ("awful", -0.7),
    ("horrible", -0.8),
    ("poor", -0.5),
    ("worst", -0.8),
    ("hate", -0.7),
    ("hated", -0.7),
    ("dislike", -0.4),
    ("broken", -0.6),
    ("buggy", -0.6),
    ("slow", -0.3),
    ("crash", -0.6),
    ("crashes", -0.6),
    ("fail", -0.6),
    ("failed", -0.6),
    ("failure", -0.7),
    ("useless", -0.7),
    ("disappointed", -0.6),
    ("disappointing", -0.6),
    ("annoying", -0.5),
    ("frustrating", -0.6),
    ("scam", -0.9),
    ("garbage", -0.7),
    ("overpriced", -0.5),
    ("regret", -0.6),
    ("avoid", -0.5),
    ("warning", -0.4),
    ("problem", -0.4),
    ("problems", -0.4),
    ("issue", -0.3),
    ("issues", -0.3),
    ("negative", -0.5),
];

const BOOSTERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("absolutely", 1.4),
    ("completely", 1.4),
    ("totally", 1.3),
    ("incredibly", 1.4),
    ("highly", 1.3),
    ("so", 1.2),
    ("super", 1.3),
    ("somewhat", 0.8),
    ("slightly", 0.7),
    ("barely", 0.6),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "neither", "nobody", "nothing", "isn't", "aren't", "wasn't",
    "weren't", "hasn't", "haven't", "doesn't", "don't", "didn't", "won't", "wouldn't", "can't",
    "cannot", "couldn't", "shouldn't",
];

/// Lexicon sentiment model.
pub struct LexiconModel {
    valence: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
}

impl LexiconModel {
    pub fn new() -> Self {
        Self {
            valence: VALENCE.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
        }
    }

    /// Score text synchronously. Empty or fully neutral text scores 0.0
    /// with zero confidence.
    pub fn analyze(&self, text: &str) -> ModelScore {
        let words: Vec<String> = text
            .split_whitespace()
            .map(Self::clean_word)
            .filter(|w| !w.is_empty())
            .collect();

        let mut scores = Vec::new();
        for (i, word) in words.iter().enumerate() {
            if let Some(&valence) = self.valence.get(word.as_str()) {
                scores.push(self.apply_modifiers(&words, i, valence));
            }
        }

        if scores.is_empty() {
            return ModelScore {
                compound: 0.0,
                positive: 0.0,
                negative: 0.0,
                neutral: 1.0,
                confidence: 0.0,
            };
        }

        let positive_sum: f64 = scores.iter().filter(|&&s| s > 0.0).sum();
        let negative_sum: f64 = scores.iter().filter(|&&s| s < 0.0).map(|s| s.abs()).sum();
        let total = positive_sum + negative_sum;

        let (positive, negative) = if total > 0.0 {
            (positive_sum / total, negative_sum / total)
        } else {
            (0.0, 0.0)
        };
        let neutral = (1.0 - positive - negative).max(0.0);

        let sum: f64 = scores.iter().sum();
        let compound = sum / (sum * sum + ALPHA).sqrt();

        ModelScore {
            compound,
            positive,
            negative,
            neutral,
            // Certainty grows with the magnitude of the reading.
            confidence: compound.abs().min(1.0),
        }
    }

    fn clean_word(word: &str) -> String {
        word.chars()
            .filter(|c| c.is_alphanumeric() || *c == '\'')
            .collect::<String>()
            .to_lowercase()
    }

    fn apply_modifiers(&self, words: &[String], index: usize, mut valence: f64) -> f64 {
        let start = index.saturating_sub(MODIFIER_WINDOW);
        for prev in &words[start..index] {
            if let Some(&factor) = self.boosters.get(prev.as_str()) {
                valence *= factor;
            }
            if NEGATIONS.contains(&prev.as_str()) {
                // Flip and dampen rather than mirror; "not good" is weaker
                // than "bad".
                valence *= -0.5;
            }
        }
        valence.clamp(-1.0, 1.0)
    }
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelAdapter for LexiconModel {
    async fn score(&self, text: &str) -> Result<ModelScore> {
        Ok(self.analyze(text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
