//! Keyword Sentiment Monitor
//!
//! Scores social-media posts about tracked keywords with an ensemble of
//! sentiment models and turns the stored scores into trend, momentum,
//! anomaly, and comparison signals.

pub mod alerts;
pub mod analytics;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod text;
pub mod types;
