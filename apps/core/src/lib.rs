//! Hybrid sentiment classification and auto-learning engine.
//!
//! A lexical rule analyzer and a Naive Bayes classifier score each text
//! independently; a weighted hybrid step reconciles them, correcting for
//! sarcasm, negation and language coverage. Ground-truth feedback is buffered
//! and folded back into the classifier, and an evaluation module reports
//! per-class metrics, Cohen's Kappa and significance between models.

pub mod actors;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod learning;
pub mod logging;
pub mod models;
pub mod store;

pub use config::EngineConfig;
pub use engine::{BatchOutcome, EvaluationReport, SentimentEngine};
pub use error::EngineError;
pub use models::{AnalysisInput, AnalysisMethod, SentimentLabel, SentimentResult, TrainingExample};

#[cfg(test)]
mod tests;
