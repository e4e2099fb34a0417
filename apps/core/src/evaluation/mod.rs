//! # Evaluation
//!
//! Read-only statistics over (actual, predicted) pairs.
//!
//! ## Components
//! - `metrics`: confusion matrix, precision/recall/F1, Cohen's Kappa
//! - `stats`: erf approximation, z-test and confidence intervals
//! - `comparison`: ranking of several models against a baseline

pub mod comparison;
pub mod metrics;
pub mod stats;

pub use comparison::{compare_models, ComparisonReport, ModelComparison, ModelRanking};
pub use metrics::{evaluate, ClassScores, LabeledPrediction, ModelMetrics};
pub use stats::{erf, normal_cdf, SignificanceTest};
