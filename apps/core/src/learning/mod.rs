//! Feedback-driven retraining of the Naive Bayes model.

pub mod feedback;

pub use feedback::{AutoLearner, LearningStats};
