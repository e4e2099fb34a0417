use async_trait::async_trait;

use crate::error::EngineError;
use crate::learning::LearningStats;
use crate::models::FeedbackInput;

/// Defines the public interface for a feedback consumer.
///
/// Abstracts where ground-truth labels go, so callers can be tested against a
/// mock sink instead of a live learning actor.
#[async_trait]
pub trait FeedbackSink: Send + Sync + 'static {
    /// Submit one feedback record. Returns stats if it triggered a training run.
    async fn submit(&self, input: FeedbackInput) -> Result<Option<LearningStats>, EngineError>;

    /// Train on everything buffered now.
    async fn flush(&self) -> Result<LearningStats, EngineError>;

    async fn stats(&self) -> Result<LearningStats, EngineError>;
}
