use serde::Serialize;
use tokio::sync::oneshot;

use crate::error::EngineError;
use crate::learning::LearningStats;
use crate::models::FeedbackInput;

/// Defines errors that can occur within the actor system.
#[derive(Debug, thiserror::Error, Serialize, Clone)]
pub enum ActorError {
    /// The actor's mailbox is closed or it dropped a responder.
    #[error("Actor unavailable: {0}")]
    Unavailable(String),
    /// The actor did not answer within the request deadline.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<tokio::time::error::Elapsed> for ActorError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ActorError::Timeout(format!("Actor operation timed out: {}", err))
    }
}

/// Messages that can be sent to the `LearningActor`.
#[derive(Debug)]
pub enum LearningMessage {
    /// Buffer one feedback record; replies with stats when it triggered a run.
    Feedback {
        input: FeedbackInput,
        responder: oneshot::Sender<Result<Option<LearningStats>, EngineError>>,
    },
    /// Train on the current buffer immediately.
    ForceProcess {
        responder: oneshot::Sender<Result<LearningStats, EngineError>>,
    },
    Stats {
        responder: oneshot::Sender<LearningStats>,
    },
    /// Flush what is buffered and stop the actor.
    Shutdown {
        responder: oneshot::Sender<Result<LearningStats, EngineError>>,
    },
}
