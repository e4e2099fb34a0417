use std::io;
use thiserror::Error;

/// Engine-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input, e.g. a non-string `text` field or a missing text in a batch item.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A strict prediction or evaluation was requested on a classifier with an empty vocabulary.
    #[error("Model not trained: {0}")]
    ModelNotTrained(String),

    /// Empty or entirely invalid training data.
    #[error("Training data error: {0}")]
    TrainingData(String),

    /// Represents configuration-related errors (e.g., out-of-range thresholds).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot or report (de)serialization failures.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A learning actor request exceeded `learning.request_timeout_ms`.
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl EngineError {
    /// Short machine-readable kind, used in batch failure records and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::ModelNotTrained(_) => "model_not_trained",
            EngineError::TrainingData(_) => "training_data",
            EngineError::Config(_) => "config",
            EngineError::Io(_) => "io",
            EngineError::Serialization(_) => "serialization",
            EngineError::Internal(_) => "internal",
            EngineError::Timeout(_) => "timeout",
        }
    }
}

impl Clone for EngineError {
    fn clone(&self) -> Self {
        match self {
            EngineError::InvalidInput(s) => EngineError::InvalidInput(s.clone()),
            EngineError::ModelNotTrained(s) => EngineError::ModelNotTrained(s.clone()),
            EngineError::TrainingData(s) => EngineError::TrainingData(s.clone()),
            EngineError::Config(s) => EngineError::Config(s.clone()),
            EngineError::Io(e) => EngineError::Io(io::Error::new(e.kind(), e.to_string())),
            EngineError::Serialization(s) => EngineError::Serialization(s.clone()),
            EngineError::Internal(s) => EngineError::Internal(s.clone()),
            EngineError::Timeout(s) => EngineError::Timeout(s.clone()),
        }
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::Internal(format!("Analysis task failed: {}", err))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for EngineError {
    fn from(err: validator::ValidationErrors) -> Self {
        EngineError::Config(format!("Validation errors: {}", err))
    }
}

impl From<crate::actors::messages::ActorError> for EngineError {
    fn from(err: crate::actors::messages::ActorError) -> Self {
        use crate::actors::messages::ActorError;
        match err {
            ActorError::Timeout(msg) => EngineError::Timeout(msg),
            other => EngineError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(EngineError::InvalidInput("x".into()).kind(), "invalid_input");
        assert_eq!(EngineError::TrainingData("x".into()).kind(), "training_data");
        assert_eq!(
            EngineError::ModelNotTrained("x".into()).kind(),
            "model_not_trained"
        );
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: EngineError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, EngineError::Serialization(_)));
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_actor_errors_map_by_kind() {
        use crate::actors::messages::ActorError;

        let err: EngineError = ActorError::Timeout("stats".into()).into();
        assert_eq!(err.kind(), "timeout");
        let err: EngineError = ActorError::Unavailable("closed".into()).into();
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn test_clone_preserves_io_kind() {
        let err = EngineError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        match err.clone() {
            EngineError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected clone: {:?}", other),
        }
    }
}
