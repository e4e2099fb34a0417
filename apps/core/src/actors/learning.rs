use crate::actors::messages::{ActorError, LearningMessage};
use crate::actors::traits::FeedbackSink;
use crate::error::EngineError;
use crate::learning::{AutoLearner, LearningStats};
use crate::models::FeedbackInput;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

/// A handle to the `LearningActor`.
///
/// Cloneable front end to a task that owns the feedback loop. Besides serving
/// requests, the task flushes the buffer every `flush_interval_secs` so feedback
/// trickling in below the batch size is still incorporated.
#[derive(Clone)]
pub struct LearningActorHandle {
    sender: mpsc::Sender<LearningMessage>,
    request_timeout: Duration,
}

/// Shortest flush period accepted; `tokio::time::interval` rejects zero.
pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(10);

impl LearningActorHandle {
    /// Spawns the actor with the learner's configured flush interval.
    pub fn new(learner: Arc<AutoLearner>) -> Self {
        let period = Duration::from_secs(learner.config().flush_interval_secs);
        Self::with_flush_interval(learner, period)
    }

    /// Spawns the actor with an explicit flush period, raised to [`MIN_FLUSH_INTERVAL`]
    /// if shorter. Must be called inside a tokio runtime.
    pub fn with_flush_interval(learner: Arc<AutoLearner>, period: Duration) -> Self {
        let request_timeout = Duration::from_millis(learner.config().request_timeout_ms);
        let (sender, receiver) = mpsc::channel(64);
        let actor = LearningActorRunner {
            receiver,
            learner,
            period: period.max(MIN_FLUSH_INTERVAL),
        };
        tokio::spawn(async move { actor.run().await });
        Self {
            sender,
            request_timeout,
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LearningMessage,
    ) -> Result<T, EngineError> {
        let (send, recv) = oneshot::channel();
        let exchange = async {
            self.sender
                .send(build(send))
                .await
                .map_err(|_| ActorError::Unavailable("Learning actor closed".to_string()))?;
            recv.await
                .map_err(|_| ActorError::Unavailable("Learning actor failed to respond".to_string()))
        };
        let reply = timeout(self.request_timeout, exchange)
            .await
            .map_err(ActorError::from)??;
        Ok(reply)
    }

    /// Flushes the buffer and stops the actor.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<LearningStats, EngineError> {
        self.request(|responder| LearningMessage::Shutdown { responder })
            .await?
    }
}

#[async_trait]
impl FeedbackSink for LearningActorHandle {
    #[instrument(skip(self, input))]
    async fn submit(&self, input: FeedbackInput) -> Result<Option<LearningStats>, EngineError> {
        self.request(|responder| LearningMessage::Feedback { input, responder })
            .await?
    }

    async fn flush(&self) -> Result<LearningStats, EngineError> {
        self.request(|responder| LearningMessage::ForceProcess { responder })
            .await?
    }

    async fn stats(&self) -> Result<LearningStats, EngineError> {
        self.request(|responder| LearningMessage::Stats { responder })
            .await
    }
}

// --- Actor Runner (Internal Logic) ---
struct LearningActorRunner {
    receiver: mpsc::Receiver<LearningMessage>,
    learner: Arc<AutoLearner>,
    period: Duration,
}

impl LearningActorRunner {
    async fn run(mut self) {
        info!("Learning actor started (flush every {:?})", self.period);
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(LearningMessage::Shutdown { responder }) => {
                        let result = self.flush().await;
                        let _ = responder.send(result);
                        break;
                    }
                    Some(msg) => self.handle_message(msg).await,
                    None => break,
                },
                _ = ticker.tick() => {
                    if self.learner.buffered() > 0 {
                        if let Err(e) = self.flush().await {
                            warn!("Periodic feedback flush failed: {}", e);
                        }
                    }
                }
            }
        }
        info!("Learning actor stopped");
    }

    async fn handle_message(&self, msg: LearningMessage) {
        match msg {
            LearningMessage::Feedback { input, responder } => {
                let learner = self.learner.clone();
                let result = tokio::task::spawn_blocking(move || {
                    learner.provide_feedback(
                        &input.text,
                        input.actual_label,
                        input.user_id,
                        input.source,
                    )
                })
                .await
                .unwrap_or_else(|e| Err(e.into()));
                if let Err(e) = &result {
                    error!("Feedback rejected: {}", e);
                }
                let _ = responder.send(result);
            }
            LearningMessage::ForceProcess { responder } => {
                let _ = responder.send(self.flush().await);
            }
            LearningMessage::Stats { responder } => {
                let _ = responder.send(self.learner.auto_learning_stats());
            }
            LearningMessage::Shutdown { .. } => {}
        }
    }

    async fn flush(&self) -> Result<LearningStats, EngineError> {
        let learner = self.learner.clone();
        tokio::task::spawn_blocking(move || learner.force_process_buffer()).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::naive_bayes::NaiveBayesClassifier;
    use crate::config::LearningConfig;
    use crate::models::SentimentLabel;

    fn learner(batch_size: usize) -> Arc<AutoLearner> {
        Arc::new(AutoLearner::new(
            Arc::new(NaiveBayesClassifier::default()),
            LearningConfig {
                feedback_batch_size: batch_size,
                ..Default::default()
            },
        ))
    }

    fn input(text: &str, label: SentimentLabel) -> FeedbackInput {
        FeedbackInput {
            text: text.to_string(),
            actual_label: label,
            user_id: None,
            source: Some("test".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_and_stats() {
        let handle = LearningActorHandle::with_flush_interval(learner(10), Duration::from_secs(3600));

        let outcome = handle
            .submit(input("terrible support", SentimentLabel::Negative))
            .await
            .unwrap();
        assert!(outcome.is_none());

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.total_received, 1);
        assert_eq!(stats.buffer_size, 1);
    }

    #[tokio::test]
    async fn test_explicit_flush() {
        let handle = LearningActorHandle::with_flush_interval(learner(10), Duration::from_secs(3600));
        handle
            .submit(input("lovely staff", SentimentLabel::Positive))
            .await
            .unwrap();

        let stats = handle.flush().await.unwrap();
        assert_eq!(stats.training_runs, 1);
        assert_eq!(stats.buffer_size, 0);
    }

    #[tokio::test]
    async fn test_invalid_feedback_is_reported() {
        let handle = LearningActorHandle::with_flush_interval(learner(10), Duration::from_secs(3600));
        let err = handle
            .submit(input("  ", SentimentLabel::Positive))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_periodic_flush() {
        let learner = learner(10);
        let handle =
            LearningActorHandle::with_flush_interval(learner.clone(), Duration::from_millis(50));
        handle
            .submit(input("slow delivery", SentimentLabel::Negative))
            .await
            .unwrap();

        let mut flushed = false;
        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            if learner.auto_learning_stats().training_runs == 1 {
                flushed = true;
                break;
            }
        }
        assert!(flushed, "periodic flush never ran");
    }

    #[tokio::test]
    async fn test_zero_flush_interval_is_clamped() {
        let learner = learner(10);
        let handle = LearningActorHandle::with_flush_interval(learner.clone(), Duration::ZERO);
        handle
            .submit(input("arrived broken", SentimentLabel::Negative))
            .await
            .unwrap();

        let mut flushed = false;
        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            if learner.auto_learning_stats().training_runs == 1 {
                flushed = true;
                break;
            }
        }
        assert!(flushed, "clamped periodic flush never ran");
        assert_eq!(handle.stats().await.unwrap().buffer_size, 0);
    }

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        // A mailbox nobody reads: the send succeeds, the reply never comes.
        let (sender, _receiver) = mpsc::channel(4);
        let handle = LearningActorHandle {
            sender,
            request_timeout: Duration::from_millis(50),
        };

        let err = handle.stats().await.unwrap_err();
        assert!(matches!(err, EngineError::Timeout(_)), "{:?}", err);
        assert_eq!(err.kind(), "timeout");
    }

    #[tokio::test]
    async fn test_request_timeout_follows_config() {
        let learner = Arc::new(AutoLearner::new(
            Arc::new(NaiveBayesClassifier::default()),
            LearningConfig {
                request_timeout_ms: 1_500,
                ..Default::default()
            },
        ));
        let handle = LearningActorHandle::new(learner);
        assert_eq!(handle.request_timeout, Duration::from_millis(1_500));
        assert!(handle.stats().await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_flushes_and_closes() {
        let learner = learner(10);
        let handle = LearningActorHandle::with_flush_interval(learner.clone(), Duration::from_secs(3600));
        handle
            .submit(input("works fine", SentimentLabel::Neutral))
            .await
            .unwrap();

        let stats = handle.shutdown().await.unwrap();
        assert_eq!(stats.total_incorporated, 1);

        // Give the runner a moment to drop its receiver.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let err = handle.stats().await.unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }
}
