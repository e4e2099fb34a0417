//! Auto-learning feedback loop.
//!
//! Feedback is buffered until `feedback_batch_size` records are waiting, then
//! merged into the classifier with an incremental training run. A failed run
//! puts the records back so nothing is lost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, instrument, warn};

use crate::analysis::naive_bayes::NaiveBayesClassifier;
use crate::config::LearningConfig;
use crate::error::EngineError;
use crate::models::{FeedbackRecord, SentimentLabel, TrainingExample};

/// Snapshot of the learner's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_received: u64,
    pub total_incorporated: u64,
    pub buffer_size: usize,
    pub training_runs: u64,
    pub failed_runs: u64,
    /// Accuracy on the recent-feedback holdout before the last run.
    pub accuracy_before: Option<f64>,
    /// Same holdout after the last run.
    pub accuracy_after: Option<f64>,
    /// Exponential moving average of `accuracy_after`.
    pub rolling_accuracy: Option<f64>,
    pub model_version: u64,
    pub last_trained_at: Option<DateTime<Utc>>,
}

/// Buffers feedback and retrains the shared classifier.
pub struct AutoLearner {
    classifier: Arc<NaiveBayesClassifier>,
    config: LearningConfig,
    buffer: Mutex<VecDeque<FeedbackRecord>>,
    /// Most recently incorporated records, capped at `holdout_size`.
    recent: Mutex<VecDeque<FeedbackRecord>>,
    stats: Mutex<LearningStats>,
}

impl AutoLearner {
    pub fn new(classifier: Arc<NaiveBayesClassifier>, config: LearningConfig) -> Self {
        Self {
            classifier,
            buffer: Mutex::new(VecDeque::with_capacity(config.buffer_capacity)),
            recent: Mutex::new(VecDeque::with_capacity(config.holdout_size)),
            stats: Mutex::new(LearningStats::default()),
            config,
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    /// Buffer one record. Returns the run's stats when the batch size triggered a flush.
    #[instrument(skip(self, text), fields(label = %actual_label))]
    pub fn provide_feedback(
        &self,
        text: &str,
        actual_label: SentimentLabel,
        user_id: Option<String>,
        source: Option<String>,
    ) -> Result<Option<LearningStats>, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "Feedback text must not be empty".to_string(),
            ));
        }

        let record = FeedbackRecord::new(text.to_string(), actual_label, user_id, source);
        self.accept(record)
    }

    /// Buffer an already built record.
    pub fn accept(&self, record: FeedbackRecord) -> Result<Option<LearningStats>, EngineError> {
        let should_flush = {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            buffer.push_back(record);
            while buffer.len() > self.config.buffer_capacity {
                if let Some(dropped) = buffer.pop_front() {
                    warn!(
                        "Feedback buffer full ({}), dropping oldest record {}",
                        self.config.buffer_capacity, dropped.id
                    );
                }
            }
            buffer.len() >= self.config.feedback_batch_size
        };
        self.lock_stats().total_received += 1;

        if should_flush {
            self.force_process_buffer().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Train on everything buffered now, regardless of the batch size.
    #[instrument(skip(self))]
    pub fn force_process_buffer(&self) -> Result<LearningStats, EngineError> {
        let batch: Vec<FeedbackRecord> = {
            let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *buffer).into()
        };
        if batch.is_empty() {
            return Ok(self.auto_learning_stats());
        }

        let holdout = self.holdout(&batch);
        let accuracy_before = self.accuracy_on(&holdout);
        let examples: Vec<TrainingExample> = batch.iter().map(FeedbackRecord::to_example).collect();

        let version = match self.classifier.incremental_train(&examples) {
            Ok(version) => version,
            Err(e) => {
                error!("Feedback training failed, restoring {} records: {}", batch.len(), e);
                self.restore(batch);
                self.lock_stats().failed_runs += 1;
                return Err(e);
            }
        };

        let accuracy_after = self.accuracy_on(&holdout);
        {
            let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
            recent.extend(batch.iter().cloned());
            while recent.len() > self.config.holdout_size {
                recent.pop_front();
            }
        }

        let mut stats = self.lock_stats();
        stats.total_incorporated += batch.len() as u64;
        stats.training_runs += 1;
        stats.accuracy_before = accuracy_before;
        stats.accuracy_after = accuracy_after;
        stats.rolling_accuracy = match (stats.rolling_accuracy, accuracy_after) {
            (Some(previous), Some(current)) => Some(
                self.config.rolling_alpha * current + (1.0 - self.config.rolling_alpha) * previous,
            ),
            (None, current) => current,
            (previous, None) => previous,
        };
        stats.model_version = version;
        stats.last_trained_at = Some(Utc::now());
        drop(stats);

        info!(
            "Incorporated {} feedback records into model v{} (accuracy {:?} -> {:?})",
            batch.len(),
            version,
            accuracy_before,
            accuracy_after
        );
        Ok(self.auto_learning_stats())
    }

    pub fn auto_learning_stats(&self) -> LearningStats {
        let mut stats = self.lock_stats().clone();
        stats.buffer_size = self.buffered();
        stats.model_version = self.classifier.version();
        stats
    }

    pub fn buffered(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_stats(&self) -> std::sync::MutexGuard<'_, LearningStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put a failed batch back in front of anything that arrived meanwhile.
    fn restore(&self, batch: Vec<FeedbackRecord>) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        for record in batch.into_iter().rev() {
            buffer.push_front(record);
        }
        while buffer.len() > self.config.buffer_capacity {
            if let Some(dropped) = buffer.pop_back() {
                warn!("Feedback buffer full after restore, dropping record {}", dropped.id);
            }
        }
    }

    /// The latest `holdout_size` records across incorporated history and `batch`.
    fn holdout(&self, batch: &[FeedbackRecord]) -> Vec<(String, SentimentLabel)> {
        let recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
        let mut pool: Vec<(String, SentimentLabel)> = recent
            .iter()
            .chain(batch)
            .map(|r| (r.text.clone(), r.actual_label))
            .collect();
        let excess = pool.len().saturating_sub(self.config.holdout_size);
        pool.drain(..excess);
        pool
    }

    fn accuracy_on(&self, holdout: &[(String, SentimentLabel)]) -> Option<f64> {
        if holdout.is_empty() {
            return None;
        }
        let state = self.classifier.snapshot();
        let correct = holdout
            .iter()
            .filter(|(text, label)| self.classifier.predict_with(&state, text).label.agrees_with(*label))
            .count();
        Some(correct as f64 / holdout.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learner(batch_size: usize, capacity: usize) -> AutoLearner {
        let config = LearningConfig {
            feedback_batch_size: batch_size,
            buffer_capacity: capacity,
            holdout_size: 5,
            ..Default::default()
        };
        AutoLearner::new(Arc::new(NaiveBayesClassifier::default()), config)
    }

    #[test]
    fn test_buffer_until_batch_size() {
        let learner = learner(3, 10);

        assert!(learner
            .provide_feedback("awful", SentimentLabel::Negative, None, None)
            .unwrap()
            .is_none());
        assert!(learner
            .provide_feedback("lovely", SentimentLabel::Positive, None, None)
            .unwrap()
            .is_none());
        assert_eq!(learner.buffered(), 2);

        let stats = learner
            .provide_feedback("fine", SentimentLabel::Neutral, Some("u1".into()), None)
            .unwrap()
            .expect("third record triggers a flush");

        assert_eq!(stats.buffer_size, 0);
        assert_eq!(stats.total_received, 3);
        assert_eq!(stats.total_incorporated, 3);
        assert_eq!(stats.training_runs, 1);
        assert_eq!(stats.model_version, 1);
        assert!(stats.last_trained_at.is_some());
        assert!(stats.accuracy_after.is_some());
    }

    #[test]
    fn test_empty_feedback_text_rejected() {
        let learner = learner(3, 10);
        let err = learner
            .provide_feedback("   ", SentimentLabel::Positive, None, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(learner.auto_learning_stats().total_received, 0);
    }

    #[test]
    fn test_force_process_empty_buffer_is_noop() {
        let learner = learner(3, 10);
        let stats = learner.force_process_buffer().unwrap();
        assert_eq!(stats.training_runs, 0);
        assert_eq!(stats.model_version, 0);
    }

    #[test]
    fn test_failed_training_restores_buffer() {
        let learner = learner(5, 10);
        // No usable tokens: incremental training rejects the whole batch.
        learner
            .provide_feedback("!!!", SentimentLabel::Positive, None, None)
            .unwrap();
        learner
            .provide_feedback("???", SentimentLabel::Negative, None, None)
            .unwrap();

        let err = learner.force_process_buffer().unwrap_err();
        assert!(matches!(err, EngineError::TrainingData(_)));

        let stats = learner.auto_learning_stats();
        assert_eq!(stats.buffer_size, 2);
        assert_eq!(stats.failed_runs, 1);
        assert_eq!(stats.training_runs, 0);

        let buffer = learner.buffer.lock().unwrap();
        assert_eq!(buffer[0].text, "!!!");
        assert_eq!(buffer[1].text, "???");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        // Batch size above what is ever reached so nothing flushes.
        let learner = AutoLearner::new(
            Arc::new(NaiveBayesClassifier::default()),
            LearningConfig {
                feedback_batch_size: 100,
                buffer_capacity: 2,
                ..Default::default()
            },
        );
        for text in ["one", "two", "three"] {
            learner
                .provide_feedback(text, SentimentLabel::Neutral, None, None)
                .unwrap();
        }
        let buffer = learner.buffer.lock().unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer[0].text, "two");
    }

    #[test]
    fn test_rolling_accuracy_is_ema() {
        let learner = learner(2, 10);
        learner
            .provide_feedback("great phone", SentimentLabel::Positive, None, None)
            .unwrap();
        let first = learner
            .provide_feedback("broken phone", SentimentLabel::Negative, None, None)
            .unwrap()
            .unwrap();
        assert_eq!(first.rolling_accuracy, first.accuracy_after);

        learner
            .provide_feedback("great screen", SentimentLabel::Positive, None, None)
            .unwrap();
        let second = learner
            .provide_feedback("broken screen", SentimentLabel::Negative, None, None)
            .unwrap()
            .unwrap();

        let expected = 0.3 * second.accuracy_after.unwrap() + 0.7 * first.rolling_accuracy.unwrap();
        assert!((second.rolling_accuracy.unwrap() - expected).abs() < 1e-9);
        assert_eq!(second.training_runs, 2);
        assert_eq!(second.model_version, 2);
    }
}
