//! Sentiment engine - main orchestrator.
//!
//! Resolves the language, extracts signals, runs the rule analyzer and the
//! Naive Bayes classifier side by side and reconciles them. Owns the shared
//! classifier, the feedback learner and a result cache keyed by model version,
//! so a retrain invalidates cached verdicts without an explicit purge.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::actors::learning::LearningActorHandle;
use crate::analysis::hybrid::HybridWeighting;
use crate::analysis::keywords::KeywordExtractor;
use crate::analysis::language::{resolve_language, Language};
use crate::analysis::naive_bayes::{NaiveBayesClassifier, NaiveBayesModelState};
use crate::analysis::rule_analyzer::RuleAnalyzer;
use crate::analysis::tokenizer::{SignalBundle, SignalExtractor};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::evaluation::metrics::{evaluate, ConfusionMatrix, LabeledPrediction, ModelMetrics};
use crate::learning::{AutoLearner, LearningStats};
use crate::models::{
    AnalysisInput, AnalysisMethod, FeedbackInput, SentimentLabel, SentimentResult, TrainingExample,
};
use crate::store::write_atomic;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    hint: Option<String>,
    model_version: u64,
}

/// Every intermediate verdict of one analysis.
#[derive(Debug, Clone)]
pub struct AnalysisTrace {
    pub language: Language,
    pub signals: SignalBundle,
    pub rule: SentimentResult,
    pub naive: SentimentResult,
    pub hybrid: SentimentResult,
}

/// A batch item that could not be analyzed. Its slot holds a neutral fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// One result per input, in input order.
    pub results: Vec<SentimentResult>,
    pub failures: Vec<ItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallScore {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodEvaluation {
    pub correct: usize,
    pub accuracy: f64,
    pub metrics: ModelMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodBreakdown {
    pub rule: MethodEvaluation,
    pub naive: MethodEvaluation,
    pub hybrid: MethodEvaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedResult {
    pub text: String,
    pub actual: SentimentLabel,
    pub predicted: SentimentLabel,
    pub confidence: f64,
    pub rule_label: SentimentLabel,
    pub naive_label: SentimentLabel,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub strongest_method: AnalysisMethod,
    pub average_confidence: f64,
    /// Share of samples where rule and naive labels differ.
    pub disagreement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model_version: u64,
    pub overall: OverallScore,
    pub by_method: MethodBreakdown,
    pub confusion_matrix: ConfusionMatrix,
    pub detailed_results: Vec<DetailedResult>,
    pub insights: Insights,
}

/// Hybrid sentiment engine. Construct once and share behind an `Arc`.
pub struct SentimentEngine {
    config: EngineConfig,
    extractor: SignalExtractor,
    rule_analyzer: RuleAnalyzer,
    classifier: Arc<NaiveBayesClassifier>,
    hybrid: HybridWeighting,
    keywords: KeywordExtractor,
    cache: Option<Mutex<LruCache<CacheKey, SentimentResult>>>,
    learner: Arc<AutoLearner>,
}

impl SentimentEngine {
    /// Build an engine. Loads the snapshot at `model_path` when that file exists.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let config = config.validated()?;

        let classifier = Arc::new(NaiveBayesClassifier::new(config.min_confidence_threshold));
        if let Some(path) = config.model_path.as_deref().filter(|p| p.exists()) {
            let json = std::fs::read_to_string(path)?;
            classifier.deserialize(&json)?;
            info!("Loaded model snapshot from {:?}", path);
        }

        let cache = NonZeroUsize::new(config.cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        let learner = Arc::new(AutoLearner::new(classifier.clone(), config.learning.clone()));

        info!(
            "Sentiment engine ready (model v{}, cache {}, emotions {})",
            classifier.version(),
            config.cache_capacity,
            config.enable_emotion_analysis
        );

        Ok(Self {
            extractor: SignalExtractor::new(config.intensifier_factor),
            rule_analyzer: RuleAnalyzer::new(
                config.rule_label_threshold,
                config.strong_label_threshold,
                config.enable_emotion_analysis,
            ),
            hybrid: HybridWeighting::new(config.hybrid.clone(), config.strong_label_threshold),
            keywords: KeywordExtractor::new(config.brand_keywords.clone(), config.max_keywords),
            classifier,
            cache,
            learner,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<NaiveBayesClassifier> {
        &self.classifier
    }

    pub fn learner(&self) -> &Arc<AutoLearner> {
        &self.learner
    }

    pub fn model_version(&self) -> u64 {
        self.classifier.version()
    }

    /// Run every stage and keep the intermediate verdicts.
    pub fn trace(&self, text: &str, language_hint: Option<&str>) -> AnalysisTrace {
        self.trace_with(&self.classifier.snapshot(), text, language_hint)
    }

    fn trace_with(
        &self,
        state: &NaiveBayesModelState,
        text: &str,
        language_hint: Option<&str>,
    ) -> AnalysisTrace {
        let language = resolve_language(text, language_hint);
        let signals = self.extractor.extract(text);
        let rule = self.rule_analyzer.analyze(&signals, language);
        let naive = self.classifier.predict_with(state, text);
        let hybrid = self.hybrid.reconcile(&rule, &naive, language, &signals);
        AnalysisTrace {
            language,
            signals,
            rule,
            naive,
            hybrid,
        }
    }

    fn unify(&self, text: &str, trace: AnalysisTrace) -> SentimentResult {
        let mut result = trace.hybrid;
        result.method = AnalysisMethod::Unified;
        result.keywords = self.keywords.keywords(text);
        result.emotions = if self.config.enable_emotion_analysis {
            trace.rule.emotions
        } else {
            None
        };
        result
    }

    /// Analyze one text. Never fails: empty text yields a neutral verdict.
    pub fn analyze(&self, text: &str, language_hint: Option<&str>) -> SentimentResult {
        self.analyze_with(&self.classifier.snapshot(), text, language_hint)
    }

    /// Analyze against one model snapshot; the cache entry is keyed by that snapshot's version.
    fn analyze_with(
        &self,
        state: &NaiveBayesModelState,
        text: &str,
        language_hint: Option<&str>,
    ) -> SentimentResult {
        let key = CacheKey {
            text: text.to_string(),
            hint: language_hint.map(|h| h.trim().to_lowercase()),
            model_version: state.version,
        };

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&key) {
                debug!("Result cache hit (model v{})", key.model_version);
                return hit.clone();
            }
        }

        let result = self.unify(text, self.trace_with(state, text, language_hint));

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(key, result.clone());
        }
        result
    }

    /// Analyze one untyped JSON value: a string or `{ "text": ..., "language"?: ... }`.
    pub fn analyze_json(&self, value: &Value) -> Result<SentimentResult, EngineError> {
        match value {
            Value::String(text) => Ok(self.analyze(text, None)),
            Value::Object(map) => {
                let text = match map.get("text") {
                    Some(Value::String(text)) => text,
                    Some(other) => {
                        return Err(EngineError::InvalidInput(format!(
                            "Field 'text' must be a string, got {}",
                            json_type(other)
                        )))
                    }
                    None => {
                        return Err(EngineError::InvalidInput(
                            "Missing field 'text'".to_string(),
                        ))
                    }
                };
                let hint = match map.get("language").or_else(|| map.get("lang")) {
                    Some(Value::String(code)) => Some(code.as_str()),
                    Some(Value::Null) | None => None,
                    Some(other) => {
                        return Err(EngineError::InvalidInput(format!(
                            "Field 'language' must be a string, got {}",
                            json_type(other)
                        )))
                    }
                };
                Ok(self.analyze(text, hint))
            }
            other => Err(EngineError::InvalidInput(format!(
                "Expected a string or an object with 'text', got {}",
                json_type(other)
            ))),
        }
    }

    /// Analyze one batch item.
    pub fn analyze_input(&self, input: &AnalysisInput) -> Result<SentimentResult, EngineError> {
        let text = input
            .text
            .as_deref()
            .ok_or_else(|| EngineError::InvalidInput("Batch item has no text".to_string()))?;
        Ok(self.analyze(text, input.language.as_deref()))
    }

    fn fallback(&self, error: &EngineError) -> SentimentResult {
        SentimentResult::neutral(AnalysisMethod::Unified, self.config.min_confidence_threshold)
            .with_explanation(format!("Analysis failed: {}", error))
    }

    /// Analyze many inputs in chunks of `batch_chunk_size`, items of a chunk in parallel.
    ///
    /// Failed items are replaced by a neutral low-confidence verdict and reported
    /// in `failures`; `results[i]` always belongs to `inputs[i]`.
    #[instrument(skip(self, inputs), fields(items = inputs.len()))]
    pub async fn analyze_batch(self: Arc<Self>, inputs: Vec<AnalysisInput>) -> BatchOutcome {
        let start = Instant::now();
        let chunk_size = self.config.batch_chunk_size.max(1);
        let mut results = Vec::with_capacity(inputs.len());
        let mut failures = Vec::new();

        for (chunk_index, chunk) in inputs.chunks(chunk_size).enumerate() {
            let tasks = chunk.iter().cloned().map(|input| {
                let engine = Arc::clone(&self);
                tokio::task::spawn_blocking(move || engine.analyze_input(&input))
            });
            let outcomes = join_all(tasks).await;

            for (offset, (outcome, input)) in outcomes.into_iter().zip(chunk).enumerate() {
                let index = chunk_index * chunk_size + offset;
                let outcome = outcome.unwrap_or_else(|e| Err(EngineError::from(e)));
                match outcome {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        error!("Batch item {} failed: {}", index, e);
                        results.push(self.fallback(&e));
                        failures.push(ItemFailure {
                            index,
                            id: input.id.clone(),
                            kind: e.kind().to_string(),
                            error: e.to_string(),
                        });
                    }
                }
            }

            tokio::task::yield_now().await;
        }

        info!(
            "Batch of {} analyzed in {}ms ({} failures)",
            results.len(),
            start.elapsed().as_millis(),
            failures.len()
        );
        BatchOutcome { results, failures }
    }

    /// Full retrain of the classifier. Returns the new model version.
    #[instrument(skip(self, examples), fields(examples = examples.len()))]
    pub fn train(&self, examples: &[TrainingExample]) -> Result<u64, EngineError> {
        let version = self.classifier.train(examples)?;
        self.persist();
        Ok(version)
    }

    /// Merge more examples into the current model.
    #[instrument(skip(self, examples), fields(examples = examples.len()))]
    pub fn incremental_train(&self, examples: &[TrainingExample]) -> Result<u64, EngineError> {
        let version = self.classifier.incremental_train(examples)?;
        self.persist();
        Ok(version)
    }

    /// Submit ground truth. Returns stats when the record triggered a retrain.
    pub fn provide_feedback(
        &self,
        text: &str,
        actual_label: SentimentLabel,
        user_id: Option<String>,
        source: Option<String>,
    ) -> Result<Option<LearningStats>, EngineError> {
        let outcome = self
            .learner
            .provide_feedback(text, actual_label, user_id, source)?;
        if outcome.is_some() {
            self.persist();
        }
        Ok(outcome)
    }

    /// Submit a set of feedback records, then train on everything buffered.
    ///
    /// Every record is checked before any is buffered, so a bad record rejects
    /// the whole set instead of leaving part of it waiting in the buffer.
    pub fn provide_feedback_batch(
        &self,
        inputs: Vec<FeedbackInput>,
    ) -> Result<LearningStats, EngineError> {
        if let Some(index) = inputs.iter().position(|i| i.text.trim().is_empty()) {
            return Err(EngineError::InvalidInput(format!(
                "Feedback record {} has empty text",
                index
            )));
        }
        for input in inputs {
            self.provide_feedback(&input.text, input.actual_label, input.user_id, input.source)?;
        }
        self.force_process_buffer()
    }

    pub fn force_process_buffer(&self) -> Result<LearningStats, EngineError> {
        let stats = self.learner.force_process_buffer()?;
        self.persist();
        Ok(stats)
    }

    pub fn auto_learning_stats(&self) -> LearningStats {
        self.learner.auto_learning_stats()
    }

    /// Spawn a learning actor over this engine's learner. Requires a tokio runtime.
    pub fn spawn_learning_actor(&self) -> LearningActorHandle {
        LearningActorHandle::new(self.learner.clone())
    }

    pub fn save_model(&self, path: &Path) -> Result<(), EngineError> {
        write_atomic(path, &self.classifier.serialize()?)?;
        info!("Saved model v{} to {:?}", self.classifier.version(), path);
        Ok(())
    }

    pub fn load_model(&self, path: &Path) -> Result<u64, EngineError> {
        let json = std::fs::read_to_string(path)?;
        self.classifier.deserialize(&json)
    }

    /// Write the snapshot to `model_path` if configured. Failures are logged only:
    /// the in-memory model is already updated.
    fn persist(&self) {
        if let Some(path) = &self.config.model_path {
            if let Err(e) = self.save_model(path) {
                warn!("Failed to persist model snapshot to {:?}: {}", path, e);
            }
        }
    }

    /// Score every method against a labeled dataset.
    #[instrument(skip(self, examples), fields(examples = examples.len()))]
    pub fn evaluate_dataset(
        &self,
        examples: &[TrainingExample],
    ) -> Result<EvaluationReport, EngineError> {
        if examples.is_empty() {
            return Err(EngineError::InvalidInput(
                "Evaluation dataset is empty".to_string(),
            ));
        }
        if !self.classifier.is_trained() {
            return Err(EngineError::ModelNotTrained(
                "Train the classifier before evaluating".to_string(),
            ));
        }

        let mut rule = Vec::with_capacity(examples.len());
        let mut naive = Vec::with_capacity(examples.len());
        let mut hybrid = Vec::with_capacity(examples.len());
        let mut detailed_results = Vec::with_capacity(examples.len());
        let mut disagreements = 0usize;

        for example in examples {
            let trace = self.trace(&example.text, example.language.as_deref());
            let prediction = |result: &SentimentResult| LabeledPrediction {
                actual: example.label,
                predicted: result.label,
                confidence: Some(result.confidence),
            };
            rule.push(prediction(&trace.rule));
            naive.push(prediction(&trace.naive));
            hybrid.push(prediction(&trace.hybrid));

            if !trace.rule.label.agrees_with(trace.naive.label) {
                disagreements += 1;
            }
            detailed_results.push(DetailedResult {
                text: example.text.clone(),
                actual: example.label,
                predicted: trace.hybrid.label,
                confidence: trace.hybrid.confidence,
                rule_label: trace.rule.label,
                naive_label: trace.naive.label,
                correct: example.label.agrees_with(trace.hybrid.label),
            });
        }

        let method = |predictions: &[LabeledPrediction]| {
            let metrics = evaluate(predictions);
            MethodEvaluation {
                correct: metrics.correct(),
                accuracy: metrics.accuracy,
                metrics,
            }
        };
        let by_method = MethodBreakdown {
            rule: method(&rule),
            naive: method(&naive),
            hybrid: method(&hybrid),
        };

        // Hybrid wins ties.
        let mut strongest = (AnalysisMethod::Hybrid, by_method.hybrid.accuracy);
        for (candidate, accuracy) in [
            (AnalysisMethod::Rule, by_method.rule.accuracy),
            (AnalysisMethod::Naive, by_method.naive.accuracy),
        ] {
            if accuracy > strongest.1 {
                strongest = (candidate, accuracy);
            }
        }

        let total = examples.len();
        let report = EvaluationReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model_version: self.classifier.version(),
            overall: OverallScore {
                total,
                correct: by_method.hybrid.correct,
                accuracy: by_method.hybrid.accuracy,
            },
            confusion_matrix: by_method.hybrid.metrics.confusion_matrix,
            insights: Insights {
                strongest_method: strongest.0,
                average_confidence: by_method.hybrid.metrics.average_confidence.unwrap_or(0.0),
                disagreement_rate: disagreements as f64 / total as f64,
            },
            by_method,
            detailed_results,
        };

        info!(
            "Evaluated {} samples: hybrid {:.3}, rule {:.3}, naive {:.3}",
            total,
            report.by_method.hybrid.accuracy,
            report.by_method.rule.accuracy,
            report.by_method.naive.accuracy
        );
        Ok(report)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
