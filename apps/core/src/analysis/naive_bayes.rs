//! Multinomial Naive Bayes classifier.
//!
//! The model state is immutable once built. Training clones the current state,
//! merges new counts into the copy and swaps the shared pointer, so concurrent
//! `predict` calls always see a complete frequency table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

use super::tokenizer::tokenize;
use crate::error::EngineError;
use crate::models::{AnalysisMethod, SentimentLabel, SentimentResult, TrainingExample};

/// Laplace (add-one) smoothing.
const ALPHA: f64 = 1.0;
const MAX_KEYWORDS: usize = 5;

/// Frequency tables of a trained model. Serialized as the model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaiveBayesModelState {
    pub vocabulary: BTreeSet<String>,
    pub class_token_counts: BTreeMap<SentimentLabel, BTreeMap<String, u64>>,
    /// Token totals per class (denominator of the smoothed likelihood).
    pub class_totals: BTreeMap<SentimentLabel, u64>,
    pub class_priors: BTreeMap<SentimentLabel, f64>,
    /// Training documents per class; priors are derived from these.
    #[serde(default)]
    pub class_doc_counts: BTreeMap<SentimentLabel, u64>,
    pub version: u64,
    pub trained_at: Option<DateTime<Utc>>,
}

impl Default for NaiveBayesModelState {
    fn default() -> Self {
        Self::empty()
    }
}

impl NaiveBayesModelState {
    pub fn empty() -> Self {
        Self {
            vocabulary: BTreeSet::new(),
            class_token_counts: BTreeMap::new(),
            class_totals: BTreeMap::new(),
            class_priors: BTreeMap::new(),
            class_doc_counts: BTreeMap::new(),
            version: 0,
            trained_at: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Copy of this state with `documents` merged in, stamped with the next version.
    fn merged_with(&self, documents: &[(SentimentLabel, Vec<String>)]) -> Self {
        let mut next = self.clone();

        for (label, tokens) in documents {
            let label = label.normalized();
            *next.class_doc_counts.entry(label).or_insert(0) += 1;
            let counts = next.class_token_counts.entry(label).or_default();
            for token in tokens {
                *counts.entry(token.clone()).or_insert(0) += 1;
                next.vocabulary.insert(token.clone());
            }
            *next.class_totals.entry(label).or_insert(0) += tokens.len() as u64;
        }

        next.recompute_priors();
        next.version = self.version + 1;
        next.trained_at = Some(Utc::now());
        next
    }

    fn recompute_priors(&mut self) {
        // Snapshots without document counts fall back to token totals.
        let basis = if self.class_doc_counts.is_empty() {
            &self.class_totals
        } else {
            &self.class_doc_counts
        };
        let total: u64 = basis.values().sum();
        self.class_priors = basis
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(label, count)| (*label, *count as f64 / total as f64))
            .collect();
    }

    /// Log-space `P(class) * Π P(token|class)` for every class with a prior.
    fn log_posteriors(&self, tokens: &[String]) -> Vec<(SentimentLabel, f64)> {
        let vocab_size = self.vocabulary.len() as f64;

        self.class_priors
            .iter()
            .map(|(label, prior)| {
                let counts = self.class_token_counts.get(label);
                let total = self.class_totals.get(label).copied().unwrap_or(0) as f64;
                let denominator = total + ALPHA * vocab_size;

                let likelihood: f64 = tokens
                    .iter()
                    .filter(|t| self.vocabulary.contains(*t))
                    .map(|t| {
                        let count = counts.and_then(|c| c.get(t)).copied().unwrap_or(0) as f64;
                        ((count + ALPHA) / denominator).ln()
                    })
                    .sum();

                (*label, prior.ln() + likelihood)
            })
            .collect()
    }
}

fn to_documents(examples: &[TrainingExample]) -> Vec<(SentimentLabel, Vec<String>)> {
    let mut skipped = 0usize;
    let documents: Vec<_> = examples
        .iter()
        .filter_map(|example| {
            let tokens = tokenize(&example.text);
            if tokens.is_empty() {
                skipped += 1;
                None
            } else {
                Some((example.label.normalized(), tokens))
            }
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {} training examples without usable tokens", skipped);
    }
    documents
}

/// Classifier owning the shared, swappable model state.
pub struct NaiveBayesClassifier {
    state: RwLock<Arc<NaiveBayesModelState>>,
    /// Serializes writers so two concurrent trainings cannot drop each other's counts.
    training: Mutex<()>,
    confidence_floor: f64,
}

impl Default for NaiveBayesClassifier {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl NaiveBayesClassifier {
    /// Create an untrained classifier.
    pub fn new(confidence_floor: f64) -> Self {
        Self::from_state(NaiveBayesModelState::empty(), confidence_floor)
    }

    pub fn from_state(state: NaiveBayesModelState, confidence_floor: f64) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            training: Mutex::new(()),
            confidence_floor,
        }
    }

    /// Current immutable state. Cheap: clones the pointer only.
    pub fn snapshot(&self) -> Arc<NaiveBayesModelState> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, next: NaiveBayesModelState) -> u64 {
        let version = next.version;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        version
    }

    pub fn is_trained(&self) -> bool {
        self.snapshot().is_trained()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    pub fn vocabulary_size(&self) -> usize {
        self.snapshot().vocabulary.len()
    }

    /// Full retrain: replaces all counts. Returns the new model version.
    #[instrument(skip(self, examples), fields(examples = examples.len()))]
    pub fn train(&self, examples: &[TrainingExample]) -> Result<u64, EngineError> {
        let documents = to_documents(examples);
        if documents.is_empty() {
            return Err(EngineError::TrainingData(
                "No valid training examples provided".to_string(),
            ));
        }

        let _guard = self.training.lock().unwrap_or_else(PoisonError::into_inner);
        let mut base = NaiveBayesModelState::empty();
        base.version = self.snapshot().version;
        let next = base.merged_with(&documents);
        info!(
            "Naive Bayes trained: version {}, {} documents, vocabulary {}",
            next.version,
            documents.len(),
            next.vocabulary.len()
        );
        Ok(self.swap(next))
    }

    /// Merge new examples into the current counts. Returns the new model version.
    #[instrument(skip(self, examples), fields(examples = examples.len()))]
    pub fn incremental_train(&self, examples: &[TrainingExample]) -> Result<u64, EngineError> {
        let documents = to_documents(examples);
        if documents.is_empty() {
            return Err(EngineError::TrainingData(
                "No valid training examples provided".to_string(),
            ));
        }

        let _guard = self.training.lock().unwrap_or_else(PoisonError::into_inner);
        let next = self.snapshot().merged_with(&documents);
        info!(
            "Naive Bayes incrementally trained: version {}, +{} documents, vocabulary {}",
            next.version,
            documents.len(),
            next.vocabulary.len()
        );
        Ok(self.swap(next))
    }

    /// Predict with a deterministic neutral fallback when untrained.
    pub fn predict(&self, text: &str) -> SentimentResult {
        self.predict_with(&self.snapshot(), text)
    }

    /// Predict, failing with `ModelNotTrained` instead of falling back.
    pub fn predict_strict(&self, text: &str) -> Result<SentimentResult, EngineError> {
        let state = self.snapshot();
        if !state.is_trained() {
            return Err(EngineError::ModelNotTrained(
                "Naive Bayes vocabulary is empty".to_string(),
            ));
        }
        Ok(self.predict_with(&state, text))
    }

    /// Predict against an explicit snapshot.
    pub fn predict_with(&self, state: &NaiveBayesModelState, text: &str) -> SentimentResult {
        if !state.is_trained() {
            return SentimentResult::neutral(AnalysisMethod::Naive, self.confidence_floor)
                .with_explanation("Model not trained; neutral fallback");
        }

        let tokens = tokenize(text);
        let scores = state.log_posteriors(&tokens);

        // Softmax over log scores
        let max_score = scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let sum_exp: f64 = scores.iter().map(|(_, s)| (s - max_score).exp()).sum();
        let probability = |label: SentimentLabel| {
            scores
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, s)| (s - max_score).exp() / sum_exp)
                .unwrap_or(0.0)
        };

        // First maximum wins, so ties resolve in label order.
        let mut winner = SentimentLabel::Neutral;
        let mut best = f64::NEG_INFINITY;
        for (label, score) in &scores {
            if *score > best {
                best = *score;
                winner = *label;
            }
        }

        let posterior = probability(winner);
        let score = (probability(SentimentLabel::Positive) - probability(SentimentLabel::Negative))
            .clamp(-1.0, 1.0);

        let mut keywords: Vec<String> = Vec::new();
        for token in tokens.iter().filter(|t| state.vocabulary.contains(*t)) {
            if keywords.len() >= MAX_KEYWORDS {
                break;
            }
            if !keywords.contains(token) {
                keywords.push(token.clone());
            }
        }

        debug!(
            "Naive Bayes prediction: {} ({:.3}) with model v{}",
            winner, posterior, state.version
        );

        SentimentResult {
            label: winner,
            score,
            confidence: posterior.max(self.confidence_floor).min(1.0),
            magnitude: score.abs(),
            emotions: None,
            keywords,
            method: AnalysisMethod::Naive,
            explanation: Some(format!(
                "Posterior {:.3} for {} (model v{})",
                posterior, winner, state.version
            )),
            language: None,
        }
    }

    /// Serialize the current state as the JSON snapshot.
    pub fn serialize(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self.snapshot().as_ref())?)
    }

    /// Replace the current state with a snapshot.
    pub fn deserialize(&self, json: &str) -> Result<u64, EngineError> {
        let mut state: NaiveBayesModelState = serde_json::from_str(json)?;
        for (label, counts) in &state.class_token_counts {
            let sum: u64 = counts.values().sum();
            if state.class_totals.get(label).copied().unwrap_or(0) != sum {
                return Err(EngineError::Serialization(format!(
                    "Snapshot totals for {} do not match its token counts",
                    label
                )));
            }
        }
        if state.class_priors.is_empty() && state.is_trained() {
            state.recompute_priors();
        }

        let _guard = self.training.lock().unwrap_or_else(PoisonError::into_inner);
        info!(
            "Loaded Naive Bayes snapshot v{} ({} tokens)",
            state.version,
            state.vocabulary.len()
        );
        Ok(self.swap(state))
    }
}
