//! Engine configuration.
//!
//! Every tunable constant of the engine lives here with its default. Values can be
//! loaded from a JSON file or from `SENTIMENT_*` environment variables (a `.env`
//! file is honoured through `dotenv`), and are always validated before use.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use validator::Validate;

use crate::error::EngineError;

/// Weights and thresholds used by the hybrid reconcile step.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HybridWeights {
    /// Multiplier applied to both weights when rule and naive labels agree.
    #[validate(range(min = 1.0, max = 3.0))]
    pub agreement_bonus: f64,
    /// Rule-weight penalty for Spanish, whose lexicon is thinner than English.
    #[validate(range(min = 0.0, max = 1.0))]
    pub spanish_rule_penalty: f64,
    /// Rule-weight penalty for every other language (and undetected text).
    #[validate(range(min = 0.0, max = 1.0))]
    pub low_coverage_rule_penalty: f64,
    /// Rule-weight factor when the text carries intensifiers or emoji.
    #[validate(range(min = 0.5, max = 2.0))]
    pub intensity_rule_factor: f64,
    /// Below this many tokens the naive weight is reduced.
    pub short_text_tokens: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub short_text_naive_factor: f64,
    /// Above this many tokens the rule weight is reduced.
    pub long_text_tokens: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub long_text_rule_factor: f64,
    /// Sarcasm scores strictly above this trigger the override.
    #[validate(range(min = 0.0))]
    pub sarcasm_threshold: f64,
    /// Negative shift applied to the blended score per threshold unit of sarcasm.
    #[validate(range(min = 0.0, max = 1.0))]
    pub sarcasm_shift: f64,
    /// Signed score the naive label maps to when blending.
    #[validate(range(min = 0.0, max = 1.0))]
    pub naive_label_score: f64,
    /// Final label threshold on the blended score.
    #[validate(range(min = 0.0, max = 1.0))]
    pub label_threshold: f64,
    /// Confidence scale when the two methods disagree.
    #[validate(range(min = 0.0, max = 1.0))]
    pub disagreement_scale: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            agreement_bonus: 1.2,
            spanish_rule_penalty: 0.05,
            low_coverage_rule_penalty: 0.15,
            intensity_rule_factor: 1.1,
            short_text_tokens: 4,
            short_text_naive_factor: 0.8,
            long_text_tokens: 60,
            long_text_rule_factor: 0.85,
            sarcasm_threshold: 1.0,
            sarcasm_shift: 0.2,
            naive_label_score: 0.7,
            label_threshold: 0.15,
            disagreement_scale: 0.9,
        }
    }
}

/// Settings of the feedback loop.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LearningConfig {
    /// Buffer size that triggers an automatic retrain.
    #[validate(range(min = 1))]
    pub feedback_batch_size: usize,
    /// Hard cap on buffered feedback; the oldest record is dropped beyond it.
    #[validate(range(min = 1))]
    pub buffer_capacity: usize,
    /// How many recent feedback records are re-predicted before/after training.
    #[validate(range(min = 1))]
    pub holdout_size: usize,
    /// Period of the background flush run by the learning actor.
    #[validate(range(min = 1))]
    pub flush_interval_secs: u64,
    /// Smoothing factor of the rolling accuracy estimate.
    #[validate(range(min = 0.0, max = 1.0))]
    pub rolling_alpha: f64,
    /// Deadline for one request to the learning actor, training included.
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            feedback_batch_size: 50,
            buffer_capacity: 1000,
            holdout_size: 20,
            flush_interval_secs: 300,
            rolling_alpha: 0.3,
            request_timeout_ms: 30_000,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Brand names always surfaced first in `keywords` when they occur in the text.
    pub brand_keywords: Vec<String>,
    pub enable_emotion_analysis: bool,
    /// Confidence floor of the naive classifier; also the fallback confidence.
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_confidence_threshold: f64,
    /// Multiplier applied to a sentiment word preceded by an intensifier.
    #[validate(range(min = 1.0, max = 5.0))]
    pub intensifier_factor: f64,
    /// Rule-analyzer label threshold.
    #[validate(range(min = 0.0, max = 1.0))]
    pub rule_label_threshold: f64,
    /// |score| at or above which `very_*` labels are emitted.
    #[validate(range(min = 0.0, max = 1.0))]
    pub strong_label_threshold: f64,
    #[validate(range(min = 1, max = 25))]
    pub max_keywords: usize,
    #[validate(range(min = 1))]
    pub batch_chunk_size: usize,
    /// Entries of the result cache; 0 disables it.
    pub cache_capacity: usize,
    /// Snapshot file loaded at start and written after training, if set.
    pub model_path: Option<PathBuf>,
    #[validate(nested)]
    pub hybrid: HybridWeights,
    #[validate(nested)]
    pub learning: LearningConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            brand_keywords: vec![],
            enable_emotion_analysis: true,
            min_confidence_threshold: 0.2,
            intensifier_factor: 1.5,
            rule_label_threshold: 0.1,
            strong_label_threshold: 0.75,
            max_keywords: 5,
            batch_chunk_size: 10,
            cache_capacity: 512,
            model_path: None,
            hybrid: HybridWeights::default(),
            learning: LearningConfig::default(),
        }
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, EngineError> {
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| EngineError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

impl EngineConfig {
    /// Validate the configuration, mapping failures to `EngineError::Config`.
    pub fn validated(self) -> Result<Self, EngineError> {
        self.validate()?;
        if self.strong_label_threshold <= self.rule_label_threshold {
            return Err(EngineError::Config(
                "strong_label_threshold must exceed rule_label_threshold".to_string(),
            ));
        }
        if self.learning.buffer_capacity < self.learning.feedback_batch_size {
            return Err(EngineError::Config(
                "learning.buffer_capacity must be at least learning.feedback_batch_size".to_string(),
            ));
        }
        Ok(self)
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validated()
    }

    /// Load defaults overridden by `SENTIMENT_*` environment variables.
    pub fn from_env() -> Result<Self, EngineError> {
        dotenv::dotenv().ok();
        let mut config = EngineConfig::default();

        if let Some(raw) = env_value::<String>("SENTIMENT_BRAND_KEYWORDS")? {
            config.brand_keywords = raw
                .split(',')
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }
        if let Some(v) = env_value("SENTIMENT_ENABLE_EMOTIONS")? {
            config.enable_emotion_analysis = v;
        }
        if let Some(v) = env_value("SENTIMENT_MIN_CONFIDENCE")? {
            config.min_confidence_threshold = v;
        }
        if let Some(v) = env_value("SENTIMENT_INTENSIFIER_FACTOR")? {
            config.intensifier_factor = v;
        }
        if let Some(v) = env_value("SENTIMENT_BATCH_CHUNK_SIZE")? {
            config.batch_chunk_size = v;
        }
        if let Some(v) = env_value("SENTIMENT_CACHE_CAPACITY")? {
            config.cache_capacity = v;
        }
        if let Some(v) = env_value::<String>("SENTIMENT_MODEL_PATH")? {
            config.model_path = Some(PathBuf::from(v));
        }
        if let Some(v) = env_value("SENTIMENT_AGREEMENT_BONUS")? {
            config.hybrid.agreement_bonus = v;
        }
        if let Some(v) = env_value("SENTIMENT_SARCASM_THRESHOLD")? {
            config.hybrid.sarcasm_threshold = v;
        }
        if let Some(v) = env_value("SENTIMENT_FEEDBACK_BATCH_SIZE")? {
            config.learning.feedback_batch_size = v;
        }
        if let Some(v) = env_value("SENTIMENT_FEEDBACK_CAPACITY")? {
            config.learning.buffer_capacity = v;
        }
        if let Some(v) = env_value("SENTIMENT_FLUSH_INTERVAL_SECS")? {
            config.learning.flush_interval_secs = v;
        }
        if let Some(v) = env_value("SENTIMENT_ACTOR_TIMEOUT_MS")? {
            config.learning.request_timeout_ms = v;
        }

        config.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default().validated().unwrap();
        assert_eq!(config.hybrid.agreement_bonus, 1.2);
        assert_eq!(config.batch_chunk_size, 10);
        assert_eq!(config.intensifier_factor, 1.5);
        assert!(config.enable_emotion_analysis);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let config = EngineConfig {
            min_confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validated(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_nested_validation() {
        let mut config = EngineConfig::default();
        config.hybrid.agreement_bonus = 0.5;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_capacity_below_batch_rejected() {
        let mut config = EngineConfig::default();
        config.learning.buffer_capacity = 10;
        config.learning.feedback_batch_size = 20;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("SENTIMENT_BRAND_KEYWORDS", Some("Acme, Globex")),
                ("SENTIMENT_MIN_CONFIDENCE", Some("0.25")),
                ("SENTIMENT_FEEDBACK_BATCH_SIZE", Some("5")),
                ("SENTIMENT_ENABLE_EMOTIONS", Some("false")),
            ],
            || {
                let config = EngineConfig::from_env().unwrap();
                assert_eq!(config.brand_keywords, vec!["acme", "globex"]);
                assert_eq!(config.min_confidence_threshold, 0.25);
                assert_eq!(config.learning.feedback_batch_size, 5);
                assert!(!config.enable_emotion_analysis);
            },
        );
    }

    #[test]
    fn test_from_env_invalid_value() {
        temp_env::with_var("SENTIMENT_BATCH_CHUNK_SIZE", Some("ten"), || {
            let err = EngineConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("SENTIMENT_BATCH_CHUNK_SIZE"));
        });
    }

    #[test]
    fn test_from_json_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"brand_keywords":["acme"],"hybrid":{"agreement_bonus":1.5}}"#)
            .unwrap();

        let config = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.brand_keywords, vec!["acme"]);
        assert_eq!(config.hybrid.agreement_bonus, 1.5);
        assert_eq!(config.hybrid.sarcasm_threshold, 1.0);
    }
}
