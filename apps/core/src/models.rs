use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::EngineError;

/// Sentiment class. `VeryPositive`/`VeryNegative` collapse to their base class
/// through [`SentimentLabel::normalized`] wherever labels are compared or counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    VeryPositive,
    VeryNegative,
}

impl SentimentLabel {
    /// The three classes every statistic is reported over, in confusion-matrix order.
    pub const CLASSES: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    /// Collapse `very_*` variants to positive/negative.
    pub fn normalized(self) -> Self {
        match self {
            SentimentLabel::VeryPositive => SentimentLabel::Positive,
            SentimentLabel::VeryNegative => SentimentLabel::Negative,
            other => other,
        }
    }

    /// Row/column index in a confusion matrix (positive, negative, neutral).
    pub fn index(self) -> usize {
        match self.normalized() {
            SentimentLabel::Positive => 0,
            SentimentLabel::Negative => 1,
            _ => 2,
        }
    }

    /// Compare two labels after normalization.
    pub fn agrees_with(self, other: SentimentLabel) -> bool {
        self.normalized() == other.normalized()
    }

    /// Label a signed score: beyond `threshold` is polar, beyond `strong` is `very_*`.
    pub fn from_score(score: f64, threshold: f64, strong: f64) -> Self {
        if score >= strong {
            SentimentLabel::VeryPositive
        } else if score > threshold {
            SentimentLabel::Positive
        } else if score <= -strong {
            SentimentLabel::VeryNegative
        } else if score < -threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::VeryPositive => "very_positive",
            SentimentLabel::VeryNegative => "very_negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            "very_positive" => Ok(SentimentLabel::VeryPositive),
            "very_negative" => Ok(SentimentLabel::VeryNegative),
            other => Err(EngineError::InvalidInput(format!(
                "Unknown sentiment label: {}",
                other
            ))),
        }
    }
}

/// Which stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Rule,
    Naive,
    Hybrid,
    /// Full engine pipeline: hybrid verdict enriched with keywords and emotions.
    Unified,
}

/// Per-emotion magnitudes, each in [0, 1]. They are not required to sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Emotions {
    pub joy: f64,
    pub sadness: f64,
    pub anger: f64,
    pub fear: f64,
    pub surprise: f64,
    pub disgust: f64,
}

impl Emotions {
    /// Name and value of the strongest emotion, if any is non-zero.
    pub fn dominant(&self) -> Option<(&'static str, f64)> {
        [
            ("joy", self.joy),
            ("sadness", self.sadness),
            ("anger", self.anger),
            ("fear", self.fear),
            ("surprise", self.surprise),
            ("disgust", self.disgust),
        ]
        .into_iter()
        .filter(|(_, v)| *v > 0.0)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

/// Verdict for one text. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Signed score in [-1, 1].
    pub score: f64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Strength of the sentiment regardless of sign, in [0, 1].
    pub magnitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotions: Option<Emotions>,
    pub keywords: Vec<String>,
    pub method: AnalysisMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// ISO-639-1 code of the language used for the analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SentimentResult {
    /// Neutral verdict with the given confidence, used for fallbacks.
    pub fn neutral(method: AnalysisMethod, confidence: f64) -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
            confidence,
            magnitude: 0.0,
            emotions: None,
            keywords: vec![],
            method,
            explanation: None,
            language: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// Labeled text used for training and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub label: SentimentLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, label: SentimentLabel) -> Self {
        Self {
            text: text.into(),
            label,
            language: None,
        }
    }
}

/// One piece of ground truth submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub text: String,
    pub actual_label: SentimentLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        text: String,
        actual_label: SentimentLabel,
        user_id: Option<String>,
        source: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            actual_label,
            user_id,
            source,
            received_at: Utc::now(),
        }
    }

    pub fn to_example(&self) -> TrainingExample {
        TrainingExample::new(self.text.clone(), self.actual_label.normalized())
    }
}

/// Wire shape of a feedback submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub text: String,
    pub actual_label: SentimentLabel,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// One batch item: a bare text or a tweet-like record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl AnalysisInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: Some(text.into()),
            language: None,
        }
    }
}
