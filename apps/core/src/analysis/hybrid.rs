//! Hybrid weighting: reconciles the rule and Naive Bayes verdicts into one.

use tracing::debug;

use super::language::Language;
use super::tokenizer::SignalBundle;
use crate::config::HybridWeights;
use crate::models::{AnalysisMethod, SentimentLabel, SentimentResult};

/// Per-method weights after every adjustment, before blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodWeights {
    pub rule: f64,
    pub naive: f64,
}

impl MethodWeights {
    pub fn dominant(&self) -> AnalysisMethod {
        if self.rule >= self.naive {
            AnalysisMethod::Rule
        } else {
            AnalysisMethod::Naive
        }
    }
}

pub struct HybridWeighting {
    weights: HybridWeights,
    strong_threshold: f64,
}

impl Default for HybridWeighting {
    fn default() -> Self {
        Self::new(HybridWeights::default(), 0.75)
    }
}

impl HybridWeighting {
    pub fn new(weights: HybridWeights, strong_threshold: f64) -> Self {
        Self {
            weights,
            strong_threshold,
        }
    }

    pub fn weights(&self) -> &HybridWeights {
        &self.weights
    }

    fn language_penalty(&self, language: Language) -> f64 {
        match language {
            Language::English => 0.0,
            Language::Spanish => self.weights.spanish_rule_penalty,
            _ => self.weights.low_coverage_rule_penalty,
        }
    }

    /// Adjusted weights for one pair of verdicts.
    pub fn method_weights(
        &self,
        rule: &SentimentResult,
        naive: &SentimentResult,
        language: Language,
        signals: &SignalBundle,
    ) -> MethodWeights {
        let w = &self.weights;
        let mut rule_weight = rule.confidence;
        let mut naive_weight = naive.confidence;

        if rule.label.agrees_with(naive.label) {
            rule_weight *= w.agreement_bonus;
            naive_weight *= w.agreement_bonus;
        }

        rule_weight *= 1.0 - self.language_penalty(language);

        if signals.intensifier_boost > 0.0 || signals.emoji_count() > 0 {
            rule_weight *= w.intensity_rule_factor;
        }
        let token_count = signals.tokens.len();
        if token_count < w.short_text_tokens {
            naive_weight *= w.short_text_naive_factor;
        }
        if token_count > w.long_text_tokens {
            rule_weight *= w.long_text_rule_factor;
        }

        MethodWeights {
            rule: rule_weight,
            naive: naive_weight,
        }
    }

    fn naive_signed(&self, label: SentimentLabel) -> f64 {
        match label.normalized() {
            SentimentLabel::Positive => self.weights.naive_label_score,
            SentimentLabel::Negative => -self.weights.naive_label_score,
            _ => 0.0,
        }
    }

    /// Blend both verdicts into a `Hybrid` result.
    pub fn reconcile(
        &self,
        rule: &SentimentResult,
        naive: &SentimentResult,
        language: Language,
        signals: &SignalBundle,
    ) -> SentimentResult {
        let w = &self.weights;
        let agree = rule.label.agrees_with(naive.label);
        let weights = self.method_weights(rule, naive, language, signals);

        let mut rule_score = rule.score;
        let mut naive_score = self.naive_signed(naive.label);

        let sarcastic = signals.sarcasm_score > w.sarcasm_threshold;
        if sarcastic {
            rule_score = -rule_score.abs();
            naive_score = -naive_score.abs();
        }

        let total = weights.rule + weights.naive;
        let mut score = if total > 0.0 {
            (naive_score * weights.naive + rule_score * weights.rule) / total
        } else {
            0.0
        };

        if sarcastic {
            let ratio = if w.sarcasm_threshold > 0.0 {
                (signals.sarcasm_score / w.sarcasm_threshold).min(2.0)
            } else {
                2.0
            };
            score -= w.sarcasm_shift * ratio;
        }
        let score = score.clamp(-1.0, 1.0);

        let confidence = if agree {
            let bonus_mean =
                (rule.confidence * w.agreement_bonus + naive.confidence * w.agreement_bonus) / 2.0;
            bonus_mean
                .min(1.0)
                .max(rule.confidence.min(naive.confidence))
        } else {
            rule.confidence.max(naive.confidence) * w.disagreement_scale
        };

        let label = SentimentLabel::from_score(score, w.label_threshold, self.strong_threshold);

        let mut keywords = rule.keywords.clone();
        for keyword in &naive.keywords {
            if !keywords.contains(keyword) {
                keywords.push(keyword.clone());
            }
        }

        let dominant = match weights.dominant() {
            AnalysisMethod::Rule => "rule",
            _ => "naive",
        };
        let mut explanation = if agree {
            format!(
                "Rule and naive methods agree on {}; {} method dominant ({:.2} vs {:.2})",
                rule.label.normalized(),
                dominant,
                weights.rule,
                weights.naive
            )
        } else {
            format!(
                "Rule ({}) and naive ({}) methods disagree; {} method dominant ({:.2} vs {:.2})",
                rule.label,
                naive.label,
                dominant,
                weights.rule,
                weights.naive
            )
        };
        if sarcastic {
            explanation.push_str(&format!(
                "; sarcasm override applied (score {:.1})",
                signals.sarcasm_score
            ));
        }
        if signals.negation_flips > 0 {
            explanation.push_str(&format!(
                "; {} negation flip(s) corrected",
                signals.negation_flips
            ));
        }

        debug!(
            "Hybrid reconcile: rule={} naive={} -> {} ({:.3})",
            rule.label, naive.label, label, score
        );

        SentimentResult {
            label,
            score,
            confidence: confidence.clamp(0.0, 1.0),
            magnitude: rule.magnitude.max(score.abs()).min(1.0),
            emotions: rule.emotions,
            keywords,
            method: AnalysisMethod::Hybrid,
            explanation: Some(explanation),
            language: Some(language.code().to_string()),
        }
    }
}
