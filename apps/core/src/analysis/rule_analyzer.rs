//! Lexical rule-based analyzer.
//!
//! Scores a [`SignalBundle`] against the lexicon of the detected language.

use super::language::Language;
use super::lexicon::{Emotion, LexiconSet};
use super::tokenizer::SignalBundle;
use crate::models::{AnalysisMethod, Emotions, SentimentLabel, SentimentResult};

/// Confidence reported when no lexicon word matched.
const NO_MATCH_CONFIDENCE: f64 = 0.6;
const MAX_CONFIDENCE: f64 = 0.95;

/// Rule-based analyzer over per-language lexicons
pub struct RuleAnalyzer {
    lexicons: &'static LexiconSet,
    label_threshold: f64,
    strong_threshold: f64,
    emotions_enabled: bool,
}

impl Default for RuleAnalyzer {
    fn default() -> Self {
        Self::new(0.1, 0.75, true)
    }
}

impl RuleAnalyzer {
    pub fn new(label_threshold: f64, strong_threshold: f64, emotions_enabled: bool) -> Self {
        Self {
            lexicons: LexiconSet::shared(),
            label_threshold,
            strong_threshold,
            emotions_enabled,
        }
    }

    /// Analyze signals with the lexicon of `language`.
    pub fn analyze(&self, signals: &SignalBundle, language: Language) -> SentimentResult {
        let lexicon = self.lexicons.for_language(language);

        let mut sum = 0.0;
        let mut absolute = 0.0;
        let mut hits = 0usize;
        let mut matched: Vec<String> = Vec::new();
        let mut emotion_mass = [0.0f64; 6];

        for (token, modifier) in signals.tokens.iter().zip(&signals.modifiers) {
            let Some(weight) = lexicon.weight(token) else {
                continue;
            };
            let sign = if modifier.negated { -1.0 } else { 1.0 };
            let contribution = weight * modifier.multiplier * sign;
            hits += 1;
            sum += contribution;
            absolute += contribution.abs();
            if !matched.contains(token) {
                matched.push(token.clone());
            }

            if self.emotions_enabled && !modifier.negated {
                for emotion in self.lexicons.emotions_of(token) {
                    emotion_mass[emotion_slot(*emotion)] += modifier.multiplier;
                }
            }
        }

        if hits == 0 {
            let mut result = SentimentResult::neutral(AnalysisMethod::Rule, NO_MATCH_CONFIDENCE);
            if self.emotions_enabled {
                result.emotions = Some(Emotions::default());
            }
            result.language = Some(language.code().to_string());
            return result.with_explanation("No lexicon matches");
        }

        let score = (sum / (hits as f64).sqrt()).clamp(-1.0, 1.0);
        let label = SentimentLabel::from_score(score, self.label_threshold, self.strong_threshold);
        let confidence = (0.5 + score.abs() * 0.3).min(MAX_CONFIDENCE);
        let magnitude = (absolute / (signals.tokens.len() as f64).sqrt()).min(1.0);

        let emotions = self.emotions_enabled.then(|| project_emotions(&emotion_mass));

        SentimentResult {
            label,
            score,
            confidence,
            magnitude,
            emotions,
            keywords: matched,
            method: AnalysisMethod::Rule,
            explanation: Some(format!(
                "{} lexicon matches ({}), {} negation flips",
                hits,
                lexicon.language.code(),
                signals.negation_flips
            )),
            language: Some(language.code().to_string()),
        }
    }
}

fn emotion_slot(emotion: Emotion) -> usize {
    match emotion {
        Emotion::Joy => 0,
        Emotion::Sadness => 1,
        Emotion::Anger => 2,
        Emotion::Fear => 3,
        Emotion::Surprise => 4,
        Emotion::Disgust => 5,
    }
}

/// Saturating projection of accumulated emotion mass into [0, 1).
fn project_emotions(mass: &[f64; 6]) -> Emotions {
    let squash = |m: f64| 1.0 - (-m).exp();
    Emotions {
        joy: squash(mass[0]),
        sadness: squash(mass[1]),
        anger: squash(mass[2]),
        fear: squash(mass[3]),
        surprise: squash(mass[4]),
        disgust: squash(mass[5]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenizer::SignalExtractor;

    fn analyze(text: &str, language: Language) -> SentimentResult {
        let signals = SignalExtractor::default().extract(text);
        RuleAnalyzer::default().analyze(&signals, language)
    }

    #[test]
    fn test_positive_text() {
        let result = analyze("I love this phone, it is excellent", Language::English);
        assert!(result.label.agrees_with(SentimentLabel::Positive));
        assert!(result.score > 0.1);
        assert_eq!(result.method, AnalysisMethod::Rule);
        assert!(result.keywords.contains(&"love".to_string()));
    }

    #[test]
    fn test_score_formula() {
        // (0.9 + 0.9) / sqrt(2), clamped to 1.0
        let result = analyze("love excellent", Language::English);
        assert_eq!(result.score, 1.0);
        assert!((result.confidence - 0.8).abs() < 1e-9);

        // 0.6 / sqrt(1)
        let result = analyze("good", Language::English);
        assert!((result.score - 0.6).abs() < 1e-9);
        assert!((result.confidence - 0.68).abs() < 1e-9);
    }

    #[test]
    fn test_negation_flips_score() {
        let result = analyze("this is not good", Language::English);
        assert!(result.label.agrees_with(SentimentLabel::Negative));
        assert!(result.score < -0.1);
    }

    #[test]
    fn test_intensifier_boosts_score() {
        let plain = analyze("the food was nice", Language::English);
        let boosted = analyze("the food was very nice", Language::English);
        assert!(boosted.score > plain.score);
    }

    #[test]
    fn test_no_match_is_neutral_with_fallback_confidence() {
        let result = analyze("the package arrived on tuesday", Language::English);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn test_empty_signals_are_neutral() {
        let result = RuleAnalyzer::default().analyze(&SignalBundle::default(), Language::English);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.magnitude, 0.0);
    }

    #[test]
    fn test_spanish_lexicon() {
        let result = analyze("El servicio es pésimo y muy lento", Language::Spanish);
        assert!(result.label.agrees_with(SentimentLabel::Negative));

        let result = analyze("No me gusta", Language::Spanish);
        assert!(result.score < 0.0);
    }

    #[test]
    fn test_emotions_projection() {
        let result = analyze("I am so angry and furious 😡", Language::English);
        let emotions = result.emotions.expect("emotions enabled by default");
        assert!(emotions.anger > 0.5);
        assert!(emotions.anger < 1.0);
        assert_eq!(emotions.joy, 0.0);
    }

    #[test]
    fn test_emotions_disabled() {
        let signals = SignalExtractor::default().extract("so happy today");
        let result = RuleAnalyzer::new(0.1, 0.75, false).analyze(&signals, Language::English);
        assert!(result.emotions.is_none());
    }

    #[test]
    fn test_bounds() {
        let result = analyze(
            "worst worst worst terrible awful horrible scam garbage",
            Language::English,
        );
        assert!(result.score >= -1.0);
        assert!(result.confidence <= 0.95);
        assert!(result.magnitude <= 1.0);
        assert_eq!(result.label, SentimentLabel::VeryNegative);
    }
}
