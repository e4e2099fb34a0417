//! Tokenization and linguistic signal extraction.
//!
//! Turns raw text into tokens, n-grams and an emoji map, then scans for negation
//! flips, intensifier boosts and sarcasm indicators. Pure: no state is kept
//! between calls and the same text always yields the same bundle.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::lexicon::{LexiconSet, CONTEXT_MARKERS, SARCASM_PHRASES};

/// Look-back window (in tokens) for negation words.
pub const NEGATION_WINDOW: usize = 3;
/// Look-ahead window for negative context after a positive word.
const SARCASM_WINDOW: usize = 4;
const DOWNTONER_FACTOR: f64 = 0.5;

// NOTE: expect() is acceptable on static patterns: a bad literal is a programming error.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[:;]['\-]?[()dp]|/s\b|[#@][\p{L}\p{N}_]+|[\p{L}\p{N}]+(?:['’]\p{L}+)*|\p{Extended_Pictographic}",
    )
    .expect("Invalid regex: token pattern")
});

static QUOTED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“”]\s*(\p{L}+)\s*["“”]"#).expect("Invalid regex: quoted word pattern")
});

/// How a single token's lexical contribution is modified by its context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenModifier {
    /// A negation word sits within the look-back window.
    pub negated: bool,
    /// Intensifier (> 1) or downtoner (< 1) factor; 1.0 when unmodified.
    pub multiplier: f64,
}

impl Default for TokenModifier {
    fn default() -> Self {
        Self {
            negated: false,
            multiplier: 1.0,
        }
    }
}

/// Signals derived from one text. Recomputed per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalBundle {
    pub tokens: Vec<String>,
    /// Unigram and bigram counts ("a b" for bigrams).
    pub ngrams: BTreeMap<String, usize>,
    /// Emoji and emoticon counts.
    pub emojis: BTreeMap<String, usize>,
    /// Sentiment-bearing tokens whose polarity was flipped by a negation.
    pub negation_flips: usize,
    /// Sum of the extra weight added by intensifiers.
    pub intensifier_boost: f64,
    pub sarcasm_score: f64,
    /// One entry per token, aligned with `tokens`.
    pub modifiers: Vec<TokenModifier>,
}

impl SignalBundle {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn emoji_count(&self) -> usize {
        self.emojis.values().sum()
    }
}

/// Lower-case and split text, keeping emoji, emoticons, hashtags and mentions whole.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_emoji_token(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| !c.is_alphanumeric() && c != '#' && c != '@' && c != '/')
}

/// Extracts [`SignalBundle`]s using the merged multilingual lexicon.
pub struct SignalExtractor {
    intensifier_factor: f64,
    lexicons: &'static LexiconSet,
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new(1.5)
    }
}

impl SignalExtractor {
    pub fn new(intensifier_factor: f64) -> Self {
        Self {
            intensifier_factor,
            lexicons: LexiconSet::shared(),
        }
    }

    /// Extract all signals from `text`. Empty text yields an all-zero bundle.
    pub fn extract(&self, text: &str) -> SignalBundle {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return SignalBundle::default();
        }

        let mut ngrams = BTreeMap::new();
        for token in &tokens {
            *ngrams.entry(token.clone()).or_insert(0) += 1;
        }
        for pair in tokens.windows(2) {
            *ngrams.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
        }

        let mut emojis = BTreeMap::new();
        for token in tokens.iter().filter(|t| is_emoji_token(t)) {
            *emojis.entry(token.clone()).or_insert(0) += 1;
        }

        let (modifiers, negation_flips, intensifier_boost) = self.scan_modifiers(&tokens);
        let sarcasm_score = self.sarcasm_score(text, &tokens, &modifiers, &emojis);

        SignalBundle {
            tokens,
            ngrams,
            emojis,
            negation_flips,
            intensifier_boost,
            sarcasm_score,
            modifiers,
        }
    }

    fn scan_modifiers(&self, tokens: &[String]) -> (Vec<TokenModifier>, usize, f64) {
        let lexicon = self.lexicons.merged();
        let mut modifiers = Vec::with_capacity(tokens.len());
        let mut flips = 0;
        let mut boost = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            if !lexicon.is_sentiment(token) {
                modifiers.push(TokenModifier::default());
                continue;
            }

            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            let negated = window.iter().any(|t| lexicon.is_negation(t));

            let multiplier = match i.checked_sub(1).map(|p| tokens[p].as_str()) {
                Some(prev) if lexicon.is_intensifier(prev) => self.intensifier_factor,
                Some(prev) if lexicon.is_downtoner(prev) => DOWNTONER_FACTOR,
                _ => 1.0,
            };

            if negated {
                flips += 1;
            }
            if multiplier > 1.0 {
                boost += multiplier - 1.0;
            }
            modifiers.push(TokenModifier {
                negated,
                multiplier,
            });
        }

        (modifiers, flips, boost)
    }

    fn sarcasm_score(
        &self,
        text: &str,
        tokens: &[String],
        modifiers: &[TokenModifier],
        emojis: &BTreeMap<String, usize>,
    ) -> f64 {
        let lexicon = self.lexicons.merged();
        let lower = text.to_lowercase();
        let mut score = 0.0;

        // Positive word followed by negative context
        for (i, token) in tokens.iter().enumerate() {
            if !lexicon.is_positive(token) || modifiers[i].negated || is_emoji_token(token) {
                continue;
            }
            let ahead = &tokens[i + 1..tokens.len().min(i + 1 + SARCASM_WINDOW)];
            if ahead.iter().any(|t| lexicon.is_negative(t)) {
                score += 1.0;
            }
            if ahead
                .first()
                .is_some_and(|next| CONTEXT_MARKERS.contains(&next.as_str()))
            {
                score += 0.5;
            }
        }

        // "Great, ..." / "Perfect! ..."
        if let Some(first) = tokens.first() {
            if lexicon.is_positive(first) {
                let rest = lower.trim_start().strip_prefix(first.as_str()).unwrap_or("");
                if rest.starts_with([',', '!', '.', '…']) {
                    score += 0.5;
                }
            }
        }

        score += SARCASM_PHRASES
            .iter()
            .filter(|phrase| lower.contains(*phrase))
            .count() as f64;

        // Scare-quoted praise next to a negative emoji
        let negative_emoji = emojis.keys().any(|e| lexicon.is_negative(e));
        if negative_emoji
            && QUOTED_WORD
                .captures_iter(&lower)
                .any(|c| lexicon.is_positive(&c[1]))
        {
            score += 1.0;
        }

        if tokens.iter().any(|t| t == "/s") {
            score += 2.0;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_preserves_special_tokens() {
        let tokens = tokenize("Loving the new #Update @acme 😍 :) don't stop!");
        assert_eq!(
            tokens,
            vec!["loving", "the", "new", "#update", "@acme", "😍", ":)", "don't", "stop"]
        );
    }

    #[test]
    fn test_empty_text_gives_zero_bundle() {
        let bundle = SignalExtractor::default().extract("");
        assert!(bundle.is_empty());
        assert_eq!(bundle, SignalBundle::default());
        assert_eq!(SignalExtractor::default().extract("   ...  ").sarcasm_score, 0.0);
    }

    #[test]
    fn test_ngrams_and_emojis() {
        let bundle = SignalExtractor::default().extract("good good day 👍 👍");
        assert_eq!(bundle.ngrams.get("good"), Some(&2));
        assert_eq!(bundle.ngrams.get("good good"), Some(&1));
        assert_eq!(bundle.ngrams.get("good day"), Some(&1));
        assert_eq!(bundle.emojis.get("👍"), Some(&2));
        assert_eq!(bundle.emoji_count(), 2);
    }

    #[test]
    fn test_negation_look_back_window() {
        let extractor = SignalExtractor::default();

        let bundle = extractor.extract("this is not good");
        assert_eq!(bundle.negation_flips, 1);
        assert!(bundle.modifiers[3].negated);

        // Four tokens between the negation and the sentiment word: out of window
        let bundle = extractor.extract("not that this one was good");
        assert_eq!(bundle.negation_flips, 0);
    }

    #[test]
    fn test_intensifier_and_downtoner() {
        let extractor = SignalExtractor::new(1.5);

        let bundle = extractor.extract("very good");
        assert_eq!(bundle.modifiers[1].multiplier, 1.5);
        assert!((bundle.intensifier_boost - 0.5).abs() < 1e-9);

        let bundle = extractor.extract("slightly disappointing");
        assert_eq!(bundle.modifiers[1].multiplier, 0.5);
        assert_eq!(bundle.intensifier_boost, 0.0);
    }

    #[test]
    fn test_custom_intensifier_factor() {
        let bundle = SignalExtractor::new(2.0).extract("really bad");
        assert_eq!(bundle.modifiers[1].multiplier, 2.0);
    }

    #[test]
    fn test_sarcasm_scenario() {
        let bundle =
            SignalExtractor::default().extract("Great, another system crash during the demo");
        assert!(bundle.sarcasm_score > 1.0, "score {}", bundle.sarcasm_score);
    }

    #[test]
    fn test_plain_praise_is_not_sarcastic() {
        let extractor = SignalExtractor::default();
        assert_eq!(extractor.extract("I love it").sarcasm_score, 0.0);
        assert_eq!(extractor.extract("Great service and friendly staff").sarcasm_score, 0.0);
    }

    #[test]
    fn test_explicit_markers() {
        let extractor = SignalExtractor::default();
        assert!(extractor.extract("best update ever /s").sarcasm_score >= 2.0);
        assert!(extractor.extract("Oh great, yeah right").sarcasm_score > 1.0);
        assert!(extractor.extract("such a \"great\" update 😡").sarcasm_score >= 1.0);
    }
}
