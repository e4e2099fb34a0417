//! Keyword extraction with a TF-IDF approximation.
//!
//! Configured brand names are surfaced first; the remaining slots go to the
//! highest scoring content words, with sentiment words weighted up.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use super::lexicon::LexiconSet;
use super::tokenizer::tokenize;

const STOPWORDS_EN: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "nor", "for", "yet", "so", "i", "you", "he", "she", "it",
    "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our", "their",
    "this", "that", "these", "those", "who", "which", "what", "is", "am", "are", "was", "were",
    "be", "been", "being", "have", "has", "had", "do", "does", "did", "will", "would", "should",
    "can", "could", "may", "might", "must", "in", "on", "at", "to", "from", "by", "with", "about",
    "into", "during", "before", "after", "up", "down", "out", "off", "over", "again", "here",
    "there", "when", "why", "how", "all", "each", "more", "most", "some", "any", "only", "than",
    "too", "very", "just", "also", "now", "then", "if", "because", "as", "it's", "i'm", "another",
];

const STOPWORDS_ES: &[&str] = &[
    "el", "la", "los", "las", "un", "una", "unos", "unas", "y", "o", "pero", "de", "del", "en",
    "con", "por", "para", "que", "es", "son", "fue", "está", "están", "mi", "tu", "su", "yo",
    "me", "te", "se", "lo", "le", "muy", "más", "como", "este", "esta", "eso", "esto", "al",
];

const STOPWORDS_FR: &[&str] = &[
    "le", "la", "les", "un", "une", "des", "du", "de", "et", "ou", "mais", "je", "tu", "il",
    "elle", "on", "nous", "vous", "ils", "ce", "cette", "ces", "qui", "que", "ne", "pas", "est",
    "sont", "dans", "sur", "avec", "pour", "par", "très", "c'est", "mon", "ma", "mes",
];

/// Weight multiplier for words carrying lexicon polarity.
const SENTIMENT_IDF_BONUS: f32 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub keyword: String,
    pub score: f32,
    pub frequency: usize,
}

/// Keyword extractor; brands are matched case-insensitively.
pub struct KeywordExtractor {
    stopwords: HashSet<&'static str>,
    brands: Vec<String>,
    min_word_length: usize,
    max_keywords: usize,
    lexicons: &'static LexiconSet,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(Vec::new(), 5)
    }
}

impl KeywordExtractor {
    pub fn new(brands: Vec<String>, max_keywords: usize) -> Self {
        let stopwords = STOPWORDS_EN
            .iter()
            .chain(STOPWORDS_ES)
            .chain(STOPWORDS_FR)
            .copied()
            .collect();
        let brands = brands
            .into_iter()
            .map(|b| b.trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();

        Self {
            stopwords,
            brands,
            min_word_length: 3,
            max_keywords,
            lexicons: LexiconSet::shared(),
        }
    }

    fn is_candidate(&self, word: &str) -> bool {
        let bare = word.trim_start_matches(['#', '@']);
        bare.chars().count() >= self.min_word_length
            && bare.chars().any(char::is_alphabetic)
            && !self.stopwords.contains(bare)
            && !self.lexicons.merged().is_negation(bare)
            && !self.lexicons.merged().is_intensifier(bare)
    }

    fn idf(&self, word: &str) -> f32 {
        let bare = word.trim_start_matches(['#', '@']);
        let length_factor = (bare.chars().count() as f32 / 6.0).min(1.5);
        let tag_bonus = if word.starts_with('#') { 0.5 } else { 0.0 };
        let base = 1.0 + length_factor + tag_bonus;
        if self.lexicons.merged().is_sentiment(bare) {
            base * SENTIMENT_IDF_BONUS
        } else {
            base
        }
    }

    /// Brands present in `text`, in configuration order.
    pub fn brands_in(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let tokens = tokenize(&lower);
        self.brands
            .iter()
            .filter(|brand| {
                if brand.contains(char::is_whitespace) {
                    lower.contains(brand.as_str())
                } else {
                    tokens
                        .iter()
                        .any(|t| t.trim_start_matches(['#', '@']) == brand.as_str())
                }
            })
            .cloned()
            .collect()
    }

    /// Scored content keywords, best first. Ties resolve alphabetically.
    pub fn extract(&self, text: &str, top_k: Option<usize>) -> Vec<KeywordResult> {
        let max_results = top_k.unwrap_or(self.max_keywords);
        let words: Vec<String> = tokenize(text)
            .into_iter()
            .filter(|w| self.is_candidate(w))
            .collect();
        if words.is_empty() {
            return vec![];
        }

        let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
        for word in &words {
            *freq.entry(word.as_str()).or_insert(0) += 1;
        }

        let total = words.len() as f32;
        let mut scored: Vec<KeywordResult> = freq
            .into_iter()
            .map(|(word, frequency)| KeywordResult {
                keyword: word.to_string(),
                score: frequency as f32 / total * self.idf(word),
                frequency,
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        scored.truncate(max_results);
        scored
    }

    /// Brands first, then extracted keywords, capped at `max_keywords`.
    pub fn keywords(&self, text: &str) -> Vec<String> {
        let mut keywords = self.brands_in(text);
        for result in self.extract(text, Some(self.max_keywords)) {
            if keywords.len() >= self.max_keywords {
                break;
            }
            let bare = result.keyword.trim_start_matches(['#', '@']);
            if !keywords.iter().any(|k| k == bare) {
                keywords.push(result.keyword);
            }
        }
        keywords.truncate(self.max_keywords);
        keywords
    }
}
