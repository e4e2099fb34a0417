//! Language resolution.
//!
//! Callers may pass an ISO-639-1 hint; otherwise the language is guessed from
//! stopword hits and language-specific characters.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Languages with a dedicated lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Unknown,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Language {
    pub const SUPPORTED: [Language; 6] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
    ];

    /// Returns the language code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Unknown => "unknown",
        }
    }

    /// Parse an ISO-639-1 code, tolerating case and region suffixes ("en-US", "pt_BR").
    pub fn from_code(code: &str) -> Option<Language> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match primary.as_str() {
            "en" => Some(Language::English),
            "es" => Some(Language::Spanish),
            "fr" => Some(Language::French),
            "de" => Some(Language::German),
            "it" => Some(Language::Italian),
            "pt" => Some(Language::Portuguese),
            _ => None,
        }
    }
}

const STOPWORDS: &[(Language, &[&str])] = &[
    (
        Language::English,
        &[
            "the", "a", "an", "is", "are", "was", "were", "be", "been", "have", "has", "had",
            "do", "does", "did", "i", "you", "he", "she", "it", "we", "they", "and", "or",
            "but", "for", "with", "from", "to", "in", "on", "this", "that", "my", "your",
            "what", "why", "how", "not", "very", "so",
        ],
    ),
    (
        Language::Spanish,
        &[
            "el", "la", "los", "las", "un", "una", "es", "son", "está", "están", "y", "o",
            "pero", "para", "con", "por", "que", "de", "del", "en", "mi", "tu", "yo", "muy",
            "este", "esta", "lo", "me", "se", "no", "más", "como",
        ],
    ),
    (
        Language::French,
        &[
            "le", "la", "les", "un", "une", "des", "du", "de", "et", "ou", "mais", "je", "tu",
            "il", "elle", "nous", "vous", "ils", "est", "sont", "pour", "dans", "sur", "avec",
            "pas", "ce", "cette", "très", "c'est",
        ],
    ),
    (
        Language::German,
        &[
            "der", "die", "das", "ein", "eine", "ist", "sind", "und", "oder", "aber", "für",
            "mit", "von", "zu", "ich", "du", "er", "sie", "wir", "nicht", "sehr", "auf", "dem",
            "den", "auch", "es",
        ],
    ),
    (
        Language::Italian,
        &[
            "il", "lo", "la", "gli", "le", "un", "una", "è", "sono", "e", "o", "ma", "per",
            "con", "di", "del", "della", "che", "non", "molto", "questo", "questa", "io", "mi",
            "ho",
        ],
    ),
    (
        Language::Portuguese,
        &[
            "o", "a", "os", "as", "um", "uma", "é", "são", "e", "ou", "mas", "para", "com",
            "por", "que", "de", "do", "da", "em", "não", "muito", "isso", "este", "esta", "eu",
            "meu", "minha", "você",
        ],
    ),
];

fn char_hint(c: char) -> Option<Language> {
    match c {
        'ñ' | '¿' | '¡' => Some(Language::Spanish),
        'ç' | 'œ' | 'è' | 'ê' | 'ë' | 'î' | 'ï' | 'û' | 'ù' => Some(Language::French),
        'ä' | 'ö' | 'ü' | 'ß' => Some(Language::German),
        'ã' | 'õ' => Some(Language::Portuguese),
        'ì' | 'ò' => Some(Language::Italian),
        _ => None,
    }
}

/// Detect the language of `text`; `Unknown` when nothing matches.
pub fn detect_language(text: &str) -> Language {
    let text_lower = text.to_lowercase();
    let words: HashSet<&str> = text_lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
        .collect();

    let mut best = Language::Unknown;
    let mut best_score = 0usize;

    for (language, stopwords) in STOPWORDS {
        let word_hits = stopwords.iter().filter(|w| words.contains(*w)).count();
        let char_hits = text_lower
            .chars()
            .filter(|c| char_hint(*c) == Some(*language))
            .count();
        let score = word_hits + char_hits * 2;

        // Strictly greater keeps the table order (English first) on ties.
        if score > best_score {
            best_score = score;
            best = *language;
        }
    }

    best
}

/// Resolve the language for one request: a recognised hint wins, otherwise detect.
pub fn resolve_language(text: &str, hint: Option<&str>) -> Language {
    hint.and_then(Language::from_code)
        .unwrap_or_else(|| detect_language(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Portuguese.code(), "pt");
        assert_eq!(Language::Unknown.code(), "unknown");
    }

    #[test]
    fn test_from_code_tolerates_regions() {
        assert_eq!(Language::from_code("EN-us"), Some(Language::English));
        assert_eq!(Language::from_code("pt_BR"), Some(Language::Portuguese));
        assert_eq!(Language::from_code("xx"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn test_english_detection() {
        assert_eq!(detect_language("This is the best thing I have bought"), Language::English);
    }

    #[test]
    fn test_spanish_detection() {
        assert_eq!(
            detect_language("El servicio es muy malo y la comida está fría"),
            Language::Spanish
        );
        assert_eq!(detect_language("¡Qué día!"), Language::Spanish);
    }

    #[test]
    fn test_french_and_german_detection() {
        assert_eq!(
            detect_language("Je ne suis pas content de ce produit"),
            Language::French
        );
        assert_eq!(
            detect_language("Das ist nicht gut und sehr langsam"),
            Language::German
        );
    }

    #[test]
    fn test_unknown_detection() {
        assert_eq!(detect_language(""), Language::Unknown);
        assert_eq!(detect_language("12345 !!!"), Language::Unknown);
    }

    #[test]
    fn test_hint_overrides_detection() {
        assert_eq!(resolve_language("the the the", Some("es")), Language::Spanish);
        assert_eq!(resolve_language("the the the", Some("zz")), Language::English);
        assert_eq!(resolve_language("the the the", None), Language::English);
    }
}
