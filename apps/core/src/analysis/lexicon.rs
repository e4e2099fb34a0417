//! Per-language sentiment lexicons.
//!
//! Each language carries weighted positive and negative words, intensifiers,
//! downtoners and negations. Emoji/emoticon polarity and the emotion lexicon are
//! shared across languages. Weights are in (0, 1]; the sign comes from the list.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::language::Language;

type WeightedWords = &'static [(&'static str, f64)];

struct LexiconSource {
    language: Language,
    positive: WeightedWords,
    negative: WeightedWords,
    intensifiers: &'static [&'static str],
    downtoners: &'static [&'static str],
    negations: &'static [&'static str],
}

const ENGLISH: LexiconSource = LexiconSource {
    language: Language::English,
    positive: &[
        ("love", 0.9), ("loved", 0.9), ("loving", 0.8), ("lovely", 0.7), ("great", 0.8),
        ("excellent", 0.9), ("amazing", 0.9), ("awesome", 0.9), ("wonderful", 0.9),
        ("fantastic", 0.9), ("good", 0.6), ("nice", 0.5), ("happy", 0.7), ("glad", 0.6),
        ("best", 0.8), ("better", 0.5), ("perfect", 0.9), ("brilliant", 0.8),
        ("beautiful", 0.7), ("outstanding", 0.9), ("superb", 0.9), ("enjoy", 0.6),
        ("enjoyed", 0.6), ("like", 0.4), ("liked", 0.4), ("recommend", 0.6),
        ("impressive", 0.7), ("pleased", 0.6), ("satisfied", 0.6), ("helpful", 0.6),
        ("reliable", 0.6), ("easy", 0.4), ("fun", 0.6), ("cool", 0.5), ("win", 0.5),
        ("success", 0.7), ("thanks", 0.4), ("thank", 0.4), ("favorite", 0.7),
        ("delighted", 0.8), ("excited", 0.7), ("incredible", 0.8), ("smooth", 0.4),
        ("fast", 0.4), ("joy", 0.8),
    ],
    negative: &[
        ("hate", 0.9), ("hated", 0.9), ("terrible", 0.9), ("awful", 0.9), ("horrible", 0.9),
        ("bad", 0.6), ("worst", 1.0), ("worse", 0.7), ("poor", 0.6), ("crash", 0.8),
        ("crashed", 0.8), ("crashes", 0.8), ("broken", 0.7), ("bug", 0.5), ("bugs", 0.5),
        ("error", 0.5), ("errors", 0.5), ("fail", 0.7), ("failed", 0.7), ("failure", 0.8),
        ("disappointing", 0.7), ("disappointed", 0.7), ("useless", 0.8), ("waste", 0.7),
        ("slow", 0.4), ("angry", 0.7), ("sad", 0.6), ("annoyed", 0.6), ("annoying", 0.6),
        ("frustrated", 0.7), ("frustrating", 0.7), ("problem", 0.5), ("problems", 0.5),
        ("issue", 0.4), ("issues", 0.4), ("scam", 1.0), ("fraud", 0.9), ("garbage", 0.9),
        ("trash", 0.8), ("pathetic", 0.9), ("mediocre", 0.5), ("expensive", 0.4),
        ("overpriced", 0.6), ("unreliable", 0.7), ("confusing", 0.5), ("ugly", 0.6),
        ("boring", 0.5), ("sucks", 0.8), ("rude", 0.7), ("delayed", 0.5), ("outage", 0.8),
        ("dislike", 0.6), ("nightmare", 0.9), ("disgusting", 0.9), ("scared", 0.5),
        ("worried", 0.4),
    ],
    intensifiers: &[
        "very", "really", "extremely", "so", "super", "absolutely", "incredibly", "totally",
        "completely", "highly", "truly", "too", "utterly", "insanely",
    ],
    downtoners: &["slightly", "somewhat", "kinda", "little", "mildly", "fairly"],
    negations: &[
        "not", "no", "never", "nothing", "none", "nobody", "neither", "nor", "without",
        "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "isn't", "isnt", "wasn't",
        "wasnt", "aren't", "arent", "can't", "cant", "cannot", "won't", "wont", "wouldn't",
        "shouldn't", "couldn't", "hardly", "barely",
    ],
};

const SPANISH: LexiconSource = LexiconSource {
    language: Language::Spanish,
    positive: &[
        ("bueno", 0.6), ("buena", 0.6), ("excelente", 0.9), ("genial", 0.8),
        ("increíble", 0.8), ("encanta", 0.9), ("encantó", 0.9), ("amo", 0.9), ("feliz", 0.7),
        ("maravilloso", 0.9), ("perfecto", 0.9), ("mejor", 0.6), ("fantástico", 0.9),
        ("bonito", 0.6), ("gracias", 0.4), ("recomiendo", 0.6), ("rápido", 0.4),
        ("contento", 0.6), ("gusta", 0.5), ("alegría", 0.8),
    ],
    negative: &[
        ("malo", 0.6), ("mala", 0.6), ("terrible", 0.9), ("horrible", 0.9), ("pésimo", 1.0),
        ("odio", 0.9), ("peor", 0.8), ("triste", 0.6), ("enojado", 0.7), ("lento", 0.4),
        ("problema", 0.5), ("error", 0.5), ("fallo", 0.7), ("basura", 0.9),
        ("decepcionado", 0.7), ("desastre", 0.9), ("caro", 0.4), ("inútil", 0.8),
        ("asco", 0.9), ("miedo", 0.5),
    ],
    intensifiers: &[
        "muy", "muchísimo", "súper", "super", "tan", "demasiado", "realmente", "bastante",
    ],
    downtoners: &["poco", "algo"],
    negations: &["no", "nunca", "jamás", "ni", "tampoco", "nada", "sin"],
};

const FRENCH: LexiconSource = LexiconSource {
    language: Language::French,
    positive: &[
        ("bon", 0.6), ("bonne", 0.6), ("excellent", 0.9), ("génial", 0.8), ("super", 0.6),
        ("magnifique", 0.9), ("parfait", 0.9), ("adore", 0.9), ("aime", 0.7),
        ("heureux", 0.7), ("merci", 0.4), ("incroyable", 0.8), ("meilleur", 0.7),
        ("content", 0.6),
    ],
    negative: &[
        ("mauvais", 0.6), ("mauvaise", 0.6), ("terrible", 0.9), ("horrible", 0.9),
        ("nul", 0.8), ("déteste", 0.9), ("pire", 0.8), ("triste", 0.6), ("problème", 0.5),
        ("erreur", 0.5), ("panne", 0.7), ("décevant", 0.7), ("lent", 0.4),
    ],
    intensifiers: &["très", "vraiment", "trop", "tellement", "extrêmement"],
    downtoners: &["peu", "légèrement"],
    negations: &["ne", "pas", "jamais", "rien", "sans", "aucun", "aucune"],
};

const GERMAN: LexiconSource = LexiconSource {
    language: Language::German,
    positive: &[
        ("gut", 0.6), ("super", 0.7), ("toll", 0.8), ("ausgezeichnet", 0.9),
        ("großartig", 0.9), ("liebe", 0.9), ("perfekt", 0.9), ("schön", 0.6), ("danke", 0.4),
        ("wunderbar", 0.9), ("besser", 0.5),
    ],
    negative: &[
        ("schlecht", 0.7), ("schrecklich", 0.9), ("furchtbar", 0.9), ("hasse", 0.9),
        ("schlimm", 0.7), ("schlimmste", 1.0), ("langsam", 0.4), ("fehler", 0.5),
        ("problem", 0.5), ("enttäuscht", 0.7), ("kaputt", 0.7),
    ],
    intensifiers: &["sehr", "wirklich", "extrem", "total", "so"],
    downtoners: &["etwas", "bisschen"],
    negations: &["nicht", "nie", "kein", "keine", "niemals", "ohne"],
};

const ITALIAN: LexiconSource = LexiconSource {
    language: Language::Italian,
    positive: &[
        ("buono", 0.6), ("buona", 0.6), ("ottimo", 0.9), ("eccellente", 0.9),
        ("fantastico", 0.9), ("bello", 0.6), ("bella", 0.6), ("amo", 0.9), ("adoro", 0.9),
        ("perfetto", 0.9), ("grazie", 0.4), ("felice", 0.7), ("migliore", 0.7),
    ],
    negative: &[
        ("cattivo", 0.6), ("terribile", 0.9), ("orribile", 0.9), ("pessimo", 1.0),
        ("odio", 0.9), ("peggiore", 0.8), ("triste", 0.6), ("lento", 0.4),
        ("problema", 0.5), ("errore", 0.5), ("deluso", 0.7),
    ],
    intensifiers: &["molto", "davvero", "troppo", "tanto"],
    downtoners: &["poco"],
    negations: &["non", "mai", "niente", "nessuno", "senza"],
};

const PORTUGUESE: LexiconSource = LexiconSource {
    language: Language::Portuguese,
    positive: &[
        ("bom", 0.6), ("boa", 0.6), ("ótimo", 0.9), ("otimo", 0.9), ("excelente", 0.9),
        ("incrível", 0.8), ("amo", 0.9), ("adoro", 0.9), ("perfeito", 0.9), ("feliz", 0.7),
        ("obrigado", 0.4), ("maravilhoso", 0.9), ("melhor", 0.6),
    ],
    negative: &[
        ("ruim", 0.7), ("mau", 0.6), ("péssimo", 1.0), ("terrível", 0.9), ("horrível", 0.9),
        ("odeio", 0.9), ("pior", 0.8), ("triste", 0.6), ("lento", 0.4), ("problema", 0.5),
        ("erro", 0.5), ("decepcionado", 0.7),
    ],
    intensifiers: &["muito", "muita", "realmente", "demais", "tão"],
    downtoners: &["pouco"],
    negations: &["não", "nao", "nunca", "jamais", "nem", "sem"],
};

const SOURCES: [&LexiconSource; 6] = [&ENGLISH, &SPANISH, &FRENCH, &GERMAN, &ITALIAN, &PORTUGUESE];

/// Emoji and emoticon polarity, independent of language.
const EMOJI_POLARITY: &[(&str, f64)] = &[
    ("😀", 0.7), ("😃", 0.7), ("😄", 0.7), ("😁", 0.7), ("😂", 0.5), ("😊", 0.7),
    ("😍", 0.9), ("🥰", 0.9), ("❤", 0.8), ("👍", 0.6), ("🎉", 0.7), ("🙌", 0.6),
    ("💯", 0.6), ("😎", 0.5), ("🙂", 0.5), ("☺", 0.6), ("😉", 0.4), ("😆", 0.7),
    ("🤩", 0.8), ("🥳", 0.8), ("🤗", 0.6), ("😘", 0.7), ("👏", 0.6), ("😌", 0.4),
    (":)", 0.6), (":-)", 0.6), (":d", 0.7), (";)", 0.4),
    ("😢", -0.7), ("😭", -0.8), ("😞", -0.6), ("😡", -0.9), ("😠", -0.8), ("🤬", -1.0),
    ("👎", -0.7), ("💔", -0.8), ("🤢", -0.8), ("🤮", -0.9), ("😱", -0.5), ("😨", -0.5),
    ("💩", -0.7), ("🙄", -0.5), ("☹", -0.6), ("🙁", -0.5), ("😔", -0.6), ("😟", -0.5),
    ("😩", -0.7), ("😫", -0.7), ("😤", -0.6), ("😒", -0.5), ("😖", -0.6), ("😣", -0.6),
    (":(", -0.6), (":-(", -0.6), (":'(", -0.7),
];

/// Emotion categories projected by the rule analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
}

const EMOTION_WORDS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Joy,
        &[
            "happy", "joy", "love", "loved", "glad", "delighted", "excited", "great",
            "wonderful", "amazing", "feliz", "alegría", "encanta", "amo", "😀", "😂", "😍",
            "😊", "🥰", "🎉", "❤", ":)", ":d",
        ],
    ),
    (
        Emotion::Sadness,
        &[
            "sad", "unhappy", "depressed", "cry", "crying", "disappointed", "lonely", "miss",
            "triste", "decepcionado", "llorar", "😢", "😭", "😞", "💔", ":(",
        ],
    ),
    (
        Emotion::Anger,
        &[
            "angry", "furious", "hate", "hated", "mad", "annoyed", "rage", "frustrated",
            "enojado", "odio", "furioso", "😡", "😠", "🤬",
        ],
    ),
    (
        Emotion::Fear,
        &[
            "afraid", "scared", "fear", "worried", "anxious", "terrified", "nervous", "miedo",
            "preocupado", "😨", "😱",
        ],
    ),
    (
        Emotion::Surprise,
        &[
            "surprised", "wow", "unexpected", "shocked", "amazed", "incredible", "sorpresa",
            "increíble", "😮", "😲",
        ],
    ),
    (
        Emotion::Disgust,
        &[
            "disgusting", "gross", "awful", "nasty", "horrible", "revolting", "asco",
            "asqueroso", "🤢", "🤮",
        ],
    ),
];

/// Phrases that read as ironic on their own.
pub const SARCASM_PHRASES: &[&str] = &[
    "yeah right",
    "oh great",
    "just what i needed",
    "thanks a lot",
    "just perfect",
    "love it when",
    "so much fun",
    "what a surprise",
    "sure, because",
];

/// Tokens that, right after a positive word, announce a complaint ("great, another ...").
pub const CONTEXT_MARKERS: &[&str] = &["another", "again", "just", "yet", "more", "exactly"];

/// Lexicon of one language.
pub struct Lexicon {
    pub language: Language,
    weights: HashMap<&'static str, f64>,
    intensifiers: HashSet<&'static str>,
    downtoners: HashSet<&'static str>,
    negations: HashSet<&'static str>,
}

impl Lexicon {
    fn from_sources(language: Language, sources: &[&LexiconSource]) -> Self {
        let mut weights = HashMap::new();
        let mut intensifiers = HashSet::new();
        let mut downtoners = HashSet::new();
        let mut negations = HashSet::new();

        for source in sources {
            for (word, weight) in source.positive {
                weights.entry(*word).or_insert(*weight);
            }
            for (word, weight) in source.negative {
                weights.entry(*word).or_insert(-*weight);
            }
            intensifiers.extend(source.intensifiers.iter().copied());
            downtoners.extend(source.downtoners.iter().copied());
            negations.extend(source.negations.iter().copied());
        }
        for (emoji, weight) in EMOJI_POLARITY {
            weights.entry(*emoji).or_insert(*weight);
        }

        Self {
            language,
            weights,
            intensifiers,
            downtoners,
            negations,
        }
    }

    /// Signed weight of a token, ignoring a leading `#`.
    pub fn weight(&self, token: &str) -> Option<f64> {
        self.weights
            .get(token.strip_prefix('#').unwrap_or(token))
            .copied()
    }

    pub fn is_sentiment(&self, token: &str) -> bool {
        self.weight(token).is_some()
    }

    pub fn is_positive(&self, token: &str) -> bool {
        self.weight(token).is_some_and(|w| w > 0.0)
    }

    pub fn is_negative(&self, token: &str) -> bool {
        self.weight(token).is_some_and(|w| w < 0.0)
    }

    pub fn is_intensifier(&self, token: &str) -> bool {
        self.intensifiers.contains(token)
    }

    pub fn is_downtoner(&self, token: &str) -> bool {
        self.downtoners.contains(token)
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// All lexicons plus a merged one used for language-agnostic signal extraction.
pub struct LexiconSet {
    by_language: HashMap<Language, Lexicon>,
    merged: Lexicon,
    emotions: HashMap<&'static str, Vec<Emotion>>,
}

static LEXICONS: LazyLock<LexiconSet> = LazyLock::new(LexiconSet::build);

impl LexiconSet {
    /// Shared, lazily built lexicon set.
    pub fn shared() -> &'static LexiconSet {
        &LEXICONS
    }

    fn build() -> Self {
        let by_language = SOURCES
            .iter()
            .map(|source| (source.language, Lexicon::from_sources(source.language, &[*source])))
            .collect();
        let merged = Lexicon::from_sources(Language::Unknown, &SOURCES);

        let mut emotions: HashMap<&'static str, Vec<Emotion>> = HashMap::new();
        for (emotion, words) in EMOTION_WORDS {
            for word in *words {
                emotions.entry(*word).or_default().push(*emotion);
            }
        }

        Self {
            by_language,
            merged,
            emotions,
        }
    }

    /// Lexicon for `language`; undetected text falls back to English.
    pub fn for_language(&self, language: Language) -> &Lexicon {
        self.by_language
            .get(&language)
            .or_else(|| self.by_language.get(&Language::English))
            .unwrap_or(&self.merged)
    }

    pub fn merged(&self) -> &Lexicon {
        &self.merged
    }

    /// Emotion categories a token belongs to.
    pub fn emotions_of(&self, token: &str) -> &[Emotion] {
        self.emotions
            .get(token.strip_prefix('#').unwrap_or(token))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
