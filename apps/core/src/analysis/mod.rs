//! # Analysis Module
//!
//! Per-text sentiment pipeline.
//!
//! ## Components
//! - `language`: language hint resolution and detection
//! - `lexicon`: per-language weighted lexicons, emoji polarity, emotion words
//! - `tokenizer`: tokens, n-grams and linguistic signals
//! - `rule_analyzer`: lexical rule-based scoring
//! - `naive_bayes`: multinomial Naive Bayes with copy-on-write state
//! - `hybrid`: reconciliation of the two verdicts
//! - `keywords`: TF-IDF keywords with brand priority

pub mod hybrid;
pub mod keywords;
pub mod language;
pub mod lexicon;
pub mod naive_bayes;
pub mod rule_analyzer;
pub mod tokenizer;

pub use hybrid::HybridWeighting;
pub use keywords::{KeywordExtractor, KeywordResult};
pub use language::{detect_language, Language};
pub use naive_bayes::{NaiveBayesClassifier, NaiveBayesModelState};
pub use rule_analyzer::RuleAnalyzer;
pub use tokenizer::{tokenize, SignalBundle, SignalExtractor};
