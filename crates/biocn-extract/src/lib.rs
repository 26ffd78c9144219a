//! bioCN Extract — turns paragraph text into highlight annotations.
//!
//! Two analysis modes share one output type (`Annotation`):
//! role extraction walks the oracle's dependency trees for subject /
//! predicate / object triples; keyword mode ranks candidate phrases and
//! buckets them into importance tiers.

pub mod analyzer;
pub mod constructions;
pub mod importance;
pub mod ranker;
pub mod roles;
pub mod segment;

pub use analyzer::{Analyzer, ParagraphAnalysis};
pub use importance::{classify, classify_top};
pub use ranker::{create_ranker, FrequencyRanker, KeywordRanker, TextRankRanker};
pub use roles::{extract, extract_sentences, extract_tokens, tokens_from_analysis, SentenceRoles};
pub use segment::split_sentences;
