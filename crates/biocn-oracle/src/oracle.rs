//! Oracle trait and the per-sentence analysis it returns.

use biocn_core::Result;
use serde::{Deserialize, Serialize};

/// Model output for one sentence, aligned by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub pos_tags: Vec<String>,
    /// `(head, relation)` per token; heads are 1-based, 0 marks the root.
    #[serde(default)]
    pub arcs: Vec<(usize, String)>,
}

impl SentenceAnalysis {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when tokens, tags, and arcs have the same length.
    pub fn is_aligned(&self) -> bool {
        self.tokens.len() == self.pos_tags.len() && self.tokens.len() == self.arcs.len()
    }
}

/// Trait for linguistic oracle backends.
pub trait LinguisticOracle {
    /// Analyse a batch of sentences in one call.
    ///
    /// Implementations should return one analysis per input sentence, in order.
    /// A transport or model failure is an error and aborts the document.
    fn analyze(&self, sentences: &[String]) -> Result<Vec<SentenceAnalysis>>;

    /// Short backend name for logging.
    fn name(&self) -> &str;
}

/// Oracle that knows nothing: every sentence gets an empty analysis.
pub struct NoopOracle;

impl LinguisticOracle for NoopOracle {
    fn analyze(&self, sentences: &[String]) -> Result<Vec<SentenceAnalysis>> {
        Ok(vec![SentenceAnalysis::default(); sentences.len()])
    }

    fn name(&self) -> &str {
        "none"
    }
}
