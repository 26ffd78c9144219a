//! Paragraph analysis in either role or keyword mode.

use std::collections::HashSet;

use biocn_core::{AnalyzerKind, Annotation, KeywordEntry, Result};
use biocn_oracle::LinguisticOracle;
use tracing::{debug, warn};

use crate::importance::classify_top;
use crate::ranker::{create_ranker, KeywordRanker};
use crate::roles::{extract_sentences, SentenceRoles};
use crate::segment::split_sentences;

/// Analysis result for one paragraph.
#[derive(Debug, Clone, Default)]
pub struct ParagraphAnalysis {
    /// Number of sentences the segmenter produced.
    pub sentence_count: usize,
    /// Sentences with at least one triple (role mode).
    pub roles: Vec<SentenceRoles>,
    /// Tiered keywords (keyword mode).
    pub keywords: Vec<KeywordEntry>,
}

impl ParagraphAnalysis {
    pub fn triple_count(&self) -> usize {
        self.roles.iter().map(|s| s.triples.len()).sum()
    }

    /// Annotation requests, deduplicated, in discovery order.
    pub fn annotations(&self) -> Vec<Annotation> {
        let mut seen = HashSet::new();
        let roles = self
            .roles
            .iter()
            .flat_map(|s| s.triples.iter())
            .flat_map(|t| t.annotations());
        let keywords = self.keywords.iter().map(KeywordEntry::annotation);

        roles
            .chain(keywords)
            .filter(|a| seen.insert(a.clone()))
            .collect()
    }
}

/// Turns paragraph text into role triples or tiered keywords.
///
/// Holds a borrowed oracle; the caller owns its lifetime.
pub struct Analyzer<'o> {
    kind: AnalyzerKind,
    oracle: &'o dyn LinguisticOracle,
    ranker: Option<Box<dyn KeywordRanker>>,
}

impl<'o> Analyzer<'o> {
    pub fn new(kind: AnalyzerKind, oracle: &'o dyn LinguisticOracle) -> Self {
        let ranker = match kind {
            AnalyzerKind::Keywords { method, .. } => Some(create_ranker(method)),
            AnalyzerKind::Roles => None,
        };
        Self { kind, oracle, ranker }
    }

    pub fn kind(&self) -> AnalyzerKind {
        self.kind
    }

    pub fn analyze(&self, text: &str) -> Result<ParagraphAnalysis> {
        let mut out = self.analyze_batch(&[text])?;
        Ok(out.pop().unwrap_or_default())
    }

    /// Analyse many paragraphs; one result per input, in order.
    ///
    /// In role mode every sentence of every paragraph goes to the oracle in a
    /// single call, and results are sliced back by a running sentence offset.
    pub fn analyze_batch(&self, texts: &[&str]) -> Result<Vec<ParagraphAnalysis>> {
        match self.kind {
            AnalyzerKind::Roles => self.analyze_roles(texts),
            AnalyzerKind::Keywords { top_k, .. } => Ok(self.analyze_keywords(texts, top_k)),
        }
    }

    fn analyze_roles(&self, texts: &[&str]) -> Result<Vec<ParagraphAnalysis>> {
        let per_text: Vec<Vec<String>> = texts.iter().map(|t| split_sentences(t)).collect();
        let all: Vec<String> = per_text.iter().flatten().cloned().collect();

        let analyses = if all.is_empty() {
            Vec::new()
        } else {
            debug!(
                "Sending {} sentences from {} paragraphs to {} oracle",
                all.len(),
                texts.len(),
                self.oracle.name()
            );
            self.oracle.analyze(&all)?
        };
        if analyses.len() != all.len() {
            warn!(
                "Oracle returned {} analyses for {} sentences; uncovered sentences get no triples",
                analyses.len(),
                all.len()
            );
        }

        let mut offset = 0;
        let results = per_text
            .iter()
            .map(|sentences| {
                let end = offset + sentences.len();
                let slice = analyses.get(offset..end.min(analyses.len())).unwrap_or(&[]);
                offset = end;
                ParagraphAnalysis {
                    sentence_count: sentences.len(),
                    roles: extract_sentences(sentences, slice),
                    keywords: Vec::new(),
                }
            })
            .collect();
        Ok(results)
    }

    fn analyze_keywords(&self, texts: &[&str], top_k: usize) -> Vec<ParagraphAnalysis> {
        let Some(ranker) = self.ranker.as_ref() else {
            return texts.iter().map(|_| ParagraphAnalysis::default()).collect();
        };

        texts
            .iter()
            .map(|text| ParagraphAnalysis {
                sentence_count: split_sentences(text).len(),
                roles: Vec::new(),
                keywords: classify_top(&ranker.rank(text), top_k),
            })
            .collect()
    }
}
