//! Oracle that replays precomputed analyses from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use biocn_core::Result;
use tracing::debug;

use crate::oracle::{LinguisticOracle, SentenceAnalysis};

/// Analyses keyed by sentence text.
///
/// File format: `{"我爱Python。": {"tokens": [...], "pos_tags": [...], "arcs": [[2,"nsubj"], ...]}}`.
#[derive(Debug, Clone, Default)]
pub struct FixtureOracle {
    entries: HashMap<String, SentenceAnalysis>,
}

impl FixtureOracle {
    pub fn new(entries: HashMap<String, SentenceAnalysis>) -> Self {
        Self { entries }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: HashMap<String, SentenceAnalysis> = serde_json::from_str(&raw)?;
        debug!("Loaded {} fixture analyses from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn insert(&mut self, sentence: impl Into<String>, analysis: SentenceAnalysis) {
        self.entries.insert(sentence.into(), analysis);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sentences in the fixture, sorted.
    pub fn sentences(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl LinguisticOracle for FixtureOracle {
    fn analyze(&self, sentences: &[String]) -> Result<Vec<SentenceAnalysis>> {
        Ok(sentences
            .iter()
            .map(|s| {
                self.entries
                    .get(s.trim())
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
