//! Runtime report types.

use serde::Serialize;

/// What happened to one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentReport {
    /// Source path, when the document came from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Paragraph blocks found.
    pub blocks: usize,
    /// Blocks skipped because they held only whitespace.
    #[serde(rename = "skippedBlocks")]
    pub skipped_blocks: usize,
    pub sentences: usize,
    pub triples: usize,
    pub keywords: usize,
    /// Highlight wrappers inserted.
    pub annotations: usize,
    #[serde(rename = "stylesheetInjected")]
    pub stylesheet_injected: bool,
}

/// Totals for a whole run over one or more documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub mode: String,
    #[serde(rename = "startedAt")]
    pub started_at: String,
    pub documents: usize,
    pub blocks: usize,
    pub sentences: usize,
    pub triples: usize,
    pub keywords: usize,
    pub annotations: usize,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub files: Vec<DocumentReport>,
}

impl RunReport {
    pub fn new(mode: &str) -> Self {
        Self {
            mode: mode.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    /// Fold a document's counts into the totals.
    pub fn record(&mut self, document: DocumentReport) {
        self.documents += 1;
        self.blocks += document.blocks;
        self.sentences += document.sentences;
        self.triples += document.triples;
        self.keywords += document.keywords;
        self.annotations += document.annotations;
        self.files.push(document);
    }
}
