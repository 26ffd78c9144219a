//! Pipeline: analyse every paragraph of a document and annotate it in place.

use std::path::{Path, PathBuf};
use std::time::Instant;

use biocn_core::{BiocnConfig, Error, Result};
use biocn_extract::Analyzer;
use biocn_markup::{annotate, BlockId, Presentation, XhtmlDocument};
use biocn_oracle::LinguisticOracle;
use tracing::{debug, info};

use crate::types::{DocumentReport, RunReport};

const DOCUMENT_EXTENSIONS: &[&str] = &["xhtml", "html", "htm"];

/// Whether a path names a document the pipeline can process.
pub fn is_document_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Configured analyser plus presentation, borrowing the caller's oracle.
pub struct Pipeline<'o> {
    analyzer: Analyzer<'o>,
    presentation: Presentation,
}

impl<'o> Pipeline<'o> {
    /// Resolve the analysis mode up front; an unknown mode or ranking method
    /// fails here, before any document is read.
    pub fn new(config: &BiocnConfig, oracle: &'o dyn LinguisticOracle) -> Result<Self> {
        let kind = config.analyzer_kind()?;
        info!(
            "Pipeline ready: mode={}, oracle={}, inline_css={}",
            kind.name(),
            oracle.name(),
            config.inline_css
        );
        Ok(Self {
            analyzer: Analyzer::new(kind, oracle),
            presentation: Presentation::new(config.inline_css, config.styles.clone()),
        })
    }

    pub fn analyzer(&self) -> &Analyzer<'o> {
        &self.analyzer
    }

    /// Annotate one document's source. Oracle failure aborts the document.
    pub fn process_document(&self, source: &str) -> Result<(String, DocumentReport)> {
        let mut doc = XhtmlDocument::parse(source);
        let mut report = DocumentReport::default();

        let mut ids: Vec<BlockId> = Vec::new();
        let mut texts: Vec<String> = Vec::new();
        for id in doc.enumerate_text_blocks() {
            report.blocks += 1;
            match doc.get_text(id) {
                Some(text) if !text.trim().is_empty() => {
                    ids.push(id);
                    texts.push(text);
                }
                _ => report.skipped_blocks += 1,
            }
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let analyses = self.analyzer.analyze_batch(&refs)?;

        for (id, analysis) in ids.iter().zip(analyses.iter()) {
            report.sentences += analysis.sentence_count;
            report.triples += analysis.triple_count();
            report.keywords += analysis.keywords.len();

            let annotations = analysis.annotations();
            if annotations.is_empty() {
                continue;
            }
            if let Some(block) = doc.block_mut(*id) {
                let before = block.highlight_count();
                annotate(block, &annotations, &self.presentation);
                report.annotations += block.highlight_count().saturating_sub(before);
            }
        }

        if !self.presentation.inline && report.annotations > 0 {
            report.stylesheet_injected = doc.inject_stylesheet(&self.presentation.styles);
        }

        debug!(
            "Document done: {} blocks ({} skipped), {} triples, {} keywords, {} wrappers",
            report.blocks, report.skipped_blocks, report.triples, report.keywords, report.annotations
        );
        Ok((doc.render(), report))
    }

    /// Process a file, or every document file in a directory (sorted by
    /// name), writing results under `output`.
    pub fn process_path(&self, input: &Path, output: &Path) -> Result<RunReport> {
        let started = Instant::now();
        let mut run = RunReport::new(self.analyzer.kind().name());

        let jobs = plan_jobs(input, output)?;
        info!("Processing {} document(s) from {}", jobs.len(), input.display());

        for (n, (source_path, target_path)) in jobs.iter().enumerate() {
            info!("[{}/{}] {}", n + 1, jobs.len(), source_path.display());
            let source = std::fs::read_to_string(source_path)?;
            let (rendered, mut report) = self.process_document(&source)?;

            if let Some(parent) = target_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(target_path, rendered)?;

            report.path = Some(source_path.display().to_string());
            run.record(report);
        }

        run.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "Done: {} documents, {} wrappers in {}ms",
            run.documents, run.annotations, run.elapsed_ms
        );
        Ok(run)
    }
}

/// Pair each input document with its output path.
fn plan_jobs(input: &Path, output: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    if input.is_dir() {
        let mut sources: Vec<PathBuf> = std::fs::read_dir(input)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_document_path(p))
            .collect();
        sources.sort();
        return Ok(sources
            .into_iter()
            .filter_map(|p| {
                let name = p.file_name()?.to_owned();
                Some((p, output.join(name)))
            })
            .collect());
    }

    if !input.is_file() {
        return Err(Error::Document(format!("input not found: {}", input.display())));
    }
    let target = if output.is_dir() {
        match input.file_name() {
            Some(name) => output.join(name),
            None => output.to_path_buf(),
        }
    } else {
        output.to_path_buf()
    };
    Ok(vec![(input.to_path_buf(), target)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use biocn_oracle::NoopOracle;

    #[test]
    fn test_document_extensions() {
        assert!(is_document_path(Path::new("a/ch01.xhtml")));
        assert!(is_document_path(Path::new("ch01.HTML")));
        assert!(!is_document_path(Path::new("content.opf")));
        assert!(!is_document_path(Path::new("README")));
    }

    #[test]
    fn test_invalid_mode_rejected_eagerly() {
        let config = BiocnConfig {
            mode: "summary".into(),
            ..Default::default()
        };
        assert!(matches!(Pipeline::new(&config, &NoopOracle), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_input() {
        let pipeline = Pipeline::new(&BiocnConfig::default(), &NoopOracle).unwrap();
        let err = pipeline
            .process_path(Path::new("/nonexistent/book.xhtml"), Path::new("/tmp/out.xhtml"))
            .unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }
}
