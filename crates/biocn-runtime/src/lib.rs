//! bioCN runtime: runs the analyser over whole documents.
//!
//! `Pipeline` ties the configured analyser to the document adapter and span
//! annotator, and reports what it did per document and per run.

pub mod pipeline;
pub mod types;

pub use pipeline::{is_document_path, Pipeline};
pub use types::*;
