//! bioCN Core — data model, configuration, and error types shared by every crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AnalyzerKind, BiocnConfig, OracleBackend, OracleConfig, RankMethod, StyleTable};
pub use error::{Error, Result};
pub use types::{Annotation, Category, KeywordEntry, RoleTriple, Tier, Token, LIST_SEPARATOR};
