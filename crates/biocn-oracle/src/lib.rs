//! bioCN Oracle — tokenisation, POS tagging, and dependency parsing backends.
//!
//! The `LinguisticOracle` trait abstracts over the model that produces
//! per-sentence tokens, tags, and dependency arcs. `HanlpOracle` calls a
//! HanLP REST endpoint; `FixtureOracle` replays precomputed analyses from a
//! JSON file; `NoopOracle` returns empty analyses so no triples are produced.

pub mod fixture;
pub mod hanlp;
pub mod oracle;

pub use fixture::FixtureOracle;
pub use hanlp::HanlpOracle;
pub use oracle::{LinguisticOracle, NoopOracle, SentenceAnalysis};

use biocn_core::{Error, OracleBackend, OracleConfig, Result};

/// Construct the oracle selected by the configuration.
///
/// The oracle is expensive to set up, so the caller builds it once and passes
/// it by reference into every extraction call.
pub fn create_oracle(config: &OracleConfig) -> Result<Box<dyn LinguisticOracle>> {
    match config.backend {
        OracleBackend::Hanlp => {
            let oracle = HanlpOracle::new(config)?;
            tracing::info!("Using HanLP oracle at {}", config.endpoint());
            Ok(Box::new(oracle))
        }
        OracleBackend::Fixture => {
            let path = config.fixture_path.as_deref().ok_or_else(|| {
                Error::Config("fixture backend requires oracle.fixture_path".into())
            })?;
            let oracle = FixtureOracle::from_path(std::path::Path::new(path))?;
            tracing::info!("Using fixture oracle ({} sentences)", oracle.len());
            Ok(Box::new(oracle))
        }
        OracleBackend::None => {
            tracing::warn!("No oracle configured; role extraction will find nothing");
            Ok(Box::new(NoopOracle))
        }
    }
}
