//! Configuration: analysis mode, presentation table, and oracle backend.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Category;

/// Default number of keywords kept per text blob.
pub const DEFAULT_TOP_K: usize = 15;
pub const DEFAULT_HANLP_URL: &str = "https://www.hanlp.com/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Keyword ranking method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMethod {
    Frequency,
    TextRank,
}

impl RankMethod {
    /// Parse a method name; unsupported names are rejected.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "frequency" | "tfidf" => Ok(Self::Frequency),
            "textrank" => Ok(Self::TextRank),
            other => Err(Error::Config(format!(
                "unsupported keyword method '{}' (expected frequency, tfidf or textrank)",
                other
            ))),
        }
    }
}

/// Analysis mode resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    /// Subject / predicate / object highlighting from dependency parses.
    Roles,
    /// Keyword highlighting by importance tier.
    Keywords { method: RankMethod, top_k: usize },
}

impl AnalyzerKind {
    /// Build from a mode name and an optional keyword method.
    pub fn from_mode(mode: &str, method: Option<&str>, top_k: usize) -> Result<Self> {
        match mode.trim().to_lowercase().as_str() {
            "svo" | "roles" => Ok(Self::Roles),
            "keywords" => {
                let method = RankMethod::parse(method.unwrap_or("frequency"))?;
                if top_k == 0 {
                    return Err(Error::Config("top_k must be at least 1".into()));
                }
                Ok(Self::Keywords { method, top_k })
            }
            other => Err(Error::Config(format!(
                "unsupported analysis mode '{}' (expected svo or keywords)",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Roles => "svo",
            Self::Keywords { .. } => "keywords",
        }
    }
}

/// Category → CSS declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub tier_high: String,
    pub tier_medium: String,
    pub tier_low: String,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            subject: "color: #D95F02; font-weight: bold;".into(),
            predicate: "color: #1B9E77; font-weight: bold;".into(),
            object: "color: #7570B3; font-weight: bold;".into(),
            tier_high: "color: #E7298A; font-weight: bold;".into(),
            tier_medium: "color: #66A61E; font-weight: bold;".into(),
            tier_low: "color: #1F78B4;".into(),
        }
    }
}

impl StyleTable {
    pub fn style_for(&self, category: Category) -> &str {
        match category {
            Category::Subject => &self.subject,
            Category::Predicate => &self.predicate,
            Category::Object => &self.object,
            Category::TierHigh => &self.tier_high,
            Category::TierMedium => &self.tier_medium,
            Category::TierLow => &self.tier_low,
        }
    }

    /// Render the table as a stylesheet keyed by each category's CSS class.
    pub fn to_css(&self) -> String {
        let mut css = String::from("/* bioCN highlighting */\n");
        for category in Category::ALL {
            css.push_str(&format!(
                ".{} {{ {} }}\n",
                category.css_class(),
                self.style_for(category).trim()
            ));
        }
        css
    }
}

/// Which linguistic oracle backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleBackend {
    Hanlp,
    Fixture,
    None,
}

/// Oracle connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_backend")]
    pub backend: OracleBackend,
    /// HanLP endpoint; unset means `BIOCN_HANLP_URL`, then the public API.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub fixture_path: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_backend() -> OracleBackend {
    OracleBackend::Hanlp
}
fn default_language() -> String {
    "zh".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl OracleConfig {
    pub fn endpoint(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_HANLP_URL)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            auth: None,
            fixture_path: None,
            language: default_language(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Top-level bioCN configuration (persisted as JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiocnConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Inline `style` attributes instead of class references plus a stylesheet.
    #[serde(default)]
    pub inline_css: bool,
    #[serde(default)]
    pub styles: StyleTable,
    #[serde(default)]
    pub oracle: OracleConfig,
}

fn default_mode() -> String {
    "svo".into()
}
fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for BiocnConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            method: None,
            top_k: DEFAULT_TOP_K,
            inline_css: false,
            styles: StyleTable::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl BiocnConfig {
    /// Load config from file (defaults when the file is absent), then apply env fallbacks.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                info!("Loaded config from {}", path.display());
                serde_json::from_str::<BiocnConfig>(&raw)?
            }
            Some(path) => {
                debug!("Config file {} not found, using defaults", path.display());
                BiocnConfig::default()
            }
            None => BiocnConfig::default(),
        };

        config.fill_from_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Fill oracle settings the file left unset from the environment.
    pub fn fill_from_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.oracle.url.is_none() {
            self.oracle.url = lookup("BIOCN_HANLP_URL");
        }
        if self.oracle.auth.is_none() {
            self.oracle.auth = lookup("BIOCN_HANLP_AUTH");
        }
    }

    /// Resolve the analysis mode, rejecting unsupported values.
    pub fn analyzer_kind(&self) -> Result<AnalyzerKind> {
        AnalyzerKind::from_mode(&self.mode, self.method.as_deref(), self.top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_resolution() {
        assert_eq!(
            AnalyzerKind::from_mode("svo", None, 15).unwrap(),
            AnalyzerKind::Roles
        );
        assert_eq!(
            AnalyzerKind::from_mode("keywords", Some("textrank"), 10).unwrap(),
            AnalyzerKind::Keywords {
                method: RankMethod::TextRank,
                top_k: 10
            }
        );
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let err = AnalyzerKind::from_mode("invalid", None, 15).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let err = AnalyzerKind::from_mode("keywords", Some("keybert"), 15).unwrap_err();
        assert!(err.to_string().contains("keybert"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("biocn.json");
        std::fs::write(&path, r#"{"mode": "keywords", "inline_css": true}"#).unwrap();

        let config = BiocnConfig::load(Some(&path)).unwrap();
        assert_eq!(config.mode, "keywords");
        assert!(config.inline_css);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.styles, StyleTable::default());
    }

    #[test]
    fn test_env_fills_only_missing_oracle_settings() {
        let env = |key: &str| match key {
            "BIOCN_HANLP_URL" => Some("http://env-host:8080".to_string()),
            "BIOCN_HANLP_AUTH" => Some("env-token".to_string()),
            _ => None,
        };

        let mut from_file: BiocnConfig =
            serde_json::from_str(r#"{"oracle": {"url": "http://file-host:9000"}}"#).unwrap();
        from_file.fill_from_env(env);
        assert_eq!(from_file.oracle.endpoint(), "http://file-host:9000");
        assert_eq!(from_file.oracle.auth.as_deref(), Some("env-token"));

        let mut bare = BiocnConfig::default();
        bare.fill_from_env(env);
        assert_eq!(bare.oracle.endpoint(), "http://env-host:8080");

        let mut unset = BiocnConfig::default();
        unset.fill_from_env(|_| None);
        assert_eq!(unset.oracle.endpoint(), DEFAULT_HANLP_URL);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = BiocnConfig::load(Some(Path::new("/nonexistent/biocn.json"))).unwrap();
        assert_eq!(config.analyzer_kind().unwrap(), AnalyzerKind::Roles);
    }

    #[test]
    fn test_css_lists_every_category() {
        let css = StyleTable::default().to_css();
        for category in Category::ALL {
            assert!(css.contains(category.css_class()));
        }
    }
}
