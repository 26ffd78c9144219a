//! Argument parsing for `biocn annotate`.

use std::path::PathBuf;

use anyhow::{anyhow, bail};
use biocn_core::{BiocnConfig, OracleBackend};

#[derive(Debug, Default, PartialEq)]
pub struct AnnotateArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    pub mode: Option<String>,
    pub method: Option<String>,
    pub top_k: Option<usize>,
    pub inline_css: bool,
    pub fixture: Option<PathBuf>,
    pub report: bool,
}

impl AnnotateArgs {
    /// Parse everything after `annotate`.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut parsed = AnnotateArgs::default();
        let mut positional = Vec::new();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let arg = arg.as_str();
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{} needs a value", flag))
            };
            match arg {
                "--config" => parsed.config = Some(PathBuf::from(value(arg)?)),
                "--mode" => parsed.mode = Some(value(arg)?),
                "--method" => parsed.method = Some(value(arg)?),
                "--top-k" => {
                    let raw = value(arg)?;
                    let n = raw
                        .parse()
                        .map_err(|_| anyhow!("--top-k expects a number, got {}", raw))?;
                    parsed.top_k = Some(n);
                }
                "--fixture" => parsed.fixture = Some(PathBuf::from(value(arg)?)),
                "--inline-css" => parsed.inline_css = true,
                "--report" => parsed.report = true,
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        if positional.len() != 2 {
            bail!("Usage: biocn annotate <input> <output> [options]");
        }
        parsed.output = positional.pop().unwrap_or_default();
        parsed.input = positional.pop().unwrap_or_default();
        Ok(parsed)
    }

    /// Command-line flags win over the config file.
    pub fn apply(&self, config: &mut BiocnConfig) {
        if let Some(mode) = &self.mode {
            config.mode = mode.clone();
        }
        if let Some(method) = &self.method {
            config.method = Some(method.clone());
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if self.inline_css {
            config.inline_css = true;
        }
        if let Some(fixture) = &self.fixture {
            config.oracle.backend = OracleBackend::Fixture;
            config.oracle.fixture_path = Some(fixture.display().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_full() {
        let parsed = AnnotateArgs::parse(&args(&[
            "book/", "out/", "--mode", "keywords", "--method", "textrank", "--top-k", "8",
            "--inline-css", "--report",
        ]))
        .unwrap();
        assert_eq!(parsed.input, PathBuf::from("book/"));
        assert_eq!(parsed.output, PathBuf::from("out/"));
        assert_eq!(parsed.mode.as_deref(), Some("keywords"));
        assert_eq!(parsed.top_k, Some(8));
        assert!(parsed.inline_css);
        assert!(parsed.report);
    }

    #[test]
    fn test_parse_errors() {
        assert!(AnnotateArgs::parse(&args(&["only-input"])).is_err());
        assert!(AnnotateArgs::parse(&args(&["a", "b", "--mode"])).is_err());
        assert!(AnnotateArgs::parse(&args(&["a", "b", "--verbose"])).is_err());
        assert!(AnnotateArgs::parse(&args(&["a", "b", "--top-k", "many"])).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let parsed = AnnotateArgs::parse(&args(&["a", "b", "--fixture", "parses.json", "--inline-css"])).unwrap();
        let mut config = BiocnConfig::default();
        parsed.apply(&mut config);
        assert_eq!(config.oracle.backend, OracleBackend::Fixture);
        assert_eq!(config.oracle.fixture_path.as_deref(), Some("parses.json"));
        assert!(config.inline_css);
        assert_eq!(config.mode, "svo");
    }
}
