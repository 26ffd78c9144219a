//! HanLP REST client.
//!
//! Sends a whole batch of sentences in a single `parse` request asking for
//! fine-grained tokens, CTB part-of-speech tags, and dependency arcs.

use std::time::Duration;

use biocn_core::{Error, OracleConfig, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::oracle::{LinguisticOracle, SentenceAnalysis};

const TASKS: [&str; 3] = ["tok/fine", "pos/ctb", "dep"];

/// Response document: one array per task, each holding one entry per sentence.
#[derive(Debug, Default, Deserialize)]
struct ParseDocument {
    #[serde(rename = "tok/fine", default)]
    tokens: Vec<Vec<String>>,
    #[serde(rename = "pos/ctb", default)]
    pos_tags: Vec<Vec<String>>,
    #[serde(default)]
    dep: Vec<Vec<(usize, String)>>,
}

pub struct HanlpOracle {
    client: Client,
    url: String,
    auth: Option<String>,
    language: String,
}

impl HanlpOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Oracle(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/parse", config.endpoint().trim_end_matches('/')),
            auth: config.auth.clone(),
            language: config.language.clone(),
        })
    }
}

impl LinguisticOracle for HanlpOracle {
    fn analyze(&self, sentences: &[String]) -> Result<Vec<SentenceAnalysis>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "text": sentences,
            "tasks": TASKS,
            "language": self.language,
        });

        debug!("Sending {} sentences to {}", sentences.len(), self.url);

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(auth) = &self.auth {
            request = request.header("Authorization", format!("Basic {}", auth));
        }

        let response = request
            .send()
            .map_err(|e| Error::Oracle(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Oracle(format!("API error {}: {}", status, body)));
        }

        let document: ParseDocument = response
            .json()
            .map_err(|e| Error::Oracle(format!("invalid response: {}", e)))?;

        Ok(split_document(document, sentences.len()))
    }

    fn name(&self) -> &str {
        "hanlp"
    }
}

/// Zip the per-task arrays back into one analysis per input sentence.
///
/// Sentences the response does not cover get an empty analysis.
fn split_document(document: ParseDocument, expected: usize) -> Vec<SentenceAnalysis> {
    if document.tokens.len() != expected {
        warn!(
            "Oracle returned {} token lists for {} sentences",
            document.tokens.len(),
            expected
        );
    }

    let mut tokens = document.tokens.into_iter();
    let mut pos_tags = document.pos_tags.into_iter();
    let mut arcs = document.dep.into_iter();

    (0..expected)
        .map(|_| SentenceAnalysis {
            tokens: tokens.next().unwrap_or_default(),
            pos_tags: pos_tags.next().unwrap_or_default(),
            arcs: arcs.next().unwrap_or_default(),
        })
        .collect()
}
