//! Built-in keyword rankers.
//!
//! Ranking is a black box to the rest of the pipeline: anything that returns
//! `(phrase, score)` pairs can implement `KeywordRanker`. Both rankers here
//! share one candidate extractor: Latin words of three or more letters, and
//! runs of Han characters split at common function characters.

use std::collections::{HashMap, HashSet};

use biocn_core::RankMethod;
use once_cell::sync::Lazy;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use regex::Regex;

/// Longest Han run kept whole; longer runs are cut into two-character words.
const MAX_HAN_TERM: usize = 6;

/// TextRank co-occurrence window (in candidate terms).
pub const DEFAULT_WINDOW: usize = 3;
pub const DAMPING: f64 = 0.85;
pub const ITERATIONS: usize = 30;

static CANDIDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Han}+|[A-Za-z][A-Za-z0-9'-]*").unwrap());

/// Function characters that delimit Han content words.
const HAN_BREAKS: &[char] = &[
    '的', '了', '是', '在', '和', '与', '及', '等', '也', '都', '就', '而', '被', '把', '着',
    '过', '地', '得', '之', '其', '这', '那', '为', '以', '于', '对', '从', '向', '将', '或',
    '并', '但', '又', '很',
];

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "have",
        "has", "had", "not", "but", "you", "your", "they", "their", "them", "its", "into",
        "than", "then", "there", "these", "those", "which", "who", "whom", "will", "would",
        "can", "could", "should", "been", "being", "also", "such", "our", "out", "all",
    ]
    .into_iter()
    .collect()
});

/// Trait for keyword ranking backends.
pub trait KeywordRanker {
    /// Rank candidate phrases of `text`, highest score first.
    fn rank(&self, text: &str) -> Vec<(String, f64)>;

    fn name(&self) -> &'static str;
}

/// Create the ranker for a configured method.
pub fn create_ranker(method: RankMethod) -> Box<dyn KeywordRanker> {
    match method {
        RankMethod::Frequency => Box::new(FrequencyRanker),
        RankMethod::TextRank => Box::new(TextRankRanker::default()),
    }
}

/// Candidate terms in order of appearance (repeats included).
pub fn candidate_terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for m in CANDIDATE_RE.find_iter(text) {
        let s = m.as_str();
        if s.starts_with(|c: char| c.is_ascii_alphabetic()) {
            if s.len() >= 3 && !STOP_WORDS.contains(s.to_lowercase().as_str()) {
                terms.push(s.to_string());
            }
            continue;
        }

        for piece in s.split(|c: char| HAN_BREAKS.contains(&c)) {
            let chars: Vec<char> = piece.chars().collect();
            if chars.len() < 2 {
                continue;
            }
            if chars.len() <= MAX_HAN_TERM {
                terms.push(piece.to_string());
            } else {
                for pair in chars.chunks(2).filter(|c| c.len() == 2) {
                    terms.push(pair.iter().collect());
                }
            }
        }
    }
    terms
}

/// Term frequency weighted by log length.
pub struct FrequencyRanker;

impl KeywordRanker for FrequencyRanker {
    fn rank(&self, text: &str) -> Vec<(String, f64)> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for term in candidate_terms(text) {
            let count = counts.entry(term.clone()).or_insert(0);
            if *count == 0 {
                order.push(term);
            }
            *count += 1;
        }

        let mut ranked: Vec<(String, f64)> = order
            .into_iter()
            .map(|term| {
                let count = counts.get(&term).copied().unwrap_or(0) as f64;
                let weight = 1.0 + (term.chars().count() as f64).ln();
                (term, count * weight)
            })
            .collect();
        sort_desc(&mut ranked);
        ranked
    }

    fn name(&self) -> &'static str {
        "frequency"
    }
}

/// PageRank over an undirected term co-occurrence graph.
pub struct TextRankRanker {
    pub window: usize,
    pub damping: f64,
    pub iterations: usize,
}

impl Default for TextRankRanker {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            damping: DAMPING,
            iterations: ITERATIONS,
        }
    }
}

impl TextRankRanker {
    fn build_graph(&self, terms: &[String]) -> UnGraph<String, f64> {
        let mut graph: UnGraph<String, f64> = UnGraph::new_undirected();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        for term in terms {
            if !nodes.contains_key(term.as_str()) {
                nodes.insert(term.as_str(), graph.add_node(term.clone()));
            }
        }

        for (i, term) in terms.iter().enumerate() {
            let a = nodes[term.as_str()];
            for other in terms.iter().skip(i + 1).take(self.window.saturating_sub(1)) {
                let b = nodes[other.as_str()];
                if a == b {
                    continue;
                }
                match graph.find_edge(a, b) {
                    Some(edge) => graph[edge] += 1.0,
                    None => {
                        graph.add_edge(a, b, 1.0);
                    }
                }
            }
        }
        graph
    }
}

impl KeywordRanker for TextRankRanker {
    fn rank(&self, text: &str) -> Vec<(String, f64)> {
        let terms = candidate_terms(text);
        if terms.is_empty() {
            return Vec::new();
        }
        let graph = self.build_graph(&terms);

        let strength: Vec<f64> = graph
            .node_indices()
            .map(|n| graph.edges(n).map(|e| *e.weight()).sum())
            .collect();

        let mut scores = vec![1.0; graph.node_count()];
        for _ in 0..self.iterations {
            let mut next = vec![1.0 - self.damping; graph.node_count()];
            for n in graph.node_indices() {
                let mut incoming = 0.0;
                for edge in graph.edges(n) {
                    let neighbour = if edge.source() == n { edge.target() } else { edge.source() };
                    let out = strength[neighbour.index()];
                    if out > 0.0 {
                        incoming += edge.weight() / out * scores[neighbour.index()];
                    }
                }
                next[n.index()] += self.damping * incoming;
            }
            scores = next;
        }

        let mut ranked: Vec<(String, f64)> = graph
            .node_indices()
            .map(|n| (graph[n].clone(), scores[n.index()]))
            .collect();
        sort_desc(&mut ranked);
        ranked
    }

    fn name(&self) -> &'static str {
        "textrank"
    }
}

/// Stable descending sort, so equal scores keep first-appearance order.
fn sort_desc(ranked: &mut [(String, f64)]) {
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}
