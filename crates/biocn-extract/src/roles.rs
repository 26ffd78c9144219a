//! Grammatical role extraction from dependency parses.
//!
//! For every verb-tagged token the extractor collects its nominal subjects and
//! direct objects, expands each through `conj` children, lets coordinated
//! verbs borrow the subject of the verb they attach to, and then runs the
//! construction rule table (passive pivots, 把 fronting). Extraction is total:
//! missing or malformed structure yields fewer triples, never an error.

use std::collections::BTreeSet;

use biocn_core::{RoleTriple, Token};
use biocn_oracle::SentenceAnalysis;
use serde::Serialize;
use tracing::{debug, trace};

use crate::constructions::{
    has_relation, is_verb, DependencyTree, CONJUNCT, CONSTRUCTION_RULES, OBJECT, SUBJECT,
};

/// Triples found in one sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceRoles {
    pub sentence: String,
    pub triples: Vec<RoleTriple>,
}

/// Build tokens from parallel oracle arrays.
///
/// Iteration is bounded by the token array; a missing tag becomes `""`, a
/// missing arc or an out-of-range head makes the token a root.
pub fn tokens_from_analysis(analysis: &SentenceAnalysis) -> Vec<Token> {
    let len = analysis.tokens.len();
    if !analysis.is_aligned() {
        debug!(
            "Misaligned parse: {} tokens, {} tags, {} arcs",
            len,
            analysis.pos_tags.len(),
            analysis.arcs.len()
        );
    }
    analysis
        .tokens
        .iter()
        .enumerate()
        .map(|(index, surface)| {
            let pos_tag = analysis.pos_tags.get(index).cloned().unwrap_or_default();
            let (head, relation) = match analysis.arcs.get(index) {
                Some((head, relation)) => (resolve_head(*head, len), relation.clone()),
                None => (None, String::new()),
            };
            Token {
                index,
                surface: surface.clone(),
                pos_tag,
                head,
                relation,
            }
        })
        .collect()
}

/// 1-based head (0 = root) to 0-based index.
fn resolve_head(head: usize, len: usize) -> Option<usize> {
    if head == 0 || head > len {
        None
    } else {
        Some(head - 1)
    }
}

/// Extract triples from parallel token / tag / arc arrays.
pub fn extract(tokens: &[String], pos_tags: &[String], arcs: &[(usize, String)]) -> Vec<RoleTriple> {
    let analysis = SentenceAnalysis {
        tokens: tokens.to_vec(),
        pos_tags: pos_tags.to_vec(),
        arcs: arcs.to_vec(),
    };
    extract_tokens(&tokens_from_analysis(&analysis))
}

/// Extract one triple per verb token, in token order.
pub fn extract_tokens(tokens: &[Token]) -> Vec<RoleTriple> {
    let tree = DependencyTree::new(tokens);

    (0..tokens.len())
        .filter(|&i| is_verb(&tokens[i].pos_tag))
        .filter_map(|predicate| resolve_predicate(&tree, predicate))
        .collect()
}

fn resolve_predicate(tree: &DependencyTree<'_>, predicate: usize) -> Option<RoleTriple> {
    let verb = tree.token(predicate);

    let mut subjects = tree.expand_conjuncts(&tree.dependents(predicate, SUBJECT));
    if subjects.is_empty() && has_relation(verb, CONJUNCT) {
        // One hop only: a conjoined verb borrows its governor's own subjects.
        if let Some(governor) = verb.head.filter(|&h| h < tree.tokens().len()) {
            subjects = tree.expand_conjuncts(&tree.dependents(governor, SUBJECT));
        }
    }

    let mut objects = tree.expand_conjuncts(&tree.dependents(predicate, OBJECT));

    for rule in CONSTRUCTION_RULES {
        if rule.trigger.fires(tree, predicate) {
            trace!("Rule {} fired on '{}'", rule.name, verb.surface);
            rule.action.apply(tree, predicate, &subjects, &mut objects);
        }
    }

    let predicate_surface = verb.surface.trim();
    if predicate_surface.is_empty() {
        return None;
    }

    Some(RoleTriple {
        subjects: render(tree, &subjects),
        predicate: predicate_surface.to_string(),
        objects: render(tree, &objects),
    })
}

/// Surfaces in token order, deduplicated by value.
fn render(tree: &DependencyTree<'_>, indices: &BTreeSet<usize>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(indices.len());
    for &index in indices {
        let surface = tree.token(index).surface.trim();
        if !surface.is_empty() && !out.iter().any(|s| s == surface) {
            out.push(surface.to_string());
        }
    }
    out
}

/// Pair sentences with their analyses and keep those with at least one triple.
///
/// Sentences the oracle did not cover are treated as having no triples.
pub fn extract_sentences(sentences: &[String], analyses: &[SentenceAnalysis]) -> Vec<SentenceRoles> {
    sentences
        .iter()
        .enumerate()
        .filter_map(|(i, sentence)| {
            let analysis = analyses.get(i)?;
            let triples = extract_tokens(&tokens_from_analysis(analysis));
            if triples.is_empty() {
                None
            } else {
                Some(SentenceRoles {
                    sentence: sentence.trim().to_string(),
                    triples,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn arcs(items: &[(usize, &str)]) -> Vec<(usize, String)> {
        items.iter().map(|(h, r)| (*h, r.to_string())).collect()
    }

    fn triple(subject: &str, predicate: &str, object: &str) -> (String, String, String) {
        (subject.into(), predicate.into(), object.into())
    }

    fn flat(triples: &[RoleTriple]) -> Vec<(String, String, String)> {
        triples
            .iter()
            .map(|t| (t.subject(), t.predicate.clone(), t.object()))
            .collect()
    }

    #[test]
    fn test_simple_svo() {
        let out = extract(
            &strings(&["我", "爱", "Python"]),
            &strings(&["PN", "VV", "NN"]),
            &arcs(&[(2, "nsubj"), (0, "root"), (2, "dobj")]),
        );
        assert_eq!(flat(&out), vec![triple("我", "爱", "Python")]);
    }

    #[test]
    fn test_no_verbs_no_triples() {
        let out = extract(
            &strings(&["苹果", "和", "香蕉"]),
            &strings(&["NN", "CC", "NN"]),
            &arcs(&[(0, "root"), (3, "cc"), (1, "conj")]),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_coordinated_objects() {
        // 我 买 苹果 和 香蕉
        let out = extract(
            &strings(&["我", "买", "苹果", "和", "香蕉"]),
            &strings(&["PN", "VV", "NN", "CC", "NN"]),
            &arcs(&[(2, "nsubj"), (0, "root"), (2, "dobj"), (5, "cc"), (3, "conj")]),
        );
        assert_eq!(flat(&out), vec![triple("我", "买", "苹果、香蕉")]);
        assert_eq!(out[0].objects, vec!["苹果", "香蕉"]);
    }

    #[test]
    fn test_transitive_coordination_keeps_token_order_once() {
        // 老师、学生和家长、学生来: the repeated surface appears once.
        let out = extract(
            &strings(&["老师", "、", "学生", "和", "家长", "学生", "来"]),
            &strings(&["NN", "PU", "NN", "CC", "NN", "NN", "VV"]),
            &arcs(&[
                (7, "nsubj"),
                (3, "punct"),
                (1, "conj"),
                (5, "cc"),
                (3, "conj"),
                (5, "conj"),
                (0, "root"),
            ]),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].subjects, vec!["老师", "学生", "家长"]);
    }

    #[test]
    fn test_passive_pivot() {
        // 苹果 被 我 吃 了
        let out = extract(
            &strings(&["苹果", "被", "我", "吃", "了"]),
            &strings(&["NN", "LB", "PN", "VV", "AS"]),
            &arcs(&[(2, "nsubjpass"), (0, "root"), (4, "nsubj"), (2, "ccomp"), (4, "asp")]),
        );
        assert_eq!(flat(&out), vec![triple("我", "吃", "苹果")]);
    }

    #[test]
    fn test_passive_pivot_expands_coordinated_patients() {
        // 苹果 和 香蕉 被 我 吃 了
        let out = extract(
            &strings(&["苹果", "和", "香蕉", "被", "我", "吃", "了"]),
            &strings(&["NN", "CC", "NN", "LB", "PN", "VV", "AS"]),
            &arcs(&[
                (4, "nsubjpass"),
                (3, "cc"),
                (1, "conj"),
                (0, "root"),
                (6, "nsubj"),
                (4, "ccomp"),
                (6, "asp"),
            ]),
        );
        assert_eq!(flat(&out), vec![triple("我", "吃", "苹果、香蕉")]);
    }

    #[test]
    fn test_passive_marker_word_without_pivot_tag() {
        let out = extract(
            &strings(&["苹果", "被", "我", "吃", "了"]),
            &strings(&["NN", "P", "PN", "VV", "AS"]),
            &arcs(&[(2, "nsubjpass"), (0, "root"), (4, "nsubj"), (2, "dep"), (4, "asp")]),
        );
        assert_eq!(flat(&out), vec![triple("我", "吃", "苹果")]);
    }

    #[test]
    fn test_ba_fronting_recovers_object() {
        // 我 把 苹果 吃 了: 苹果 attaches as a generic dependent.
        let out = extract(
            &strings(&["我", "把", "苹果", "吃", "了"]),
            &strings(&["PN", "BA", "NN", "VV", "AS"]),
            &arcs(&[(4, "nsubj"), (4, "ba"), (4, "dep"), (0, "root"), (4, "asp")]),
        );
        assert_eq!(flat(&out), vec![triple("我", "吃", "苹果")]);
    }

    #[test]
    fn test_ba_fronting_expands_coordinated_object() {
        // 我 把 苹果 和 香蕉 吃 了
        let out = extract(
            &strings(&["我", "把", "苹果", "和", "香蕉", "吃", "了"]),
            &strings(&["PN", "BA", "NN", "CC", "NN", "VV", "AS"]),
            &arcs(&[
                (6, "nsubj"),
                (6, "ba"),
                (6, "dep"),
                (5, "cc"),
                (3, "conj"),
                (0, "root"),
                (6, "asp"),
            ]),
        );
        assert_eq!(flat(&out), vec![triple("我", "吃", "苹果、香蕉")]);
    }

    #[test]
    fn test_ba_fronting_keeps_existing_object() {
        let out = extract(
            &strings(&["我", "把", "门", "关", "上", "窗"]),
            &strings(&["PN", "BA", "NN", "VV", "VV", "NN"]),
            &arcs(&[(4, "nsubj"), (4, "ba"), (4, "dep"), (0, "root"), (4, "rcomp"), (4, "dobj")]),
        );
        assert_eq!(out[0].object(), "窗");
    }

    #[test]
    fn test_conjoined_verb_shares_subject() {
        // 他 唱歌 又 跳舞
        let out = extract(
            &strings(&["他", "唱歌", "又", "跳舞"]),
            &strings(&["PN", "VV", "AD", "VV"]),
            &arcs(&[(2, "nsubj"), (0, "root"), (4, "advmod"), (2, "conj")]),
        );
        assert_eq!(
            flat(&out),
            vec![triple("他", "唱歌", ""), triple("他", "跳舞", "")]
        );
    }

    #[test]
    fn test_conjoined_verb_inherits_coordinated_subject() {
        // 他 和 她 唱歌 又 跳舞
        let out = extract(
            &strings(&["他", "和", "她", "唱歌", "又", "跳舞"]),
            &strings(&["PN", "CC", "PN", "VV", "AD", "VV"]),
            &arcs(&[
                (4, "nsubj"),
                (3, "cc"),
                (1, "conj"),
                (0, "root"),
                (6, "advmod"),
                (4, "conj"),
            ]),
        );
        assert_eq!(
            flat(&out),
            vec![triple("他、她", "唱歌", ""), triple("他、她", "跳舞", "")]
        );
    }

    #[test]
    fn test_subject_sharing_is_one_hop_only() {
        // Known limitation: a verb chained two conj hops away from the verb
        // that owns the subject does not inherit it.
        let out = extract(
            &strings(&["他", "唱", "跳", "笑"]),
            &strings(&["PN", "VV", "VV", "VV"]),
            &arcs(&[(2, "nsubj"), (0, "root"), (2, "conj"), (3, "conj")]),
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].subject(), "他");
        assert_eq!(out[2].subject(), "");
    }

    #[test]
    fn test_predicate_only_triple() {
        let out = extract(&strings(&["下雨"]), &strings(&["VV"]), &arcs(&[(0, "root")]));
        assert_eq!(flat(&out), vec![triple("", "下雨", "")]);
    }

    #[test]
    fn test_misaligned_arrays_bounded_by_tokens() {
        let out = extract(
            &strings(&["我", "爱", "Python"]),
            &strings(&["PN", "VV"]),
            &arcs(&[(2, "nsubj"), (0, "root"), (2, "dobj"), (9, "dep")]),
        );
        assert_eq!(flat(&out), vec![triple("我", "爱", "Python")]);
    }

    #[test]
    fn test_out_of_range_head_is_root() {
        let analysis = SentenceAnalysis {
            tokens: strings(&["我", "爱"]),
            pos_tags: strings(&["PN", "VV"]),
            arcs: arcs(&[(5, "nsubj"), (0, "root")]),
        };
        let tokens = tokens_from_analysis(&analysis);
        assert_eq!(tokens[0].head, None);
        assert_eq!(flat(&extract_tokens(&tokens)), vec![triple("", "爱", "")]);
    }

    #[test]
    fn test_every_predicate_is_non_empty() {
        let out = extract(
            &strings(&["", "我", "爱"]),
            &strings(&["VV", "PN", "VV"]),
            &arcs(&[(3, "dep"), (3, "nsubj"), (0, "root")]),
        );
        assert_eq!(out.len(), 1);
        assert!(out.iter().all(|t| !t.predicate.is_empty()));
    }

    #[test]
    fn test_sentences_without_triples_are_dropped() {
        let sentences = strings(&["我爱Python。", "好。", "未覆盖。"]);
        let analyses = vec![
            SentenceAnalysis {
                tokens: strings(&["我", "爱", "Python", "。"]),
                pos_tags: strings(&["PN", "VV", "NN", "PU"]),
                arcs: arcs(&[(2, "nsubj"), (0, "root"), (2, "dobj"), (2, "punct")]),
            },
            SentenceAnalysis {
                tokens: strings(&["好", "。"]),
                pos_tags: strings(&["JJ", "PU"]),
                arcs: arcs(&[(0, "root"), (1, "punct")]),
            },
        ];
        let out = extract_sentences(&sentences, &analyses);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sentence, "我爱Python。");
    }
}
