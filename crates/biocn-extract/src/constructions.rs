//! Label vocabularies and the construction rule table.
//!
//! Passive and object-fronting detection is pattern matching over POS tags,
//! relation labels, and literal marker words. Each pattern lives in
//! `CONSTRUCTION_RULES` as a (trigger, action) pair applied in order after
//! the ordinary subject and object sets are resolved.

use std::collections::BTreeSet;

use biocn_core::Token;

/// Nominal subject.
pub const SUBJECT: &[&str] = &["nsubj"];
/// Direct object, Stanford and Universal Dependencies spellings.
pub const OBJECT: &[&str] = &["dobj", "obj"];
/// Coordination.
pub const CONJUNCT: &[&str] = &["conj"];
/// Passive subject (the logical patient).
pub const PASSIVE_SUBJECT: &[&str] = &["nsubjpass", "nsubj:pass"];
/// Fronting auxiliary of the 把 construction.
pub const FRONTING: &[&str] = &["ba", "aux:ba"];
/// Generic and oblique relations a fronted object may attach with.
pub const OBLIQUE: &[&str] = &["dep", "obl", "obl:patient", "nmod"];

/// Governor tags that mark a passive pivot (long/short 被, sentence-final particle).
pub const PIVOT_TAGS: &[&str] = &["LB", "SB", "SP"];
/// Literal passive markers.
pub const PIVOT_MARKERS: &[&str] = &["被"];

/// Verb tags: CTB `VV`/`VA`/`VC`/`VE`, UD `VERB`, PTB `VB*`.
pub fn is_verb(tag: &str) -> bool {
    tag.starts_with('V')
}

/// Noun-class tags: CTB `NN`/`NR`/`NT`/`PN`, UD `NOUN`/`PROPN`/`PRON`, PTB `NN*`/`PRP`.
pub fn is_nominal(tag: &str) -> bool {
    matches!(tag, "NR" | "NT" | "PN" | "NOUN" | "PROPN" | "PRON" | "PRP") || tag.starts_with("NN")
}

pub fn has_relation(token: &Token, labels: &[&str]) -> bool {
    let relation = token.relation.to_ascii_lowercase();
    labels.iter().any(|l| *l == relation)
}

/// Read-only view of one sentence's dependency tree.
pub struct DependencyTree<'a> {
    tokens: &'a [Token],
    children: Vec<Vec<usize>>,
}

impl<'a> DependencyTree<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut children = vec![Vec::new(); tokens.len()];
        for (position, token) in tokens.iter().enumerate() {
            if let Some(head) = token.head {
                if head < tokens.len() {
                    children[head].push(position);
                }
            }
        }
        Self { tokens, children }
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    pub fn token(&self, index: usize) -> &'a Token {
        &self.tokens[index]
    }

    pub fn governor(&self, index: usize) -> Option<&'a Token> {
        self.tokens[index]
            .head
            .and_then(|h| self.tokens.get(h))
    }

    /// Dependents of `index` attached with one of `labels`, in token order.
    pub fn dependents(&self, index: usize, labels: &[&str]) -> Vec<usize> {
        self.children[index]
            .iter()
            .copied()
            .filter(|&c| has_relation(&self.tokens[c], labels))
            .collect()
    }

    /// Seeds plus every token reachable from them through `conj` children.
    ///
    /// Breadth-first and guarded by a visited set, so malformed arcs that
    /// form a cycle still terminate.
    pub fn expand_conjuncts(&self, seeds: &[usize]) -> BTreeSet<usize> {
        let mut visited = BTreeSet::new();
        let mut queue: std::collections::VecDeque<usize> = seeds.iter().copied().collect();

        while let Some(index) = queue.pop_front() {
            if !visited.insert(index) {
                continue;
            }
            for child in self.dependents(index, CONJUNCT) {
                if !visited.contains(&child) {
                    queue.push_back(child);
                }
            }
        }
        visited
    }
}

/// When a construction rule applies to a predicate.
#[derive(Debug)]
pub enum Trigger {
    /// The predicate's governor carries one of these POS tags.
    GovernorTag(&'static [&'static str]),
    /// The predicate's governor is one of these literal words.
    GovernorSurface(&'static [&'static str]),
    /// The predicate has a dependent with one of these relations.
    DependentRelation(&'static [&'static str]),
}

/// What a matched rule does to the argument sets.
#[derive(Debug)]
pub enum Action {
    /// The governor is a pivot: its dependents with these relations join the objects.
    PivotDependentsToObject(&'static [&'static str]),
    /// The predicate's own dependents with these relations join the objects.
    OwnDependentsToObject(&'static [&'static str]),
    /// With no object yet, the first nominal dependent attached with one of
    /// these relations (and not already a subject) becomes the object.
    RecoverObliqueObject(&'static [&'static str]),
}

#[derive(Debug)]
pub struct ConstructionRule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub action: Action,
}

pub const CONSTRUCTION_RULES: &[ConstructionRule] = &[
    ConstructionRule {
        name: "passive-pivot-tag",
        trigger: Trigger::GovernorTag(PIVOT_TAGS),
        action: Action::PivotDependentsToObject(PASSIVE_SUBJECT),
    },
    ConstructionRule {
        name: "passive-pivot-marker",
        trigger: Trigger::GovernorSurface(PIVOT_MARKERS),
        action: Action::PivotDependentsToObject(PASSIVE_SUBJECT),
    },
    ConstructionRule {
        name: "passive-subject-on-predicate",
        trigger: Trigger::DependentRelation(PASSIVE_SUBJECT),
        action: Action::OwnDependentsToObject(PASSIVE_SUBJECT),
    },
    ConstructionRule {
        name: "ba-fronting",
        trigger: Trigger::DependentRelation(FRONTING),
        action: Action::RecoverObliqueObject(OBLIQUE),
    },
];

impl Trigger {
    pub fn fires(&self, tree: &DependencyTree<'_>, predicate: usize) -> bool {
        match self {
            Trigger::GovernorTag(tags) => tree
                .governor(predicate)
                .is_some_and(|g| tags.contains(&g.pos_tag.as_str())),
            Trigger::GovernorSurface(words) => tree
                .governor(predicate)
                .is_some_and(|g| words.contains(&g.surface.as_str())),
            Trigger::DependentRelation(labels) => !tree.dependents(predicate, labels).is_empty(),
        }
    }
}

impl Action {
    pub fn apply(
        &self,
        tree: &DependencyTree<'_>,
        predicate: usize,
        subjects: &BTreeSet<usize>,
        objects: &mut BTreeSet<usize>,
    ) {
        match self {
            Action::PivotDependentsToObject(labels) => {
                let pivot = tree.token(predicate).head.filter(|&h| h < tree.tokens().len());
                if let Some(pivot) = pivot {
                    let patients = tree.dependents(pivot, labels);
                    objects.extend(tree.expand_conjuncts(&patients));
                }
            }
            Action::OwnDependentsToObject(labels) => {
                let patients = tree.dependents(predicate, labels);
                objects.extend(tree.expand_conjuncts(&patients));
            }
            Action::RecoverObliqueObject(labels) => {
                if !objects.is_empty() {
                    return;
                }
                let fronted = tree
                    .dependents(predicate, labels)
                    .into_iter()
                    .find(|&d| is_nominal(&tree.token(d).pos_tag) && !subjects.contains(&d));
                if let Some(index) = fronted {
                    objects.extend(tree.expand_conjuncts(&[index]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(index: usize, surface: &str, tag: &str, head: Option<usize>, rel: &str) -> Token {
        Token {
            index,
            surface: surface.into(),
            pos_tag: tag.into(),
            head,
            relation: rel.into(),
        }
    }

    #[test]
    fn test_tag_classes() {
        assert!(is_verb("VV"));
        assert!(is_verb("VERB"));
        assert!(!is_verb("NN"));
        assert!(is_nominal("NR"));
        assert!(is_nominal("NNS"));
        assert!(!is_nominal("VV"));
    }

    #[test]
    fn test_relation_match_is_exact() {
        let t = token(0, "苹果", "NN", Some(1), "nsubj:pass");
        assert!(has_relation(&t, PASSIVE_SUBJECT));
        assert!(!has_relation(&t, SUBJECT));
    }

    #[test]
    fn test_expansion_terminates_on_cycle() {
        // 0 and 1 are each other's conjunct heads.
        let tokens = vec![
            token(0, "甲", "NN", Some(1), "conj"),
            token(1, "乙", "NN", Some(0), "conj"),
        ];
        let tree = DependencyTree::new(&tokens);
        let expanded = tree.expand_conjuncts(&[0]);
        assert_eq!(expanded.into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_out_of_range_heads_are_ignored() {
        let tokens = vec![token(0, "好", "VA", Some(7), "root")];
        let tree = DependencyTree::new(&tokens);
        assert!(tree.governor(0).is_none());
    }
}
