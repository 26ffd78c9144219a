//! Data model shared by extraction, annotation, and the runtime.

use serde::{Deserialize, Serialize};

/// Separator used when coordinated surfaces share one argument slot.
pub const LIST_SEPARATOR: &str = "、";

/// One analysed token of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 0-based position within the sentence.
    pub index: usize,
    pub surface: String,
    pub pos_tag: String,
    /// 0-based index of the governing token; `None` for the root.
    pub head: Option<usize>,
    /// Dependency relation to the head (e.g. `nsubj`, `dobj`, `conj`).
    pub relation: String,
}

/// Subject / predicate / object roles anchored on one predicate token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleTriple {
    /// Subject surfaces, ordered by token index, deduplicated.
    pub subjects: Vec<String>,
    pub predicate: String,
    /// Object surfaces, ordered by token index, deduplicated.
    pub objects: Vec<String>,
}

impl RoleTriple {
    /// Subject slot rendered as one string (`"A、B"` for coordinated members).
    pub fn subject(&self) -> String {
        self.subjects.join(LIST_SEPARATOR)
    }

    /// Object slot rendered as one string.
    pub fn object(&self) -> String {
        self.objects.join(LIST_SEPARATOR)
    }

    /// Annotation requests for every member surface of this triple.
    pub fn annotations(&self) -> Vec<Annotation> {
        let mut out = Vec::with_capacity(self.subjects.len() + self.objects.len() + 1);
        out.extend(
            self.subjects
                .iter()
                .map(|s| Annotation::new(s.clone(), Category::Subject)),
        );
        if !self.predicate.is_empty() {
            out.push(Annotation::new(self.predicate.clone(), Category::Predicate));
        }
        out.extend(
            self.objects
                .iter()
                .map(|o| Annotation::new(o.clone(), Category::Object)),
        );
        out
    }
}

/// Discrete importance bucket of a ranked keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub fn category(&self) -> Category {
        match self {
            Tier::High => Category::TierHigh,
            Tier::Medium => Category::TierMedium,
            Tier::Low => Category::TierLow,
        }
    }
}

/// A ranked keyword with its importance tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub phrase: String,
    pub score: f64,
    pub tier: Tier,
}

impl KeywordEntry {
    pub fn annotation(&self) -> Annotation {
        Annotation::new(self.phrase.clone(), self.tier.category())
    }
}

/// Highlight category carried by an annotation wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Subject,
    Predicate,
    Object,
    TierHigh,
    TierMedium,
    TierLow,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Subject,
        Category::Predicate,
        Category::Object,
        Category::TierHigh,
        Category::TierMedium,
        Category::TierLow,
    ];

    /// Stable label, also used as the wrapper marker value.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Subject => "subject",
            Category::Predicate => "predicate",
            Category::Object => "object",
            Category::TierHigh => "tier_high",
            Category::TierMedium => "tier_medium",
            Category::TierLow => "tier_low",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// CSS class used in class-reference mode.
    pub fn css_class(&self) -> &'static str {
        match self {
            Category::Subject => "svo-subject",
            Category::Predicate => "svo-predicate",
            Category::Object => "svo-object",
            Category::TierHigh => "kw-high",
            Category::TierMedium => "kw-medium",
            Category::TierLow => "kw-low",
        }
    }

    /// Keyword categories match on word boundaries and are applied longest-first.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Category::TierHigh | Category::TierMedium | Category::TierLow
        )
    }
}

/// Request to wrap every occurrence of `span_text` with `category` markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub span_text: String,
    pub category: Category,
}

impl Annotation {
    pub fn new(span_text: impl Into<String>, category: Category) -> Self {
        Self {
            span_text: span_text.into(),
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_joins_coordinated_members() {
        let triple = RoleTriple {
            subjects: vec!["我".into()],
            predicate: "买".into(),
            objects: vec!["苹果".into(), "香蕉".into()],
        };
        assert_eq!(triple.subject(), "我");
        assert_eq!(triple.object(), "苹果、香蕉");
        assert_eq!(triple.annotations().len(), 4);
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("verb"), None);
    }

    #[test]
    fn test_tier_maps_to_keyword_category() {
        assert!(Tier::High.category().is_keyword());
        assert!(!Category::Predicate.is_keyword());
    }
}
