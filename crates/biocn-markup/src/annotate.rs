//! Span annotation over a `TextBlock`.
//!
//! Each annotation is matched against the block's text leaves and every hit
//! is split out into a highlight wrapper. Text inside a wrapper is no longer
//! a leaf, so later annotations (and later passes) never wrap it twice.

use std::collections::VecDeque;

use biocn_core::{Annotation, Category, StyleTable};
use tracing::trace;

use crate::tree::{TextBlock, MARKER_ATTR};

/// How wrappers present their category.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    /// `style="…"` on every wrapper instead of a class reference.
    pub inline: bool,
    pub styles: StyleTable,
}

impl Presentation {
    pub fn new(inline: bool, styles: StyleTable) -> Self {
        Self { inline, styles }
    }

    /// Wrapper attributes for a category, sorted by name so a reparsed
    /// wrapper serialises identically.
    pub fn attributes(&self, category: Category) -> Vec<(String, String)> {
        let presentation = if self.inline {
            ("style".to_string(), self.styles.style_for(category).trim().to_string())
        } else {
            ("class".to_string(), category.css_class().to_string())
        };
        let mut attrs = vec![
            presentation,
            (MARKER_ATTR.to_string(), category.label().to_string()),
        ];
        attrs.sort();
        attrs
    }
}

/// Wrap every occurrence of each annotation's span in `block`.
///
/// Role annotations are applied in the given order. Keyword annotations
/// follow, longest phrase first, so a short phrase cannot fragment a longer
/// one that contains it. Spans that no longer occur are silently skipped.
pub fn annotate(block: &mut TextBlock, annotations: &[Annotation], presentation: &Presentation) {
    for annotation in ordered(annotations) {
        if annotation.span_text.is_empty() {
            continue;
        }
        let wrapped = annotate_one(block, annotation, presentation);
        trace!(
            "Wrapped {} occurrence(s) of {:?} as {}",
            wrapped,
            annotation.span_text,
            annotation.category.label()
        );
    }
}

fn ordered(annotations: &[Annotation]) -> Vec<&Annotation> {
    let (mut keywords, roles): (Vec<&Annotation>, Vec<&Annotation>) =
        annotations.iter().partition(|a| a.category.is_keyword());
    keywords.sort_by(|a, b| b.span_text.chars().count().cmp(&a.span_text.chars().count()));
    roles.into_iter().chain(keywords).collect()
}

fn annotate_one(block: &mut TextBlock, annotation: &Annotation, presentation: &Presentation) -> usize {
    let bounded = annotation.category.is_keyword();
    let mut worklist: VecDeque<_> = block.text_nodes().into();
    let mut wrapped = 0;

    while let Some(id) = worklist.pop_front() {
        let Some(text) = block.node_text(id) else {
            continue;
        };
        let Some(start) = find_span(text, &annotation.span_text, bounded) else {
            continue;
        };
        let end = start + annotation.span_text.len();
        let attrs = presentation.attributes(annotation.category);
        if let Some((_, trailing)) = block.wrap_range(id, start, end, annotation.category, attrs) {
            wrapped += 1;
            if let Some(trailing) = trailing {
                worklist.push_front(trailing);
            }
        }
    }
    wrapped
}

/// Byte offset of the leftmost acceptable occurrence of `span` in `text`.
fn find_span(text: &str, span: &str, bounded: bool) -> Option<usize> {
    text.match_indices(span)
        .map(|(start, _)| start)
        .find(|&start| !bounded || on_word_boundary(text, start, start + span.len()))
}

/// Latin and digit edges must not touch another word character. CJK text
/// has no word delimiters, so CJK edges always pass.
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let span = &text[start..end];
    let left_ok = match (span.chars().next(), text[..start].chars().next_back()) {
        (Some(first), Some(prev)) if is_delimited(first) => !is_delimited(prev),
        _ => true,
    };
    let right_ok = match (span.chars().next_back(), text[end..].chars().next()) {
        (Some(last), Some(next)) if is_delimited(last) => !is_delimited(next),
        _ => true,
    };
    left_ok && right_ok
}

fn is_delimited(c: char) -> bool {
    (c.is_alphanumeric() || c == '_') && !is_cjk(c)
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2FA1F}')
}
