//! XHTML chapter documents.
//!
//! Only paragraph content is parsed into a tree; everything else in the
//! source is carried through untouched, and paragraphs nobody modified are
//! emitted exactly as they were read.

use std::ops::Range;

use biocn_core::{Error, Result, StyleTable};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::tree::TextBlock;

/// `id` of the injected stylesheet element.
pub const STYLE_ELEMENT_ID: &str = "biocn-styles";

/// Opening `<p>` tags only; a self-closed `<p/>` is an empty paragraph, not a block.
static PARAGRAPH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(<p(?:\s*|\s[^>]*[^/>])>)(.*?)</p\s*>").unwrap()
});
static HEAD_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

pub type BlockId = usize;

#[derive(Debug)]
struct BlockSlot {
    /// Byte range of the whole `<p>…</p>` element in the source.
    outer: Range<usize>,
    open_tag: String,
    block: TextBlock,
    replaced: bool,
}

/// One parsed XHTML document.
#[derive(Debug)]
pub struct XhtmlDocument {
    source: String,
    slots: Vec<BlockSlot>,
    stylesheet: Option<(usize, String)>,
}

impl XhtmlDocument {
    pub fn parse(source: &str) -> Self {
        let slots: Vec<BlockSlot> = PARAGRAPH_RE
            .captures_iter(source)
            .filter_map(|caps| {
                let outer = caps.get(0)?;
                Some(BlockSlot {
                    outer: outer.range(),
                    open_tag: caps.get(1)?.as_str().to_string(),
                    block: TextBlock::parse(caps.get(2)?.as_str()),
                    replaced: false,
                })
            })
            .collect();
        debug!("Parsed document with {} paragraph blocks", slots.len());

        Self {
            source: source.to_string(),
            slots,
            stylesheet: None,
        }
    }

    pub fn enumerate_text_blocks(&self) -> Vec<BlockId> {
        (0..self.slots.len()).collect()
    }

    pub fn get_text(&self, id: BlockId) -> Option<String> {
        self.slots.get(id).map(|slot| slot.block.text())
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut TextBlock> {
        self.slots.get_mut(id).map(|slot| &mut slot.block)
    }

    /// Replace a block's inner markup.
    pub fn set_content(&mut self, id: BlockId, markup: &str) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| Error::Document(format!("no text block {}", id)))?;
        slot.block = TextBlock::parse(markup);
        slot.replaced = true;
        Ok(())
    }

    pub fn has_stylesheet(&self) -> bool {
        self.stylesheet.is_some() || self.source.contains(&format!("id=\"{}\"", STYLE_ELEMENT_ID))
    }

    /// Add the category stylesheet before `</head>`, or at the very start when
    /// the document has no head. Returns `false` if one is already present.
    pub fn inject_stylesheet(&mut self, styles: &StyleTable) -> bool {
        if self.has_stylesheet() {
            return false;
        }
        let position = HEAD_CLOSE_RE
            .find(&self.source)
            .map(|m| m.start())
            .unwrap_or(0);
        let element = format!(
            "<style type=\"text/css\" id=\"{}\">\n{}</style>\n",
            STYLE_ELEMENT_ID,
            styles.to_css()
        );
        self.stylesheet = Some((position, element));
        true
    }

    pub fn is_modified(&self) -> bool {
        self.stylesheet.is_some() || self.slots.iter().any(|s| s.replaced || s.block.is_modified())
    }

    /// Serialise the document with every edit applied.
    pub fn render(&self) -> String {
        let mut edits: Vec<(Range<usize>, String)> = self
            .slots
            .iter()
            .filter(|slot| slot.replaced || slot.block.is_modified())
            .map(|slot| {
                let markup = format!("{}{}</p>", slot.open_tag, slot.block.to_markup());
                (slot.outer.clone(), markup)
            })
            .collect();
        if let Some((position, element)) = &self.stylesheet {
            edits.push((*position..*position, element.clone()));
        }
        edits.sort_by_key(|(range, _)| (range.start, range.end));

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for (range, replacement) in edits {
            out.push_str(&self.source[cursor..range.start]);
            out.push_str(&replacement);
            cursor = range.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{annotate, Presentation};
    use biocn_core::{Annotation, Category};

    const CHAPTER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
<head><title>第一章</title></head>\n\
<body>\n\
<h1>第一章</h1>\n\
<p class=\"body\">我爱Python。</p>\n\
<p>  </p>\n\
<P>苹果被我吃了。</P>\n\
</body>\n\
</html>\n";

    #[test]
    fn test_enumerate_blocks() {
        let doc = XhtmlDocument::parse(CHAPTER);
        assert_eq!(doc.enumerate_text_blocks(), vec![0, 1, 2]);
        assert_eq!(doc.get_text(0).as_deref(), Some("我爱Python。"));
        assert_eq!(doc.get_text(1).as_deref(), Some("  "));
        assert_eq!(doc.get_text(2).as_deref(), Some("苹果被我吃了。"));
        assert!(doc.get_text(3).is_none());
    }

    #[test]
    fn test_untouched_document_renders_verbatim() {
        let doc = XhtmlDocument::parse(CHAPTER);
        assert!(!doc.is_modified());
        assert_eq!(doc.render(), CHAPTER);
    }

    #[test]
    fn test_annotated_block_is_spliced_back() {
        let mut doc = XhtmlDocument::parse(CHAPTER);
        let block = doc.block_mut(0).unwrap();
        annotate(
            block,
            &[Annotation::new("爱", Category::Predicate)],
            &Presentation::default(),
        );
        let rendered = doc.render();
        assert!(rendered.contains(
            r#"<p class="body">我<span class="svo-predicate" data-biocn="predicate">爱</span>Python。</p>"#
        ));
        assert!(rendered.contains("<P>苹果被我吃了。</P>"));
        assert!(rendered.starts_with("<?xml"));
    }

    #[test]
    fn test_self_closed_paragraph_is_not_a_block() {
        let source = "<body><p class=\"sep\"/>\n<p />\n<p >我爱Python。</p></body>";
        let mut doc = XhtmlDocument::parse(source);
        assert_eq!(doc.enumerate_text_blocks(), vec![0]);
        assert_eq!(doc.get_text(0).as_deref(), Some("我爱Python。"));

        annotate(
            doc.block_mut(0).unwrap(),
            &[Annotation::new("爱", Category::Predicate)],
            &Presentation::default(),
        );
        let rendered = doc.render();
        assert_eq!(rendered.matches("</p>").count(), 1);
        assert!(rendered.starts_with("<body><p class=\"sep\"/>\n<p />\n<p >我<span"));
        assert!(rendered.ends_with("Python。</p></body>"));
    }

    #[test]
    fn test_self_closed_element_inside_annotated_paragraph() {
        let source = r#"<p>前文<span epub:type="pagebreak" id="p5" title="5"/>我爱Python。</p>"#;
        let mut doc = XhtmlDocument::parse(source);
        annotate(
            doc.block_mut(0).unwrap(),
            &[Annotation::new("爱", Category::Predicate)],
            &Presentation::default(),
        );
        assert_eq!(
            doc.render(),
            concat!(
                r#"<p>前文<span epub:type="pagebreak" id="p5" title="5"/>我"#,
                r#"<span class="svo-predicate" data-biocn="predicate">爱</span>Python。</p>"#,
            )
        );
    }

    #[test]
    fn test_set_content() {
        let mut doc = XhtmlDocument::parse(CHAPTER);
        doc.set_content(1, "<b>新</b>").unwrap();
        assert!(doc.render().contains("<p><b>新</b></p>"));
        assert!(matches!(doc.set_content(9, "x"), Err(Error::Document(_))));
    }

    #[test]
    fn test_stylesheet_injected_once() {
        let mut doc = XhtmlDocument::parse(CHAPTER);
        assert!(doc.inject_stylesheet(&StyleTable::default()));
        assert!(!doc.inject_stylesheet(&StyleTable::default()));

        let rendered = doc.render();
        assert_eq!(rendered.matches(STYLE_ELEMENT_ID).count(), 1);
        let style_at = rendered.find("<style").unwrap();
        assert!(style_at < rendered.find("</head>").unwrap());
        assert!(rendered.contains(".svo-subject { color: #D95F02; font-weight: bold; }"));

        let mut again = XhtmlDocument::parse(&rendered);
        assert!(!again.inject_stylesheet(&StyleTable::default()));
    }

    #[test]
    fn test_headless_fragment_gets_leading_stylesheet() {
        let mut doc = XhtmlDocument::parse("<p>我</p>");
        assert!(doc.inject_stylesheet(&StyleTable::default()));
        assert!(doc.render().starts_with("<style"));
        assert!(doc.render().ends_with("<p>我</p>"));
    }
}
