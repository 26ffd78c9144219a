//! Arena-backed markup tree for one text block.
//!
//! Nodes live in a `Vec` and refer to each other by index. Splitting a text
//! node never invalidates other handles: the split node keeps its id for the
//! leading text and the wrapper / trailing text get fresh ids, which the
//! caller can keep working on without rescanning the tree.

use biocn_core::Category;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html};

pub type NodeId = usize;

/// Attribute that marks a highlight wrapper and names its category.
pub const MARKER_ATTR: &str = "data-biocn";

/// Temporary attribute carrying an XML self-closed tag through the HTML parser.
const SELF_CLOSING_ATTR: &str = "data-biocn-self-closing";

static SELF_CLOSED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z][A-Za-z0-9:_.-]*)(\s[^<>]*?)?\s*/>").unwrap());

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Text(String),
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        /// Written as `<name/>` in the source.
        self_closing: bool,
    },
    /// A highlight wrapper; its text is never matched again.
    Highlight {
        category: Category,
        attrs: Vec<(String, String)>,
    },
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable markup content of one block element (e.g. a paragraph).
#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
    modified: bool,
}

impl TextBlock {
    /// Parse inner XHTML markup. Elements carrying `data-biocn` become
    /// highlights; self-closed elements such as `<a id="x"/>` stay empty.
    pub fn parse(markup: &str) -> Self {
        let fragment = Html::parse_fragment(&expand_self_closed(markup));
        let mut block = TextBlock::default();
        block.append_children(fragment.root_element(), None);
        block
    }

    /// A block holding one plain text node.
    pub fn from_text(text: &str) -> Self {
        let mut block = TextBlock::default();
        if !text.is_empty() {
            block.push(NodeKind::Text(text.to_string()), None);
        }
        block
    }

    fn append_children(&mut self, element: ElementRef<'_>, parent: Option<NodeId>) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let el = child_element.value();
                let attrs: Vec<(String, String)> = el
                    .attrs()
                    .filter(|(k, _)| *k != SELF_CLOSING_ATTR)
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                let kind = match el.attr(MARKER_ATTR).and_then(Category::from_label) {
                    Some(category) => NodeKind::Highlight { category, attrs },
                    None => NodeKind::Element {
                        name: el.name().to_string(),
                        attrs,
                        self_closing: el.attr(SELF_CLOSING_ATTR).is_some(),
                    },
                };
                let id = self.push(kind, parent);
                self.append_children(child_element, Some(id));
            } else if let Some(text) = child.value().as_text() {
                self.push(NodeKind::Text(text.to_string()), parent);
            } else if let Some(comment) = child.value().as_comment() {
                self.push(NodeKind::Comment(comment.to_string()), parent);
            }
        }
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Create a node without attaching it to any sibling list.
    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        match parent {
            Some(p) => &mut self.nodes[p].children,
            None => &mut self.roots,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id).map(|n| &n.kind)
    }

    pub fn node_text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// All literal text in document order, including highlighted text.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.collect_text(root, &mut out);
        }
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        if let NodeKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Text leaves eligible for matching: document order, outside highlights.
    pub fn text_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            match &node.kind {
                NodeKind::Text(_) => out.push(id),
                NodeKind::Element { .. } => stack.extend(node.children.iter().rev().copied()),
                NodeKind::Highlight { .. } | NodeKind::Comment(_) => {}
            }
        }
        out
    }

    /// Number of highlight wrappers reachable from the roots.
    pub fn highlight_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<NodeId> = self.roots.clone();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if matches!(node.kind, NodeKind::Highlight { .. }) {
                count += 1;
            }
            stack.extend(node.children.iter().copied());
        }
        count
    }

    /// Wrap bytes `start..end` of text node `id` in a highlight.
    ///
    /// The node keeps the leading text (or is replaced when there is none).
    /// Returns the wrapper id and the trailing text node, if any.
    pub fn wrap_range(
        &mut self,
        id: NodeId,
        start: usize,
        end: usize,
        category: Category,
        attrs: Vec<(String, String)>,
    ) -> Option<(NodeId, Option<NodeId>)> {
        let text = self.node_text(id)?.to_string();
        if start >= end || end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            return None;
        }
        let parent = self.nodes[id].parent;
        let (before, rest) = text.split_at(start);
        let (span, after) = rest.split_at(end - start);

        let wrapper = self.alloc(NodeKind::Highlight { category, attrs }, parent);
        let inner = self.alloc(NodeKind::Text(span.to_string()), Some(wrapper));
        self.nodes[wrapper].children.push(inner);

        let trailing = if after.is_empty() {
            None
        } else {
            Some(self.alloc(NodeKind::Text(after.to_string()), parent))
        };

        let mut replacement = Vec::with_capacity(3);
        if !before.is_empty() {
            self.nodes[id].kind = NodeKind::Text(before.to_string());
            replacement.push(id);
        }
        replacement.push(wrapper);
        replacement.extend(trailing);

        let siblings = self.siblings_mut(parent);
        let position = siblings.iter().position(|&s| s == id)?;
        siblings.splice(position..=position, replacement);

        self.modified = true;
        Some((wrapper, trailing))
    }

    /// Serialise back to markup. Text is escaped; void elements self-close.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.write_node(root, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element {
                name,
                attrs,
                self_closing,
            } => {
                self.write_element(name, attrs, &node.children, *self_closing, out);
            }
            NodeKind::Highlight { attrs, .. } => {
                self.write_element("span", attrs, &node.children, false, out);
            }
        }
    }

    fn write_element(
        &self,
        name: &str,
        attrs: &[(String, String)],
        children: &[NodeId],
        self_closing: bool,
        out: &mut String,
    ) {
        out.push('<');
        out.push_str(name);
        for (key, value) in attrs {
            out.push_str(&format!(" {}=\"{}\"", key, escape_attr(value)));
        }
        if children.is_empty() && (self_closing || VOID_ELEMENTS.contains(&name)) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for &child in children {
            self.write_node(child, out);
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

/// Rewrite `<name .../>` for non-void names as an explicit open/close pair,
/// tagged so serialisation can restore the self-closed form. The HTML parser
/// would otherwise treat it as an open tag that swallows its siblings.
fn expand_self_closed(markup: &str) -> String {
    SELF_CLOSED_RE
        .replace_all(markup, |caps: &Captures<'_>| {
            let name = &caps[1];
            if VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
                return caps[0].to_string();
            }
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            format!("<{}{} {}=\"\"></{}>", name, attrs, SELF_CLOSING_ATTR, name)
        })
        .into_owned()
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
