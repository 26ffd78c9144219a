//! bioCN markup: span annotation over XHTML paragraph blocks.

pub mod annotate;
pub mod document;
pub mod tree;

pub use annotate::{annotate, Presentation};
pub use document::{BlockId, XhtmlDocument, STYLE_ELEMENT_ID};
pub use tree::{NodeId, NodeKind, TextBlock, MARKER_ATTR};
