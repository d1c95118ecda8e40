//! Document tree types produced by the parse pipeline
//!
//! Every block-level variant carries its own [`NodeId`]. The id is the join key
//! into [`ParseResult::locations`]; it comes from traversal order only, so two
//! structurally identical blocks never share one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Identity and Location
// ─────────────────────────────────────────────────────────────────────────────

/// Stable identifier of a block node within one parse result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Build the identifier for the `seq`-th node allocated in a parse.
    pub(crate) fn from_seq(seq: u32) -> Self {
        NodeId(format!("node-{}", seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

/// Inclusive, 1-based line range in the original (pre-preprocessing) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub start: usize,
    pub end: usize,
}

impl NodeLocation {
    /// Create a location, swapping the bounds if they arrive reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// A location covering a single line.
    pub fn single(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Node Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Heading level (H1-H6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

impl From<u8> for HeadingLevel {
    fn from(level: u8) -> Self {
        match level {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            3 => HeadingLevel::H3,
            4 => HeadingLevel::H4,
            5 => HeadingLevel::H5,
            _ => HeadingLevel::H6,
        }
    }
}

/// Table column alignment.
///
/// The converter records `None` for every column: the engine's alignment
/// metadata is not carried through this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

// ─────────────────────────────────────────────────────────────────────────────
// Markdown Node
// ─────────────────────────────────────────────────────────────────────────────

/// A node of the converted document tree.
///
/// Children are owned by their parent; the tree has no back-edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownNode {
    /// Root document node
    Document {
        id: NodeId,
        children: Vec<MarkdownNode>,
    },
    Heading {
        id: NodeId,
        level: HeadingLevel,
        children: Vec<MarkdownNode>,
    },
    Paragraph {
        id: NodeId,
        children: Vec<MarkdownNode>,
    },
    BlockQuote {
        id: NodeId,
        children: Vec<MarkdownNode>,
    },
    List {
        id: NodeId,
        ordered: bool,
        start: u32,
        tight: bool,
        children: Vec<MarkdownNode>,
    },
    ListItem {
        id: NodeId,
        children: Vec<MarkdownNode>,
    },
    /// List item with a checkbox; `index` counts task items in document order
    TaskListItem {
        id: NodeId,
        index: usize,
        checked: bool,
        children: Vec<MarkdownNode>,
    },
    CodeBlock {
        id: NodeId,
        info: Option<String>,
        literal: String,
    },
    HtmlBlock {
        id: NodeId,
        literal: String,
    },
    ThematicBreak {
        id: NodeId,
    },
    Table {
        id: NodeId,
        alignments: Vec<TableAlignment>,
        children: Vec<MarkdownNode>,
    },
    TableRow {
        id: NodeId,
        children: Vec<MarkdownNode>,
    },
    TableCell {
        id: NodeId,
        children: Vec<MarkdownNode>,
    },

    // Inline content
    Text(String),
    SoftBreak,
    LineBreak,
    Code(String),
    HtmlInline(String),
    Emphasis {
        children: Vec<MarkdownNode>,
    },
    Strong {
        children: Vec<MarkdownNode>,
    },
    Strikethrough {
        children: Vec<MarkdownNode>,
    },
    Link {
        url: String,
        title: Option<String>,
        children: Vec<MarkdownNode>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
}

impl MarkdownNode {
    /// The identifier of a block node; `None` for inline content.
    pub fn id(&self) -> Option<&NodeId> {
        match self {
            MarkdownNode::Document { id, .. }
            | MarkdownNode::Heading { id, .. }
            | MarkdownNode::Paragraph { id, .. }
            | MarkdownNode::BlockQuote { id, .. }
            | MarkdownNode::List { id, .. }
            | MarkdownNode::ListItem { id, .. }
            | MarkdownNode::TaskListItem { id, .. }
            | MarkdownNode::CodeBlock { id, .. }
            | MarkdownNode::HtmlBlock { id, .. }
            | MarkdownNode::ThematicBreak { id }
            | MarkdownNode::Table { id, .. }
            | MarkdownNode::TableRow { id, .. }
            | MarkdownNode::TableCell { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Child nodes (empty for leaves).
    pub fn children(&self) -> &[MarkdownNode] {
        match self {
            MarkdownNode::Document { children, .. }
            | MarkdownNode::Heading { children, .. }
            | MarkdownNode::Paragraph { children, .. }
            | MarkdownNode::BlockQuote { children, .. }
            | MarkdownNode::List { children, .. }
            | MarkdownNode::ListItem { children, .. }
            | MarkdownNode::TaskListItem { children, .. }
            | MarkdownNode::Table { children, .. }
            | MarkdownNode::TableRow { children, .. }
            | MarkdownNode::TableCell { children, .. }
            | MarkdownNode::Emphasis { children }
            | MarkdownNode::Strong { children }
            | MarkdownNode::Strikethrough { children }
            | MarkdownNode::Link { children, .. } => children,
            _ => &[],
        }
    }

    /// Pure containers: the lookup descends through these instead of returning them.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            MarkdownNode::Document { .. }
                | MarkdownNode::List { .. }
                | MarkdownNode::ListItem { .. }
                | MarkdownNode::TaskListItem { .. }
        )
    }

    /// Blocks a tap can open for editing.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            MarkdownNode::Paragraph { .. }
                | MarkdownNode::Heading { .. }
                | MarkdownNode::Table { .. }
                | MarkdownNode::CodeBlock { .. }
                | MarkdownNode::BlockQuote { .. }
        )
    }

    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match self {
            MarkdownNode::Text(t) | MarkdownNode::Code(t) => output.push_str(t),
            MarkdownNode::SoftBreak => output.push(' '),
            MarkdownNode::LineBreak => output.push('\n'),
            MarkdownNode::Image { alt, .. } => output.push_str(alt),
            MarkdownNode::CodeBlock { literal, .. } => output.push_str(literal),
            _ => {}
        }
        for child in self.children() {
            child.collect_text(output);
        }
    }

    /// Id of the first paragraph directly under a list item.
    ///
    /// Tapping a bullet edits the item's paragraph rather than the item.
    pub fn first_paragraph_id(&self) -> Option<&NodeId> {
        match self {
            MarkdownNode::ListItem { children, .. }
            | MarkdownNode::TaskListItem { children, .. } => {
                children.iter().find_map(|child| match child {
                    MarkdownNode::Paragraph { id, .. } => Some(id),
                    _ => None,
                })
            }
            _ => None,
        }
    }

    /// Depth-first search for the node with the given id.
    pub fn find(&self, target: &NodeId) -> Option<&MarkdownNode> {
        if self.id() == Some(target) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(target))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parse Result
// ─────────────────────────────────────────────────────────────────────────────

/// The outcome of one parse call. Never mutated; edits trigger a fresh parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Document root
    pub ast: MarkdownNode,
    /// Location of every block node, keyed by id
    pub locations: BTreeMap<NodeId, NodeLocation>,
    /// The raw input, before preprocessing
    pub original_text: String,
}

impl ParseResult {
    /// Location of a node, if it has one.
    pub fn location(&self, id: &NodeId) -> Option<NodeLocation> {
        self.locations.get(id).copied()
    }

    /// Find a node anywhere in the tree.
    pub fn find_node(&self, id: &NodeId) -> Option<&MarkdownNode> {
        self.ast.find(id)
    }

    /// Top-level blocks of the document.
    pub fn blocks(&self) -> &[MarkdownNode] {
        self.ast.children()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn para(seq: u32, text: &str) -> MarkdownNode {
        MarkdownNode::Paragraph {
            id: NodeId::from_seq(seq),
            children: vec![MarkdownNode::Text(text.to_string())],
        }
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::from_seq(7).to_string(), "node-7");
        assert_eq!(NodeId::from("node-7"), NodeId::from_seq(7));
    }

    #[test]
    fn test_location_new_orders_bounds() {
        let loc = NodeLocation::new(5, 2);
        assert_eq!(loc, NodeLocation { start: 2, end: 5 });
        assert!(loc.contains(2));
        assert!(loc.contains(5));
        assert!(!loc.contains(6));
    }

    #[test]
    fn test_heading_level_from_u8() {
        assert_eq!(HeadingLevel::from(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from(4), HeadingLevel::H4);
        assert_eq!(HeadingLevel::from(9), HeadingLevel::H6);
    }

    #[test]
    fn test_inline_nodes_have_no_id() {
        assert!(MarkdownNode::Text("x".to_string()).id().is_none());
        assert!(MarkdownNode::Strong { children: vec![] }.id().is_none());
        assert!(para(1, "x").id().is_some());
    }

    #[test]
    fn test_container_and_editable_classification() {
        let item = MarkdownNode::ListItem {
            id: NodeId::from_seq(2),
            children: vec![para(3, "a")],
        };
        assert!(item.is_container());
        assert!(!item.is_editable());
        assert!(para(1, "a").is_editable());
        let hr = MarkdownNode::ThematicBreak {
            id: NodeId::from_seq(4),
        };
        assert!(!hr.is_container());
        assert!(!hr.is_editable());
    }

    #[test]
    fn test_text_content_and_find() {
        let doc = MarkdownNode::Document {
            id: NodeId::from_seq(1),
            children: vec![
                para(2, "Hello"),
                MarkdownNode::ListItem {
                    id: NodeId::from_seq(3),
                    children: vec![para(4, "world")],
                },
            ],
        };
        assert_eq!(doc.text_content(), "Helloworld");
        let found = doc.find(&NodeId::from_seq(4)).unwrap();
        assert_eq!(found.text_content(), "world");
        assert!(doc.find(&NodeId::from_seq(99)).is_none());
    }

    #[test]
    fn test_first_paragraph_id() {
        let item = MarkdownNode::TaskListItem {
            id: NodeId::from_seq(1),
            index: 0,
            checked: false,
            children: vec![para(2, "task")],
        };
        assert_eq!(item.first_paragraph_id(), Some(&NodeId::from_seq(2)));
        assert!(para(3, "x").first_paragraph_id().is_none());
    }

    #[test]
    fn test_parse_result_serializes_ids_as_strings() {
        let mut locations = BTreeMap::new();
        locations.insert(NodeId::from_seq(2), NodeLocation::single(1));
        let result = ParseResult {
            ast: MarkdownNode::Document {
                id: NodeId::from_seq(1),
                children: vec![para(2, "x")],
            },
            locations,
            original_text: "x".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["locations"]["node-2"]["start"], 1);
        let back: ParseResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
