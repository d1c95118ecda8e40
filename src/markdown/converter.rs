//! Native tree to document tree conversion with location tagging
//!
//! A single pre-order walk gives every block node an id and a location in the
//! original text. Engine line numbers refer to the normalized text and are
//! translated through the [`LineMap`]. When the engine reports no usable range
//! (0/0, typically for paragraphs inside list items and for empty items) the
//! range is inferred from a running cursor:
//!
//! - empty or whitespace-only content shares the cursor's line;
//! - otherwise, if the cursor sits on the opening line of the enclosing
//!   container and that line carries a marker (`- `, `1. `, `>`, `|`), the
//!   content continues that line; if not, it starts at the next non-blank line
//!   after the cursor. The end is the start plus the content's line count.
//!
//! All mutable state lives in a [`ParseContext`] created for one parse call.

use log::debug;
use std::collections::BTreeMap;

use super::engine::{NativeKind, NativeList, NativeNode};
use super::node::{HeadingLevel, MarkdownNode, NodeId, NodeLocation, TableAlignment};
use super::preprocess::LineMap;
use super::source::{is_marker_line, SourceLines};

// ─────────────────────────────────────────────────────────────────────────────
// Parse Context
// ─────────────────────────────────────────────────────────────────────────────

/// Highest original line confirmed to belong to an already-placed node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cursor {
    line: usize,
    /// The cursor sits on the first line of a container being entered, with
    /// no content placed on that line yet.
    at_container_start: bool,
}

/// How a block participates in cursor tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockRole {
    Document,
    Container,
    Leaf,
}

/// Per-call conversion state: id counter, task counter, cursor and the
/// location table. Never shared between parse calls.
#[derive(Debug)]
pub(crate) struct ParseContext<'a> {
    source: SourceLines<'a>,
    line_map: &'a LineMap,
    next_seq: u32,
    next_task_index: usize,
    cursor: Cursor,
    locations: BTreeMap<NodeId, NodeLocation>,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(original_text: &'a str, line_map: &'a LineMap) -> Self {
        Self {
            source: SourceLines::new(original_text),
            line_map,
            next_seq: 1,
            next_task_index: 0,
            cursor: Cursor::default(),
            locations: BTreeMap::new(),
        }
    }

    /// Allocate a fresh node id.
    pub(crate) fn next_id(&mut self) -> NodeId {
        let id = NodeId::from_seq(self.next_seq);
        self.next_seq += 1;
        id
    }

    pub(crate) fn source(&self) -> &SourceLines<'a> {
        &self.source
    }

    pub(crate) fn location(&self, id: &NodeId) -> Option<NodeLocation> {
        self.locations.get(id).copied()
    }

    pub(crate) fn set_location(&mut self, id: NodeId, location: NodeLocation) {
        self.locations.insert(id, location);
    }

    pub(crate) fn remove_location(&mut self, id: &NodeId) {
        self.locations.remove(id);
    }

    pub(crate) fn into_locations(self) -> BTreeMap<NodeId, NodeLocation> {
        self.locations
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────

    /// Convert a native document tree.
    pub(crate) fn convert_document(&mut self, root: &NativeNode) -> MarkdownNode {
        match self.convert_node(root) {
            doc @ MarkdownNode::Document { .. } => doc,
            other => {
                // The engine handed back a non-document root; wrap it.
                let id = self.next_id();
                let location = NodeLocation::new(1, self.source.len());
                self.set_location(id.clone(), location);
                MarkdownNode::Document {
                    id,
                    children: vec![other],
                }
            }
        }
    }

    fn convert_children(&mut self, native: &NativeNode) -> Vec<MarkdownNode> {
        native
            .children
            .iter()
            .map(|child| self.convert_node(child))
            .collect()
    }

    fn convert_node(&mut self, native: &NativeNode) -> MarkdownNode {
        let Some(role) = block_role(native) else {
            return self.convert_inline(native);
        };

        let id = self.next_id();
        let location = self.place(native, role);
        self.set_location(id.clone(), location);

        // Task indices follow document order, so take one before the children.
        let task_index = if native.is_task_item() {
            let index = self.next_task_index;
            self.next_task_index += 1;
            Some(index)
        } else {
            None
        };

        let mut children = self.convert_children(native);

        if role == BlockRole::Container {
            let line = self.cursor.line.max(location.end);
            self.cursor = Cursor {
                line,
                at_container_start: false,
            };
        }

        match native.kind {
            NativeKind::Document => MarkdownNode::Document { id, children },
            NativeKind::Heading => MarkdownNode::Heading {
                id,
                level: HeadingLevel::from(native.heading_level),
                children,
            },
            NativeKind::Paragraph => MarkdownNode::Paragraph { id, children },
            NativeKind::BlockQuote => MarkdownNode::BlockQuote { id, children },
            NativeKind::List => {
                let meta = native.list.unwrap_or(NativeList {
                    ordered: false,
                    start: 1,
                    tight: true,
                });
                MarkdownNode::List {
                    id,
                    ordered: meta.ordered,
                    start: meta.start,
                    tight: meta.tight,
                    children,
                }
            }
            NativeKind::Item => {
                if children.is_empty() {
                    children.push(self.placeholder_paragraph(location));
                }
                match task_index {
                    Some(index) => MarkdownNode::TaskListItem {
                        id,
                        index,
                        checked: native.checked,
                        children,
                    },
                    None => MarkdownNode::ListItem { id, children },
                }
            }
            NativeKind::CodeBlock => MarkdownNode::CodeBlock {
                id,
                info: non_empty(&native.fence_info),
                literal: native.literal.clone(),
            },
            NativeKind::HtmlBlock => MarkdownNode::HtmlBlock {
                id,
                literal: native.literal.clone(),
            },
            NativeKind::ThematicBreak => MarkdownNode::ThematicBreak { id },
            NativeKind::Extension => match native.type_string.as_str() {
                "table" => MarkdownNode::Table {
                    id,
                    alignments: table_alignments(native),
                    children,
                },
                "table_row" | "table_header" => MarkdownNode::TableRow { id, children },
                "table_cell" => MarkdownNode::TableCell { id, children },
                "tasklist" => {
                    if children.is_empty() {
                        children.push(self.placeholder_paragraph(location));
                    }
                    MarkdownNode::ListItem { id, children }
                }
                _ => MarkdownNode::Paragraph { id, children },
            },
            _ => MarkdownNode::Paragraph { id, children },
        }
    }

    /// Empty paragraph standing in for an item the engine left childless.
    fn placeholder_paragraph(&mut self, location: NodeLocation) -> MarkdownNode {
        let id = self.next_id();
        self.set_location(id.clone(), location);
        MarkdownNode::Paragraph {
            id,
            children: Vec::new(),
        }
    }

    fn convert_inline(&mut self, native: &NativeNode) -> MarkdownNode {
        match native.kind {
            NativeKind::Text => MarkdownNode::Text(native.literal.clone()),
            NativeKind::SoftBreak => MarkdownNode::SoftBreak,
            NativeKind::LineBreak => MarkdownNode::LineBreak,
            NativeKind::Code => MarkdownNode::Code(native.literal.clone()),
            NativeKind::HtmlInline => MarkdownNode::HtmlInline(native.literal.clone()),
            NativeKind::Emph => MarkdownNode::Emphasis {
                children: self.convert_children(native),
            },
            NativeKind::Strong => MarkdownNode::Strong {
                children: self.convert_children(native),
            },
            NativeKind::Link => MarkdownNode::Link {
                url: native.url.clone(),
                title: non_empty(&native.title),
                children: self.convert_children(native),
            },
            NativeKind::Image => MarkdownNode::Image {
                url: native.url.clone(),
                title: non_empty(&native.title),
                alt: image_alt(native),
            },
            NativeKind::Extension if native.type_string == "strikethrough" => {
                MarkdownNode::Strikethrough {
                    children: self.convert_children(native),
                }
            }
            _ => MarkdownNode::Text(String::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Location Assignment
    // ─────────────────────────────────────────────────────────────────────────

    /// Assign a location to a block and advance the cursor.
    fn place(&mut self, native: &NativeNode, role: BlockRole) -> NodeLocation {
        let start = self.line_map.original_line(native.start_line);
        let end = self.line_map.original_line(native.end_line);

        if native.start_line > 0 && native.end_line > 0 && start > 0 && end > 0 {
            let location = self.clamp(NodeLocation::new(start, end));
            self.advance(location, role);
            return location;
        }

        if role == BlockRole::Document {
            return NodeLocation::new(1, self.source.len());
        }

        let location = self.infer(native);
        debug!(
            "Inferred lines {}-{} for {:?} node with no engine position",
            location.start, location.end, native.kind
        );
        self.advance(location, role);
        location
    }

    fn advance(&mut self, location: NodeLocation, role: BlockRole) {
        match role {
            BlockRole::Document => {}
            BlockRole::Container => {
                self.cursor = Cursor {
                    line: location.start,
                    at_container_start: true,
                };
            }
            BlockRole::Leaf => {
                self.cursor = Cursor {
                    line: location.end,
                    at_container_start: false,
                };
            }
        }
    }

    /// Infer a range for a node the engine left unlocated.
    fn infer(&self, native: &NativeNode) -> NodeLocation {
        let at_cursor = NodeLocation::single(self.source.clamp(self.cursor.line));

        let text = flattened_text(native);
        if text.trim().is_empty() {
            return at_cursor;
        }
        let line_count = text.trim_end_matches('\n').split('\n').count();

        let continues_marker_line = self.cursor.at_container_start
            && self.source.get(self.cursor.line).is_some_and(is_marker_line);

        let start = if continues_marker_line {
            self.cursor.line
        } else {
            match self.source.next_content_line_after(self.cursor.line) {
                Some(line) => line,
                None => return at_cursor,
            }
        };

        self.clamp(NodeLocation::new(start, start + line_count - 1))
    }

    /// Keep a location inside `[1, line count]`.
    fn clamp(&self, location: NodeLocation) -> NodeLocation {
        let start = self.source.clamp(location.start);
        let end = self.source.clamp(location.end).max(start);
        NodeLocation { start, end }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native Node Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Cursor role of a native node, or `None` for inline content.
fn block_role(native: &NativeNode) -> Option<BlockRole> {
    match native.kind {
        NativeKind::Document => Some(BlockRole::Document),
        NativeKind::BlockQuote | NativeKind::List | NativeKind::Item => Some(BlockRole::Container),
        NativeKind::Paragraph
        | NativeKind::Heading
        | NativeKind::CodeBlock
        | NativeKind::HtmlBlock
        | NativeKind::ThematicBreak => Some(BlockRole::Leaf),
        NativeKind::Extension => match native.type_string.as_str() {
            "table" | "table_row" | "table_header" | "tasklist" => Some(BlockRole::Container),
            "table_cell" => Some(BlockRole::Leaf),
            "strikethrough" => None,
            _ if native.children.is_empty() => None,
            _ => Some(BlockRole::Leaf),
        },
        NativeKind::Other if !native.children.is_empty() => Some(BlockRole::Leaf),
        _ => None,
    }
}

/// Text of a node with line structure kept: breaks and block boundaries
/// become newlines.
fn flattened_text(native: &NativeNode) -> String {
    let mut text = String::new();
    collect_flattened(native, &mut text);
    text
}

fn collect_flattened(native: &NativeNode, output: &mut String) {
    match native.kind {
        NativeKind::Text | NativeKind::Code | NativeKind::HtmlInline => {
            output.push_str(&native.literal)
        }
        NativeKind::SoftBreak | NativeKind::LineBreak => output.push('\n'),
        NativeKind::CodeBlock | NativeKind::HtmlBlock => {
            output.push_str(native.literal.trim_end_matches('\n'))
        }
        _ => {}
    }
    for child in &native.children {
        if block_role(child).is_some() && !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        collect_flattened(child, output);
    }
}

/// Alt text of an image: the text of its children.
fn image_alt(native: &NativeNode) -> String {
    fn collect(native: &NativeNode, output: &mut String) {
        if native.kind == NativeKind::Text {
            output.push_str(&native.literal);
        }
        for child in &native.children {
            collect(child, output);
        }
    }
    let mut alt = String::new();
    for child in &native.children {
        collect(child, &mut alt);
    }
    alt
}

/// One unspecified alignment per cell of the table's first row.
fn table_alignments(native: &NativeNode) -> Vec<TableAlignment> {
    native
        .children
        .first()
        .map(|row| {
            row.children
                .iter()
                .filter(|cell| cell.type_string == "table_cell")
                .map(|_| TableAlignment::None)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
