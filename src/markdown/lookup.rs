//! Read-time queries over a parse result
//!
//! These resolve taps and edits to line ranges. They are total: an unknown id
//! or an out-of-range line yields `None` or an empty result, never an error.

use std::collections::BTreeSet;

use super::node::{MarkdownNode, NodeId, ParseResult};
use super::source::SourceLines;

impl ParseResult {
    fn source_lines(&self) -> SourceLines<'_> {
        SourceLines::new(&self.original_text)
    }

    /// Original lines `[start, end]` joined with newlines.
    ///
    /// Empty when `start < 1`, `end < start` or `start` is past the last
    /// line. `end` is clamped to the document.
    pub fn extract_lines(&self, start: usize, end: usize) -> String {
        self.source_lines().extract(start, end)
    }

    /// The innermost editable block covering `line`.
    ///
    /// Descends through documents, lists and list items and returns the first
    /// paragraph, heading, table, code block or block quote whose location
    /// contains the line. Other blocks are neither returned nor entered.
    pub fn find_editable_node_at(&self, line: usize) -> Option<NodeId> {
        self.find_editable_in(&self.ast, line)
    }

    fn find_editable_in(&self, node: &MarkdownNode, line: usize) -> Option<NodeId> {
        if node.is_container() {
            return node
                .children()
                .iter()
                .find_map(|child| self.find_editable_in(child, line));
        }
        if !node.is_editable() {
            return None;
        }
        let id = node.id()?;
        self.location(id)
            .filter(|location| location.contains(line))
            .map(|_| id.clone())
    }

    /// First line of a node's range holding content.
    ///
    /// Falls back to the range end when every line is blank.
    pub fn actual_content_start(&self, id: &NodeId) -> Option<usize> {
        let location = self.location(id)?;
        let lines = self.source_lines();
        let line = (location.start..=location.end)
            .find(|&line| !lines.is_blank(line))
            .unwrap_or(location.end);
        Some(line)
    }

    /// Last line of a node's range holding content.
    ///
    /// Falls back to the range start when every line is blank.
    pub fn actual_content_end(&self, id: &NodeId) -> Option<usize> {
        let location = self.location(id)?;
        let lines = self.source_lines();
        let line = (location.start..=location.end)
            .rev()
            .find(|&line| !lines.is_blank(line))
            .unwrap_or(location.start);
        Some(line)
    }

    /// Every original line whose trimmed content is empty.
    pub fn empty_line_numbers(&self) -> BTreeSet<usize> {
        self.source_lines().blank_lines().collect()
    }

    /// The source lines a node occupies, which is what an editor opens with.
    pub fn editable_text(&self, id: &NodeId) -> Option<String> {
        let location = self.location(id)?;
        Some(self.extract_lines(location.start, location.end))
    }

    /// Empty lines shown in front of top-level block `index`.
    ///
    /// For the first block: every empty line before its content. For later
    /// blocks: the empty lines strictly between the previous block's content
    /// end and this block's content start. Empty when either bound is unknown.
    pub fn blank_lines_before_block(&self, index: usize) -> Vec<usize> {
        let blocks = self.blocks();
        let Some(current_start) = blocks
            .get(index)
            .and_then(|block| block.id())
            .and_then(|id| self.actual_content_start(id))
        else {
            return Vec::new();
        };

        let empty = self.empty_line_numbers();
        if index == 0 {
            return empty.range(..current_start).copied().collect();
        }

        let previous_end = blocks[index - 1]
            .id()
            .and_then(|id| self.actual_content_end(id));
        match previous_end {
            Some(previous_end) if previous_end < current_start => empty
                .range((previous_end + 1)..current_start)
                .copied()
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
