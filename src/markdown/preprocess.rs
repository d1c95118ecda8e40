//! Indentation normalization for nested lists
//!
//! The engine only recognizes a deeper list level reliably when the nested
//! item is indented to its parent's content column and preceded by a
//! paragraph break. This pass rewrites leading whitespace accordingly and
//! records, for every emitted line, the original line it came from.
//!
//! Indentation is measured in units of 3 columns: spaces are accumulated and
//! rounded (`(spaces + 1) / 3`), and each tab closes the pending spaces and
//! adds one more level.

use log::trace;

use super::source::{is_list_item_line, ordered_marker_width};

// ─────────────────────────────────────────────────────────────────────────────
// Line Map
// ─────────────────────────────────────────────────────────────────────────────

/// Total map from processed line number to original line number (1-indexed).
///
/// Not injective: a synthetic line maps to the original line that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineMap {
    entries: Vec<usize>,
}

impl LineMap {
    /// The map for text that was not rewritten.
    pub fn identity(line_count: usize) -> Self {
        Self {
            entries: (1..=line_count).collect(),
        }
    }

    fn push(&mut self, original_line: usize) {
        self.entries.push(original_line);
    }

    /// Original line for a processed line.
    ///
    /// `0` (the engine's "unknown") stays `0`; lines past the end map to the
    /// last known original line.
    pub fn original_line(&self, processed_line: usize) -> usize {
        if processed_line == 0 {
            return 0;
        }
        self.entries
            .get(processed_line - 1)
            .or_else(|| self.entries.last())
            .copied()
            .unwrap_or(0)
    }

    /// Number of processed lines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preprocessing
// ─────────────────────────────────────────────────────────────────────────────

/// Normalized text plus its line map.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub text: String,
    pub line_map: LineMap,
}

/// Indent level of a line, in units of 3 columns.
pub fn indent_level(line: &str) -> usize {
    let mut level = 0;
    let mut spaces = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                level += (spaces + 1) / 3 + 1;
                spaces = 0;
            }
            ' ' => spaces += 1,
            _ => break,
        }
    }
    level + (spaces + 1) / 3
}

/// Width of a list marker including its trailing space (`- ` or `12. `).
fn marker_width(trimmed: &str) -> usize {
    ordered_marker_width(trimmed).unwrap_or(2)
}

/// A list item that later lines may nest under.
#[derive(Debug, Clone, Copy)]
struct OpenItem {
    level: usize,
    content_column: usize,
}

/// Target indentation for a line at `level`: `2 * level` spaces, but never
/// less than the content column of the enclosing item.
fn target_indent(level: usize, enclosing: Option<&OpenItem>) -> usize {
    let indent = 2 * level;
    enclosing.map_or(indent, |item| indent.max(item.content_column))
}

/// Normalize nested-list indentation.
///
/// - A list item deeper than the previous list item gets a synthetic blank
///   line in front of it.
/// - Non-blank lines are indented to `2 * level` spaces, raised to the
///   content column of the enclosing item so that content under wide
///   markers (`10. `) stays inside its item.
/// - Only list items close open items; other lines may be lazy
///   continuations and leave them open.
/// - Blank lines pass through and reset the previous-item tracker.
pub fn preprocess(markdown: &str) -> Preprocessed {
    let mut output: Vec<String> = Vec::new();
    let mut line_map = LineMap::default();
    let mut prev_item_level: Option<usize> = None;
    let mut open_items: Vec<OpenItem> = Vec::new();

    for (index, line) in markdown.split('\n').enumerate() {
        let original_line = index + 1;
        let level = indent_level(line);
        let trimmed = line.trim_matches(|c| c == ' ' || c == '\t');

        if trimmed.is_empty() {
            prev_item_level = None;
            output.push(line.to_string());
            line_map.push(original_line);
            continue;
        }

        if is_list_item_line(trimmed) {
            open_items.retain(|item| item.level < level);
            if prev_item_level.is_some_and(|prev| level > prev) {
                trace!(
                    "Inserting paragraph break before nested item at line {}",
                    original_line
                );
                output.push(String::new());
                line_map.push(original_line);
            }
            prev_item_level = Some(level);

            let indent = target_indent(level, open_items.last());
            open_items.push(OpenItem {
                level,
                content_column: indent + marker_width(trimmed),
            });
            output.push(format!("{}{}", " ".repeat(indent), trimmed));
        } else {
            let enclosing = open_items.iter().rev().find(|item| item.level < level);
            let indent = target_indent(level, enclosing);
            output.push(format!("{}{}", " ".repeat(indent), trimmed));
        }
        line_map.push(original_line);
    }

    Preprocessed {
        text: output.join("\n"),
        line_map,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_level_spaces() {
        assert_eq!(indent_level("item"), 0);
        assert_eq!(indent_level(" item"), 0);
        assert_eq!(indent_level("  item"), 1);
        assert_eq!(indent_level("    item"), 1);
        assert_eq!(indent_level("     item"), 2);
    }

    #[test]
    fn test_indent_level_tabs() {
        assert_eq!(indent_level("\titem"), 1);
        assert_eq!(indent_level("\t\titem"), 2);
        // Two pending spaces round up to a level before the tab adds its own.
        assert_eq!(indent_level("  \titem"), 2);
        assert_eq!(indent_level("\t  item"), 2);
    }

    #[test]
    fn test_flat_text_is_unchanged() {
        let input = "# Title\n\nBody text.";
        let out = preprocess(input);
        assert_eq!(out.text, input);
        assert_eq!(out.line_map, LineMap::identity(3));
    }

    #[test]
    fn test_nested_item_gets_synthetic_blank_line() {
        let out = preprocess("- a\n  - b\n- c");
        assert_eq!(out.text, "- a\n\n  - b\n- c");
        assert_eq!(out.line_map.len(), 4);
        assert_eq!(out.line_map.original_line(1), 1);
        assert_eq!(out.line_map.original_line(2), 2);
        assert_eq!(out.line_map.original_line(3), 2);
        assert_eq!(out.line_map.original_line(4), 3);
    }

    #[test]
    fn test_tab_indented_nesting() {
        let out = preprocess("- a\n\t- b\n\t\t- c");
        assert_eq!(out.text, "- a\n\n  - b\n\n    - c");
        assert_eq!(out.line_map.original_line(5), 3);
    }

    #[test]
    fn test_nested_under_ordered_item_uses_content_column() {
        let out = preprocess("1. a\n   - b");
        assert_eq!(out.text, "1. a\n\n   - b");
    }

    #[test]
    fn test_blank_line_resets_previous_level() {
        let out = preprocess("- a\n\n  - b");
        assert_eq!(out.text, "- a\n\n  - b");
        assert_eq!(out.line_map, LineMap::identity(3));
    }

    #[test]
    fn test_continuation_line_reindented() {
        let out = preprocess("- a\n     continued");
        assert_eq!(out.text, "- a\n    continued");
    }

    #[test]
    fn test_lazy_continuation_keeps_item_open() {
        // "after" continues item "a" lazily, so "b" still nests under it.
        let out = preprocess("- a\nafter\n  - b");
        assert_eq!(out.text, "- a\nafter\n\n  - b");
        assert_eq!(out.line_map.original_line(3), 3);
        assert_eq!(out.line_map.original_line(4), 3);
    }

    #[test]
    fn test_indented_code_inside_item_keeps_depth() {
        let out = preprocess("- a\n\n        code");
        assert_eq!(out.text, "- a\n\n      code");
    }

    #[test]
    fn test_deep_paragraph_line_uses_level() {
        let out = preprocess("text\n      deep para");
        assert_eq!(out.text, "text\n    deep para");
    }

    #[test]
    fn test_second_paragraph_in_ordered_item() {
        let out = preprocess("1. a\n\n   more\n\n10. b\n\n    tail");
        assert_eq!(out.text, "1. a\n\n   more\n\n10. b\n\n    tail");
    }

    #[test]
    fn test_top_level_paragraph_after_blank_line() {
        let out = preprocess("- a\n\nafter");
        assert_eq!(out.text, "- a\n\nafter");
    }

    #[test]
    fn test_line_map_edges() {
        let map = LineMap::identity(3);
        assert_eq!(map.original_line(0), 0);
        assert_eq!(map.original_line(3), 3);
        assert_eq!(map.original_line(10), 3);
        assert_eq!(LineMap::default().original_line(1), 0);
    }
}
