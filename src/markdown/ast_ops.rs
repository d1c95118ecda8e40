//! Line-range edit operations
//!
//! The editing layer resolves a tap to a node, the node to a line range via
//! [`ParseResult`], and then calls one of these transforms with the text the
//! user typed. Each returns the complete new source plus the line that should
//! receive focus; the caller re-parses from scratch.
//!
//! # Operations
//! - **Edit complete**: replace a node's lines with new text
//! - **Return key**: split a node into its text before and after the cursor
//! - **Backspace at start**: merge a node into the block above
//! - **Empty lines**: insert, delete, split or merge a blank line
//! - **Checkboxes**: toggle a task list item by its task index
//!
//! All operations return `None` when the target range does not exist.

use regex::Regex;
use std::sync::OnceLock;

use super::node::{MarkdownNode, ParseResult};

// ─────────────────────────────────────────────────────────────────────────────
// Edit Result
// ─────────────────────────────────────────────────────────────────────────────

/// The outcome of an edit: new document text and the line to focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    /// The new markdown source after the edit
    pub new_source: String,
    /// 1-indexed line the editor should focus after re-parsing
    pub focus_line: usize,
}

impl LineEdit {
    fn new(lines: Vec<String>, focus_line: usize) -> Self {
        Self {
            new_source: lines.join("\n"),
            focus_line,
        }
    }
}

/// Validate `[start, end]` against the document, clamping `end`.
fn line_range(lines: &[&str], start: usize, end: usize) -> Option<(usize, usize)> {
    if start < 1 || end < start || start > lines.len() {
        return None;
    }
    Some((start, end.min(lines.len())))
}

/// Validate that `line` exists and is blank.
fn blank_line(lines: &[&str], line: usize) -> Option<usize> {
    let text = lines.get(line.checked_sub(1)?)?;
    text.trim().is_empty().then_some(line)
}

/// Replace lines `[start, end]` with `replacement`.
fn splice(lines: &[&str], start: usize, end: usize, replacement: Vec<String>) -> Vec<String> {
    let mut new_lines: Vec<String> = Vec::with_capacity(lines.len() + replacement.len());
    new_lines.extend(lines[..start - 1].iter().map(|l| l.to_string()));
    new_lines.extend(replacement);
    new_lines.extend(lines[end..].iter().map(|l| l.to_string()));
    new_lines
}

fn text_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Append `text` to `line`, separated by one space.
fn join_text(line: &str, text: &str) -> String {
    let line = line.trim_end();
    let text = text.trim_start();
    if text.is_empty() {
        line.to_string()
    } else if line.trim().is_empty() {
        text.to_string()
    } else {
        format!("{} {}", line, text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Node Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Replace a node's lines with the edited text.
pub fn replace_range(source: &str, start: usize, end: usize, text: &str) -> Option<LineEdit> {
    let lines: Vec<&str> = source.split('\n').collect();
    let (start, end) = line_range(&lines, start, end)?;
    Some(LineEdit::new(
        splice(&lines, start, end, text_lines(text)),
        start,
    ))
}

/// Split a node at the cursor (return key).
///
/// The range becomes `before`, a blank line, then `after` on a new line which
/// receives focus.
pub fn insert_line_after(
    source: &str,
    start: usize,
    end: usize,
    before: &str,
    after: &str,
) -> Option<LineEdit> {
    let lines: Vec<&str> = source.split('\n').collect();
    let (start, end) = line_range(&lines, start, end)?;

    let mut replacement = text_lines(before);
    let focus_line = start + replacement.len() + 1;
    replacement.push(String::new());
    replacement.push(after.to_string());

    Some(LineEdit::new(
        splice(&lines, start, end, replacement),
        focus_line,
    ))
}

/// Merge a node into the content above it (backspace at the start).
///
/// The range and the blank lines above it are removed, and `text` is appended
/// to the nearest non-blank line. Without such a line the range is replaced
/// by `text`.
pub fn merge_with_previous(source: &str, start: usize, end: usize, text: &str) -> Option<LineEdit> {
    let lines: Vec<&str> = source.split('\n').collect();
    let (start, end) = line_range(&lines, start, end)?;

    let Some(previous) = (1..start).rev().find(|&n| !lines[n - 1].trim().is_empty()) else {
        return replace_range(source, start, end, text);
    };

    let merged = join_text(lines[previous - 1], text);
    Some(LineEdit::new(
        splice(&lines, previous, end, vec![merged]),
        previous,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Empty Line Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Type into a blank line.
pub fn insert_at_empty_line(source: &str, line: usize, text: &str) -> Option<LineEdit> {
    let lines: Vec<&str> = source.split('\n').collect();
    let line = blank_line(&lines, line)?;
    Some(LineEdit::new(splice(&lines, line, line, text_lines(text)), line))
}

/// Remove a blank line; focus moves to the line above.
pub fn delete_empty_line(source: &str, line: usize) -> Option<LineEdit> {
    let lines: Vec<&str> = source.split('\n').collect();
    let line = blank_line(&lines, line)?;
    Some(LineEdit::new(
        splice(&lines, line, line, Vec::new()),
        line.saturating_sub(1).max(1),
    ))
}

/// Turn a blank line into two lines (return key while typing into it).
pub fn split_empty_line(source: &str, line: usize, before: &str, after: &str) -> Option<LineEdit> {
    let lines: Vec<&str> = source.split('\n').collect();
    let line = blank_line(&lines, line)?;
    let mut replacement = text_lines(before);
    let focus_line = line + replacement.len();
    replacement.push(after.to_string());
    Some(LineEdit::new(
        splice(&lines, line, line, replacement),
        focus_line,
    ))
}

/// Remove a blank line and append what was typed into it to the line above.
pub fn merge_empty_line_with_previous(source: &str, line: usize, text: &str) -> Option<LineEdit> {
    let lines: Vec<&str> = source.split('\n').collect();
    let line = blank_line(&lines, line)?;
    if line == 1 {
        return insert_at_empty_line(source, line, text);
    }
    let merged = join_text(lines[line - 2], text);
    Some(LineEdit::new(
        splice(&lines, line - 1, line, vec![merged]),
        line - 1,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Task Items
// ─────────────────────────────────────────────────────────────────────────────

/// Marker prefix (optionally quoted) followed by a checkbox.
static TASK_BOX: OnceLock<Regex> = OnceLock::new();

fn task_box() -> &'static Regex {
    TASK_BOX.get_or_init(|| {
        Regex::new(r"^((?:\s*>)*\s*(?:[-*+]|\d+[.)])\s+)\[[ xX]\]").expect("static regex is valid")
    })
}

fn find_task(node: &MarkdownNode, target: usize) -> Option<&MarkdownNode> {
    if let MarkdownNode::TaskListItem { index, .. } = node {
        if *index == target {
            return Some(node);
        }
    }
    node.children().iter().find_map(|child| find_task(child, target))
}

/// Set the checkbox of the task item with task index `index`.
pub fn toggle_task(result: &ParseResult, index: usize, checked: bool) -> Option<LineEdit> {
    let id = find_task(&result.ast, index)?.id()?;
    let line = result.location(id)?.start;

    let lines: Vec<&str> = result.original_text.split('\n').collect();
    let text = lines.get(line.checked_sub(1)?)?;
    let captures = task_box().captures(text)?;
    let whole = captures.get(0)?;
    let prefix = captures.get(1)?.as_str();

    let mark = if checked { "[x]" } else { "[ ]" };
    let updated = format!("{}{}{}", prefix, mark, &text[whole.end()..]);
    Some(LineEdit::new(splice(&lines, line, line, vec![updated]), line))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parser::parse_markdown;

    // ─────────────────────────────────────────────────────────────────────────
    // Node operations
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_replace_range_middle() {
        let edit = replace_range("a\nb\nc", 2, 2, "B1\nB2").unwrap();
        assert_eq!(edit.new_source, "a\nB1\nB2\nc");
        assert_eq!(edit.focus_line, 2);
    }

    #[test]
    fn test_replace_range_clamps_end() {
        let edit = replace_range("a\nb", 2, 10, "z").unwrap();
        assert_eq!(edit.new_source, "a\nz");
    }

    #[test]
    fn test_replace_range_out_of_bounds() {
        assert!(replace_range("a\nb", 0, 1, "x").is_none());
        assert!(replace_range("a\nb", 3, 3, "x").is_none());
        assert!(replace_range("a\nb", 2, 1, "x").is_none());
    }

    #[test]
    fn test_insert_line_after_splits_paragraph() {
        let edit = insert_line_after("# T\n\nHello world\n\nEnd", 3, 3, "Hello", "world").unwrap();
        assert_eq!(edit.new_source, "# T\n\nHello\n\nworld\n\nEnd");
        assert_eq!(edit.focus_line, 5);
    }

    #[test]
    fn test_insert_line_after_multiline_before() {
        let edit = insert_line_after("one\ntwo", 1, 2, "one\ntwo", "").unwrap();
        assert_eq!(edit.new_source, "one\ntwo\n\n");
        assert_eq!(edit.focus_line, 4);
    }

    #[test]
    fn test_merge_with_previous_joins_lines() {
        let edit = merge_with_previous("first\n\nsecond\n\nthird", 3, 3, "second").unwrap();
        assert_eq!(edit.new_source, "first second\n\nthird");
        assert_eq!(edit.focus_line, 1);
    }

    #[test]
    fn test_merge_with_previous_at_top() {
        let edit = merge_with_previous("\nonly", 2, 2, "only!").unwrap();
        assert_eq!(edit.new_source, "\nonly!");
        assert_eq!(edit.focus_line, 2);
    }

    #[test]
    fn test_merge_with_previous_empty_text() {
        let edit = merge_with_previous("keep\nx", 2, 2, "").unwrap();
        assert_eq!(edit.new_source, "keep");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Empty lines
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_insert_at_empty_line() {
        let edit = insert_at_empty_line("a\n\nb", 2, "new").unwrap();
        assert_eq!(edit.new_source, "a\nnew\nb");
        assert!(insert_at_empty_line("a\n\nb", 1, "new").is_none());
        assert!(insert_at_empty_line("a\n\nb", 9, "new").is_none());
    }

    #[test]
    fn test_delete_empty_line() {
        let edit = delete_empty_line("a\n\n\nb", 3).unwrap();
        assert_eq!(edit.new_source, "a\n\nb");
        assert_eq!(edit.focus_line, 2);

        let edit = delete_empty_line("\nb", 1).unwrap();
        assert_eq!(edit.new_source, "b");
        assert_eq!(edit.focus_line, 1);
    }

    #[test]
    fn test_split_empty_line() {
        let edit = split_empty_line("a\n\nb", 2, "x", "y").unwrap();
        assert_eq!(edit.new_source, "a\nx\ny\nb");
        assert_eq!(edit.focus_line, 3);
    }

    #[test]
    fn test_merge_empty_line_with_previous() {
        let edit = merge_empty_line_with_previous("a\n  \nb", 2, "tail").unwrap();
        assert_eq!(edit.new_source, "a tail\nb");
        assert_eq!(edit.focus_line, 1);

        let edit = merge_empty_line_with_previous("\nb", 1, "head").unwrap();
        assert_eq!(edit.new_source, "head\nb");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Task items
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_toggle_task_by_index() {
        let result = parse_markdown("- [ ] one\n- [x] two\n- plain");
        let edit = toggle_task(&result, 0, true).unwrap();
        assert_eq!(edit.new_source, "- [x] one\n- [x] two\n- plain");
        assert_eq!(edit.focus_line, 1);

        let edit = toggle_task(&result, 1, false).unwrap();
        assert_eq!(edit.new_source, "- [ ] one\n- [ ] two\n- plain");
    }

    #[test]
    fn test_toggle_task_unknown_index() {
        let result = parse_markdown("- [ ] one");
        assert!(toggle_task(&result, 5, true).is_none());
    }

    #[test]
    fn test_task_box_pattern() {
        assert!(task_box().is_match("  - [ ] nested"));
        assert!(task_box().is_match("3. [X] ordered"));
        assert!(task_box().is_match("> * [ ] quoted"));
        assert!(!task_box().is_match("[ ] bare"));
    }
}
