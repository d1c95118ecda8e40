//! Line-oriented view of the original markdown text
//!
//! Lines are split on `\n` only, so a trailing newline yields a final empty
//! line. All line numbers are 1-indexed.

use regex::Regex;
use std::sync::OnceLock;

/// Ordered list marker: digits, a period, a space.
static ORDERED_MARKER: OnceLock<Regex> = OnceLock::new();

fn ordered_marker() -> &'static Regex {
    ORDERED_MARKER.get_or_init(|| Regex::new(r"^\d+\. ").expect("static regex is valid"))
}

/// Width of an ordered marker (`12. `) at the start of `trimmed`, including the space.
pub fn ordered_marker_width(trimmed: &str) -> Option<usize> {
    ordered_marker().find(trimmed).map(|m| m.end())
}

/// Whether a line, once leading whitespace is stripped, opens a list item.
///
/// Recognizes `- `, `* `, `+ `, `- [` and `N. `.
pub fn is_list_item_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("- ")
        || trimmed.starts_with("* ")
        || trimmed.starts_with("+ ")
        || trimmed.starts_with("- [")
        || ordered_marker().is_match(trimmed)
}

/// Whether a line opens a container whose content continues on the same
/// line: a list item, a block quote or a pipe table row.
pub fn is_marker_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    is_list_item_line(trimmed) || trimmed.starts_with('>') || trimmed.starts_with('|')
}

/// Borrowed lines of a document.
#[derive(Debug, Clone)]
pub(crate) struct SourceLines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SourceLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.split('\n').collect(),
        }
    }

    /// Number of lines; at least 1, since empty text is one empty line.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The text of a line, or `None` when out of range.
    pub fn get(&self, line: usize) -> Option<&'a str> {
        if line == 0 {
            return None;
        }
        self.lines.get(line - 1).copied()
    }

    /// Whether a line is blank. Out-of-range lines are not blank.
    pub fn is_blank(&self, line: usize) -> bool {
        self.get(line).is_some_and(|l| l.trim().is_empty())
    }

    /// First non-blank line strictly after `line`.
    pub fn next_content_line_after(&self, line: usize) -> Option<usize> {
        ((line + 1)..=self.len()).find(|&n| !self.is_blank(n))
    }

    /// Lines `[start, end]` joined with newlines.
    ///
    /// Empty when `start < 1`, `end < start`, or `start` is past the last line;
    /// `end` is clamped to the document.
    pub fn extract(&self, start: usize, end: usize) -> String {
        if start < 1 || end < start || start > self.len() {
            return String::new();
        }
        let end = end.min(self.len());
        self.lines[(start - 1)..end].join("\n")
    }

    /// Clamp a line number into `[1, len]`.
    pub fn clamp(&self, line: usize) -> usize {
        line.clamp(1, self.len().max(1))
    }

    /// Line numbers of every blank line.
    pub fn blank_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.trim().is_empty())
            .map(|(i, _)| i + 1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_item_markers() {
        assert!(is_list_item_line("- item"));
        assert!(is_list_item_line("  * item"));
        assert!(is_list_item_line("\t+ item"));
        assert!(is_list_item_line("- [ ] task"));
        assert!(is_list_item_line("12. twelfth"));
        assert!(!is_list_item_line("-item"));
        assert!(!is_list_item_line("1) paren"));
        assert!(!is_list_item_line("plain text"));
        assert!(!is_list_item_line(""));
    }

    #[test]
    fn test_marker_line_includes_quotes_and_rows() {
        assert!(is_marker_line("> quoted"));
        assert!(is_marker_line("- item"));
        assert!(is_marker_line("| a | b |"));
        assert!(!is_marker_line("text > other"));
    }

    #[test]
    fn test_line_count_with_trailing_newline() {
        assert_eq!(SourceLines::new("").len(), 1);
        assert_eq!(SourceLines::new("a\nb").len(), 2);
        assert_eq!(SourceLines::new("a\n").len(), 2);
    }

    #[test]
    fn test_blank_detection() {
        let lines = SourceLines::new("a\n   \n\tb\n");
        assert!(!lines.is_blank(1));
        assert!(lines.is_blank(2));
        assert!(!lines.is_blank(3));
        assert!(lines.is_blank(4));
        assert!(!lines.is_blank(0));
        assert!(!lines.is_blank(5));
        assert_eq!(lines.blank_lines().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn test_next_content_line_after() {
        let lines = SourceLines::new("a\n\n\nb");
        assert_eq!(lines.next_content_line_after(0), Some(1));
        assert_eq!(lines.next_content_line_after(1), Some(4));
        assert_eq!(lines.next_content_line_after(4), None);
    }

    #[test]
    fn test_extract_bounds() {
        let lines = SourceLines::new("one\ntwo\nthree");
        assert_eq!(lines.extract(0, 5), "");
        assert_eq!(lines.extract(3, 1), "");
        assert_eq!(lines.extract(4, 4), "");
        assert_eq!(lines.extract(2, 2), "two");
        assert_eq!(lines.extract(1, 1000), "one\ntwo\nthree");
    }

    #[test]
    fn test_clamp() {
        let lines = SourceLines::new("a\nb");
        assert_eq!(lines.clamp(0), 1);
        assert_eq!(lines.clamp(2), 2);
        assert_eq!(lines.clamp(9), 2);
    }
}
