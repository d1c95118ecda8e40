//! Markdown parse pipeline
//!
//! Raw text is normalized by the preprocessor, handed to the engine, and the
//! returned native tree is converted into a located document tree. A second
//! pass splits loose lists. Every call builds its own [`ParseContext`], so
//! a parser can be shared freely between threads and repeated parses of the
//! same text produce the same ids.
//!
//! When the engine fails the result is a document holding the raw input as a
//! single paragraph, with no locations.

use log::{debug, warn};

use crate::config::ParseOptions;

use super::converter::ParseContext;
use super::engine::{ComrakEngine, Engine, Extension};
use super::loose_lists::split_loose_lists;
use super::node::{MarkdownNode, NodeId, ParseResult};
use super::preprocess::{preprocess, LineMap, Preprocessed};

// ─────────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────────

/// Parses markdown into a [`ParseResult`] using an [`Engine`].
#[derive(Debug, Clone)]
pub struct MarkdownParser<E: Engine = ComrakEngine> {
    engine: E,
    options: ParseOptions,
}

impl MarkdownParser<ComrakEngine> {
    /// A comrak-backed parser with default options.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// A comrak-backed parser with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self::with_engine(ComrakEngine::new(), options)
    }
}

impl Default for MarkdownParser<ComrakEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> MarkdownParser<E> {
    pub fn with_engine(engine: E, options: ParseOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse markdown text. Never fails; see the module docs for the fallback.
    pub fn parse(&self, markdown: &str) -> ParseResult {
        let preprocessed = if self.options.normalize_indentation {
            preprocess(markdown)
        } else {
            Preprocessed {
                text: markdown.to_string(),
                line_map: LineMap::identity(markdown.split('\n').count()),
            }
        };

        let extensions: Vec<Extension> = self
            .options
            .extensions
            .iter()
            .filter_map(|name| self.engine.find_extension(name))
            .collect();

        let native = match self.engine.parse(&preprocessed.text, &extensions) {
            Ok(native) => native,
            Err(e) => {
                warn!("{}; falling back to a plain paragraph", e);
                return fallback_result(markdown);
            }
        };

        let mut ctx = ParseContext::new(markdown, &preprocessed.line_map);
        let mut ast = ctx.convert_document(&native);
        drop(native);

        if self.options.split_loose_lists {
            ast = split_loose_lists(ast, &mut ctx);
        }

        let locations = ctx.into_locations();
        debug!(
            "Parsed {} lines into {} located blocks",
            preprocessed.line_map.len(),
            locations.len()
        );

        ParseResult {
            ast,
            locations,
            original_text: markdown.to_string(),
        }
    }
}

/// Document holding the whole input as one paragraph, with no locations.
fn fallback_result(markdown: &str) -> ParseResult {
    ParseResult {
        ast: MarkdownNode::Document {
            id: NodeId::from_seq(1),
            children: vec![MarkdownNode::Paragraph {
                id: NodeId::from_seq(2),
                children: vec![MarkdownNode::Text(markdown.to_string())],
            }],
        },
        locations: Default::default(),
        original_text: markdown.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Convenience Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Parse markdown with the comrak engine and default options.
///
/// # Example
/// ```ignore
/// let result = parse_markdown("# Hello\n\nWorld");
/// assert_eq!(result.extract_lines(3, 3), "World");
/// ```
pub fn parse_markdown(markdown: &str) -> ParseResult {
    MarkdownParser::new().parse(markdown)
}

/// Parse markdown with the comrak engine and custom options.
pub fn parse_markdown_with_options(markdown: &str, options: &ParseOptions) -> ParseResult {
    MarkdownParser::with_options(options.clone()).parse(markdown)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
