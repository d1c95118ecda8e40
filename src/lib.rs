//! linemark: markdown to a line-located document tree
//!
//! Parses markdown into a tree whose every block node knows the exact lines of
//! the original text it came from, so an editor can map a tapped line back to
//! one node and rewrite just that node's lines.
//!
//! The pipeline is stateless: every edit produces new text that is parsed
//! again from scratch.

pub mod config;
pub mod error;
pub mod markdown;

pub use config::{load_options, try_load_options, ParseOptions};
pub use error::{Error, Result, ResultExt};
pub use markdown::{parse_markdown, MarkdownNode, MarkdownParser, NodeId, NodeLocation, ParseResult};
