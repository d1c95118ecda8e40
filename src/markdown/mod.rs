//! Markdown parsing with per-block source lines
//!
//! This module turns markdown text into a document tree in which every block
//! carries the original line range it came from, using the comrak library as
//! the CommonMark + GFM engine.
//!
//! # Features
//! - Indentation normalization for nested lists, with line un-mapping
//! - Location inference for blocks the engine leaves unpositioned
//! - Splitting of loose lists into visually separate lists
//! - Line-based lookups and edit operations for tap-to-edit interfaces
//!
//! # Example
//! ```ignore
//! use linemark::markdown::{parse_markdown, replace_range};
//!
//! let source = "# Hello\n\nWorld";
//! let result = parse_markdown(source);
//! let id = result.find_editable_node_at(3).unwrap();
//! let location = result.location(&id).unwrap();
//! let edit = replace_range(source, location.start, location.end, "Everyone").unwrap();
//! assert_eq!(edit.new_source, "# Hello\n\nEveryone");
//! ```

mod ast_ops;
mod converter;
mod engine;
mod loose_lists;
mod lookup;
mod node;
mod parser;
mod preprocess;
mod source;

pub use ast_ops::{
    delete_empty_line, insert_at_empty_line, insert_line_after, merge_empty_line_with_previous,
    merge_with_previous, replace_range, split_empty_line, toggle_task, LineEdit,
};
pub use engine::{ComrakEngine, Engine, Extension, NativeKind, NativeList, NativeNode};
pub use node::{HeadingLevel, MarkdownNode, NodeId, NodeLocation, ParseResult, TableAlignment};
pub use parser::{parse_markdown, parse_markdown_with_options, MarkdownParser};
pub use preprocess::{indent_level, preprocess, LineMap, Preprocessed};
pub use source::is_list_item_line;
