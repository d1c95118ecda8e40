//! Markdown engine binding
//!
//! The converter does not read comrak nodes directly. An [`Engine`] parses the
//! normalized text into an owned [`NativeNode`] tree that exposes only what
//! the location tagger needs: node kind, the engine's reported 1-based line
//! range (0 = unknown), list and heading metadata, literals, and the
//! extension type string for GFM-defined kinds.
//!
//! [`ComrakEngine`] keeps comrak's arena local to [`Engine::parse`], so the
//! engine's tree is released before the converter runs, on every path.

use comrak::{
    nodes::{AstNode, ListType as ComrakListType, NodeValue},
    parse_document, Arena, Options,
};
use log::warn;

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// GFM syntax extensions an engine may attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Table,
    Strikethrough,
    Tasklist,
    Autolink,
}

impl Extension {
    /// Default extension names, in attach order.
    pub const DEFAULT_NAMES: [&'static str; 4] = ["table", "strikethrough", "tasklist", "autolink"];

    /// Resolve an extension by its registered name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "table" => Some(Extension::Table),
            "strikethrough" => Some(Extension::Strikethrough),
            "tasklist" => Some(Extension::Tasklist),
            "autolink" => Some(Extension::Autolink),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Extension::Table => "table",
            Extension::Strikethrough => "strikethrough",
            Extension::Tasklist => "tasklist",
            Extension::Autolink => "autolink",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Native Tree
// ─────────────────────────────────────────────────────────────────────────────

/// Core node kinds. GFM kinds arrive as [`NativeKind::Extension`] and are told
/// apart by [`NativeNode::type_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    Document,
    BlockQuote,
    List,
    Item,
    CodeBlock,
    HtmlBlock,
    Paragraph,
    Heading,
    ThematicBreak,
    Text,
    SoftBreak,
    LineBreak,
    Code,
    HtmlInline,
    Emph,
    Strong,
    Link,
    Image,
    /// Extension-defined node; see `type_string`
    Extension,
    /// Anything the binding does not model
    Other,
}

/// List metadata reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeList {
    pub ordered: bool,
    pub start: u32,
    pub tight: bool,
}

/// One node of the engine's tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeNode {
    pub kind: NativeKind,
    /// Extension type name (`table`, `table_row`, `table_header`,
    /// `table_cell`, `tasklist`, `strikethrough`); empty for core kinds
    pub type_string: String,
    /// Reported start line in the normalized text (0 = unknown)
    pub start_line: usize,
    /// Reported end line in the normalized text (0 = unknown)
    pub end_line: usize,
    pub heading_level: u8,
    pub list: Option<NativeList>,
    pub fence_info: String,
    pub literal: String,
    pub url: String,
    pub title: String,
    /// Checkbox state of a `tasklist` item
    pub checked: bool,
    pub children: Vec<NativeNode>,
}

impl NativeNode {
    /// A node of the given kind with no position and no metadata.
    pub fn new(kind: NativeKind) -> Self {
        Self {
            kind,
            type_string: String::new(),
            start_line: 0,
            end_line: 0,
            heading_level: 0,
            list: None,
            fence_info: String::new(),
            literal: String::new(),
            url: String::new(),
            title: String::new(),
            checked: false,
            children: Vec::new(),
        }
    }

    /// An extension node with the given type string.
    pub fn extension(type_string: &str) -> Self {
        Self {
            type_string: type_string.to_string(),
            ..Self::new(NativeKind::Extension)
        }
    }

    pub fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }

    pub fn with_literal(mut self, literal: &str) -> Self {
        self.literal = literal.to_string();
        self
    }

    pub fn with_children(mut self, children: Vec<NativeNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether this is an item the tasklist extension recognized.
    pub fn is_task_item(&self) -> bool {
        self.kind == NativeKind::Item && self.type_string == "tasklist"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A CommonMark + GFM parsing engine.
pub trait Engine {
    /// Resolve a syntax extension by name; `None` when the engine lacks it.
    fn find_extension(&self, name: &str) -> Option<Extension>;

    /// Parse normalized text with the given extensions attached.
    ///
    /// An error means the engine could not be constructed or produced no
    /// document.
    fn parse(&self, text: &str, extensions: &[Extension]) -> Result<NativeNode>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Comrak Engine
// ─────────────────────────────────────────────────────────────────────────────

/// The comrak-backed engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakEngine;

impl ComrakEngine {
    pub fn new() -> Self {
        Self
    }

    /// Build comrak options with only the requested extensions enabled.
    fn comrak_options(extensions: &[Extension]) -> Options {
        let mut options = Options::default();
        for extension in extensions {
            match extension {
                Extension::Table => options.extension.table = true,
                Extension::Strikethrough => options.extension.strikethrough = true,
                Extension::Tasklist => options.extension.tasklist = true,
                Extension::Autolink => options.extension.autolink = true,
            }
        }
        options
    }
}

impl Engine for ComrakEngine {
    fn find_extension(&self, name: &str) -> Option<Extension> {
        let extension = Extension::from_name(name);
        if extension.is_none() {
            warn!("Markdown extension '{}' is not available", name);
        }
        extension
    }

    fn parse(&self, text: &str, extensions: &[Extension]) -> Result<NativeNode> {
        let arena = Arena::new();
        let options = Self::comrak_options(extensions);
        let root = parse_document(&arena, text, &options);
        Ok(convert_node(root))
    }
}

/// Convert a comrak AST node (and its subtree) to a native node.
fn convert_node<'a>(node: &'a AstNode<'a>) -> NativeNode {
    let ast = node.data.borrow();
    let sourcepos = ast.sourcepos;

    let mut native = match &ast.value {
        NodeValue::Document => NativeNode::new(NativeKind::Document),
        NodeValue::BlockQuote => NativeNode::new(NativeKind::BlockQuote),
        NodeValue::List(list) => NativeNode {
            list: Some(NativeList {
                ordered: list.list_type == ComrakListType::Ordered,
                start: u32::try_from(list.start).unwrap_or(u32::MAX),
                tight: list.tight,
            }),
            ..NativeNode::new(NativeKind::List)
        },
        NodeValue::Item(_) => NativeNode::new(NativeKind::Item),
        NodeValue::TaskItem(symbol) => NativeNode {
            type_string: "tasklist".to_string(),
            checked: symbol.map(|c| c == 'x' || c == 'X').unwrap_or(false),
            ..NativeNode::new(NativeKind::Item)
        },
        NodeValue::CodeBlock(code) => NativeNode {
            fence_info: code.info.clone(),
            literal: code.literal.clone(),
            ..NativeNode::new(NativeKind::CodeBlock)
        },
        NodeValue::HtmlBlock(html) => {
            NativeNode::new(NativeKind::HtmlBlock).with_literal(&html.literal)
        }
        NodeValue::Paragraph => NativeNode::new(NativeKind::Paragraph),
        NodeValue::Heading(heading) => NativeNode {
            heading_level: heading.level,
            ..NativeNode::new(NativeKind::Heading)
        },
        NodeValue::ThematicBreak => NativeNode::new(NativeKind::ThematicBreak),
        NodeValue::Table(_) => NativeNode::extension("table"),
        NodeValue::TableRow(true) => NativeNode::extension("table_header"),
        NodeValue::TableRow(false) => NativeNode::extension("table_row"),
        NodeValue::TableCell => NativeNode::extension("table_cell"),
        NodeValue::Strikethrough => NativeNode::extension("strikethrough"),
        NodeValue::Text(text) => NativeNode::new(NativeKind::Text).with_literal(text),
        NodeValue::SoftBreak => NativeNode::new(NativeKind::SoftBreak),
        NodeValue::LineBreak => NativeNode::new(NativeKind::LineBreak),
        NodeValue::Code(code) => NativeNode::new(NativeKind::Code).with_literal(&code.literal),
        NodeValue::HtmlInline(html) => NativeNode::new(NativeKind::HtmlInline).with_literal(html),
        NodeValue::Emph => NativeNode::new(NativeKind::Emph),
        NodeValue::Strong => NativeNode::new(NativeKind::Strong),
        NodeValue::Link(link) => NativeNode {
            url: link.url.clone(),
            title: link.title.clone(),
            ..NativeNode::new(NativeKind::Link)
        },
        NodeValue::Image(image) => NativeNode {
            url: image.url.clone(),
            title: image.title.clone(),
            ..NativeNode::new(NativeKind::Image)
        },
        // Front matter, footnotes and other kinds outside the modeled set
        _ => NativeNode::new(NativeKind::Other),
    };

    native.start_line = sourcepos.start.line;
    native.end_line = sourcepos.end.line;
    drop(ast);

    native.children = node.children().map(convert_node).collect();
    native
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
