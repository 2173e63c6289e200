//! Syntax tree seam.
//!
//! The engine consumes a read-only tree of named nodes with byte ranges. Any
//! incremental parser can sit behind [`SyntaxTree`]; a re-parse produces a new
//! tree object and the engine notices through `Arc` identity.
//!
//! [`MarkdownTree`] is the bundled provider, built from pulldown-cmark's
//! offset iterator and emitting the node names the classifier understands.

use std::fmt;
use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use smol_str::{SmolStr, format_smolstr};

/// A named node span in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxNode {
    pub name: SmolStr,
    pub from: usize,
    pub to: usize,
}

impl SyntaxNode {
    pub fn new(name: impl Into<SmolStr>, from: usize, to: usize) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    pub fn kind(&self) -> Option<NodeKind> {
        NodeKind::from_name(&self.name)
    }

    /// Inclusive overlap with `[from, to]`.
    pub fn touches(&self, from: usize, to: usize) -> bool {
        self.from <= to && self.to >= from
    }
}

/// Read-only parse tree.
pub trait SyntaxTree: fmt::Debug + Send + Sync {
    /// All nodes in document order (parents before their children).
    fn nodes(&self) -> &[SyntaxNode];
}

/// Construct kinds the decoration engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Strong,
    Emphasis,
    Strikethrough,
    InlineCode,
    /// ATX heading, level 1 through 6.
    Heading(u8),
    Link,
    Blockquote,
    HorizontalRule,
    FencedCode,
    Table,
}

/// Which builder owns a construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Line-scoped builder; never replaces across a line break.
    Inline,
    Table,
    CodeBlock,
}

impl NodeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "StrongEmphasis" => Self::Strong,
            "Emphasis" => Self::Emphasis,
            "Strikethrough" => Self::Strikethrough,
            "InlineCode" => Self::InlineCode,
            "Link" => Self::Link,
            "Blockquote" => Self::Blockquote,
            "HorizontalRule" => Self::HorizontalRule,
            "FencedCode" => Self::FencedCode,
            "Table" => Self::Table,
            _ => {
                let level = name.strip_prefix("ATXHeading")?.parse::<u8>().ok()?;
                if !(1..=6).contains(&level) {
                    return None;
                }
                Self::Heading(level)
            }
        };
        Some(kind)
    }

    pub fn name(self) -> SmolStr {
        match self {
            Self::Strong => SmolStr::new_static("StrongEmphasis"),
            Self::Emphasis => SmolStr::new_static("Emphasis"),
            Self::Strikethrough => SmolStr::new_static("Strikethrough"),
            Self::InlineCode => SmolStr::new_static("InlineCode"),
            Self::Heading(level) => format_smolstr!("ATXHeading{level}"),
            Self::Link => SmolStr::new_static("Link"),
            Self::Blockquote => SmolStr::new_static("Blockquote"),
            Self::HorizontalRule => SmolStr::new_static("HorizontalRule"),
            Self::FencedCode => SmolStr::new_static("FencedCode"),
            Self::Table => SmolStr::new_static("Table"),
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            Self::Table => Scope::Table,
            Self::FencedCode => Scope::CodeBlock,
            Self::Strong
            | Self::Emphasis
            | Self::Strikethrough
            | Self::InlineCode
            | Self::Heading(_)
            | Self::Link
            | Self::Blockquote
            | Self::HorizontalRule => Scope::Inline,
        }
    }
}

/// Parse tree produced by pulldown-cmark.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownTree {
    nodes: Vec<SyntaxNode>,
}

pub fn default_md_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

impl MarkdownTree {
    pub fn parse(source: &str) -> Self {
        let mut nodes = Vec::new();

        for (event, range) in Parser::new_ext(source, default_md_options()).into_offset_iter() {
            let name: SmolStr = match &event {
                Event::Start(tag) => match tag {
                    Tag::Strong => "StrongEmphasis".into(),
                    Tag::Emphasis => "Emphasis".into(),
                    // Only the two-tilde form counts as strikethrough.
                    Tag::Strikethrough if source[range.clone()].starts_with("~~") => {
                        "Strikethrough".into()
                    }
                    Tag::Heading { level, .. } => {
                        let trimmed = source[range.clone()].trim_start_matches([' ', '\t']);
                        if trimmed.starts_with('#') {
                            format_smolstr!("ATXHeading{}", *level as u8)
                        } else {
                            format_smolstr!("SetextHeading{}", *level as u8)
                        }
                    }
                    Tag::Link { .. } => "Link".into(),
                    Tag::Image { .. } => "Image".into(),
                    Tag::BlockQuote(_) => "Blockquote".into(),
                    Tag::CodeBlock(CodeBlockKind::Fenced(_)) => "FencedCode".into(),
                    Tag::CodeBlock(CodeBlockKind::Indented) => "CodeBlock".into(),
                    Tag::Table(_) => "Table".into(),
                    Tag::Paragraph => "Paragraph".into(),
                    Tag::List(Some(_)) => "OrderedList".into(),
                    Tag::List(None) => "BulletList".into(),
                    Tag::Item => "ListItem".into(),
                    _ => continue,
                },
                Event::Code(_) => "InlineCode".into(),
                Event::Rule => "HorizontalRule".into(),
                _ => continue,
            };

            let range = trim_node_range(source, range, NodeKind::from_name(&name));
            tracing::trace!(
                target: "livemark::syntax",
                node = %name,
                from = range.start,
                to = range.end,
                "node"
            );
            nodes.push(SyntaxNode::new(name, range.start, range.end));
        }

        Self { nodes }
    }
}

impl SyntaxTree for MarkdownTree {
    fn nodes(&self) -> &[SyntaxNode] {
        &self.nodes
    }
}

/// Block ranges from the parser include their trailing line break and may
/// start at line indentation; node spans here cover just the construct.
fn trim_node_range(source: &str, range: Range<usize>, kind: Option<NodeKind>) -> Range<usize> {
    let text = &source[range.clone()];
    let end = range.start + text.trim_end_matches(['\n', '\r']).len();

    let leading = match kind {
        Some(
            NodeKind::Heading(_)
            | NodeKind::HorizontalRule
            | NodeKind::FencedCode
            | NodeKind::Table,
        ) => text.len() - text.trim_start_matches([' ', '\t']).len(),
        _ => 0,
    };
    (range.start + leading).min(end)..end
}
