//! Node classification and the cursor-adjacency rule.
//!
//! The classifier turns one syntax node plus its text into zero or more
//! decorations. Whether markers get hidden depends on a single question,
//! answered by [`CursorOracle`]: is the main selection touching the node?

use std::sync::LazyLock;

use livemark_renderer::ClassNames;
use regex::Regex;
use smol_str::SmolStr;

use crate::decoration::{Decoration, Mark, Widget};
use crate::syntax::{NodeKind, Scope, SyntaxNode};
use crate::types::Selection;

pub static HEADING_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]*").unwrap());

pub static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\]]+)\]\(([^)]+)\)$").unwrap());

pub static QUOTE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*>+\s*").unwrap());

/// Answers whether the main selection is "inside" a node span.
///
/// The test is inclusive at both ends, so a caret sitting right before or
/// right after a construct reveals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorOracle {
    selection: Selection,
    force_hidden: bool,
}

impl CursorOracle {
    pub fn new(selection: Selection, force_hidden: bool) -> Self {
        Self {
            selection,
            force_hidden,
        }
    }

    /// Cursor-aware oracle. An unfocused editor shows the clean preview.
    pub fn live(selection: Selection, focused: bool) -> Self {
        Self::new(selection, !focused)
    }

    /// Reading mode: nothing is ever inside.
    pub fn reading() -> Self {
        Self::new(Selection::collapsed(0), true)
    }

    pub fn is_inside(&self, from: usize, to: usize) -> bool {
        !self.force_hidden && self.selection.start() <= to && self.selection.end() >= from
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStyle {
    Strong,
    Emphasis,
    Strikethrough,
    InlineCode,
}

/// How the marker length of a delimited construct is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markers {
    /// `**`/`__` is 2, `*`/`_` is 1, anything else is malformed.
    Emphasis,
    Fixed(usize),
    /// Length of the leading backtick run.
    Backticks,
}

impl Markers {
    pub fn len(self, text: &str) -> usize {
        match self {
            Self::Emphasis => {
                if text.starts_with("**") || text.starts_with("__") {
                    2
                } else if text.starts_with('*') || text.starts_with('_') {
                    1
                } else {
                    0
                }
            }
            Self::Fixed(len) => len,
            Self::Backticks => text.bytes().take_while(|b| *b == b'`').count(),
        }
    }
}

/// Decoration recipe for a construct kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    /// Symmetric markers around styled content.
    Delimited { markers: Markers, style: InlineStyle },
    Heading,
    Link,
    Blockquote,
    HorizontalRule,
    /// Handled by the table field.
    TableWidget,
    /// Handled by the code block field.
    CodeBlockWidget,
}

impl Recipe {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Strong => Self::Delimited {
                markers: Markers::Emphasis,
                style: InlineStyle::Strong,
            },
            NodeKind::Emphasis => Self::Delimited {
                markers: Markers::Emphasis,
                style: InlineStyle::Emphasis,
            },
            NodeKind::Strikethrough => Self::Delimited {
                markers: Markers::Fixed(2),
                style: InlineStyle::Strikethrough,
            },
            NodeKind::InlineCode => Self::Delimited {
                markers: Markers::Backticks,
                style: InlineStyle::InlineCode,
            },
            NodeKind::Heading(_) => Self::Heading,
            NodeKind::Link => Self::Link,
            NodeKind::Blockquote => Self::Blockquote,
            NodeKind::HorizontalRule => Self::HorizontalRule,
            NodeKind::Table => Self::TableWidget,
            NodeKind::FencedCode => Self::CodeBlockWidget,
        }
    }
}

/// Maps line-scoped nodes to decorations.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    classes: ClassNames,
}

impl Classifier {
    pub fn new(classes: ClassNames) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &ClassNames {
        &self.classes
    }

    fn style_class(&self, style: InlineStyle) -> SmolStr {
        match style {
            InlineStyle::Strong => self.classes.strong(),
            InlineStyle::Emphasis => self.classes.emphasis(),
            InlineStyle::Strikethrough => self.classes.strikethrough(),
            InlineStyle::InlineCode => self.classes.inline_code(),
        }
    }

    /// Decorations for a line-scoped node. `text` is the document text of
    /// `node`'s span. Table and fenced code nodes yield nothing here.
    pub fn decorate(&self, node: &SyntaxNode, text: &str, inside: bool) -> Vec<Decoration> {
        let Some(kind) = node.kind() else {
            return Vec::new();
        };
        if kind.scope() != Scope::Inline {
            return Vec::new();
        }

        let (from, to) = (node.from, node.to);
        let mut out = Vec::new();
        match Recipe::for_kind(kind) {
            Recipe::Delimited { markers, style } => {
                let m = markers.len(text);
                if m == 0 || text.len() < m * 2 {
                    tracing::trace!(
                        target: "livemark::decorate",
                        node = %node.name,
                        from,
                        to,
                        "malformed delimiters, skipping node"
                    );
                    return out;
                }
                if !inside {
                    out.push(Decoration::hide(from, from + m));
                    out.push(Decoration::mark(
                        from + m,
                        to - m,
                        Mark::class(self.style_class(style)),
                    ));
                    out.push(Decoration::hide(to - m, to));
                }
            }
            Recipe::Heading => {
                let Some(prefix) = HEADING_PREFIX_RE.captures(text) else {
                    tracing::trace!(
                        target: "livemark::decorate",
                        from,
                        to,
                        "heading without # prefix, skipping node"
                    );
                    return out;
                };
                let level = prefix[1].len() as u8;
                let marker_end = from + prefix[0].len();
                if !inside {
                    out.push(Decoration::hide(from, marker_end));
                    if marker_end < to {
                        out.push(Decoration::mark(
                            marker_end,
                            to,
                            Mark::class(self.classes.heading(level)),
                        ));
                    }
                }
            }
            Recipe::Link => {
                let Some(caps) = LINK_RE.captures(text) else {
                    tracing::trace!(
                        target: "livemark::decorate",
                        from,
                        to,
                        "not an inline [text](url) link, skipping node"
                    );
                    return out;
                };
                if !inside {
                    let text_end = from + 1 + caps[1].len();
                    out.push(Decoration::hide(from, from + 1));
                    out.push(Decoration::mark(
                        from + 1,
                        text_end,
                        Mark::class(self.classes.link()).with_attr("data-url", &caps[2]),
                    ));
                    out.push(Decoration::hide(text_end, to));
                }
            }
            Recipe::Blockquote => {
                out.push(Decoration::mark(from, to, Mark::class(self.classes.blockquote())));
                if !inside {
                    let mut line_start = from;
                    for line in text.split_inclusive('\n') {
                        let content = line.trim_end_matches(['\n', '\r']);
                        if let Some(prefix) = QUOTE_PREFIX_RE.find(content) {
                            if !prefix.is_empty() {
                                out.push(Decoration::hide(
                                    line_start + prefix.start(),
                                    line_start + prefix.end(),
                                ));
                            }
                        }
                        line_start += line.len();
                    }
                }
            }
            Recipe::HorizontalRule => {
                if !inside {
                    out.push(Decoration::widget(from, to, Widget::HorizontalRule, false));
                }
            }
            Recipe::TableWidget | Recipe::CodeBlockWidget => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::DecorationKind;

    fn node(kind: NodeKind, from: usize, to: usize) -> SyntaxNode {
        SyntaxNode::new(kind.name(), from, to)
    }

    fn summary(decorations: &[Decoration]) -> Vec<(usize, usize, String)> {
        decorations
            .iter()
            .map(|d| {
                let what = match &d.kind {
                    DecorationKind::Hide => "hide".to_string(),
                    DecorationKind::Mark(mark) => mark.class.to_string(),
                    DecorationKind::Replace { .. } => "widget".to_string(),
                };
                (d.from, d.to, what)
            })
            .collect()
    }

    #[test]
    fn test_oracle_is_inclusive_at_both_ends() {
        let at = |pos| CursorOracle::live(Selection::collapsed(pos), true);
        assert!(!at(1).is_inside(2, 7));
        assert!(at(2).is_inside(2, 7));
        assert!(at(5).is_inside(2, 7));
        assert!(at(7).is_inside(2, 7));
        assert!(!at(8).is_inside(2, 7));

        // Range selections overlap too.
        let sel = CursorOracle::live(Selection::new(0, 2), true);
        assert!(sel.is_inside(2, 7));
    }

    #[test]
    fn test_oracle_forced_hidden() {
        assert!(!CursorOracle::reading().is_inside(0, 10));
        assert!(!CursorOracle::live(Selection::collapsed(3), false).is_inside(0, 10));
    }

    #[test]
    fn test_marker_lengths() {
        assert_eq!(Markers::Emphasis.len("**a**"), 2);
        assert_eq!(Markers::Emphasis.len("__a__"), 2);
        assert_eq!(Markers::Emphasis.len("*a*"), 1);
        assert_eq!(Markers::Emphasis.len("_a_"), 1);
        assert_eq!(Markers::Emphasis.len("a"), 0);
        assert_eq!(Markers::Backticks.len("``a``"), 2);
        assert_eq!(Markers::Fixed(2).len("~~a~~"), 2);
    }

    #[test]
    fn test_strong_outside_and_inside() {
        let classifier = Classifier::default();
        let strong = node(NodeKind::Strong, 4, 12);
        assert_eq!(
            summary(&classifier.decorate(&strong, "**bold**", false)),
            vec![
                (4, 6, "hide".into()),
                (6, 10, "lp-strong".into()),
                (10, 12, "hide".into())
            ]
        );
        assert!(classifier.decorate(&strong, "**bold**", true).is_empty());
    }

    #[test]
    fn test_malformed_strong_yields_nothing() {
        let classifier = Classifier::default();
        assert!(
            classifier
                .decorate(&node(NodeKind::Strong, 0, 4), "bold", false)
                .is_empty()
        );
        assert!(
            classifier
                .decorate(&node(NodeKind::Strong, 0, 2), "**", false)
                .is_empty()
        );
    }

    #[test]
    fn test_inline_code_uses_backtick_run() {
        let classifier = Classifier::default();
        let code = node(NodeKind::InlineCode, 0, 7);
        assert_eq!(
            summary(&classifier.decorate(&code, "``a`b``", false)),
            vec![
                (0, 2, "hide".into()),
                (2, 5, "lp-inline-code".into()),
                (5, 7, "hide".into())
            ]
        );
    }

    #[test]
    fn test_heading_hides_prefix() {
        let classifier = Classifier::default();
        let heading = node(NodeKind::Heading(3), 0, 9);
        assert_eq!(
            summary(&classifier.decorate(&heading, "###  Deep", false)),
            vec![(0, 5, "hide".into()), (5, 9, "lp-heading-3".into())]
        );
        // Empty heading: only the prefix is hidden.
        assert_eq!(
            summary(&classifier.decorate(&node(NodeKind::Heading(1), 0, 1), "#", false)),
            vec![(0, 1, "hide".into())]
        );
    }

    #[test]
    fn test_link_carries_url() {
        let classifier = Classifier::default();
        let link = node(NodeKind::Link, 10, 30);
        let decorations = classifier.decorate(&link, "[docs](https://x.io)", false);
        assert_eq!(
            summary(&decorations),
            vec![
                (10, 11, "hide".into()),
                (11, 15, "lp-link".into()),
                (15, 30, "hide".into())
            ]
        );
        assert_eq!(
            decorations[1].as_mark().and_then(|m| m.attr("data-url")),
            Some("https://x.io")
        );

        // Reference-style links aren't recognized.
        assert!(
            classifier
                .decorate(&node(NodeKind::Link, 0, 9), "[a][ref]x", false)
                .is_empty()
        );
    }

    #[test]
    fn test_blockquote_hides_each_prefix() {
        let classifier = Classifier::default();
        let quote = node(NodeKind::Blockquote, 0, 12);
        assert_eq!(
            summary(&classifier.decorate(&quote, "> one\n>> two", false)),
            vec![
                (0, 12, "lp-blockquote".into()),
                (0, 2, "hide".into()),
                (6, 9, "hide".into())
            ]
        );
        // Styled even while editing.
        assert_eq!(
            summary(&classifier.decorate(&quote, "> one\n>> two", true)),
            vec![(0, 12, "lp-blockquote".into())]
        );
    }

    #[test]
    fn test_rule_becomes_widget_outside() {
        let classifier = Classifier::default();
        let rule = node(NodeKind::HorizontalRule, 0, 3);
        let decorations = classifier.decorate(&rule, "---", false);
        assert_eq!(
            decorations[0].as_widget(),
            Some(&Widget::HorizontalRule)
        );
        assert!(classifier.decorate(&rule, "---", true).is_empty());
    }

    #[test]
    fn test_block_nodes_are_not_inline() {
        let classifier = Classifier::default();
        let table = node(NodeKind::Table, 0, 5);
        assert!(classifier.decorate(&table, "| a |", false).is_empty());
        assert_eq!(Recipe::for_kind(NodeKind::Table), Recipe::TableWidget);
    }
}
