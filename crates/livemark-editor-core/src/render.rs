//! Compositor: merges decoration sets over the document.
//!
//! Stands in for the editor view. Produces a flat list of visible text runs
//! (with the marks covering them) and widgets, which can be rendered to HTML
//! or flattened to the text a reader would see.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use livemark_renderer::{ClassNames, escape_html};
use smol_str::SmolStr;

use crate::code_block::CodeBlockWidget;
use crate::decoration::{Decoration, DecorationKind, DecorationSet, Mark, Widget};
use crate::host::WidgetHost;
use crate::text::TextBuffer;

/// Provides current markup for mounted code block views.
///
/// Without one, code blocks render as their plain scaffold.
pub trait CodeBlockViews {
    /// Returns `Some(html)` if a view for `widget` is mounted.
    fn code_block_html(&self, widget: &CodeBlockWidget, classes: &ClassNames) -> Option<String>;
}

/// Unit type implementation - nothing mounted.
impl CodeBlockViews for () {
    fn code_block_html(&self, _widget: &CodeBlockWidget, _classes: &ClassNames) -> Option<String> {
        None
    }
}

impl<T: CodeBlockViews> CodeBlockViews for &T {
    fn code_block_html(&self, widget: &CodeBlockWidget, classes: &ClassNames) -> Option<String> {
        (*self).code_block_html(widget, classes)
    }
}

impl<T: CodeBlockViews> CodeBlockViews for Option<T> {
    fn code_block_html(&self, widget: &CodeBlockWidget, classes: &ClassNames) -> Option<String> {
        self.as_ref()
            .and_then(|views| views.code_block_html(widget, classes))
    }
}

impl<H, D> CodeBlockViews for WidgetHost<H, D>
where
    H: livemark_renderer::Highlighter + 'static,
    D: livemark_renderer::DiagramRenderer + 'static,
{
    fn code_block_html(&self, widget: &CodeBlockWidget, classes: &ClassNames) -> Option<String> {
        self.html_for(widget, classes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Visible document text starting at `from`, with the marks covering it
    /// (outermost first).
    Text {
        from: usize,
        text: SmolStr,
        marks: Vec<Mark>,
    },
    Widget {
        from: usize,
        to: usize,
        widget: Widget,
        block: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    segments: Vec<Segment>,
}

/// Merge `sets` over `doc`.
///
/// Replacements from different sets are not checked against each other when
/// the sets are built; if two overlap here, the earlier one wins.
pub fn compose<'a>(
    doc: &impl TextBuffer,
    sets: impl IntoIterator<Item = &'a DecorationSet>,
) -> Composition {
    let len = doc.len_bytes();
    let mut replaces: Vec<&Decoration> = Vec::new();
    let mut marks: Vec<&Decoration> = Vec::new();
    for decoration in sets.into_iter().flat_map(|set| set.iter()) {
        if decoration.to > len {
            continue;
        }
        if decoration.is_replace() {
            replaces.push(decoration);
        } else {
            marks.push(decoration);
        }
    }
    replaces.sort_by_key(|d| (d.from, d.to));
    // Outer marks (earlier start, later end) open first.
    marks.sort_by(|a, b| a.from.cmp(&b.from).then(b.to.cmp(&a.to)));

    let mut kept: Vec<&Decoration> = Vec::with_capacity(replaces.len());
    for decoration in replaces {
        if kept.last().is_some_and(|last| decoration.from < last.to) {
            tracing::trace!(
                target: "livemark::decorate",
                from = decoration.from,
                to = decoration.to,
                "replacement overlaps another set, dropping"
            );
            continue;
        }
        kept.push(decoration);
    }

    let mut boundaries = BTreeSet::from([0, len]);
    for decoration in kept.iter().chain(marks.iter()) {
        boundaries.insert(decoration.from);
        boundaries.insert(decoration.to);
    }

    let mut segments = Vec::new();
    let mut replaces = kept.into_iter().peekable();
    let mut pos = 0;
    while pos < len {
        if let Some(replace) = replaces.next_if(|r| r.from == pos) {
            if let DecorationKind::Replace { widget, block } = &replace.kind {
                segments.push(Segment::Widget {
                    from: replace.from,
                    to: replace.to,
                    widget: widget.clone(),
                    block: *block,
                });
            }
            pos = replace.to;
            continue;
        }

        let next = boundaries.range(pos + 1..).next().copied().unwrap_or(len);
        if let Some(text) = doc.slice(pos..next) {
            let covering = marks
                .iter()
                .filter(|m| m.from <= pos && m.to >= next)
                .filter_map(|m| m.as_mark().cloned())
                .collect();
            segments.push(Segment::Text {
                from: pos,
                text,
                marks: covering,
            });
        }
        pos = next;
    }

    Composition { segments }
}

impl Composition {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Text a reader sees, widgets excluded.
    pub fn visible_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text { text, .. } => Some(text.as_str()),
                Segment::Widget { .. } => None,
            })
            .collect()
    }

    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Widget { widget, .. } => Some(widget),
            Segment::Text { .. } => None,
        })
    }

    pub fn to_html(&self, classes: &ClassNames, views: &impl CodeBlockViews) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text { text, marks, .. } => {
                    for mark in marks {
                        write_open_span(&mut html, mark);
                    }
                    html.push_str(&escape_html(text));
                    for _ in marks {
                        html.push_str("</span>");
                    }
                }
                Segment::Widget { widget, .. } => match widget {
                    Widget::HorizontalRule => {
                        let _ = write!(html, "<hr class=\"{}\">", classes.hr_widget());
                    }
                    Widget::Table(table) => html.push_str(&table.to_html(classes)),
                    Widget::CodeBlock(code) => html.push_str(
                        &views
                            .code_block_html(code, classes)
                            .unwrap_or_else(|| code.scaffold_html(classes)),
                    ),
                },
            }
        }
        html
    }
}

fn write_open_span(html: &mut String, mark: &Mark) {
    let _ = write!(html, "<span class=\"{}\"", escape_html(&mark.class));
    for (name, value) in &mark.attrs {
        let _ = write!(html, " {}=\"{}\"", name, escape_html(value));
    }
    html.push('>');
}
