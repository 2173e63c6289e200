//! Decoration model.
//!
//! A decoration tells the rendering layer to hide, style or replace a span of
//! the document without touching its text. Sets are immutable and rebuilt
//! wholesale; [`DecorationSetBuilder::finish`] sorts the collected entries and
//! drops the ones the rendering layer would reject, one at a time.

use std::ops::Range;

use smol_str::SmolStr;

use crate::code_block::CodeBlockWidget;
use crate::error::DecorationError;
use crate::table::TableWidget;
use crate::text::TextBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub class: SmolStr,
    pub attrs: Vec<(SmolStr, SmolStr)>,
}

impl Mark {
    pub fn class(class: impl Into<SmolStr>) -> Self {
        Self {
            class: class.into(),
            attrs: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Rendered replacement for raw syntax.
///
/// Equality is structural, which is what lets the host reuse an already
/// mounted widget instead of rebuilding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    HorizontalRule,
    Table(TableWidget),
    CodeBlock(CodeBlockWidget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationKind {
    /// Zero-width replacement: the span disappears.
    Hide,
    Mark(Mark),
    /// Replace the span with a widget. `block` widgets affect line layout.
    Replace { widget: Widget, block: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn hide(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            kind: DecorationKind::Hide,
        }
    }

    pub fn mark(from: usize, to: usize, mark: Mark) -> Self {
        Self {
            from,
            to,
            kind: DecorationKind::Mark(mark),
        }
    }

    pub fn widget(from: usize, to: usize, widget: Widget, block: bool) -> Self {
        Self {
            from,
            to,
            kind: DecorationKind::Replace { widget, block },
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    /// Hides and widgets both replace their span.
    pub fn is_replace(&self) -> bool {
        !matches!(self.kind, DecorationKind::Mark(_))
    }

    pub fn as_mark(&self) -> Option<&Mark> {
        match &self.kind {
            DecorationKind::Mark(mark) => Some(mark),
            _ => None,
        }
    }

    pub fn as_widget(&self) -> Option<&Widget> {
        match &self.kind {
            DecorationKind::Replace { widget, .. } => Some(widget),
            _ => None,
        }
    }
}

/// Immutable, sorted decorations. Replacing entries never overlap each
/// other; marks may nest around them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    entries: Vec<Decoration>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Decoration] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decoration> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn widgets(&self) -> impl Iterator<Item = (Range<usize>, &Widget)> {
        self.entries
            .iter()
            .filter_map(|d| d.as_widget().map(|w| (d.range(), w)))
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Result of committing a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Committed {
    pub set: DecorationSet,
    pub skipped: Vec<DecorationError>,
}

/// Collects entries in any order and commits them as a [`DecorationSet`].
#[derive(Debug, Default)]
pub struct DecorationSetBuilder {
    entries: Vec<Decoration>,
    line_scoped: bool,
}

impl DecorationSetBuilder {
    /// Builder for a set that may not replace across line breaks.
    pub fn line_scoped() -> Self {
        Self {
            entries: Vec::new(),
            line_scoped: true,
        }
    }

    /// Builder for block-level sets (tables, code blocks).
    pub fn block() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decoration: Decoration) {
        self.entries.push(decoration);
    }

    pub fn extend(&mut self, decorations: impl IntoIterator<Item = Decoration>) {
        self.entries.extend(decorations);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort by `(from, to)` and drop entries that can't be committed.
    pub fn finish(mut self, doc: &impl TextBuffer) -> Committed {
        // Stable: ties keep push order, so rebuilds are deterministic.
        let mut entries = std::mem::take(&mut self.entries);
        entries.sort_by_key(|d| (d.from, d.to));

        let len = doc.len_bytes();
        let mut accepted = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();
        let mut replace_end = 0usize;

        for decoration in entries {
            match self.check(&decoration, doc, len, replace_end) {
                Ok(()) => {
                    if decoration.is_replace() {
                        replace_end = decoration.to;
                    }
                    accepted.push(decoration);
                }
                Err(err) => {
                    tracing::debug!(
                        target: "livemark::decorate",
                        error = %err,
                        "skipping decoration"
                    );
                    skipped.push(err);
                }
            }
        }

        Committed {
            set: DecorationSet { entries: accepted },
            skipped,
        }
    }

    fn check(
        &self,
        decoration: &Decoration,
        doc: &impl TextBuffer,
        len: usize,
        replace_end: usize,
    ) -> Result<(), DecorationError> {
        let (from, to) = (decoration.from, decoration.to);
        if from > to || to > len {
            return Err(DecorationError::OutOfBounds { from, to, len });
        }
        if from == to {
            return Err(DecorationError::Empty { at: from });
        }
        if decoration.is_replace() {
            if from < replace_end {
                return Err(DecorationError::Overlapping {
                    from,
                    to,
                    previous_end: replace_end,
                });
            }
            if self.line_scoped && doc.spans_line_break(from..to) {
                return Err(DecorationError::CrossesLineBreak { from, to });
            }
        }
        Ok(())
    }
}
