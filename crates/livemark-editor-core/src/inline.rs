//! Line-scoped decoration builder.
//!
//! Walks the visible part of the tree once per triggering update and commits
//! hides and marks for every single-line construct. Tables and fenced code are
//! left to their fields.

use livemark_renderer::ClassNames;

use crate::classify::{Classifier, CursorOracle};
use crate::decoration::{DecorationSet, DecorationSetBuilder};
use crate::state::{EditorState, ViewUpdate};
use crate::syntax::Scope;

#[derive(Debug)]
pub struct InlineDecorations {
    classifier: Classifier,
    force_hidden: bool,
    set: DecorationSet,
    skipped: usize,
    builds: u64,
}

impl InlineDecorations {
    pub fn new(state: &EditorState, classes: ClassNames, force_hidden: bool) -> Self {
        let mut this = Self {
            classifier: Classifier::new(classes),
            force_hidden,
            set: DecorationSet::empty(),
            skipped: 0,
            builds: 0,
        };
        this.rebuild(state);
        this
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.set
    }

    /// Entries dropped by the last rebuild.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Rebuild if any of this builder's triggers fired. Returns whether it did.
    pub fn update(&mut self, state: &EditorState, update: &ViewUpdate) -> bool {
        if !update.affects_view() {
            return false;
        }
        self.rebuild(state);
        true
    }

    fn oracle(&self, state: &EditorState) -> CursorOracle {
        if self.force_hidden {
            CursorOracle::reading()
        } else {
            CursorOracle::live(state.selection().main(), state.is_focused())
        }
    }

    fn rebuild(&mut self, state: &EditorState) {
        let oracle = self.oracle(state);
        let viewport = state.viewport();
        let mut builder = DecorationSetBuilder::line_scoped();

        for node in state.tree().nodes() {
            if !node.touches(viewport.start, viewport.end) {
                continue;
            }
            if node.kind().map(|k| k.scope()) != Some(Scope::Inline) {
                continue;
            }
            let Some(text) = state.slice_doc(node.from, node.to) else {
                tracing::trace!(
                    target: "livemark::decorate",
                    node = %node.name,
                    from = node.from,
                    to = node.to,
                    "node span outside document, skipping"
                );
                continue;
            };
            let inside = oracle.is_inside(node.from, node.to);
            builder.extend(self.classifier.decorate(node, &text, inside));
        }

        let committed = builder.finish(state.doc());
        self.skipped = committed.skipped.len();
        self.builds += 1;
        tracing::trace!(
            target: "livemark::decorate",
            decorations = committed.set.len(),
            skipped = self.skipped,
            "rebuilt inline decorations"
        );
        self.set = committed.set;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectionSet;

    #[test]
    fn test_only_visible_nodes_are_decorated() {
        let text = "**a**\n\n**b**\n";
        let state = EditorState::new(text)
            .with_selection(SelectionSet::cursor(text.len()))
            .with_viewport(7..12);
        let inline = InlineDecorations::new(&state, ClassNames::default(), false);
        assert!(inline.decorations().iter().all(|d| d.from >= 7));
        assert_eq!(inline.decorations().len(), 3);
    }

    #[test]
    fn test_untriggered_update_keeps_set() {
        let state = EditorState::new("**a**");
        let mut inline = InlineDecorations::new(&state, ClassNames::default(), false);
        assert_eq!(inline.builds(), 1);
        assert!(!inline.update(&state, &ViewUpdate::default()));
        assert_eq!(inline.builds(), 1);
    }
}
