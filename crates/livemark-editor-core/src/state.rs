//! Editor snapshots and the change flags derived from two of them.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::syntax::{MarkdownTree, SyntaxTree};
use crate::text::{EditorRope, TextBuffer, strip_container_prefix};
use crate::types::SelectionSet;

/// Immutable editor snapshot: document, selection, parse tree, focus and
/// visible range.
///
/// Every `with_*` method returns a new snapshot; the document and tree are
/// shared with the original.
#[derive(Clone)]
pub struct EditorState {
    doc: EditorRope,
    selection: SelectionSet,
    tree: Arc<dyn SyntaxTree>,
    focused: bool,
    viewport: Option<Range<usize>>,
    doc_version: u64,
}

impl fmt::Debug for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorState")
            .field("len", &self.doc.len_bytes())
            .field("selection", &self.selection)
            .field("focused", &self.focused)
            .field("viewport", &self.viewport)
            .field("doc_version", &self.doc_version)
            .finish_non_exhaustive()
    }
}

impl EditorState {
    /// Parse `text` with the bundled markdown tree. Starts focused with the
    /// cursor at 0 and the whole document visible.
    pub fn new(text: &str) -> Self {
        Self::with_parsed(text, Arc::new(MarkdownTree::parse(text)))
    }

    /// Use a tree from another provider.
    pub fn with_parsed(text: &str, tree: Arc<dyn SyntaxTree>) -> Self {
        Self {
            doc: EditorRope::from(text),
            selection: SelectionSet::default(),
            tree,
            focused: true,
            viewport: None,
            doc_version: 0,
        }
    }

    pub fn doc(&self) -> &EditorRope {
        &self.doc
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn tree(&self) -> &Arc<dyn SyntaxTree> {
        &self.tree
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Visible byte range, clamped to the document.
    pub fn viewport(&self) -> Range<usize> {
        let len = self.doc.len_bytes();
        match &self.viewport {
            Some(range) => range.start.min(len)..range.end.min(len),
            None => 0..len,
        }
    }

    pub fn doc_version(&self) -> u64 {
        self.doc_version
    }

    pub fn slice_doc(&self, from: usize, to: usize) -> Option<SmolStr> {
        self.doc.slice(from..to)
    }

    /// Text of a block node with the container prefixes of its continuation
    /// lines removed, so a quoted or list-nested block reads like a top-level
    /// one.
    pub fn block_text(&self, from: usize, to: usize) -> Option<String> {
        let text = self.doc.slice(from..to)?;
        let column = from - self.doc.line_range(from)?.start;
        Some(strip_container_prefix(&text, column))
    }

    pub fn with_selection(&self, selection: SelectionSet) -> Self {
        Self {
            selection: selection.clamp(self.doc.len_bytes()),
            ..self.clone()
        }
    }

    pub fn with_focus(&self, focused: bool) -> Self {
        Self {
            focused,
            ..self.clone()
        }
    }

    pub fn with_viewport(&self, viewport: Range<usize>) -> Self {
        Self {
            viewport: Some(viewport),
            ..self.clone()
        }
    }

    /// Swap in a tree for the same document, e.g. after an incremental
    /// parser finished more of it.
    pub fn with_tree(&self, tree: Arc<dyn SyntaxTree>) -> Self {
        Self {
            tree,
            ..self.clone()
        }
    }

    /// Replace `range` with `text`, re-parse and map the selection through
    /// the change. Returns `None` if `range` is not valid for the document.
    pub fn apply_change(&self, range: Range<usize>, text: &str) -> Option<Self> {
        let mut doc = self.doc.clone();
        if !doc.replace(range.clone(), text) {
            tracing::debug!(
                target: "livemark::decorate",
                from = range.start,
                to = range.end,
                len = self.doc.len_bytes(),
                "rejected change outside the document"
            );
            return None;
        }
        let source = doc.to_string();
        let selection = self
            .selection
            .map_through(&range, text.len())
            .clamp(doc.len_bytes());
        Some(Self {
            tree: Arc::new(MarkdownTree::parse(&source)),
            doc,
            selection,
            focused: self.focused,
            viewport: self.viewport.clone(),
            doc_version: self.doc_version + 1,
        })
    }
}

/// What changed between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub doc_changed: bool,
    pub selection_set: bool,
    pub viewport_changed: bool,
    pub focus_changed: bool,
    pub tree_changed: bool,
}

impl ViewUpdate {
    pub fn between(old: &EditorState, new: &EditorState) -> Self {
        Self {
            doc_changed: old.doc_version != new.doc_version,
            selection_set: old.selection != new.selection,
            viewport_changed: old.viewport() != new.viewport(),
            focus_changed: old.focused != new.focused,
            tree_changed: !Arc::ptr_eq(&old.tree, &new.tree),
        }
    }

    /// Inline builder triggers.
    pub fn affects_view(&self) -> bool {
        self.doc_changed
            || self.selection_set
            || self.viewport_changed
            || self.focus_changed
            || self.tree_changed
    }

    /// Table and code block field triggers. Viewport and focus don't count.
    pub fn affects_fields(&self) -> bool {
        self.doc_changed || self.selection_set || self.tree_changed
    }
}
