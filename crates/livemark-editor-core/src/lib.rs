//! livemark-editor-core: cursor-aware live preview decorations for markdown.
//!
//! This crate provides:
//! - `TextBuffer` trait and the ropey-backed `EditorRope`
//! - `EditorState` snapshots and `ViewUpdate` change flags
//! - `SyntaxTree` seam with the pulldown-cmark backed `MarkdownTree`
//! - Node classification and the cursor-adjacency rule
//! - The inline builder plus table and code block fields
//! - `PreviewExtensions` bundles (Live Preview, Reading), the widget host
//!   and a compositor for rendering the result

pub mod classify;
pub mod code_block;
pub mod config;
pub mod decoration;
pub mod error;
pub mod host;
pub mod inline;
pub mod modes;
pub mod render;
pub mod state;
pub mod syntax;
pub mod table;
pub mod text;
pub mod types;

pub use classify::{Classifier, CursorOracle, Recipe};
pub use code_block::{CodeBlockField, CodeBlockWidget, FencedCode, MountedCodeBlock};
pub use config::PreviewConfig;
pub use decoration::{
    Committed, Decoration, DecorationKind, DecorationSet, DecorationSetBuilder, Mark, Widget,
};
pub use error::{ConfigError, DecorationError};
pub use host::{SyncReport, WidgetHost};
pub use inline::InlineDecorations;
pub use modes::{PreviewExtensions, PreviewMode, Rebuilt};
pub use render::{CodeBlockViews, Composition, Segment, compose};
pub use smol_str::SmolStr;
pub use state::{EditorState, ViewUpdate};
pub use syntax::{MarkdownTree, NodeKind, Scope, SyntaxNode, SyntaxTree};
pub use table::{Alignment, TableField, TableWidget};
pub use text::{EditorRope, TextBuffer};
pub use types::{Selection, SelectionSet};
