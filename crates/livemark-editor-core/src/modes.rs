//! Live Preview and Reading bundles.
//!
//! A bundle is everything a host installs for one editor: the inline builder,
//! the table and code block fields, and the theme. The two modes differ only
//! in whether the cursor can reveal syntax.

use std::collections::BTreeMap;

use livemark_renderer::{ClassNames, ColorMode, Theme, live_preview_theme};
use smol_str::SmolStr;

use crate::code_block::CodeBlockField;
use crate::config::PreviewConfig;
use crate::decoration::DecorationSet;
use crate::inline::InlineDecorations;
use crate::render::{CodeBlockViews, Composition, compose};
use crate::state::{EditorState, ViewUpdate};
use crate::table::TableField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// Syntax under the cursor is revealed for editing.
    LivePreview,
    /// Always the clean preview.
    Reading,
}

impl PreviewMode {
    pub fn force_hidden(self) -> bool {
        matches!(self, Self::Reading)
    }
}

/// Which sets a call rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rebuilt {
    pub inline: bool,
    pub tables: bool,
    pub code_blocks: bool,
}

#[derive(Debug)]
pub struct PreviewExtensions {
    mode: PreviewMode,
    classes: ClassNames,
    theme: Theme,
    inline: InlineDecorations,
    tables: TableField,
    code_blocks: CodeBlockField,
}

impl PreviewExtensions {
    pub fn live_preview(state: &EditorState, config: &PreviewConfig) -> Self {
        Self::new(PreviewMode::LivePreview, state, config)
    }

    pub fn reading(state: &EditorState, config: &PreviewConfig) -> Self {
        Self::new(PreviewMode::Reading, state, config)
    }

    pub fn new(mode: PreviewMode, state: &EditorState, config: &PreviewConfig) -> Self {
        let classes = config.classes();
        let force_hidden = mode.force_hidden();
        let aliases: BTreeMap<SmolStr, SmolStr> = config.aliases();
        Self {
            mode,
            theme: live_preview_theme(config.color_mode.is_dark(), &classes),
            inline: InlineDecorations::new(state, classes.clone(), force_hidden),
            tables: TableField::new(state, force_hidden),
            code_blocks: CodeBlockField::new(state, config.color_mode, aliases, force_hidden),
            classes,
        }
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn classes(&self) -> &ClassNames {
        &self.classes
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn color_mode(&self) -> ColorMode {
        self.code_blocks.mode()
    }

    pub fn inline(&self) -> &InlineDecorations {
        &self.inline
    }

    pub fn tables(&self) -> &TableField {
        &self.tables
    }

    pub fn code_blocks(&self) -> &CodeBlockField {
        &self.code_blocks
    }

    /// The three sets, inline first.
    pub fn decoration_sets(&self) -> [&DecorationSet; 3] {
        [
            self.inline.decorations(),
            self.tables.decorations(),
            self.code_blocks.decorations(),
        ]
    }

    /// Run every builder whose triggers fired between `old` and `new`.
    pub fn update(&mut self, old: &EditorState, new: &EditorState) -> Rebuilt {
        let update = ViewUpdate::between(old, new);
        self.apply(new, &update)
    }

    pub fn apply(&mut self, state: &EditorState, update: &ViewUpdate) -> Rebuilt {
        let rebuilt = Rebuilt {
            inline: self.inline.update(state, update),
            tables: self.tables.update(state, update),
            code_blocks: self.code_blocks.update(state, update),
        };
        tracing::trace!(
            target: "livemark::decorate",
            ?update,
            ?rebuilt,
            "applied view update"
        );
        rebuilt
    }

    /// Switch light/dark. Only the theme and the code block set change.
    pub fn set_color_mode(&mut self, state: &EditorState, mode: ColorMode) {
        if mode == self.color_mode() {
            return;
        }
        self.theme = live_preview_theme(mode.is_dark(), &self.classes);
        self.code_blocks.set_color_mode(state, mode);
        tracing::debug!(
            target: "livemark::decorate",
            mode = mode.as_str(),
            "color mode changed"
        );
    }

    pub fn compose(&self, state: &EditorState) -> Composition {
        compose(state.doc(), self.decoration_sets())
    }

    pub fn render_html(&self, state: &EditorState, views: &impl CodeBlockViews) -> String {
        self.compose(state).to_html(&self.classes, views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_mode_switch_touches_only_code_blocks() {
        let state = EditorState::new("**a**\n\n```rs\nfn a() {}\n```\n\n| x |\n| - |\n| 1 |\n")
            .with_focus(false);
        let mut preview = PreviewExtensions::live_preview(&state, &PreviewConfig::default());
        let before = (preview.inline().builds(), preview.tables().builds());

        preview.set_color_mode(&state, ColorMode::Dark);

        assert_eq!(before, (preview.inline().builds(), preview.tables().builds()));
        assert_eq!(preview.code_blocks().builds(), 2);
        assert_eq!(preview.theme().mode, ColorMode::Dark);
        assert_eq!(preview.color_mode(), ColorMode::Dark);

        // Same mode again is a no-op.
        preview.set_color_mode(&state, ColorMode::Dark);
        assert_eq!(preview.code_blocks().builds(), 2);
    }

    #[test]
    fn test_reading_mode_flag() {
        assert!(PreviewMode::Reading.force_hidden());
        assert!(!PreviewMode::LivePreview.force_hidden());
    }
}
