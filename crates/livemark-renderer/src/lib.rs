//! livemark-renderer
//!
//! Rendering-side pieces of the live preview: the theme factory and its CSS,
//! the decoration class-name scheme, fence language normalization, and the
//! cached async highlight pipeline used by code block widgets.

#[cfg(feature = "syntax-highlighting")]
pub mod code_pretty;
pub mod css;
pub mod diagram;
pub mod error;
pub mod highlight;
pub mod language;
pub mod theme;

#[cfg(feature = "syntax-highlighting")]
pub use code_pretty::SyntectHighlighter;
pub use css::generate_theme_css;
pub use diagram::DiagramRenderer;
pub use error::{DiagramError, HighlightError};
pub use highlight::{
    HighlightCache, HighlightKey, HighlightService, HighlightTask, Highlighter, Lookup,
    PendingRender, Rendered,
};
pub use language::{MERMAID, builtin_languages, is_diagram_language, normalize_language};
pub use theme::{
    ClassNames, ColorMode, ColorScheme, FontScheme, StyleRule, Theme, live_preview_theme,
};

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String is infallible.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}
