//! syntect-backed code highlighting.

use std::future::Future;

use smol_str::SmolStr;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::error::HighlightError;
use crate::highlight::Highlighter;
use crate::theme::ColorMode;

pub const DEFAULT_LIGHT_THEME: &str = "InspiredGitHub";
pub const DEFAULT_DARK_THEME: &str = "base16-ocean.dark";

/// Canonical ids with no syntax of their own in syntect's bundled set,
/// mapped to a token it does know.
const SYNTAX_FALLBACKS: &[(&str, &str)] = &[
    ("csharp", "cs"),
    ("typescript", "js"),
    ("kotlin", "java"),
    ("powershell", "bash"),
    ("elixir", "rb"),
];

/// Highlights with syntect's bundled syntaxes and themes, emitting inline
/// styles so the result carries the color mode with it.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    light_theme: SmolStr,
    dark_theme: SmolStr,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_LIGHT_THEME, DEFAULT_DARK_THEME)
    }
}

impl std::fmt::Debug for SyntectHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntectHighlighter")
            .field("light_theme", &self.light_theme)
            .field("dark_theme", &self.dark_theme)
            .finish_non_exhaustive()
    }
}

impl SyntectHighlighter {
    pub fn new(light_theme: impl Into<SmolStr>, dark_theme: impl Into<SmolStr>) -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
            light_theme: light_theme.into(),
            dark_theme: dark_theme.into(),
        }
    }

    fn syntax_for(&self, language: &str) -> Option<&SyntaxReference> {
        if matches!(language, "" | "text" | "plaintext" | "txt") {
            return Some(self.syntaxes.find_syntax_plain_text());
        }
        // Tokens match an extension, then a syntax name, case-insensitively.
        self.syntaxes
            .find_syntax_by_token(language)
            .or_else(|| {
                let (_, token) = SYNTAX_FALLBACKS
                    .iter()
                    .find(|(canonical, _)| *canonical == language)?;
                self.syntaxes.find_syntax_by_token(token)
            })
    }

    /// Highlight synchronously. `language` should already be normalized.
    pub fn highlight_sync(
        &self,
        code: &str,
        language: &str,
        mode: ColorMode,
    ) -> Result<String, HighlightError> {
        let syntax = self
            .syntax_for(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(SmolStr::new(language)))?;
        let theme_name = match mode {
            ColorMode::Light => &self.light_theme,
            ColorMode::Dark => &self.dark_theme,
        };
        let theme = self
            .themes
            .themes
            .get(theme_name.as_str())
            .ok_or_else(|| HighlightError::UnknownTheme(theme_name.clone()))?;

        highlighted_html_for_string(code, &self.syntaxes, syntax, theme)
            .map_err(|e| HighlightError::Backend(e.to_string(), Box::new(e)))
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(
        &self,
        code: &str,
        language: &str,
        mode: ColorMode,
    ) -> impl Future<Output = Result<String, HighlightError>> + Send {
        std::future::ready(self.highlight_sync(code, language, mode))
    }
}
