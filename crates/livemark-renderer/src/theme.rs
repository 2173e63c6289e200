//! Theme factory for live preview decorations.
//!
//! Every class name the decoration builders emit gets a style rule here, so a
//! host can install the result of [`live_preview_theme`] next to the decoration
//! sets and have the preview render correctly in either color mode.

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

/// Light or dark appearance.
///
/// Part of the highlight cache key, since highlighted markup bakes the
/// syntect theme colors in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Class-name scheme shared by the builders, the compositor and the theme.
///
/// All classes are `{prefix}-{suffix}`, e.g. `lp-strong`, `lp-heading-2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassNames {
    prefix: SmolStr,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::new("lp")
    }
}

impl ClassNames {
    pub fn new(prefix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn class(&self, suffix: &str) -> SmolStr {
        format_smolstr!("{}-{}", self.prefix, suffix)
    }

    pub fn strong(&self) -> SmolStr {
        self.class("strong")
    }

    pub fn emphasis(&self) -> SmolStr {
        self.class("emphasis")
    }

    pub fn strikethrough(&self) -> SmolStr {
        self.class("strikethrough")
    }

    pub fn inline_code(&self) -> SmolStr {
        self.class("inline-code")
    }

    /// Heading class for levels 1 through 6. Out-of-range levels are clamped.
    pub fn heading(&self, level: u8) -> SmolStr {
        format_smolstr!("{}-heading-{}", self.prefix, level.clamp(1, 6))
    }

    pub fn link(&self) -> SmolStr {
        self.class("link")
    }

    pub fn blockquote(&self) -> SmolStr {
        self.class("blockquote")
    }

    pub fn hr_widget(&self) -> SmolStr {
        self.class("hr-widget")
    }

    pub fn table_widget(&self) -> SmolStr {
        self.class("table-widget")
    }

    /// `code-block-{part}`: `container`, `lang`, `pre`, `diagram`, `error`.
    pub fn code_block(&self, part: &str) -> SmolStr {
        format_smolstr!("{}-code-block-{}", self.prefix, part)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub background: SmolStr,
    pub foreground: SmolStr,
    pub muted: SmolStr,
    pub surface: SmolStr,
    pub border: SmolStr,
    pub link: SmolStr,
    pub heading: SmolStr,
    pub quote: SmolStr,
    pub error: SmolStr,
}

impl ColorScheme {
    pub fn light() -> Self {
        Self {
            background: SmolStr::new("#faf4ed"),
            foreground: SmolStr::new("#2b303b"),
            muted: SmolStr::new("#9893a5"),
            surface: SmolStr::new("#f2e9e1"),
            border: SmolStr::new("#dfdad9"),
            link: SmolStr::new("#286983"),
            heading: SmolStr::new("#575279"),
            quote: SmolStr::new("#797593"),
            error: SmolStr::new("#b4637a"),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: SmolStr::new("#191724"),
            foreground: SmolStr::new("#e0def4"),
            muted: SmolStr::new("#6e6a86"),
            surface: SmolStr::new("#1f1d2e"),
            border: SmolStr::new("#403d52"),
            link: SmolStr::new("#9ccfd8"),
            heading: SmolStr::new("#c4a7e7"),
            quote: SmolStr::new("#908caa"),
            error: SmolStr::new("#eb6f92"),
        }
    }

    pub fn for_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Light => Self::light(),
            ColorMode::Dark => Self::dark(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontScheme {
    pub body: SmolStr,
    pub heading: SmolStr,
    pub monospace: SmolStr,
}

impl Default for FontScheme {
    fn default() -> Self {
        Self {
            body: SmolStr::new(
                "IBM Plex, system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif",
            ),
            heading: SmolStr::new(
                "IBM Plex Sans, system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif",
            ),
            monospace: SmolStr::new(
                "'IBM Plex Mono', 'Berkeley Mono', 'Cascadia Code', 'Roboto Mono', Consolas, monospace",
            ),
        }
    }
}

/// A single selector with its declarations, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector: SmolStr,
    pub declarations: Vec<(SmolStr, SmolStr)>,
}

impl StyleRule {
    fn new(selector: impl Into<SmolStr>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
        }
    }

    fn decl(mut self, property: &str, value: impl Into<SmolStr>) -> Self {
        self.declarations.push((SmolStr::new(property), value.into()));
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub mode: ColorMode,
    pub colors: ColorScheme,
    pub fonts: FontScheme,
    pub classes: ClassNames,
    rules: Vec<StyleRule>,
}

impl Theme {
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Look up the rule for a class (without the leading dot).
    pub fn rule_for_class(&self, class: &str) -> Option<&StyleRule> {
        self.rules
            .iter()
            .find(|r| r.selector.strip_prefix('.') == Some(class))
    }
}

const HEADING_SIZES: [&str; 6] = ["2em", "1.6em", "1.35em", "1.2em", "1.1em", "1em"];

/// Build the theme for the given appearance.
pub fn live_preview_theme(dark: bool, classes: &ClassNames) -> Theme {
    let mode = ColorMode::from_dark_flag(dark);
    let colors = ColorScheme::for_mode(mode);
    let fonts = FontScheme::default();
    let sel = |class: SmolStr| format_smolstr!(".{}", class);

    let mut rules = vec![
        StyleRule::new(sel(classes.strong())).decl("font-weight", "700"),
        StyleRule::new(sel(classes.emphasis())).decl("font-style", "italic"),
        StyleRule::new(sel(classes.strikethrough())).decl("text-decoration", "line-through"),
        StyleRule::new(sel(classes.inline_code()))
            .decl("font-family", fonts.monospace.clone())
            .decl("background", colors.surface.clone())
            .decl("padding", "0.1em 0.25em")
            .decl("border-radius", "4px")
            .decl("font-size", "0.9em"),
    ];

    for (idx, size) in HEADING_SIZES.iter().enumerate() {
        rules.push(
            StyleRule::new(sel(classes.heading(idx as u8 + 1)))
                .decl("font-family", fonts.heading.clone())
                .decl("font-size", *size)
                .decl("font-weight", "600")
                .decl("color", colors.heading.clone()),
        );
    }

    rules.extend([
        StyleRule::new(sel(classes.link()))
            .decl("color", colors.link.clone())
            .decl("text-decoration", "underline")
            .decl("cursor", "pointer"),
        StyleRule::new(sel(classes.blockquote()))
            .decl("color", colors.quote.clone())
            .decl("border-left", format_smolstr!("2px solid {}", colors.border))
            .decl("padding-left", "0.75rem"),
        StyleRule::new(sel(classes.hr_widget()))
            .decl("border", "none")
            .decl("border-top", format_smolstr!("1px solid {}", colors.border))
            .decl("margin", "0.75rem 0"),
        StyleRule::new(sel(classes.table_widget()))
            .decl("border-collapse", "collapse")
            .decl("margin", "0.5rem 0"),
        StyleRule::new(format_smolstr!(
            ".{0} th, .{0} td",
            classes.table_widget()
        ))
        .decl("border", format_smolstr!("1px solid {}", colors.border))
        .decl("padding", "0.25rem 0.5rem"),
        StyleRule::new(format_smolstr!(".{} th", classes.table_widget()))
            .decl("background", colors.surface.clone())
            .decl("font-weight", "600"),
        StyleRule::new(sel(classes.code_block("container")))
            .decl("position", "relative")
            .decl("margin", "0.5rem 0")
            .decl("border", format_smolstr!("1px solid {}", colors.border))
            .decl("border-radius", "5px")
            .decl("background", colors.surface.clone()),
        StyleRule::new(sel(classes.code_block("lang")))
            .decl("position", "absolute")
            .decl("top", "0.25rem")
            .decl("right", "0.5rem")
            .decl("font-size", "0.75em")
            .decl("color", colors.muted.clone()),
        StyleRule::new(sel(classes.code_block("pre")))
            .decl("font-family", fonts.monospace.clone())
            .decl("padding", "0.75rem 1rem")
            .decl("margin", "0")
            .decl("overflow-x", "auto"),
        StyleRule::new(sel(classes.code_block("diagram")))
            .decl("display", "flex")
            .decl("justify-content", "center")
            .decl("padding", "0.75rem"),
        StyleRule::new(sel(classes.code_block("error")))
            .decl("color", colors.error.clone())
            .decl("font-family", fonts.monospace.clone())
            .decl("padding", "0.5rem 1rem")
            .decl("white-space", "pre-wrap"),
    ]);

    Theme {
        mode,
        colors,
        fonts,
        classes: classes.clone(),
        rules,
    }
}
