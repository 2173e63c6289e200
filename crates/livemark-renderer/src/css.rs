use std::fmt::Write;

use crate::theme::Theme;

/// Render a theme to a stylesheet.
///
/// The variables block mirrors the palette so hosts can reuse the colors in
/// their own chrome; the rules follow in theme order. Variables share the
/// class prefix.
pub fn generate_theme_css(theme: &Theme) -> String {
    let colors = &theme.colors;
    let fonts = &theme.fonts;

    let prefix = theme.classes.prefix();

    // Writing into a String can't fail.
    let mut css = format!("/* Live preview ({}) */\n:root {{\n", theme.mode.as_str());
    for (name, value) in [
        ("color-base", &colors.background),
        ("color-text", &colors.foreground),
        ("color-muted", &colors.muted),
        ("color-surface", &colors.surface),
        ("color-border", &colors.border),
        ("color-link", &colors.link),
    ] {
        let _ = writeln!(css, "    --{prefix}-{name}: {value};");
    }
    css.push('\n');
    for (name, value) in [
        ("font-body", &fonts.body),
        ("font-heading", &fonts.heading),
        ("font-mono", &fonts.monospace),
    ] {
        let _ = writeln!(css, "    --{prefix}-{name}: {value};");
    }
    css.push_str("}\n");

    for rule in theme.rules() {
        let _ = writeln!(css, "\n{} {{", rule.selector);
        for (property, value) in &rule.declarations {
            let _ = writeln!(css, "    {property}: {value};");
        }
        css.push('}');
        css.push('\n');
    }

    css
}

impl Theme {
    pub fn to_css(&self) -> String {
        generate_theme_css(self)
    }
}
