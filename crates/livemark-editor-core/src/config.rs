use std::collections::BTreeMap;
use std::path::Path;

use livemark_renderer::{ClassNames, ColorMode};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;

/// Live preview settings.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```toml
/// class_prefix = "md"
/// color_mode = "dark"
///
/// [language_aliases]
/// hbs = "handlebars"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Prefix for every decoration class, e.g. `lp` gives `lp-strong`.
    pub class_prefix: SmolStr,
    pub color_mode: ColorMode,
    /// syntect theme used in light mode.
    pub light_theme: SmolStr,
    /// syntect theme used in dark mode.
    pub dark_theme: SmolStr,
    /// Extra fence language aliases, checked before the built-in table.
    pub language_aliases: BTreeMap<SmolStr, SmolStr>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            class_prefix: SmolStr::new_static("lp"),
            color_mode: ColorMode::Light,
            light_theme: SmolStr::new_static("InspiredGitHub"),
            dark_theme: SmolStr::new_static("base16-ocean.dark"),
            language_aliases: BTreeMap::new(),
        }
    }
}

impl PreviewConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        tracing::debug!(
            target: "livemark::config",
            prefix = %config.class_prefix,
            mode = config.color_mode.as_str(),
            aliases = config.language_aliases.len(),
            "loaded preview config"
        );
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// The prefix must work as the start of a CSS class name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.class_prefix.as_str();
        let valid = prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidClassPrefix(prefix.to_string()))
        }
    }

    pub fn classes(&self) -> ClassNames {
        ClassNames::new(self.class_prefix.clone())
    }

    /// Lowercased alias table, as `normalize_language` expects.
    pub fn aliases(&self) -> BTreeMap<SmolStr, SmolStr> {
        self.language_aliases
            .iter()
            .map(|(alias, target)| {
                (
                    SmolStr::new(alias.to_ascii_lowercase()),
                    SmolStr::new(target.to_ascii_lowercase()),
                )
            })
            .collect()
    }

    #[cfg(feature = "syntax-highlighting")]
    pub fn highlighter(&self) -> livemark_renderer::SyntectHighlighter {
        livemark_renderer::SyntectHighlighter::new(
            self.light_theme.clone(),
            self.dark_theme.clone(),
        )
    }
}
