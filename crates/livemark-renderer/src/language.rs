//! Fence language normalization.
//!
//! Code fences are usually tagged with a file extension (`ts`, `py`). The
//! highlighter and the highlight cache key both want the canonical name, so
//! tags are normalized once before either sees them.

use std::collections::BTreeMap;

use smol_str::SmolStr;

/// Language tag that renders as a diagram instead of highlighted code.
pub const MERMAID: &str = "mermaid";

const ALIASES: &[(&str, &str)] = &[
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("mts", "typescript"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("py", "python"),
    ("py3", "python"),
    ("rs", "rust"),
    ("rb", "ruby"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("zsh", "bash"),
    ("console", "bash"),
    ("yml", "yaml"),
    ("md", "markdown"),
    ("kt", "kotlin"),
    ("cs", "csharp"),
    ("c#", "csharp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("c++", "cpp"),
    ("h", "c"),
    ("golang", "go"),
    ("htm", "html"),
    ("xhtml", "html"),
    ("jsonc", "json"),
    ("pl", "perl"),
    ("ps1", "powershell"),
    ("tex", "latex"),
    ("hs", "haskell"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("ml", "ocaml"),
    ("mmd", "mermaid"),
];

/// Normalize a fence language tag to the canonical highlighter id.
///
/// Lookup is case-insensitive. `extra` aliases win over the built-in table;
/// unknown tags pass through lowercased.
pub fn normalize_language(tag: &str, extra: &BTreeMap<SmolStr, SmolStr>) -> SmolStr {
    let lower = SmolStr::new(tag.trim().to_ascii_lowercase());
    if let Some(target) = extra.get(&lower) {
        return target.clone();
    }
    ALIASES
        .iter()
        .find(|(alias, _)| lower.as_str() == *alias)
        .map(|(_, canonical)| SmolStr::new_static(*canonical))
        .unwrap_or(lower)
}

/// Canonical ids the built-in alias table can produce.
pub fn builtin_languages() -> impl Iterator<Item = &'static str> {
    let mut targets: Vec<&'static str> = ALIASES.iter().map(|(_, canonical)| *canonical).collect();
    targets.sort_unstable();
    targets.dedup();
    targets.into_iter()
}

pub fn is_diagram_language(language: &str) -> bool {
    language == MERMAID
}
