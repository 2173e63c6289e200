use miette::Diagnostic;
use thiserror::Error;

/// Why a single decoration entry was dropped while committing a set.
///
/// These never abort a rebuild; they are logged and collected so callers
/// (and tests) can see what was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DecorationError {
    #[error("decoration {from}..{to} is outside the document (len {len})")]
    #[diagnostic(code(livemark::decorate::out_of_bounds))]
    OutOfBounds { from: usize, to: usize, len: usize },

    #[error("empty decoration at {at}")]
    #[diagnostic(code(livemark::decorate::empty))]
    Empty { at: usize },

    #[error("replacement {from}..{to} overlaps an earlier replacement ending at {previous_end}")]
    #[diagnostic(code(livemark::decorate::overlap))]
    Overlapping {
        from: usize,
        to: usize,
        previous_end: usize,
    },

    #[error("replacement {from}..{to} crosses a line break in a line-scoped set")]
    #[diagnostic(
        code(livemark::decorate::line_break),
        help("multi-line constructs belong in a block-level decoration set")
    )]
    CrossesLineBreak { from: usize, to: usize },
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read preview configuration")]
    #[diagnostic(code(livemark::config::io))]
    Io(#[from] std::io::Error),

    #[error("invalid preview configuration")]
    #[diagnostic(code(livemark::config::parse))]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize preview configuration")]
    #[diagnostic(code(livemark::config::serialize))]
    Serialize(#[from] toml::ser::Error),

    #[error("class prefix `{0}` must be a non-empty CSS identifier")]
    #[diagnostic(code(livemark::config::class_prefix))]
    InvalidClassPrefix(String),
}
