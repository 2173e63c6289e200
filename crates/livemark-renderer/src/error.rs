use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HighlightError {
    #[error("no syntax definition for language `{0}`")]
    #[diagnostic(code(livemark::highlight::unknown_language))]
    UnknownLanguage(SmolStr),

    #[error("unknown highlight theme `{0}`")]
    #[diagnostic(code(livemark::highlight::unknown_theme))]
    UnknownTheme(SmolStr),

    #[error("highlighter failed: {0}")]
    #[diagnostic(code(livemark::highlight::backend))]
    Backend(String, #[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Error, Diagnostic)]
pub enum DiagramError {
    #[error("diagram rendering is not available")]
    #[diagnostic(code(livemark::diagram::unavailable))]
    Unavailable,

    #[error("diagram failed to render: {0}")]
    #[diagnostic(code(livemark::diagram::render))]
    Render(String),
}
