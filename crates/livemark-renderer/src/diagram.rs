//! Diagram rendering seam for `mermaid` fences.
//!
//! The actual diagram engine lives in the host (it usually needs a JS
//! runtime). Implementations return SVG/HTML markup for a diagram source.

use std::future::Future;

use crate::error::DiagramError;
use crate::theme::ColorMode;

pub trait DiagramRenderer: Send + Sync {
    /// Render diagram source to markup.
    fn render_diagram(
        &self,
        source: &str,
        mode: ColorMode,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send;
}

/// Unit type implementation - no diagram engine.
impl DiagramRenderer for () {
    fn render_diagram(
        &self,
        _source: &str,
        _mode: ColorMode,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send {
        std::future::ready(Err(DiagramError::Unavailable))
    }
}

impl<T: DiagramRenderer> DiagramRenderer for &T {
    fn render_diagram(
        &self,
        source: &str,
        mode: ColorMode,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send {
        (*self).render_diagram(source, mode)
    }
}

impl<T: DiagramRenderer> DiagramRenderer for Option<T> {
    fn render_diagram(
        &self,
        source: &str,
        mode: ColorMode,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send {
        async move {
            match self {
                Some(renderer) => renderer.render_diagram(source, mode).await,
                None => Err(DiagramError::Unavailable),
            }
        }
    }
}
