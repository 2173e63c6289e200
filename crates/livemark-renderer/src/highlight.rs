//! Content-addressed highlight cache and the async highlight pipeline.
//!
//! Code block widgets first paint plain text, then ask the
//! [`HighlightService`] for markup. A cache hit is served synchronously so
//! identical blocks never flash unstyled. A miss hands back a
//! [`HighlightTask`] for the host to drive plus a receiver the widget
//! polls; results for widgets detached in the meantime are still cached but
//! never delivered.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use dashmap::DashMap;
use smol_str::{SmolStr, format_smolstr};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::diagram::DiagramRenderer;
use crate::error::HighlightError;
use crate::language::is_diagram_language;
use crate::theme::ColorMode;

pub trait Highlighter: Send + Sync {
    /// Highlight `code` as `language` (already normalized) for `mode`.
    fn highlight(
        &self,
        code: &str,
        language: &str,
        mode: ColorMode,
    ) -> impl Future<Output = Result<String, HighlightError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HighlightKey {
    pub mode: ColorMode,
    pub language: SmolStr,
    pub code: Arc<str>,
}

impl HighlightKey {
    pub fn new(mode: ColorMode, language: impl Into<SmolStr>, code: impl Into<Arc<str>>) -> Self {
        Self {
            mode,
            language: language.into(),
            code: code.into(),
        }
    }
}

/// Highlighted markup keyed by `(mode, language, code)`.
///
/// Entries are never evicted; the key space is bounded by the distinct code
/// blocks a user actually looks at. Values are deterministic per key, so
/// racing writers are harmless.
#[derive(Debug, Default)]
pub struct HighlightCache {
    entries: DashMap<HighlightKey, Arc<str>>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &HighlightKey) -> Option<Arc<str>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: HighlightKey, markup: Arc<str>) {
        self.entries.insert(key, markup);
    }

    pub fn contains(&self, key: &HighlightKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a pending render delivers to its widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Highlighted code or diagram markup.
    Markup(Arc<str>),
    /// A diagram failed; shown inline so it doesn't look like it's loading forever.
    DiagramFailed(SmolStr),
}

/// Fire-and-forget highlight work. Spawn it on any executor or await it.
pub struct HighlightTask {
    inner: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
}

impl fmt::Debug for HighlightTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightTask").finish_non_exhaustive()
    }
}

impl Future for HighlightTask {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.as_mut().poll(cx)
    }
}

#[derive(Debug)]
pub struct PendingRender {
    pub receiver: oneshot::Receiver<Rendered>,
    pub task: HighlightTask,
}

#[derive(Debug)]
pub enum Lookup {
    Cached(Arc<str>),
    Pending(PendingRender),
}

/// Front door to the cache, the highlighter and the diagram renderer.
///
/// Owned by the editor integration layer and handed to widget hosts; clones
/// share the same cache.
pub struct HighlightService<H, D = ()> {
    cache: Arc<HighlightCache>,
    highlighter: Arc<H>,
    diagrams: Arc<D>,
}

impl<H, D> Clone for HighlightService<H, D> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            highlighter: self.highlighter.clone(),
            diagrams: self.diagrams.clone(),
        }
    }
}

impl<H, D> fmt::Debug for HighlightService<H, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighlightService")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<H: Highlighter + 'static> HighlightService<H, ()> {
    pub fn new(cache: Arc<HighlightCache>, highlighter: H) -> Self {
        Self {
            cache,
            highlighter: Arc::new(highlighter),
            diagrams: Arc::new(()),
        }
    }
}

impl<H, D> HighlightService<H, D>
where
    H: Highlighter + 'static,
    D: DiagramRenderer + 'static,
{
    pub fn with_diagrams<D2: DiagramRenderer + 'static>(
        self,
        diagrams: D2,
    ) -> HighlightService<H, D2> {
        HighlightService {
            cache: self.cache,
            highlighter: self.highlighter,
            diagrams: Arc::new(diagrams),
        }
    }

    pub fn cache(&self) -> &Arc<HighlightCache> {
        &self.cache
    }

    /// Look up markup for `key`, or schedule it.
    ///
    /// `liveness` belongs to the requesting widget; once cancelled, a late
    /// result is still cached but not delivered.
    pub fn request(&self, key: HighlightKey, liveness: CancellationToken) -> Lookup {
        if let Some(markup) = self.cache.get(&key) {
            tracing::trace!(
                target: "livemark::highlight",
                language = %key.language,
                mode = key.mode.as_str(),
                "cache hit"
            );
            return Lookup::Cached(markup);
        }

        let (tx, receiver) = oneshot::channel();
        let cache = self.cache.clone();
        let highlighter = self.highlighter.clone();
        let diagrams = self.diagrams.clone();

        let work = async move {
            let outcome = if is_diagram_language(&key.language) {
                match diagrams.render_diagram(&key.code, key.mode).await {
                    Ok(markup) => {
                        let markup: Arc<str> = markup.into();
                        cache.insert(key.clone(), markup.clone());
                        Rendered::Markup(markup)
                    }
                    Err(err) => {
                        tracing::debug!(
                            target: "livemark::highlight",
                            error = %err,
                            "diagram render failed"
                        );
                        Rendered::DiagramFailed(format_smolstr!("{err}"))
                    }
                }
            } else {
                match highlighter.highlight(&key.code, &key.language, key.mode).await {
                    Ok(markup) => {
                        let markup: Arc<str> = markup.into();
                        cache.insert(key.clone(), markup.clone());
                        Rendered::Markup(markup)
                    }
                    Err(err) => {
                        // Widget keeps its plain-text fallback.
                        tracing::debug!(
                            target: "livemark::highlight",
                            language = %key.language,
                            error = %err,
                            "highlight failed"
                        );
                        return;
                    }
                }
            };

            if liveness.is_cancelled() {
                tracing::trace!(
                    target: "livemark::highlight",
                    language = %key.language,
                    "discarding result for detached widget"
                );
                return;
            }
            // Receiver gone means the widget was dropped without cancelling.
            let _ = tx.send(outcome);
        };

        Lookup::Pending(PendingRender {
            receiver,
            task: HighlightTask {
                inner: Box::pin(work),
            },
        })
    }
}
