//! Fenced code block widget, its mounted view, and the field that places it.
//!
//! A mounted block paints escaped plain text straight away and upgrades to
//! highlighted (or diagram) markup when the highlight service delivers it.
//! Dropping the mounted view cancels its liveness token, so late results are
//! cached but never applied to a view that is gone.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, LazyLock};

use livemark_renderer::{
    ClassNames, ColorMode, DiagramRenderer, HighlightKey, HighlightService, HighlightTask,
    Highlighter, Lookup, Rendered, escape_html, is_diagram_language, normalize_language,
};
use regex::Regex;
use smol_str::SmolStr;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio_util::sync::CancellationToken;

use crate::classify::CursorOracle;
use crate::decoration::{Decoration, DecorationSet, DecorationSetBuilder, Widget};
use crate::state::{EditorState, ViewUpdate};
use crate::syntax::NodeKind;

pub static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(`{3,}|~{3,})[ \t]*([\w#+.-]*)").unwrap());

/// Raw pieces of a fenced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedCode {
    pub fence: char,
    /// Language tag as written, before normalization.
    pub tag: SmolStr,
    pub body: String,
}

impl FencedCode {
    /// Split fenced block text into its tag and body. The closing fence is
    /// the last non-blank line if it is only the opening fence character,
    /// three or more times.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return None;
        }
        let opening = lines.remove(0);
        let caps = FENCE_OPEN_RE.captures(opening.trim_start())?;
        let fence = caps[1].chars().next()?;
        let tag = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        if let Some(last) = lines.iter().rposition(|line| !line.trim().is_empty()) {
            let closing = lines[last].trim();
            if closing.len() >= 3 && closing.chars().all(|c| c == fence) {
                lines.truncate(last);
            }
        }

        Some(Self {
            fence,
            tag: SmolStr::new(tag),
            body: lines.join("\n"),
        })
    }
}

/// Widget for a fenced code block.
///
/// Equal widgets are interchangeable: the host keeps an already mounted view
/// instead of re-highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeBlockWidget {
    pub language: SmolStr,
    pub code: Arc<str>,
    pub mode: ColorMode,
}

impl CodeBlockWidget {
    pub fn new(language: impl Into<SmolStr>, code: impl Into<Arc<str>>, mode: ColorMode) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            mode,
        }
    }

    pub fn from_fenced(
        fenced: &FencedCode,
        mode: ColorMode,
        aliases: &BTreeMap<SmolStr, SmolStr>,
    ) -> Self {
        Self::new(
            normalize_language(&fenced.tag, aliases),
            fenced.body.as_str(),
            mode,
        )
    }

    pub fn is_diagram(&self) -> bool {
        is_diagram_language(&self.language)
    }

    pub fn key(&self) -> HighlightKey {
        HighlightKey::new(self.mode, self.language.clone(), self.code.clone())
    }

    /// Plain `<pre><code>` body with the escaped literal code.
    pub fn scaffold_html(&self, classes: &ClassNames) -> String {
        self.container_html(classes, &self.plain_body(classes))
    }

    fn plain_body(&self, classes: &ClassNames) -> String {
        format!(
            "<pre class=\"{}\"><code>{}</code></pre>",
            classes.code_block("pre"),
            escape_html(&self.code)
        )
    }

    fn container_html(&self, classes: &ClassNames, body: &str) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<div class=\"{}\" data-language=\"{}\">",
            classes.code_block("container"),
            escape_html(&self.language)
        );
        if !self.language.is_empty() {
            let _ = write!(
                html,
                "<span class=\"{}\">{}</span>",
                classes.code_block("lang"),
                escape_html(&self.language)
            );
        }
        html.push_str(body);
        html.push_str("</div>");
        html
    }

    /// Mount a view. A cache hit comes back already highlighted; otherwise
    /// the view holds the plain scaffold and a task the host must drive.
    pub fn mount<H, D>(&self, service: &HighlightService<H, D>) -> MountedCodeBlock
    where
        H: Highlighter + 'static,
        D: DiagramRenderer + 'static,
    {
        let liveness = CancellationToken::new();
        let mut mounted = MountedCodeBlock {
            widget: self.clone(),
            body: Body::Plain,
            receiver: None,
            task: None,
            awaits_peer: false,
            liveness: liveness.clone(),
        };
        match service.request(self.key(), liveness) {
            Lookup::Cached(markup) => mounted.body = Body::Ready(markup),
            Lookup::Pending(pending) => {
                mounted.receiver = Some(pending.receiver);
                mounted.task = Some(pending.task);
            }
        }
        mounted
    }

    /// Mount a view that shares the request of an equal view already in
    /// flight. It settles from that view or the cache, never on its own.
    pub(crate) fn mount_follower(&self) -> MountedCodeBlock {
        MountedCodeBlock {
            widget: self.clone(),
            body: Body::Plain,
            receiver: None,
            task: None,
            awaits_peer: true,
            liveness: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Body {
    Plain,
    Ready(Arc<str>),
    DiagramError(SmolStr),
}

/// A code block view attached to the editor.
#[derive(Debug)]
pub struct MountedCodeBlock {
    widget: CodeBlockWidget,
    body: Body,
    receiver: Option<oneshot::Receiver<Rendered>>,
    task: Option<HighlightTask>,
    awaits_peer: bool,
    liveness: CancellationToken,
}

impl MountedCodeBlock {
    pub fn widget(&self) -> &CodeBlockWidget {
        &self.widget
    }

    /// Highlight work to spawn or await. Present at most once, and only
    /// after a cache miss.
    pub fn take_task(&mut self) -> Option<HighlightTask> {
        self.task.take()
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some() || self.awaits_peer
    }

    pub(crate) fn awaits_peer(&self) -> bool {
        self.awaits_peer
    }

    pub(crate) fn body(&self) -> &Body {
        &self.body
    }

    /// Take over a body settled elsewhere. Returns whether the body changed.
    pub(crate) fn adopt(&mut self, body: Body) -> bool {
        self.awaits_peer = false;
        let changed = self.body != body;
        self.body = body;
        changed
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self.body, Body::Ready(_))
    }

    /// Apply a delivered result, if one arrived. Returns whether the body
    /// changed.
    pub fn apply_ready(&mut self) -> bool {
        let Some(receiver) = self.receiver.as_mut() else {
            return false;
        };
        match receiver.try_recv() {
            Ok(Rendered::Markup(markup)) => {
                self.receiver = None;
                self.body = Body::Ready(markup);
                true
            }
            Ok(Rendered::DiagramFailed(message)) => {
                self.receiver = None;
                self.body = Body::DiagramError(message);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Closed) => {
                // Highlighting failed; plain text stays.
                self.receiver = None;
                false
            }
        }
    }

    pub fn html(&self, classes: &ClassNames) -> String {
        match &self.body {
            Body::Plain => self.widget.scaffold_html(classes),
            Body::Ready(markup) if self.widget.is_diagram() => self.widget.container_html(
                classes,
                &format!(
                    "<div class=\"{}\">{markup}</div>",
                    classes.code_block("diagram")
                ),
            ),
            Body::Ready(markup) => self.widget.container_html(classes, markup),
            Body::DiagramError(message) => {
                let error = format!(
                    "<div class=\"{}\">{}</div>",
                    classes.code_block("error"),
                    escape_html(message)
                );
                let body = self.widget.plain_body(classes);
                self.widget.container_html(classes, &(error + &body))
            }
        }
    }

    /// Stop listening for results. Also happens on drop.
    pub fn detach(&mut self) {
        self.liveness.cancel();
        self.receiver = None;
        self.awaits_peer = false;
    }
}

impl Drop for MountedCodeBlock {
    fn drop(&mut self) {
        self.liveness.cancel();
    }
}

/// Code block decorations, derived from document, selection, tree and the
/// current color mode.
#[derive(Debug)]
pub struct CodeBlockField {
    force_hidden: bool,
    mode: ColorMode,
    aliases: BTreeMap<SmolStr, SmolStr>,
    set: DecorationSet,
    builds: u64,
}

impl CodeBlockField {
    pub fn new(
        state: &EditorState,
        mode: ColorMode,
        aliases: BTreeMap<SmolStr, SmolStr>,
        force_hidden: bool,
    ) -> Self {
        let mut this = Self {
            force_hidden,
            mode,
            aliases,
            set: DecorationSet::empty(),
            builds: 0,
        };
        this.rebuild(state);
        this
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.set
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn builds(&self) -> u64 {
        self.builds
    }

    pub fn update(&mut self, state: &EditorState, update: &ViewUpdate) -> bool {
        if !update.affects_fields() {
            return false;
        }
        self.rebuild(state);
        true
    }

    /// Rebuild with a new color mode baked into the widgets.
    pub fn set_color_mode(&mut self, state: &EditorState, mode: ColorMode) {
        self.mode = mode;
        self.rebuild(state);
    }

    fn rebuild(&mut self, state: &EditorState) {
        let oracle = CursorOracle::new(state.selection().main(), self.force_hidden);
        let mut builder = DecorationSetBuilder::block();

        for node in state.tree().nodes() {
            if node.kind() != Some(NodeKind::FencedCode) || oracle.is_inside(node.from, node.to) {
                continue;
            }
            let Some(fenced) = state
                .block_text(node.from, node.to)
                .and_then(|text| FencedCode::parse(&text))
            else {
                tracing::trace!(
                    target: "livemark::decorate",
                    from = node.from,
                    to = node.to,
                    "no opening fence, skipping node"
                );
                continue;
            };
            let widget = CodeBlockWidget::from_fenced(&fenced, self.mode, &self.aliases);
            builder.push(Decoration::widget(
                node.from,
                node.to,
                Widget::CodeBlock(widget),
                true,
            ));
        }

        self.set = builder.finish(state.doc()).set;
        self.builds += 1;
    }
}
