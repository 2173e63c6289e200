//! Keeps mounted code block views in step with the code block decorations.

use livemark_renderer::{ClassNames, DiagramRenderer, HighlightService, HighlightTask, Highlighter};

use crate::code_block::{Body, CodeBlockWidget, MountedCodeBlock};
use crate::decoration::{DecorationSet, Widget};

/// Owns the mounted views for one editor.
///
/// On every sync, a widget equal to an already mounted one keeps that view
/// (no re-highlight, no flash); views with no equal widget left are dropped,
/// which cancels their pending work. Equal widgets mounted while one of them
/// is still highlighting share that single request.
#[derive(Debug)]
pub struct WidgetHost<H, D = ()> {
    service: HighlightService<H, D>,
    mounted: Vec<MountedCodeBlock>,
}

/// Counts from one [`WidgetHost::sync`].
#[derive(Debug, Default)]
pub struct SyncReport {
    pub reused: usize,
    pub mounted: usize,
    pub detached: usize,
    /// Work for cache misses. Spawn or await these.
    pub tasks: Vec<HighlightTask>,
}

impl<H, D> WidgetHost<H, D>
where
    H: Highlighter + 'static,
    D: DiagramRenderer + 'static,
{
    pub fn new(service: HighlightService<H, D>) -> Self {
        Self {
            service,
            mounted: Vec::new(),
        }
    }

    pub fn service(&self) -> &HighlightService<H, D> {
        &self.service
    }

    pub fn mounted(&self) -> &[MountedCodeBlock] {
        &self.mounted
    }

    pub fn sync(&mut self, set: &DecorationSet) -> SyncReport {
        let mut previous = std::mem::take(&mut self.mounted);
        let mut report = SyncReport::default();

        for (_, widget) in set.widgets() {
            let Widget::CodeBlock(widget) = widget else {
                continue;
            };
            // Views that own a request go first, so followers aren't orphaned.
            let reusable = previous
                .iter()
                .position(|m| m.widget() == widget && !m.awaits_peer())
                .or_else(|| previous.iter().position(|m| m.widget() == widget));
            if let Some(index) = reusable {
                self.mounted.push(previous.swap_remove(index));
                report.reused += 1;
                continue;
            }
            if self
                .mounted
                .iter()
                .any(|m| m.widget() == widget && m.is_pending())
            {
                self.mounted.push(widget.mount_follower());
                report.mounted += 1;
                continue;
            }
            let mut view = widget.mount(&self.service);
            if let Some(task) = view.take_task() {
                report.tasks.push(task);
            }
            self.mounted.push(view);
            report.mounted += 1;
        }

        report.detached = previous.len();
        for mut view in previous {
            view.detach();
        }
        tracing::trace!(
            target: "livemark::highlight",
            reused = report.reused,
            mounted = report.mounted,
            detached = report.detached,
            "synced code block views"
        );
        report
    }

    /// Apply every delivered result. Returns how many views changed.
    pub fn apply_ready(&mut self) -> usize {
        let mut changed = self
            .mounted
            .iter_mut()
            .map(|view| view.apply_ready())
            .filter(|changed| *changed)
            .count();

        // Followers settle from an equal view that has settled, or from the
        // cache if that view was detached before its result arrived.
        for index in 0..self.mounted.len() {
            if !self.mounted[index].awaits_peer() {
                continue;
            }
            let widget = self.mounted[index].widget();
            let settled = self
                .mounted
                .iter()
                .find(|m| !m.is_pending() && m.widget() == widget)
                .map(|m| m.body().clone())
                .or_else(|| self.service.cache().get(&widget.key()).map(Body::Ready));
            if let Some(body) = settled
                && self.mounted[index].adopt(body)
            {
                changed += 1;
            }
        }
        changed
    }

    pub fn view_for(&self, widget: &CodeBlockWidget) -> Option<&MountedCodeBlock> {
        self.mounted.iter().find(|m| m.widget() == widget)
    }

    /// Current markup for a widget, if it is mounted.
    pub fn html_for(&self, widget: &CodeBlockWidget, classes: &ClassNames) -> Option<String> {
        self.view_for(widget).map(|view| view.html(classes))
    }
}
