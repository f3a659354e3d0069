use core::fmt;

use cellwindow::{DataSource, PassReport, Reconciler, ScrollAnchor, ViewportHost, WindowOptions};

use crate::{MemoryViewport, TaskQueue};

/// A framework-neutral controller that owns a [`Reconciler`] together with its data source,
/// host and deferred task queue.
///
/// Adapters drive it by:
/// - forwarding scroll/resize events (`on_scroll`, `on_resize`, or `on_movement` for custom hosts)
/// - calling `run_pending` from their run loop, outside of any event callback
///
/// Every movement notification only schedules work; passes run when the queue is drained.
pub struct Controller<S: DataSource, H> {
    reconciler: Reconciler<S::Cell>,
    source: S,
    host: H,
    queue: TaskQueue,
}

impl<S: DataSource, H: ViewportHost> Controller<S, H> {
    pub fn new(options: WindowOptions, source: S, host: H) -> Self {
        let reconciler = Reconciler::with_source(options, &source);
        Self {
            reconciler,
            source,
            host,
            queue: TaskQueue::new(),
        }
    }

    pub fn reconciler(&self) -> &Reconciler<S::Cell> {
        &self.reconciler
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the data source. Call [`Self::reload`] (or [`Self::set_item_count`])
    /// after changing what it serves.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host. Call [`Self::on_movement`] after moving or resizing it.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn into_parts(self) -> (S, H) {
        (self.source, self.host)
    }

    /// `true` when no pass is queued.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Reports that the host's visible bounds changed.
    pub fn on_movement(&mut self) {
        let ticket = self.reconciler.notify_movement();
        self.queue.push(ticket);
    }

    pub fn set_options(&mut self, options: WindowOptions) {
        let ticket = self.reconciler.set_options(options);
        self.queue.push(ticket);
    }

    /// Discards the whole window and schedules a fresh pass.
    pub fn reload(&mut self) {
        let ticket = self.reconciler.reload(&mut self.source);
        self.queue.push(Some(ticket));
    }

    /// Reloads while keeping the first visible item at its on-screen position.
    ///
    /// Suited to data changes that do not shift indexes in front of the visible span (appends,
    /// in-place edits). Use [`Self::reload_with_anchor`] when they do.
    pub fn reload_preserving_position(&mut self) {
        self.reload_with_anchor(Some);
    }

    /// Reloads around the first visible item, remapped through `remap`.
    ///
    /// `remap` receives the anchor captured before the reload (pre-change index) and returns the
    /// anchor to restore, e.g. with the index shifted by the number of prepended items. Returning
    /// `None` falls back to a plain [`Self::reload`].
    pub fn reload_with_anchor<F>(&mut self, remap: F)
    where
        F: FnOnce(ScrollAnchor) -> Option<ScrollAnchor>,
    {
        let bounds = self.host.visible_bounds();
        let anchor = self.reconciler.capture_anchor(bounds).and_then(remap);
        let ticket = match anchor {
            Some(anchor) => {
                adebug!(
                    index = anchor.index,
                    offset_in_viewport = anchor.offset_in_viewport,
                    "reload anchored"
                );
                self.reconciler.reload_anchored(&mut self.source, anchor)
            }
            None => self.reconciler.reload(&mut self.source),
        };
        self.queue.push(Some(ticket));
    }

    /// Applies a soft item-count change without discarding the window.
    pub fn set_item_count(&mut self, count: usize) {
        let ticket = self.reconciler.set_item_count(count);
        self.queue.push(ticket);
    }

    /// Re-measures a windowed cell whose content changed. Returns the height delta.
    pub fn invalidate_height(&mut self, index: usize) -> Option<i64> {
        let delta = self.reconciler.invalidate_height(index, &mut self.host)?;
        if delta != 0 {
            self.on_movement();
        }
        Some(delta)
    }

    /// Runs the oldest queued pass.
    ///
    /// Returns `None` when the queue is empty or the ticket went stale. If the pass re-anchored
    /// the window or moved the host (a shrinking extent clamping the offset) another pass is
    /// queued, as a real scroll view would report that movement.
    pub fn run_pending(&mut self) -> Option<PassReport> {
        let ticket = self.queue.pop()?;
        let before = self.host.visible_bounds();
        let report = self
            .reconciler
            .on_tick(ticket, &mut self.source, &mut self.host)?;
        if report.scroll_adjustment != 0 || self.host.visible_bounds() != before {
            atrace!(
                before = before.offset,
                after = self.host.visible_bounds().offset,
                "host moved during pass"
            );
            self.on_movement();
        }
        Some(report)
    }

    /// Drains the queue, running at most `max_tasks` tasks. Returns how many ran.
    pub fn run_until_idle(&mut self, max_tasks: usize) -> usize {
        let mut ran = 0;
        while ran < max_tasks {
            if self.queue.is_empty() {
                return ran;
            }
            self.run_pending();
            ran += 1;
        }
        if !self.queue.is_empty() {
            awarn!(max_tasks, queued = self.queue.len(), "task queue did not settle");
        }
        ran
    }

    /// Cancels pending work and releases every cell back to the data source.
    pub fn teardown(&mut self) {
        self.reconciler.teardown(&mut self.source);
        self.queue.clear();
    }
}

impl<S: DataSource> Controller<S, MemoryViewport> {
    /// Scrolls the in-memory viewport and schedules a pass if it actually moved.
    pub fn on_scroll(&mut self, offset: u64) {
        if self.host.set_offset(offset) {
            self.on_movement();
        }
    }

    pub fn on_resize(&mut self, size: u32, width: u32) {
        if self.host.set_size(size, width) {
            self.on_movement();
        }
    }
}

impl<S, H> fmt::Debug for Controller<S, H>
where
    S: DataSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("snapshot", &self.reconciler.snapshot())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}
