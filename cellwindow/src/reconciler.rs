use crate::schedule::PassSchedule;
use crate::types::clamp_to_i64;
use crate::{
    CellCache, CellSlot, DataSource, ExtentEstimate, MeasureCell, PassTicket, ReconcilerState,
    Region, ScrollAnchor, ViewportBounds, ViewportHost, Window, WindowError, WindowOptions,
    WindowRange,
};

/// What a single reconciliation pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassReport {
    pub evicted: usize,
    pub created: usize,
    pub window: Option<WindowRange>,
    pub extent: ExtentEstimate,
    /// Scroll offset delta requested from the host by leading-edge pinning (0 if none).
    pub scroll_adjustment: i64,
}

/// A lightweight snapshot of the reconciler, for inspection and debugging overlays.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowSnapshot {
    pub item_count: usize,
    pub window: Option<WindowRange>,
    pub cached: usize,
    pub extent: ExtentEstimate,
    pub scheduled: bool,
}

/// Owns the window, the cell cache and the extent estimate, and is the only thing that mutates
/// them.
///
/// The host drives it in two steps:
/// - movement notifications, reloads and option changes *schedule* a pass and hand back a
///   [`PassTicket`] (at most one is live at a time, so notifications coalesce);
/// - the host later runs the ticket through [`Reconciler::on_tick`] on the same thread, which
///   evicts, seeds, grows and re-estimates in one go.
#[derive(Debug)]
pub struct Reconciler<C> {
    options: WindowOptions,
    item_count: usize,
    window: Window,
    cache: CellCache<C>,
    extent: ExtentEstimate,
    schedule: PassSchedule,
    pending_anchor: Option<ScrollAnchor>,
    measured_width: Option<u32>,
}

struct Budget {
    remaining: usize,
    limit: usize,
    reported: bool,
}

impl Budget {
    fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            limit,
            reported: false,
        }
    }

    fn take<H: ViewportHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            return true;
        }
        if !self.reported {
            self.reported = true;
            wwarn!(budget = self.limit, "materialization budget exhausted");
            host.report(&WindowError::BudgetExhausted { budget: self.limit });
        }
        false
    }
}

/// Maps `offset / total` (clamped to `[0, 1]`) linearly onto `[0, count - 1]`.
pub(crate) fn seed_index(offset: u64, total: u64, count: usize) -> usize {
    if count == 0 || total == 0 {
        return 0;
    }
    let offset = offset.min(total) as u128;
    let last = (count - 1) as u128;
    let index = offset * last / total as u128;
    usize::try_from(index).unwrap_or(count - 1).min(count - 1)
}

impl<C: MeasureCell> Reconciler<C> {
    pub fn new(options: WindowOptions) -> Self {
        wdebug!(
            margin = options.margin,
            default_item_extent = options.default_item_extent,
            "Reconciler::new"
        );
        let window = Window::new();
        let cache = CellCache::new();
        let extent = ExtentEstimate::compute(&window, &cache, 0, 0, options.default_item_extent);
        Self {
            options,
            item_count: 0,
            window,
            cache,
            extent,
            schedule: PassSchedule::default(),
            pending_anchor: None,
            measured_width: None,
        }
    }

    /// Creates a reconciler and reads the initial item count from `source`.
    ///
    /// Nothing is materialized until the first pass runs.
    pub fn with_source<S>(options: WindowOptions, source: &S) -> Self
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        let mut r = Self::new(options);
        r.item_count = source.item_count();
        r.extent = r.estimate(0);
        r
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn window(&self) -> Option<WindowRange> {
        self.window.range()
    }

    pub fn cache(&self) -> &CellCache<C> {
        &self.cache
    }

    pub fn cell(&self, index: usize) -> Option<&CellSlot<C>> {
        self.cache.get(index)
    }

    /// Mutable access to a materialized cell, e.g. to update its content. Follow up with
    /// [`Self::invalidate_height`] if the height changed.
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut CellSlot<C>> {
        self.cache.get_mut(index)
    }

    /// Windowed cells in index order.
    pub fn cells(&self) -> impl Iterator<Item = &CellSlot<C>> + '_ {
        self.window
            .range()
            .into_iter()
            .flat_map(|r| r.indexes())
            .filter_map(move |i| self.cache.get(i))
    }

    /// The estimate computed by the last pass (or by the last height invalidation).
    pub fn extent(&self) -> ExtentEstimate {
        self.extent
    }

    pub fn state(&self) -> ReconcilerState {
        self.schedule.state()
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            item_count: self.item_count,
            window: self.window.range(),
            cached: self.cache.len(),
            extent: self.extent,
            scheduled: self.state() == ReconcilerState::Scheduled,
        }
    }

    pub fn set_options(&mut self, options: WindowOptions) -> Option<PassTicket> {
        if self.options == options {
            return None;
        }
        wdebug!(
            margin = options.margin,
            default_item_extent = options.default_item_extent,
            max_cells_per_pass = options.max_cells_per_pass,
            pin_leading_edge = options.pin_leading_edge,
            "Reconciler::set_options"
        );
        self.options = options;
        self.schedule.request()
    }

    pub fn set_margin(&mut self, margin: u32) -> Option<PassTicket> {
        let next = self.options.with_margin(margin);
        self.set_options(next)
    }

    /// Records that the viewport moved or resized.
    ///
    /// Returns a ticket when a new pass was scheduled; `None` means a pass is already pending and
    /// will observe the latest bounds when it runs.
    pub fn notify_movement(&mut self) -> Option<PassTicket> {
        let ticket = self.schedule.request();
        wtrace!(coalesced = ticket.is_none(), "notify_movement");
        ticket
    }

    /// Discards the window and cache, re-reads the item count and schedules a pass.
    ///
    /// Any pending pass is cancelled; its ticket becomes a no-op.
    pub fn reload<S>(&mut self, source: &mut S) -> PassTicket
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        self.pending_anchor = None;
        let _evicted = self.discard(source);
        self.item_count = source.item_count();
        wdebug!(item_count = self.item_count, evicted = _evicted, "reload");
        self.schedule.restart()
    }

    /// Like [`Self::reload`], but the next pass seeds the window at `anchor` instead of the
    /// proportional index, keeping that item where it was on screen.
    pub fn reload_anchored<S>(&mut self, source: &mut S, anchor: ScrollAnchor) -> PassTicket
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        let ticket = self.reload(source);
        self.pending_anchor = Some(anchor);
        ticket
    }

    /// Changes the item count without discarding the window (e.g. after appending items).
    ///
    /// The next pass evicts cells past the new end and grows into new items as needed.
    pub fn set_item_count(&mut self, count: usize) -> Option<PassTicket> {
        if self.item_count == count {
            return None;
        }
        wdebug!(from = self.item_count, to = count, "set_item_count");
        self.item_count = count;
        self.schedule.request()
    }

    /// Cancels any pending pass and releases every materialized cell.
    pub fn teardown<S>(&mut self, source: &mut S)
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        self.schedule.cancel();
        self.pending_anchor = None;
        let _evicted = self.discard(source);
        wdebug!(evicted = _evicted, "teardown");
    }

    /// The first windowed cell that reaches into the visible span, with its position relative to
    /// the viewport offset.
    pub fn capture_anchor(&self, bounds: ViewportBounds) -> Option<ScrollAnchor> {
        let offset = clamp_to_i64(bounds.offset);
        let slot = self.cells().find(|s| s.end() > offset)?;
        Some(ScrollAnchor {
            index: slot.id(),
            offset_in_viewport: slot.origin().saturating_sub(offset),
        })
    }

    /// Re-measures the cell at `index` after its content changed.
    ///
    /// Neighbors are shifted so the window stays gap-free: when the cell lies entirely above the
    /// viewport its trailing edge is kept and earlier cells move, otherwise its leading edge is
    /// kept and later cells move. The extent is recomputed and reported; no eviction or growth
    /// runs. Returns the height delta, or `None` if `index` is not materialized.
    pub fn invalidate_height<H>(&mut self, index: usize, host: &mut H) -> Option<i64>
    where
        H: ViewportHost + ?Sized,
    {
        if !self.window.contains(index) {
            return None;
        }
        let bounds = host.visible_bounds();
        let slot = self.cache.get(index)?;
        let before = slot.height();
        let above_viewport = slot.end() <= clamp_to_i64(bounds.offset);
        slot.invalidate_height();
        let delta = slot.height() as i64 - before as i64;
        wtrace!(index, delta, above_viewport, "invalidate_height");

        if delta != 0 {
            let next_in_window = index
                .checked_add(1)
                .filter(|&i| self.window.contains(i));
            match next_in_window {
                Some(next) if above_viewport => self.relayout_around(next),
                _ => self.relayout_around(index),
            }
        }

        self.extent = self.estimate(bounds.size);
        host.set_content_extent(self.extent.total);
        Some(delta)
    }

    /// Runs the scheduled pass if `ticket` is still live.
    ///
    /// Returns `None` for stale tickets (cancelled by a reload/teardown, or already run).
    pub fn on_tick<S, H>(
        &mut self,
        ticket: PassTicket,
        source: &mut S,
        host: &mut H,
    ) -> Option<PassReport>
    where
        S: DataSource<Cell = C> + ?Sized,
        H: ViewportHost + ?Sized,
    {
        if !self.schedule.take(ticket) {
            wtrace!("on_tick: stale ticket");
            return None;
        }
        Some(self.run_pass(source, host))
    }

    fn run_pass<S, H>(&mut self, source: &mut S, host: &mut H) -> PassReport
    where
        S: DataSource<Cell = C> + ?Sized,
        H: ViewportHost + ?Sized,
    {
        let bounds = host.visible_bounds();
        let region = bounds.expanded(self.options.margin);
        let anchor = self.pending_anchor.take();
        wtrace!(
            offset = bounds.offset,
            size = bounds.size,
            width = bounds.width,
            item_count = self.item_count,
            "pass start"
        );

        self.sync_width(bounds);

        let mut evicted = self.evict_out_of_range(source);
        evicted += self.evict_top(region, source, host);
        evicted += self.evict_bottom(region, source, host);
        // A window that should be gone but left entries behind (or entries outside the window
        // for any other reason) must not survive the pass.
        evicted += self.cache.evict_outside(self.window.range(), source);

        let mut budget = Budget::new(self.options.max_cells_per_pass);
        let mut created = 0;
        if self.window.is_empty() && self.item_count > 0 {
            created += self.seed(bounds, anchor, source, host, &mut budget);
        }
        created += self.grow_top(region, bounds.width, source, host, &mut budget);
        created += self.grow_bottom(region, bounds.width, source, host, &mut budget);

        let scroll_adjustment = self.pin_leading_edge();

        self.extent = self.estimate(bounds.size);
        host.set_content_extent(self.extent.total);
        if scroll_adjustment != 0 {
            host.adjust_scroll_offset(scroll_adjustment);
        }

        let report = PassReport {
            evicted,
            created,
            window: self.window.range(),
            extent: self.extent,
            scroll_adjustment,
        };
        wtrace!(
            evicted,
            created,
            top = report.window.map(|w| w.top),
            bottom = report.window.map(|w| w.bottom),
            total = report.extent.total,
            scroll_adjustment,
            "pass done"
        );
        report
    }

    fn estimate(&self, viewport_size: u32) -> ExtentEstimate {
        let estimate = ExtentEstimate::compute(
            &self.window,
            &self.cache,
            self.item_count,
            viewport_size,
            self.options.default_item_extent,
        );
        let Some(bottom) = self.window.bottom().and_then(|b| self.cache.get(b)) else {
            return estimate;
        };
        let trailing = u64::try_from(bottom.end()).unwrap_or(0);
        estimate.cover(trailing.saturating_add(estimate.below))
    }

    fn discard<S>(&mut self, source: &mut S) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        self.window.clear();
        self.cache.evict_outside(None, source)
    }

    fn sync_width(&mut self, bounds: ViewportBounds) {
        let previous = self.measured_width.replace(bounds.width);
        if previous.is_none_or(|w| w == bounds.width) {
            return;
        }
        wdebug!(
            from = previous,
            to = bounds.width,
            "width changed, re-measuring window"
        );
        for slot in self.cache.iter_mut() {
            slot.set_width(bounds.width);
        }
        if let Some(anchor) = self.capture_anchor(bounds) {
            self.relayout_around(anchor.index);
        }
    }

    /// Keeps `anchor`'s origin and re-places every other windowed cell flush against its
    /// neighbor.
    fn relayout_around(&mut self, anchor: usize) {
        let Some(range) = self.window.range() else {
            return;
        };
        let Some(anchor_origin) = self.cache.get(anchor).map(|s| s.origin()) else {
            return;
        };

        let mut cursor = anchor_origin;
        for i in anchor..=range.bottom {
            if let Some(slot) = self.cache.get_mut(i) {
                slot.set_origin(cursor);
                cursor = slot.end();
            }
        }

        let mut cursor = anchor_origin;
        for i in (range.top..anchor).rev() {
            if let Some(slot) = self.cache.get_mut(i) {
                cursor = cursor.saturating_sub(slot.height() as i64);
                slot.set_origin(cursor);
            }
        }
    }

    fn evict_out_of_range<S>(&mut self, source: &mut S) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        let mut evicted = 0;
        while let Some(bottom) = self.window.bottom() {
            if bottom < self.item_count {
                break;
            }
            self.cache.evict(bottom, source);
            evicted += 1;
            if self.window.contract_bottom(bottom.checked_sub(1)).is_none() {
                break;
            }
        }
        evicted
    }

    fn evict_top<S, H>(&mut self, region: Region, source: &mut S, host: &mut H) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
        H: ViewportHost + ?Sized,
    {
        let mut evicted = 0;
        while let Some(top) = self.window.top() {
            let Some(slot) = self.cache.get(top) else {
                self.report_missing(top, host);
                self.window.clear();
                break;
            };
            if slot.end() >= region.start {
                break;
            }
            self.cache.evict(top, source);
            evicted += 1;
            if self.window.contract_top(top + 1).is_none() {
                break;
            }
        }
        evicted
    }

    fn evict_bottom<S, H>(&mut self, region: Region, source: &mut S, host: &mut H) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
        H: ViewportHost + ?Sized,
    {
        let mut evicted = 0;
        while let Some(bottom) = self.window.bottom() {
            let Some(slot) = self.cache.get(bottom) else {
                self.report_missing(bottom, host);
                self.window.clear();
                break;
            };
            if slot.origin() <= region.end {
                break;
            }
            self.cache.evict(bottom, source);
            evicted += 1;
            if self.window.contract_bottom(bottom.checked_sub(1)).is_none() {
                break;
            }
        }
        evicted
    }

    fn seed<S, H>(
        &mut self,
        bounds: ViewportBounds,
        anchor: Option<ScrollAnchor>,
        source: &mut S,
        host: &mut H,
        budget: &mut Budget,
    ) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
        H: ViewportHost + ?Sized,
    {
        let count = self.item_count;
        let offset = clamp_to_i64(bounds.offset);
        let (index, origin) = match anchor {
            Some(a) => (
                a.index.min(count - 1),
                offset.saturating_add(a.offset_in_viewport),
            ),
            None => (seed_index(bounds.offset, self.extent.total, count), offset),
        };
        if !budget.take(host) {
            return 0;
        }
        let Some(slot) = self.cache.get_or_create(index, bounds.width, source) else {
            self.report_unavailable(index, host);
            return 0;
        };
        slot.set_origin(origin);
        self.window.seed(index);
        wtrace!(index, origin, anchored = anchor.is_some(), "seeded window");
        1
    }

    fn grow_top<S, H>(
        &mut self,
        region: Region,
        width: u32,
        source: &mut S,
        host: &mut H,
        budget: &mut Budget,
    ) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
        H: ViewportHost + ?Sized,
    {
        let mut created = 0;
        while let Some(top) = self.window.top() {
            if top == 0 {
                break;
            }
            let Some(leading) = self.cache.get(top).map(|s| s.origin()) else {
                self.report_missing(top, host);
                break;
            };
            if leading <= region.start || !budget.take(host) {
                break;
            }
            let index = top - 1;
            let Some(slot) = self.cache.get_or_create(index, width, source) else {
                self.report_unavailable(index, host);
                break;
            };
            let height = slot.height() as i64;
            slot.set_origin(leading.saturating_sub(height));
            if let Err(err) = self.window.expand_top(index) {
                host.report(&err);
                self.cache.evict(index, source);
                break;
            }
            created += 1;
        }
        created
    }

    fn grow_bottom<S, H>(
        &mut self,
        region: Region,
        width: u32,
        source: &mut S,
        host: &mut H,
        budget: &mut Budget,
    ) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
        H: ViewportHost + ?Sized,
    {
        let mut created = 0;
        while let Some(bottom) = self.window.bottom() {
            if bottom + 1 >= self.item_count {
                break;
            }
            let Some(trailing) = self.cache.get(bottom).map(|s| s.end()) else {
                self.report_missing(bottom, host);
                break;
            };
            if trailing >= region.end || !budget.take(host) {
                break;
            }
            let index = bottom + 1;
            let Some(slot) = self.cache.get_or_create(index, width, source) else {
                self.report_unavailable(index, host);
                break;
            };
            slot.set_origin(trailing);
            if let Err(err) = self.window.expand_bottom(index) {
                host.report(&err);
                self.cache.evict(index, source);
                break;
            }
            created += 1;
        }
        created
    }

    /// Shifts the window so item 0 starts at offset 0. Returns the applied shift.
    fn pin_leading_edge(&mut self) -> i64 {
        if !self.options.pin_leading_edge || self.window.top() != Some(0) {
            return 0;
        }
        let Some(origin) = self.cache.get(0).map(|s| s.origin()) else {
            return 0;
        };
        if origin == 0 {
            return 0;
        }
        let delta = origin.saturating_neg();
        for slot in self.cache.iter_mut() {
            slot.shift(delta);
        }
        wtrace!(delta, "pinned leading edge");
        delta
    }

    fn report_unavailable<H: ViewportHost + ?Sized>(&self, index: usize, host: &mut H) {
        wwarn!(index, count = self.item_count, "data source produced no cell");
        host.report(&WindowError::CellUnavailable {
            index,
            count: self.item_count,
        });
    }

    fn report_missing<H: ViewportHost + ?Sized>(&self, index: usize, host: &mut H) {
        wwarn!(index, "window index missing from cell cache");
        debug_assert!(false, "window index {index} missing from cell cache");
        host.report(&WindowError::MissingCell { index });
    }
}
