use crate::*;

use alloc::vec::Vec;
use core::cell::Cell;

use proptest::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Row {
    /// Line height; the full height when `wrap` is `None`.
    height: u32,
    /// Text length that wraps at the measured width, one line per `width` units.
    wrap: Option<u32>,
}

impl MeasureCell for Row {
    fn measure(&self, width: u32) -> u32 {
        match self.wrap {
            Some(len) => len.div_ceil(width.max(1)) * self.height,
            None => self.height,
        }
    }
}

#[derive(Debug, Default)]
struct Rows {
    count: usize,
    /// Cycled over indexes; empty means 30.
    heights: Vec<u32>,
    wrap: Option<u32>,
    unavailable: Vec<usize>,
    created: Vec<usize>,
    recycled: Vec<usize>,
    count_reads: Cell<usize>,
}

impl Rows {
    fn fixed(count: usize, height: u32) -> Self {
        Self {
            count,
            heights: alloc::vec![height],
            ..Self::default()
        }
    }

    fn height_of(&self, index: usize) -> u32 {
        if self.heights.is_empty() {
            return 30;
        }
        self.heights[index % self.heights.len()]
    }
}

impl DataSource for Rows {
    type Cell = Row;

    fn item_count(&self) -> usize {
        self.count_reads.set(self.count_reads.get() + 1);
        self.count
    }

    fn cell_for_index(&mut self, index: usize, _available_width: u32) -> Option<Row> {
        if index >= self.count || self.unavailable.contains(&index) {
            return None;
        }
        self.created.push(index);
        Some(Row {
            height: self.height_of(index),
            wrap: self.wrap,
        })
    }

    fn recycle(&mut self, index: usize, _cell: Row) {
        self.recycled.push(index);
    }
}

#[derive(Debug, Default)]
struct Host {
    bounds: ViewportBounds,
    extents: Vec<u64>,
    adjustments: Vec<i64>,
    errors: Vec<WindowError>,
}

impl Host {
    fn new(offset: u64, size: u32) -> Self {
        Self {
            bounds: ViewportBounds::new(offset, size, 400),
            ..Self::default()
        }
    }
}

impl ViewportHost for Host {
    fn visible_bounds(&self) -> ViewportBounds {
        self.bounds
    }

    fn set_content_extent(&mut self, extent: u64) {
        self.extents.push(extent);
    }

    fn adjust_scroll_offset(&mut self, delta: i64) {
        self.adjustments.push(delta);
        let max = self
            .extents
            .last()
            .copied()
            .unwrap_or(0)
            .saturating_sub(self.bounds.size as u64);
        let next = (self.bounds.offset as i128 + delta as i128).clamp(0, max as i128);
        self.bounds.offset = next as u64;
    }

    fn report(&mut self, error: &WindowError) {
        self.errors.push(error.clone());
    }
}

fn tick(r: &mut Reconciler<Row>, src: &mut Rows, host: &mut Host) -> PassReport {
    let ticket = r.notify_movement().expect("no pass should be pending");
    r.on_tick(ticket, src, host).expect("live ticket")
}

/// Runs passes until leading-edge pinning stops moving the viewport.
fn settle(r: &mut Reconciler<Row>, src: &mut Rows, host: &mut Host) -> PassReport {
    let mut report = tick(r, src, host);
    for _ in 0..4 {
        if report.scroll_adjustment == 0 {
            break;
        }
        report = tick(r, src, host);
    }
    report
}

fn assert_consistent(r: &Reconciler<Row>, host: &Host) {
    let count = r.item_count();
    match r.window() {
        None => assert!(r.cache().is_empty(), "cache must be empty without a window"),
        Some(w) => {
            assert!(w.top <= w.bottom);
            assert!(w.bottom < count, "window {w:?} exceeds count {count}");
            let expected: Vec<usize> = w.indexes().collect();
            assert_eq!(r.cache().indexes(), expected);
            let cells: Vec<_> = r.cells().collect();
            for pair in cells.windows(2) {
                assert_eq!(pair[0].end(), pair[1].origin(), "window must be gap-free");
            }
        }
    }
    let extent = r.extent();
    assert!(extent.total >= host.bounds.size as u64);
    assert!(extent.total >= extent.rendered);
    assert_eq!(host.extents.last().copied(), Some(extent.total));
}

#[test]
fn scenario_a_fixed_height_covers_viewport_plus_margin() {
    let mut src = Rows::fixed(1000, 30);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(100), &src);

    let report = tick(&mut r, &mut src, &mut host);
    // [-100, 600] from item 0 at offset 0: 20 cells of 30.
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 19 }));
    assert_eq!(report.extent.total, 30_000);
    assert_consistent(&r, &host);

    host.bounds.offset = 15_000;
    let report = tick(&mut r, &mut src, &mut host);
    // Everything from the first pass is far above; the window is reseeded at
    // floor(15000 / 30000 * 999) = 499 and grown over [14900, 15600].
    assert_eq!(report.evicted, 20);
    assert_eq!(
        report.window,
        Some(WindowRange {
            top: 495,
            bottom: 518
        })
    );
    assert_eq!(report.window.map(|w| w.len()), Some(24));
    assert_eq!(r.cell(499).map(|c| c.origin()), Some(15_000));
    assert_eq!(report.extent.rendered, 720);
    assert_eq!(report.extent.above, 495 * 30);
    assert_eq!(report.extent.below, 481 * 30);
    assert!(report.extent.total >= 30_000);
    assert_consistent(&r, &host);
}

#[test]
fn scenario_b_empty_source_never_materializes() {
    let mut src = Rows::fixed(0, 30);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(100), &src);

    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, None);
    assert_eq!(report.created, 0);
    assert_eq!(report.extent.total, 500);
    assert!(src.created.is_empty());
    assert_eq!(src.count_reads.get(), 1);

    host.bounds.offset = 1_000;
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, None);
    assert_eq!(host.extents, alloc::vec![500, 500]);
    assert!(src.created.is_empty());
}

#[test]
fn scenario_c_reload_with_fewer_items_clamps_window() {
    let mut src = Rows::fixed(1000, 30);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(100), &src);
    tick(&mut r, &mut src, &mut host);

    host.bounds.offset = 29_500;
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(
        report.window,
        Some(WindowRange {
            top: 978,
            bottom: 999
        })
    );

    src.count = 10;
    src.recycled.clear();
    let ticket = r.reload(&mut src);
    assert_eq!(r.window(), None);
    assert!(r.cache().is_empty());
    assert_eq!(src.recycled.len(), 22);
    assert_eq!(r.item_count(), 10);

    let report = r.on_tick(ticket, &mut src, &mut host).unwrap();
    let w = report.window.unwrap();
    assert_eq!(w.bottom, 9);
    assert_consistent(&r, &host);
}

#[test]
fn scenario_c_soft_count_change_evicts_out_of_range_cells() {
    let mut src = Rows::fixed(1000, 30);
    let mut host = Host::new(15_000, 500);
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(100), &src);
    // 1000 items at the default 30 estimate: the seed lands at 499.
    tick(&mut r, &mut src, &mut host);
    let before = r.window().unwrap();
    assert!(before.bottom > 505);

    src.count = 505;
    src.recycled.clear();
    let ticket = r.set_item_count(505).unwrap();
    // Nothing is discarded until the pass runs.
    assert_eq!(r.window(), Some(before));

    let report = r.on_tick(ticket, &mut src, &mut host).unwrap();
    assert_eq!(
        report.window,
        Some(WindowRange {
            top: before.top,
            bottom: 504
        })
    );
    let mut recycled = src.recycled.clone();
    recycled.sort_unstable();
    assert_eq!(recycled, (505..=before.bottom).collect::<Vec<_>>());
    assert_consistent(&r, &host);
}

#[test]
fn scenario_d_zero_height_cell_falls_back_to_default_average() {
    let mut src = Rows::fixed(1, 0);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new().with_default_item_extent(44), &src);

    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 0 }));
    assert_eq!(report.extent.rendered, 0);
    assert_eq!(report.extent.average, AverageExtent::fixed(44));
    assert_eq!(report.extent.total, 500);
    assert_consistent(&r, &host);
}

#[test]
fn zero_height_lists_respect_the_pass_budget() {
    let mut src = Rows::fixed(10_000, 0);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new().with_max_cells_per_pass(64), &src);

    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.created, 64);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 63 }));
    assert_eq!(
        host.errors,
        alloc::vec![WindowError::BudgetExhausted { budget: 64 }]
    );

    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.created, 64);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 127 }));
    assert_consistent(&r, &host);
}

#[test]
fn movement_notifications_coalesce_into_one_pass() {
    let mut src = Rows::fixed(100, 30);
    let mut host = Host::new(0, 300);
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);
    assert_eq!(r.state(), ReconcilerState::Idle);

    let ticket = r.notify_movement().unwrap();
    assert_eq!(r.notify_movement(), None);
    assert_eq!(r.notify_movement(), None);
    assert_eq!(r.state(), ReconcilerState::Scheduled);

    // The pass sees the bounds as of when it runs, not when it was scheduled.
    host.bounds.offset = 600;
    let report = r.on_tick(ticket, &mut src, &mut host).unwrap();
    assert_eq!(r.state(), ReconcilerState::Idle);
    assert_eq!(r.cell(report.window.unwrap().top).map(|c| c.end() > 600), Some(true));

    assert_eq!(r.on_tick(ticket, &mut src, &mut host), None);
    assert_eq!(host.extents.len(), 1);
}

#[test]
fn reload_and_teardown_cancel_pending_passes() {
    let mut src = Rows::fixed(100, 30);
    let mut host = Host::new(0, 300);
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);
    tick(&mut r, &mut src, &mut host);

    let stale = r.notify_movement().unwrap();
    let fresh = r.reload(&mut src);
    assert_ne!(stale, fresh);
    assert_eq!(r.on_tick(stale, &mut src, &mut host), None);
    assert!(r.on_tick(fresh, &mut src, &mut host).is_some());

    let pending = r.notify_movement().unwrap();
    let cached = r.cache().len();
    src.recycled.clear();
    r.teardown(&mut src);
    assert_eq!(r.state(), ReconcilerState::Idle);
    assert_eq!(r.on_tick(pending, &mut src, &mut host), None);
    assert_eq!(r.window(), None);
    assert!(r.cache().is_empty());
    assert_eq!(src.recycled.len(), cached);
}

#[test]
fn reconciling_twice_without_changes_is_idempotent() {
    let mut src = Rows {
        count: 500,
        heights: alloc::vec![12, 40, 25, 70, 18],
        ..Rows::default()
    };
    let mut host = Host::new(4_000, 600);
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(80), &src);
    settle(&mut r, &mut src, &mut host);
    let snapshot = r.snapshot();
    let origins: Vec<i64> = r.cells().map(|c| c.origin()).collect();

    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.created, 0);
    assert_eq!(report.evicted, 0);
    assert_eq!(report.scroll_adjustment, 0);
    assert_eq!(r.snapshot(), snapshot);
    assert_eq!(r.cells().map(|c| c.origin()).collect::<Vec<_>>(), origins);
}

#[test]
fn scrolling_evicts_cells_outside_the_margin() {
    let mut src = Rows::fixed(1000, 30);
    let mut host = Host::new(0, 300);
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(60), &src);
    tick(&mut r, &mut src, &mut host);
    assert_eq!(r.window(), Some(WindowRange { top: 0, bottom: 11 }));

    // Scroll by less than a viewport: cells overlap and the window slides.
    host.bounds.offset = 200;
    src.recycled.clear();
    let report = tick(&mut r, &mut src, &mut host);
    // Region is [140, 560]; item 3 ends at 120 and item 4 at 150.
    assert_eq!(src.recycled, alloc::vec![0, 1, 2, 3]);
    assert_eq!(report.window, Some(WindowRange { top: 4, bottom: 18 }));
    assert_consistent(&r, &host);
}

#[test]
fn adapter_miss_stops_growth_and_is_retried_next_pass() {
    let mut src = Rows::fixed(100, 30);
    src.unavailable.push(7);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);

    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 6 }));
    assert_eq!(
        host.errors,
        alloc::vec![WindowError::CellUnavailable {
            index: 7,
            count: 100
        }]
    );
    assert_consistent(&r, &host);

    src.unavailable.clear();
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 16 }));
}

#[test]
fn reaching_item_zero_pins_the_leading_edge() {
    let mut src = Rows::fixed(100, 10);
    let mut host = Host::new(2_000, 500);
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);

    // Estimated at 30 per item, so offset 2000 seeds item 66 although it really sits at 660.
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 66, bottom: 99 }));
    assert_eq!(r.cell(66).map(|c| c.origin()), Some(2_000));

    host.bounds.offset = 1_700;
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 36, bottom: 86 }));

    host.bounds.offset = 1_300;
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 46 }));
    assert_eq!(report.scroll_adjustment, -1_340);
    assert_eq!(host.adjustments, alloc::vec![-1_340]);
    assert_eq!(r.cell(0).map(|c| c.origin()), Some(0));
    assert_eq!(host.bounds.offset, 0);

    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.scroll_adjustment, 0);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 49 }));
    assert_consistent(&r, &host);
}

#[test]
fn pinning_can_be_disabled() {
    let mut src = Rows::fixed(100, 10);
    let mut host = Host::new(2_000, 500);
    let mut r =
        Reconciler::with_source(WindowOptions::new().with_pin_leading_edge(false), &src);
    tick(&mut r, &mut src, &mut host);
    host.bounds.offset = 1_700;
    tick(&mut r, &mut src, &mut host);
    host.bounds.offset = 1_300;
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.scroll_adjustment, 0);
    assert_eq!(r.cell(0).map(|c| c.origin()), Some(1_340));
    assert!(host.adjustments.is_empty());
}

/// A host that cannot move its own offset and leaves `adjust_scroll_offset` at the default.
struct PinnedHost {
    bounds: ViewportBounds,
}

impl ViewportHost for PinnedHost {
    fn visible_bounds(&self) -> ViewportBounds {
        self.bounds
    }

    fn set_content_extent(&mut self, _extent: u64) {}
}

#[test]
fn viewport_past_the_content_settles_when_pinning_is_off() {
    let mut src = Rows::fixed(1, 1);
    let mut host = PinnedHost {
        bounds: ViewportBounds::new(2, 1, 400),
    };
    let mut r =
        Reconciler::with_source(WindowOptions::new().with_pin_leading_edge(false), &src);

    let first = r.notify_movement().expect("ticket");
    let report = r.on_tick(first, &mut src, &mut host).expect("pass");
    assert_eq!(report.created, 1);
    assert_eq!(r.cell(0).map(|c| c.origin()), Some(2));

    for _ in 0..3 {
        let ticket = r.notify_movement().expect("ticket");
        let report = r.on_tick(ticket, &mut src, &mut host).expect("pass");
        assert_eq!((report.created, report.evicted), (0, 0));
        assert_eq!(report.scroll_adjustment, 0);
    }
    assert_eq!(src.created, alloc::vec![0]);
}

#[test]
fn invalidating_a_visible_cell_pushes_later_cells_down() {
    let mut src = Rows::fixed(100, 30);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);
    tick(&mut r, &mut src, &mut host);
    let window = r.window();
    assert_eq!(window, Some(WindowRange { top: 0, bottom: 16 }));

    r.cell_mut(3).unwrap().cell_mut().height = 90;
    assert_eq!(r.invalidate_height(3, &mut host), Some(60));
    assert_eq!(r.cell(3).map(|c| (c.origin(), c.height())), Some((90, 90)));
    assert_eq!(r.cell(4).map(|c| c.origin()), Some(180));
    assert_eq!(r.window(), window);
    assert_eq!(r.extent().rendered, 17 * 30 + 60);
    assert_eq!(host.extents.last().copied(), Some(r.extent().total));

    assert_eq!(r.invalidate_height(50, &mut host), None);
}

#[test]
fn invalidating_a_cell_above_the_viewport_keeps_visible_cells_still() {
    let mut src = Rows::fixed(100, 30);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(100), &src);
    tick(&mut r, &mut src, &mut host);
    host.bounds.offset = 600;
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 16, bottom: 39 }));

    r.cell_mut(16).unwrap().cell_mut().height = 60;
    assert_eq!(r.invalidate_height(16, &mut host), Some(30));
    assert_eq!(r.cell(17).map(|c| c.origin()), Some(510));
    assert_eq!(r.cell(16).map(|c| c.origin()), Some(450));
}

#[test]
fn width_change_remeasures_the_window() {
    let mut src = Rows {
        count: 50,
        heights: alloc::vec![10],
        wrap: Some(100),
        ..Rows::default()
    };
    let mut host = Host::new(0, 100);
    host.bounds.width = 100;
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 9 }));

    host.bounds.width = 50;
    let report = tick(&mut r, &mut src, &mut host);
    assert_eq!(report.window, Some(WindowRange { top: 0, bottom: 5 }));
    assert!(r.cells().all(|c| c.height() == 20 && c.width() == 50));
    assert_consistent(&r, &host);
}

#[test]
fn anchored_reload_keeps_the_item_in_place() {
    let mut src = Rows::fixed(1000, 30);
    let mut host = Host::new(0, 500);
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);
    tick(&mut r, &mut src, &mut host);
    host.bounds.offset = 15_015;
    tick(&mut r, &mut src, &mut host);

    let anchor = r.capture_anchor(host.bounds).unwrap();
    assert_eq!(
        anchor,
        ScrollAnchor {
            index: 499,
            offset_in_viewport: 0
        }
    );

    // Ten items were prepended: the anchored item moved to 509.
    src.count = 1010;
    let ticket = r.reload_anchored(
        &mut src,
        ScrollAnchor {
            index: anchor.index + 10,
            ..anchor
        },
    );
    r.on_tick(ticket, &mut src, &mut host).unwrap();
    assert_eq!(r.cell(509).map(|c| c.origin()), Some(15_015));
    assert_consistent(&r, &host);
}

#[test]
fn option_changes_schedule_a_pass() {
    let src = Rows::fixed(10, 30);
    let mut r = Reconciler::with_source(WindowOptions::new(), &src);
    assert_eq!(r.set_options(WindowOptions::new()), None);
    assert!(r.set_margin(40).is_some());
    assert_eq!(r.set_margin(50), None, "coalesced into the pending pass");
    assert_eq!(r.options().margin, 50);
}

#[test]
fn window_tracker_contracts_and_clears() {
    let mut w = Window::new();
    assert!(w.is_empty());
    w.seed(5);
    w.expand_bottom(6).unwrap();
    w.expand_top(4).unwrap();
    assert_eq!(w.range(), Some(WindowRange { top: 4, bottom: 6 }));
    assert_eq!(w.len(), 3);

    assert_eq!(
        w.contract_top(5),
        Some(WindowRange { top: 5, bottom: 6 })
    );
    assert_eq!(w.contract_top(7), None);
    assert!(w.is_empty());

    w.seed(0);
    assert_eq!(w.contract_bottom(None), None);
    assert_eq!(w.top(), None);
    assert_eq!(w.bottom(), None);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "expand_bottom must be adjacent")]
fn window_tracker_rejects_gaps_in_debug() {
    let mut w = Window::new();
    w.seed(5);
    let _ = w.expand_bottom(8);
}

#[cfg(not(debug_assertions))]
#[test]
fn window_tracker_rejects_gaps_in_release() {
    let mut w = Window::new();
    w.seed(5);
    assert_eq!(
        w.expand_bottom(8),
        Err(WindowError::NonAdjacentExpansion {
            edge: 5,
            requested: 8
        })
    );
    assert_eq!(w.range(), Some(WindowRange { top: 5, bottom: 5 }));
}

#[test]
fn cache_get_or_create_never_evicts() {
    let mut src = Rows::fixed(3, 30);
    let mut cache = CellCache::new();
    assert!(cache.get_or_create(0, 100, &mut src).is_some());
    assert!(cache.get_or_create(0, 100, &mut src).is_some());
    assert!(cache.get_or_create(1, 100, &mut src).is_some());
    assert!(cache.get_or_create(3, 100, &mut src).is_none());
    assert_eq!(src.created, alloc::vec![0, 1]);
    assert_eq!(cache.indexes(), alloc::vec![0, 1]);

    assert!(cache.evict(0, &mut src));
    assert!(!cache.evict(0, &mut src));
    assert_eq!(src.recycled, alloc::vec![0]);
}

#[test]
fn cell_height_is_measured_once_until_invalidated() {
    let mut src = Rows::fixed(1, 30);
    let mut cache = CellCache::new();
    let slot = cache.get_or_create(0, 100, &mut src).unwrap();
    assert!(!slot.is_measured());
    assert_eq!(slot.height(), 30);
    assert!(slot.is_measured());

    slot.cell_mut().height = 45;
    assert_eq!(slot.height(), 30, "cached until invalidated");
    slot.invalidate_height();
    assert_eq!(slot.height(), 45);
    assert_eq!(slot.id(), 0);
}

#[test]
fn extent_estimate_extrapolates_the_window_average() {
    let mut src = Rows {
        count: 100,
        heights: alloc::vec![10, 20, 30],
        ..Rows::default()
    };
    let mut cache = CellCache::new();
    let mut window = Window::new();
    window.seed(10);
    for i in 10..=12 {
        cache.get_or_create(i, 100, &mut src);
        if i > 10 {
            window.expand_bottom(i).unwrap();
        }
    }

    // Heights of 10..=12 are 20, 30, 10.
    let e = ExtentEstimate::compute(&window, &cache, 100, 200, 30);
    assert_eq!(e.rendered, 60);
    assert_eq!(e.average, AverageExtent { sum: 60, count: 3 });
    assert_eq!(e.above, 200);
    assert_eq!(e.below, 87 * 20);
    assert_eq!(e.total, 60 + 200 + 87 * 20);

    let empty = ExtentEstimate::compute(&Window::new(), &cache, 100, 200, 30);
    assert_eq!(empty.total, 3_000);
    let none = ExtentEstimate::compute(&Window::new(), &cache, 0, 200, 30);
    assert_eq!(none.total, 200);
}

#[test]
fn average_extent_scales_exactly() {
    let avg = AverageExtent::of(10, 3);
    assert_eq!(avg.scale(3), 10);
    assert_eq!(avg.scale(300_000_000), 1_000_000_000);
    assert_eq!(avg.per_item(), 3);
    assert_eq!(AverageExtent::of(5, 0).count, 1);
    assert_eq!(AverageExtent::fixed(u32::MAX).scale(usize::MAX), u64::MAX);
}

#[test]
fn seed_index_maps_scroll_proportion_onto_indexes() {
    use crate::reconciler::seed_index;
    assert_eq!(seed_index(0, 30_000, 1000), 0);
    assert_eq!(seed_index(15_000, 30_000, 1000), 499);
    assert_eq!(seed_index(30_000, 30_000, 1000), 999);
    assert_eq!(seed_index(u64::MAX, 30_000, 1000), 999);
    assert_eq!(seed_index(500, 0, 1000), 0);
    assert_eq!(seed_index(500, 1000, 0), 0);
}

fn region_of(host: &Host, margin: u32) -> Region {
    host.bounds.expanded(margin)
}

proptest! {
    #[test]
    fn passes_keep_window_cache_and_extent_consistent(
        heights in prop::collection::vec(1u32..80, 1..16),
        count in 0usize..400,
        size in 1u32..800,
        margin in 0u32..200,
        offsets in prop::collection::vec(0u64..40_000, 1..12),
    ) {
        let mut src = Rows { count, heights, ..Rows::default() };
        let mut host = Host::new(0, size);
        let mut r = Reconciler::with_source(WindowOptions::new().with_margin(margin), &src);

        for offset in offsets {
            host.bounds.offset = offset;
            settle(&mut r, &mut src, &mut host);
            assert_consistent(&r, &host);

            let region = region_of(&host, margin);
            for cell in r.cache().iter() {
                prop_assert!(
                    !region.excludes(cell.origin(), cell.end()),
                    "cell {} at [{}, {}] outside {:?}",
                    cell.id(),
                    cell.origin(),
                    cell.end(),
                    region
                );
            }

            if let Some(w) = r.window() {
                let top = r.cell(w.top).unwrap();
                let bottom = r.cell(w.bottom).unwrap();
                prop_assert!(w.top == 0 || top.origin() <= region.start);
                prop_assert!(w.bottom + 1 == count || bottom.end() >= region.end);
            } else {
                prop_assert_eq!(count, 0);
            }

            let snapshot = r.snapshot();
            let again = tick(&mut r, &mut src, &mut host);
            prop_assert_eq!(again.created, 0);
            prop_assert_eq!(again.evicted, 0);
            prop_assert_eq!(r.snapshot(), snapshot);
        }
    }
}
