// Example: drive a reconciler by hand over a fixed-height list.
use cellwindow::{DataSource, MeasureCell, Reconciler, ViewportBounds, ViewportHost, WindowOptions};

struct Line(u32);

impl MeasureCell for Line {
    fn measure(&self, _width: u32) -> u32 {
        self.0
    }
}

struct Lines(usize);

impl DataSource for Lines {
    type Cell = Line;

    fn item_count(&self) -> usize {
        self.0
    }

    fn cell_for_index(&mut self, index: usize, _available_width: u32) -> Option<Line> {
        (index < self.0).then_some(Line(1))
    }
}

struct Terminal {
    bounds: ViewportBounds,
    extent: u64,
}

impl ViewportHost for Terminal {
    fn visible_bounds(&self) -> ViewportBounds {
        self.bounds
    }

    fn set_content_extent(&mut self, extent: u64) {
        self.extent = extent;
    }
}

fn main() {
    let mut source = Lines(1_000_000);
    let mut host = Terminal {
        bounds: ViewportBounds::new(0, 10, 80),
        extent: 0,
    };
    let mut r = Reconciler::with_source(WindowOptions::new().with_margin(5), &source);

    let ticket = r.reload(&mut source);
    r.on_tick(ticket, &mut source, &mut host);
    println!("window={:?} extent={}", r.window(), host.extent);

    host.bounds.offset = 123_456;
    if let Some(ticket) = r.notify_movement() {
        let report = r.on_tick(ticket, &mut source, &mut host);
        println!("after jump: {report:?}");
    }
    println!("snapshot={:?}", r.snapshot());
}
