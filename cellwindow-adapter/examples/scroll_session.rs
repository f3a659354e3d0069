// Example: a controller over an in-memory viewport, scrolled like a user would.
use cellwindow::{DataSource, MeasureCell, WindowOptions};
use cellwindow_adapter::{Controller, MemoryViewport};

struct Row(u32);

impl MeasureCell for Row {
    fn measure(&self, _width: u32) -> u32 {
        self.0
    }
}

struct Feed {
    count: usize,
}

impl DataSource for Feed {
    type Cell = Row;

    fn item_count(&self) -> usize {
        self.count
    }

    fn cell_for_index(&mut self, index: usize, _available_width: u32) -> Option<Row> {
        (index < self.count).then(|| Row(20 + (index as u32 % 3) * 20))
    }
}

fn main() {
    let mut c = Controller::new(
        WindowOptions::new().with_margin(200),
        Feed { count: 10_000 },
        MemoryViewport::new(600, 320),
    );
    c.reload();
    c.run_until_idle(16);
    println!("loaded: {c:?}");

    // A fling: many scroll events between two run-loop turns collapse into one pass.
    for offset in (0..=4000).step_by(250) {
        c.on_scroll(offset);
    }
    println!("queued after fling: {}", c.queue().len());
    while let Some(report) = c.run_pending() {
        println!(
            "pass: window={:?} created={} evicted={} total={}",
            report.window, report.created, report.evicted, report.extent.total
        );
    }

    // Jump back to the top; pinning re-anchors item 0 and the controller runs the follow-up.
    c.on_scroll(0);
    let ran = c.run_until_idle(16);
    println!(
        "top: ran={ran} offset={} window={:?}",
        c.host().offset(),
        c.reconciler().window()
    );

    c.teardown();
}
