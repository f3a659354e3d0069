// Example: cells whose height depends on the available width are re-measured on resize.
use cellwindow::{DataSource, MeasureCell, Reconciler, ViewportBounds, ViewportHost, WindowOptions};

struct Paragraph {
    chars: u32,
}

impl MeasureCell for Paragraph {
    fn measure(&self, width: u32) -> u32 {
        self.chars.div_ceil(width.max(1))
    }
}

struct Document {
    lengths: Vec<u32>,
}

impl DataSource for Document {
    type Cell = Paragraph;

    fn item_count(&self) -> usize {
        self.lengths.len()
    }

    fn cell_for_index(&mut self, index: usize, _available_width: u32) -> Option<Paragraph> {
        let chars = *self.lengths.get(index)?;
        Some(Paragraph { chars })
    }
}

struct Pane {
    bounds: ViewportBounds,
}

impl ViewportHost for Pane {
    fn visible_bounds(&self) -> ViewportBounds {
        self.bounds
    }

    fn set_content_extent(&mut self, extent: u64) {
        println!("  content extent -> {extent}");
    }
}

fn print_window(r: &Reconciler<Paragraph>) {
    for slot in r.cells() {
        println!(
            "  #{:<3} origin={:<4} height={}",
            slot.id(),
            slot.origin(),
            slot.height()
        );
    }
}

fn main() {
    let mut doc = Document {
        lengths: (0..500).map(|i| 40 + (i * 37) % 200).collect(),
    };
    let mut pane = Pane {
        bounds: ViewportBounds::new(0, 24, 80),
    };
    let mut r = Reconciler::with_source(WindowOptions::new().with_default_item_extent(2), &doc);

    println!("width 80:");
    let ticket = r.reload(&mut doc);
    r.on_tick(ticket, &mut doc, &mut pane);
    print_window(&r);

    println!("width 40:");
    pane.bounds.width = 40;
    if let Some(ticket) = r.notify_movement() {
        r.on_tick(ticket, &mut doc, &mut pane);
    }
    print_window(&r);
}
