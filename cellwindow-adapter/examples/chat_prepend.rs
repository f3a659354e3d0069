// Example: keep the visible message in place when older messages are prepended.
use cellwindow::{DataSource, MeasureCell, ViewportHost, WindowOptions};
use cellwindow_adapter::{Controller, MemoryViewport};

struct Message {
    lines: u32,
}

impl MeasureCell for Message {
    fn measure(&self, _width: u32) -> u32 {
        self.lines * 18
    }
}

struct History {
    messages: Vec<u32>,
}

impl DataSource for History {
    type Cell = Message;

    fn item_count(&self) -> usize {
        self.messages.len()
    }

    fn cell_for_index(&mut self, index: usize, _available_width: u32) -> Option<Message> {
        let lines = *self.messages.get(index)?;
        Some(Message { lines })
    }
}

fn main() {
    let history = History {
        messages: (0..200).map(|i| 1 + i % 4).collect(),
    };
    let mut c = Controller::new(
        WindowOptions::default(),
        history,
        MemoryViewport::new(480, 360),
    );
    c.reload();
    c.run_until_idle(16);
    c.on_scroll(900);
    c.run_until_idle(16);

    let before = c.reconciler().capture_anchor(c.host().visible_bounds());
    println!("before prepend: offset={} anchor={before:?}", c.host().offset());

    // Load 50 older messages in front of the current history.
    let older = 50;
    let mut messages: Vec<u32> = (0..older).map(|i| 2 + i % 3).collect();
    messages.append(&mut c.source_mut().messages);
    c.source_mut().messages = messages;

    c.reload_with_anchor(|mut anchor| {
        anchor.index += older as usize;
        Some(anchor)
    });
    c.run_until_idle(16);

    let after = c.reconciler().capture_anchor(c.host().visible_bounds());
    println!("after prepend: offset={} anchor={after:?}", c.host().offset());
}
