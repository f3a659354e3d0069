use alloc::collections::VecDeque;

use cellwindow::PassTicket;

/// A single-threaded FIFO of deferred reconciliation passes.
///
/// Stands in for the UI thread's run loop: tickets are enqueued when a pass is scheduled and run
/// later, never synchronously from the callback that scheduled them.
#[derive(Clone, Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<PassTicket>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Enqueues `ticket` if present. Returns whether anything was queued.
    pub fn push(&mut self, ticket: Option<PassTicket>) -> bool {
        match ticket {
            Some(ticket) => {
                self.tasks.push_back(ticket);
                true
            }
            None => false,
        }
    }

    pub fn pop(&mut self) -> Option<PassTicket> {
        self.tasks.pop_front()
    }

    /// Drops every queued task. Stale tickets are harmless, this only frees them early.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
