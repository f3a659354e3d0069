/// Proof that a reconciliation pass was scheduled.
///
/// The host enqueues the ticket on its own task queue and hands it back to
/// [`crate::Reconciler::on_tick`]. Tickets invalidated by a reload, teardown or an earlier run are
/// no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PassTicket {
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcilerState {
    Idle,
    /// A pass is pending; further movement notifications coalesce into it.
    Scheduled,
}

/// A scheduled flag plus a generation counter acting as the cancellation token.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PassSchedule {
    generation: u64,
    scheduled: bool,
}

impl PassSchedule {
    /// Returns a ticket only when no pass was pending.
    pub(crate) fn request(&mut self) -> Option<PassTicket> {
        if self.scheduled {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.scheduled = true;
        Some(PassTicket {
            generation: self.generation,
        })
    }

    /// Cancels any pending pass and schedules a fresh one.
    pub(crate) fn restart(&mut self) -> PassTicket {
        self.generation = self.generation.wrapping_add(1);
        self.scheduled = true;
        PassTicket {
            generation: self.generation,
        }
    }

    pub(crate) fn cancel(&mut self) {
        if self.scheduled {
            self.generation = self.generation.wrapping_add(1);
        }
        self.scheduled = false;
    }

    /// Consumes the pending pass if `ticket` is the live one.
    pub(crate) fn take(&mut self, ticket: PassTicket) -> bool {
        if !self.scheduled || ticket.generation != self.generation {
            return false;
        }
        self.scheduled = false;
        true
    }

    pub(crate) fn state(&self) -> ReconcilerState {
        if self.scheduled {
            ReconcilerState::Scheduled
        } else {
            ReconcilerState::Idle
        }
    }
}
