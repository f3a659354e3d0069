use crate::{ViewportBounds, WindowError};

/// A materialized item that can report its extent along the scroll axis.
///
/// Concrete item variants (text rows, headers, images, ...) are chosen by the [`DataSource`];
/// the core only needs their height for a given cross-axis width.
pub trait MeasureCell {
    fn measure(&self, width: u32) -> u32;
}

/// Supplies the item count and produces cells on demand. Owned by the host application.
///
/// `cell_for_index` must be deterministic for a given `(index, available_width)` until the next
/// reload.
pub trait DataSource {
    type Cell: MeasureCell;

    fn item_count(&self) -> usize;

    /// Returns `None` when no cell can be produced (normally only past the list boundaries).
    fn cell_for_index(&mut self, index: usize, available_width: u32) -> Option<Self::Cell>;

    /// Receives every cell the window evicts. The default drops it; pooling hosts can keep it.
    fn recycle(&mut self, index: usize, cell: Self::Cell) {
        let _ = (index, cell);
    }
}

/// The scrollable surface the window is rendered into.
///
/// Implementations must not drive a reconciliation pass synchronously from any of these
/// callbacks; movement they cause is delivered through the normal notification path.
pub trait ViewportHost {
    fn visible_bounds(&self) -> ViewportBounds;

    /// Receives the estimated total content extent at the end of every pass.
    fn set_content_extent(&mut self, extent: u64);

    /// Asks the host to shift its scroll offset so visible content stays put after the window was
    /// re-anchored.
    ///
    /// Only called when [`crate::WindowOptions::pin_leading_edge`] is set. Hosts that keep the
    /// default (which drops the delta) should turn pinning off: otherwise a viewport left past
    /// the content re-seeds and re-pins item 0 on every pass.
    fn adjust_scroll_offset(&mut self, delta: i64) {
        if delta != 0 {
            wwarn!(delta, "host ignored a scroll adjustment; disable pin_leading_edge");
        }
        let _ = delta;
    }

    /// Receives non-fatal conditions hit during a pass.
    fn report(&mut self, error: &WindowError) {
        let _ = error;
    }
}
