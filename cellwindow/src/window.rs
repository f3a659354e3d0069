use crate::{WindowError, WindowRange};

/// Tracks the inclusive range of materialized indexes.
///
/// The window is either absent or a non-empty `[top, bottom]` range; there is no half-open state.
/// Growth only ever moves an edge by one index, shrinking past the opposite edge clears it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    range: Option<WindowRange>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> Option<WindowRange> {
        self.range
    }

    pub fn top(&self) -> Option<usize> {
        self.range.map(|r| r.top)
    }

    pub fn bottom(&self) -> Option<usize> {
        self.range.map(|r| r.bottom)
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    pub fn len(&self) -> usize {
        self.range.map_or(0, |r| r.len())
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range.is_some_and(|r| r.contains(index))
    }

    /// Opens an empty window at a single index.
    pub fn seed(&mut self, index: usize) {
        debug_assert!(self.range.is_none(), "seeding a window that is already open");
        self.range = Some(WindowRange {
            top: index,
            bottom: index,
        });
    }

    pub fn clear(&mut self) {
        self.range = None;
    }

    /// Extends the window up by one index. `new_top` must equal `top - 1`.
    pub fn expand_top(&mut self, new_top: usize) -> Result<(), WindowError> {
        let Some(range) = self.range.as_mut() else {
            debug_assert!(false, "expand_top on an empty window (requested {new_top})");
            self.seed(new_top);
            return Ok(());
        };
        if range.top.checked_sub(1) != Some(new_top) {
            wwarn!(top = range.top, new_top, "non-adjacent expand_top ignored");
            debug_assert!(
                false,
                "expand_top must be adjacent (top={}, requested={new_top})",
                range.top
            );
            return Err(WindowError::NonAdjacentExpansion {
                edge: range.top,
                requested: new_top,
            });
        }
        range.top = new_top;
        Ok(())
    }

    /// Extends the window down by one index. `new_bottom` must equal `bottom + 1`.
    pub fn expand_bottom(&mut self, new_bottom: usize) -> Result<(), WindowError> {
        let Some(range) = self.range.as_mut() else {
            debug_assert!(false, "expand_bottom on an empty window (requested {new_bottom})");
            self.seed(new_bottom);
            return Ok(());
        };
        if range.bottom.checked_add(1) != Some(new_bottom) {
            wwarn!(bottom = range.bottom, new_bottom, "non-adjacent expand_bottom ignored");
            debug_assert!(
                false,
                "expand_bottom must be adjacent (bottom={}, requested={new_bottom})",
                range.bottom
            );
            return Err(WindowError::NonAdjacentExpansion {
                edge: range.bottom,
                requested: new_bottom,
            });
        }
        range.bottom = new_bottom;
        Ok(())
    }

    /// Moves the top edge down to `new_top`. Returns the remaining range, or `None` when the
    /// window was cleared because `new_top` passed the bottom edge.
    pub fn contract_top(&mut self, new_top: usize) -> Option<WindowRange> {
        let range = self.range.as_mut()?;
        debug_assert!(
            new_top >= range.top,
            "contract_top must move toward the bottom (top={}, requested={new_top})",
            range.top
        );
        if new_top > range.bottom {
            self.range = None;
            return None;
        }
        range.top = range.top.max(new_top);
        Some(*range)
    }

    /// Moves the bottom edge up to `new_bottom`. `None` means the window is now cleared; the
    /// window cannot express "contract past index 0", so callers pass `None` for that case.
    pub fn contract_bottom(&mut self, new_bottom: Option<usize>) -> Option<WindowRange> {
        let range = self.range.as_mut()?;
        let Some(new_bottom) = new_bottom.filter(|&b| b >= range.top) else {
            self.range = None;
            return None;
        };
        debug_assert!(
            new_bottom <= range.bottom,
            "contract_bottom must move toward the top (bottom={}, requested={new_bottom})",
            range.bottom
        );
        range.bottom = range.bottom.min(new_bottom);
        Some(*range)
    }
}
