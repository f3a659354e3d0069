use alloc::vec::Vec;

use cellwindow::{ViewportBounds, ViewportHost, WindowError};

/// An in-memory scroll surface.
///
/// Behaves like a typical scroll view: the offset is clamped to `[0, content_extent - size]`,
/// including when the content shrinks underneath it. Useful for headless adapters and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryViewport {
    offset: u64,
    size: u32,
    width: u32,
    content_extent: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    errors: Vec<WindowError>,
}

impl MemoryViewport {
    /// Creates a viewport at offset 0 whose content initially fills exactly one screen.
    pub fn new(size: u32, width: u32) -> Self {
        Self {
            offset: 0,
            size,
            width,
            content_extent: u64::from(size),
            errors: Vec::new(),
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn content_extent(&self) -> u64 {
        self.content_extent
    }

    pub fn max_offset(&self) -> u64 {
        self.content_extent.saturating_sub(u64::from(self.size))
    }

    /// Scrolls to `offset` (clamped). Returns `true` if the visible bounds changed.
    pub fn set_offset(&mut self, offset: u64) -> bool {
        let clamped = offset.min(self.max_offset());
        let changed = clamped != self.offset;
        self.offset = clamped;
        changed
    }

    /// Resizes the visible span. Returns `true` if the visible bounds changed.
    pub fn set_size(&mut self, size: u32, width: u32) -> bool {
        let changed = size != self.size || width != self.width;
        self.size = size;
        self.width = width;
        self.offset = self.offset.min(self.max_offset());
        changed
    }

    /// Conditions reported by the window since the last [`Self::take_errors`].
    pub fn errors(&self) -> &[WindowError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<WindowError> {
        core::mem::take(&mut self.errors)
    }
}

impl ViewportHost for MemoryViewport {
    fn visible_bounds(&self) -> ViewportBounds {
        ViewportBounds::new(self.offset, self.size, self.width)
    }

    fn set_content_extent(&mut self, extent: u64) {
        self.content_extent = extent;
        self.offset = self.offset.min(self.max_offset());
    }

    fn adjust_scroll_offset(&mut self, delta: i64) {
        let target = if delta >= 0 {
            self.offset.saturating_add(delta.unsigned_abs())
        } else {
            self.offset.saturating_sub(delta.unsigned_abs())
        };
        self.offset = target.min(self.max_offset());
    }

    fn report(&mut self, error: &WindowError) {
        self.errors.push(error.clone());
    }
}
