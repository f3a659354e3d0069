use core::ops::RangeInclusive;

/// Viewport geometry as reported by the host.
///
/// `offset`/`size` are along the scroll axis; `width` is the cross-axis size that cells are
/// measured against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportBounds {
    pub offset: u64,
    pub size: u32,
    pub width: u32,
}

impl ViewportBounds {
    pub fn new(offset: u64, size: u32, width: u32) -> Self {
        Self {
            offset,
            size,
            width,
        }
    }

    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }

    /// The region cells may occupy without being evicted: the visible span grown by `margin` on
    /// both sides.
    pub fn expanded(&self, margin: u32) -> Region {
        let offset = clamp_to_i64(self.offset);
        let margin = margin as i64;
        Region {
            start: offset.saturating_sub(margin),
            end: offset
                .saturating_add(self.size as i64)
                .saturating_add(margin),
        }
    }
}

/// A closed span on the scroll axis. Signed because anchor-based placement can push cells above
/// offset zero before the leading edge is pinned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub start: i64,
    pub end: i64,
}

impl Region {
    /// Whether `[start, end]` lies entirely outside this region.
    pub fn excludes(&self, start: i64, end: i64) -> bool {
        end < self.start || start > self.end
    }
}

/// Inclusive range of materialized indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub top: usize,
    pub bottom: usize,
}

impl WindowRange {
    pub fn len(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.top..=self.bottom).contains(&index)
    }

    pub fn indexes(&self) -> RangeInclusive<usize> {
        self.top..=self.bottom
    }
}

/// Identifies an item and where it sat relative to the viewport, so the window can be rebuilt
/// around it after a reload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    pub index: usize,
    /// Distance from the viewport offset down to the item's leading edge (negative when the item
    /// starts above the viewport).
    pub offset_in_viewport: i64,
}

pub(crate) fn clamp_to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
