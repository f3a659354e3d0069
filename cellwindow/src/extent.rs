use crate::{CellCache, MeasureCell, Window};

/// An average item extent kept as an exact ratio, so extrapolating over millions of items does not
/// accumulate rounding error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AverageExtent {
    pub sum: u64,
    /// Always at least 1.
    pub count: u64,
}

impl AverageExtent {
    pub fn fixed(extent: u32) -> Self {
        Self {
            sum: extent as u64,
            count: 1,
        }
    }

    pub fn of(sum: u64, count: usize) -> Self {
        Self {
            sum,
            count: (count as u64).max(1),
        }
    }

    /// The extent of `n` items of this average size, rounded down.
    pub fn scale(&self, n: usize) -> u64 {
        let v = (self.sum as u128).saturating_mul(n as u128) / self.count.max(1) as u128;
        u64::try_from(v).unwrap_or(u64::MAX)
    }

    /// Per-item extent, rounded down.
    pub fn per_item(&self) -> u64 {
        self.sum / self.count.max(1)
    }
}

/// The estimated scrollable extent: measured cells in the window plus extrapolated space for the
/// items above and below it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtentEstimate {
    /// Sum of measured heights of the windowed cells.
    pub rendered: u64,
    /// Estimated extent of the un-materialized items above the window.
    pub above: u64,
    /// Estimated extent of the un-materialized items below the window.
    pub below: u64,
    /// `max(rendered + above + below, viewport size)`, possibly raised by [`Self::cover`].
    pub total: u64,
    pub average: AverageExtent,
}

impl ExtentEstimate {
    /// Raises `total` so that content up to `trailing` is reachable.
    pub fn cover(mut self, trailing: u64) -> Self {
        self.total = self.total.max(trailing);
        self
    }

    /// Computes the estimate for the current window.
    ///
    /// `default_item_extent` stands in for the average before anything has been measured, and
    /// whenever the window's cells all measure zero.
    pub fn compute<C: MeasureCell>(
        window: &Window,
        cache: &CellCache<C>,
        item_count: usize,
        viewport_size: u32,
        default_item_extent: u32,
    ) -> Self {
        let viewport = viewport_size as u64;
        let fallback = AverageExtent::fixed(default_item_extent);

        if item_count == 0 {
            return Self {
                rendered: 0,
                above: 0,
                below: 0,
                total: viewport,
                average: fallback,
            };
        }

        let Some(range) = window.range() else {
            let below = fallback.scale(item_count);
            return Self {
                rendered: 0,
                above: 0,
                below,
                total: below.max(viewport),
                average: fallback,
            };
        };

        let rendered = range
            .indexes()
            .filter_map(|i| cache.get(i))
            .fold(0u64, |acc, slot| acc.saturating_add(slot.height() as u64));

        let average = if rendered == 0 {
            fallback
        } else {
            AverageExtent::of(rendered, range.len())
        };

        let above = average.scale(range.top);
        let below = average.scale(item_count.saturating_sub(1).saturating_sub(range.bottom));
        let total = rendered
            .saturating_add(above)
            .saturating_add(below)
            .max(viewport);

        Self {
            rendered,
            above,
            below,
            total,
            average,
        }
    }
}
