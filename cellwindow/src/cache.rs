use alloc::vec::Vec;
use core::cell::Cell;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::{DataSource, MeasureCell, WindowRange};

#[cfg(feature = "std")]
type SlotMap<C> = HashMap<usize, CellSlot<C>>;
#[cfg(not(feature = "std"))]
type SlotMap<C> = BTreeMap<usize, CellSlot<C>>;

/// A materialized cell plus the bookkeeping the window needs about it.
///
/// The height is measured on first use and then cached until [`CellSlot::invalidate_height`]
/// (or a width change) clears it. The origin is owned by the reconciler.
#[derive(Debug)]
pub struct CellSlot<C> {
    id: usize,
    cell: C,
    width: u32,
    height: Cell<Option<u32>>,
    origin: i64,
}

impl<C: MeasureCell> CellSlot<C> {
    pub(crate) fn new(id: usize, cell: C, width: u32) -> Self {
        Self {
            id,
            cell,
            width,
            height: Cell::new(None),
            origin: 0,
        }
    }

    /// The item index this cell was created for. Never changes.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cell(&self) -> &C {
        &self.cell
    }

    /// Mutable access to the user cell. Call [`Self::invalidate_height`] (or
    /// `Reconciler::invalidate_height`) if the change affects its height.
    pub fn cell_mut(&mut self) -> &mut C {
        &mut self.cell
    }

    /// The cross-axis width the cell is measured against.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        if let Some(h) = self.height.get() {
            return h;
        }
        let h = self.cell.measure(self.width);
        self.height.set(Some(h));
        h
    }

    pub fn is_measured(&self) -> bool {
        self.height.get().is_some()
    }

    pub fn invalidate_height(&self) {
        self.height.set(None);
    }

    /// Leading edge on the scroll axis.
    pub fn origin(&self) -> i64 {
        self.origin
    }

    /// Trailing edge on the scroll axis.
    pub fn end(&self) -> i64 {
        self.origin.saturating_add(self.height() as i64)
    }

    pub(crate) fn set_origin(&mut self, origin: i64) {
        self.origin = origin;
    }

    pub(crate) fn shift(&mut self, delta: i64) {
        self.origin = self.origin.saturating_add(delta);
    }

    pub(crate) fn set_width(&mut self, width: u32) {
        if self.width != width {
            self.width = width;
            self.invalidate_height();
        }
    }

    pub(crate) fn into_cell(self) -> C {
        self.cell
    }
}

/// Index → materialized cell.
///
/// The cache never evicts on its own; the reconciler decides what leaves and hands evicted
/// cells back to the data source.
#[derive(Debug)]
pub struct CellCache<C> {
    slots: SlotMap<C>,
}

impl<C> Default for CellCache<C> {
    fn default() -> Self {
        Self {
            slots: SlotMap::new(),
        }
    }
}

impl<C: MeasureCell> CellCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.slots.contains_key(&index)
    }

    pub fn get(&self, index: usize) -> Option<&CellSlot<C>> {
        self.slots.get(&index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CellSlot<C>> {
        self.slots.get_mut(&index)
    }

    /// Returns the cached cell, or asks `source` for a new one and caches it.
    ///
    /// Returns `None` when the source cannot produce a cell; callers stop expanding in that
    /// direction.
    pub fn get_or_create<S>(
        &mut self,
        index: usize,
        width: u32,
        source: &mut S,
    ) -> Option<&mut CellSlot<C>>
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        if !self.slots.contains_key(&index) {
            let cell = source.cell_for_index(index, width)?;
            wtrace!(index, width, "cell created");
            self.slots.insert(index, CellSlot::new(index, cell, width));
        }
        self.slots.get_mut(&index)
    }

    /// Removes the cell at `index` and hands it back to `source`. Returns whether one existed.
    pub fn evict<S>(&mut self, index: usize, source: &mut S) -> bool
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        let Some(slot) = self.slots.remove(&index) else {
            return false;
        };
        wtrace!(index, "cell evicted");
        source.recycle(index, slot.into_cell());
        true
    }

    /// Evicts every entry whose index is not in `keep` (all of them when `keep` is `None`).
    ///
    /// Cells are recycled in ascending index order. Returns the number evicted.
    pub fn evict_outside<S>(&mut self, keep: Option<WindowRange>, source: &mut S) -> usize
    where
        S: DataSource<Cell = C> + ?Sized,
    {
        let mut stale: Vec<usize> = self
            .slots
            .keys()
            .copied()
            .filter(|&i| !keep.is_some_and(|w| w.contains(i)))
            .collect();
        stale.sort_unstable();
        for &index in &stale {
            self.evict(index, source);
        }
        stale.len()
    }

    /// Cached indexes in ascending order.
    pub fn indexes(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.slots.keys().copied().collect();
        out.sort_unstable();
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellSlot<C>> {
        self.slots.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut CellSlot<C>> {
        self.slots.values_mut()
    }
}
