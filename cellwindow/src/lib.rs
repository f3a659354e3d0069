//! A headless windowing engine for unbounded lists.
//!
//! For adapter-level utilities (deferred pass scheduling, controllers, an in-memory host), see
//! the `cellwindow-adapter` crate.
//!
//! Only a contiguous window of items around the viewport is ever materialized. As the viewport
//! moves, a reconciliation pass evicts cells that left the visible span plus a margin, seeds the
//! window when it is empty, grows it until the margin is covered, and re-estimates the total
//! scrollable extent from the measured cells so the scrollbar behaves as if every item existed.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a [`DataSource`] that knows the item count and builds cells
//! - a [`ViewportHost`] that reports visible bounds and accepts the content extent
//! - a task queue that runs scheduled [`PassTicket`]s on the UI thread
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cache;
mod error;
mod extent;
mod options;
mod reconciler;
mod schedule;
mod source;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use cache::{CellCache, CellSlot};
pub use error::WindowError;
pub use extent::{AverageExtent, ExtentEstimate};
pub use options::WindowOptions;
pub use reconciler::{PassReport, Reconciler, WindowSnapshot};
pub use schedule::{PassTicket, ReconcilerState};
pub use source::{DataSource, MeasureCell, ViewportHost};
pub use types::{Region, ScrollAnchor, ViewportBounds, WindowRange};
pub use window::Window;
