//! Adapter utilities for the `cellwindow` crate.
//!
//! The `cellwindow` crate is UI-agnostic and leaves scheduling to the host. This crate provides
//! small, framework-neutral pieces an adapter usually needs:
//!
//! - A single-threaded task queue for deferred reconciliation passes
//! - A controller that owns the reconciler, data source, host and queue
//! - An in-memory viewport host for headless use and tests
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod host;
mod queue;


pub use controller::Controller;
pub use host::MemoryViewport;
pub use queue::TaskQueue;
