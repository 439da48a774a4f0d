//! EventBus - terminal events and the subscription seam.
//!
//! The plugin only depends on [`EventSource`]. [`EventBus`] is the in-process
//! implementation used by the reference host and the tests: it invokes the
//! registered callbacks synchronously on the publishing thread and fans the
//! event out to broadcast observers afterwards.

/// Callback registry and broadcast fan-out.
pub mod bus;
/// Event type definitions for the terminal vocabulary.
pub mod types;

pub use bus::{EventBus, EventCallback, EventSource};
pub use types::{vocabulary, Event, EventKind};

#[cfg(test)]
mod tests;
