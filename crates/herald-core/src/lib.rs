//! # Herald Core
//!
//! Signal/connection primitive and typed event bus for Herald.
//! Provides the fundamental abstractions for decoupled event delivery:
//! move-safe connections, per-type signals, and receiver bookkeeping.

pub mod event_bus;
pub mod signal;

pub use event_bus::{
    BusStats, ConnectionSet, Event, EventBus, EventBusConfig, EventConnection, EventTypeId,
    Receive, Receiver,
};

pub use signal::{Connection, Signal};
