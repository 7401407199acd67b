//! # Herald
//!
//! Typed publish/subscribe event core for entity-component applications:
//! producers of domain events (entity lifecycle changes, component additions,
//! gameplay notifications) are decoupled from the receivers that consume
//! them, without either side holding long-lived references to the other.
//!
//! ## Architecture
//!
//! Herald is organized as a workspace; this crate is a thin facade over the
//! implementation crate:
//!
//! 1. **herald-core** - signal/connection primitive and the typed event bus
//! 2. **herald** - this facade, re-exporting the public API
//!
//! ## Quick start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use herald::{ConnectionSet, EventBus, Receive, Receiver};
//!
//! struct Bumped {
//!     amount: i32,
//! }
//!
//! #[derive(Default)]
//! struct Logger {
//!     seen: RefCell<Vec<i32>>,
//!     connections: ConnectionSet,
//! }
//!
//! impl Receiver for Logger {
//!     fn connections(&self) -> &ConnectionSet {
//!         &self.connections
//!     }
//! }
//!
//! impl Receive<Bumped> for Logger {
//!     fn receive(&self, event: &Bumped) {
//!         self.seen.borrow_mut().push(event.amount);
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let logger = Rc::new(Logger::default());
//! bus.subscribe::<Bumped, _>(&logger);
//! bus.emit(Bumped { amount: 5 });
//! assert_eq!(*logger.seen.borrow(), vec![5]);
//! ```

pub use herald_core::event_bus;
pub use herald_core::signal;

pub use herald_core::{
    BusStats, Connection, ConnectionSet, Event, EventBus, EventBusConfig, EventConnection,
    EventTypeId, Receive, Receiver, Signal,
};
