//! # Event Bus Module
//!
//! Typed publish/subscribe dispatch built on the [`signal`](crate::signal)
//! primitive. Producers emit plain values; receivers implement [`Receive`]
//! for the event types they care about and are notified synchronously, in
//! subscription order, without either side referencing the other.
//!
//! ## Overview
//!
//! - Each distinct event type gets a process-stable [`EventTypeId`] on first
//!   use and one lazily-created signal per [`EventBus`] instance
//! - [`EventBus::subscribe`] parks the connection in the receiver's own
//!   [`ConnectionSet`], so dropping the receiver removes its subscriptions
//! - [`EventBus::emit`] fans the value out to every current subscriber of
//!   that type before returning; emitting with no subscribers is a no-op
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use herald_core::event_bus::{ConnectionSet, EventBus, Receive, Receiver};
//!
//! struct Damaged {
//!     amount: u32,
//! }
//!
//! #[derive(Default)]
//! struct Health {
//!     points: Cell<u32>,
//!     connections: ConnectionSet,
//! }
//!
//! impl Receiver for Health {
//!     fn connections(&self) -> &ConnectionSet {
//!         &self.connections
//!     }
//! }
//!
//! impl Receive<Damaged> for Health {
//!     fn receive(&self, event: &Damaged) {
//!         self.points.set(self.points.get().saturating_sub(event.amount));
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let health = Rc::new(Health::default());
//! health.points.set(100);
//!
//! bus.subscribe::<Damaged, _>(&health);
//! bus.emit(Damaged { amount: 30 });
//! assert_eq!(health.points.get(), 70);
//! ```

mod bus;
mod events;
mod receiver;

pub use bus::{BusStats, EventBus, EventBusConfig};
pub use events::{Event, EventTypeId};
pub use receiver::{ConnectionSet, EventConnection, Receive, Receiver};
