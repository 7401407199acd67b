//! Receiver-side bookkeeping.
//!
//! A receiver is any object that implements [`Receive`] for the event types
//! it cares about and owns a [`ConnectionSet`] for the subscriptions made on
//! its behalf. Destroying the receiver destroys the set, which silently
//! removes every subscription it ever made.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;

use super::events::Event;
use crate::signal::Connection;

/// Connection handle produced by a bus subscription.
pub type EventConnection = Connection<dyn Any>;

/// Typed delivery capability.
///
/// Delivery is synchronous on the emitting thread, so receivers keep mutable
/// state in `Cell`/`RefCell` fields; taking `&self` here keeps re-entrant
/// delivery and mid-callback subscription of the same receiver safe.
pub trait Receive<E: Event> {
    /// Handles one event. The reference is only valid for the duration of
    /// the call; callbacks must not stash it away.
    fn receive(&self, event: &E);
}

/// Hook the bus uses to park the connections it creates for a receiver.
pub trait Receiver {
    /// The receiver's owned connection collection.
    fn connections(&self) -> &ConnectionSet;
}

/// Ordered collection of bus connections owned by one subscribing object.
///
/// Every element is either connected or a harmless disconnected stub.
#[derive(Default)]
pub struct ConnectionSet {
    connections: RefCell<Vec<EventConnection>>,
}

impl ConnectionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a connection for the lifetime of this set.
    pub fn track(&self, connection: EventConnection) {
        self.connections.borrow_mut().push(connection);
    }

    /// Number of still-connected subscriptions.
    pub fn connected_count(&self) -> usize {
        self.connections
            .borrow()
            .iter()
            .filter(|connection| connection.is_connected())
            .count()
    }

    /// Number of tracked entries, disconnected stubs included.
    pub fn len(&self) -> usize {
        self.connections.borrow().len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.connections.borrow().is_empty()
    }

    /// Drops entries that have become disconnected stubs.
    pub fn prune(&self) {
        self.connections
            .borrow_mut()
            .retain(|connection| connection.is_connected());
    }

    /// Disconnects and drops every tracked connection.
    pub fn disconnect_all(&self) {
        self.connections.borrow_mut().clear();
    }
}

impl fmt::Debug for ConnectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSet")
            .field("tracked", &self.len())
            .field("connected", &self.connected_count())
            .finish()
    }
}
