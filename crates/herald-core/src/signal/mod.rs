//! # Signal Module
//!
//! Move-safe, automatically-disconnecting fan-out primitive. A [`Signal`]
//! delivers one payload to every connected [`Connection`] in the order the
//! connections were made; either endpoint can be dropped or moved at any
//! time without the other noticing more than a silently vanished link.
//!
//! ## Overview
//!
//! - [`Signal::connect`] registers a callback and returns a [`Connection`]
//!   handle owning that registration
//! - [`Signal::emit`] invokes every connected callback synchronously, on the
//!   caller's thread, in insertion order
//! - Dropping a [`Connection`] (or calling [`Connection::disconnect`])
//!   removes the registration; dropping the [`Signal`] orphans its
//!   connections into harmless disconnected stubs
//!
//! Disconnection leaves a tombstone in place rather than shrinking the slot
//! list, so a fan-out that is currently iterating is never pulled out from
//! under itself; tombstones are compacted at the start of the next emit.
//!
//! ## Usage
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use herald_core::signal::Signal;
//!
//! let signal = Signal::new();
//! let last = Rc::new(Cell::new(0));
//!
//! let sink = Rc::clone(&last);
//! let connection = signal.connect(move |value: &i32| sink.set(*value));
//!
//! signal.emit(&7);
//! assert_eq!(last.get(), 7);
//!
//! drop(connection);
//! signal.emit(&9);
//! assert_eq!(last.get(), 7);
//! ```

mod connection;
mod emitter;

pub use connection::Connection;
pub use emitter::Signal;
