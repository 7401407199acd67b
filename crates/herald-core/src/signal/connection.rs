//! Connection handles.
//!
//! A [`Connection`] is the observer half of a signal binding: it owns one
//! registration and holds a weak back-reference to the signal's slot list.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use super::emitter::SlotList;

/// Identity of one slot within a signal.
///
/// Ids are handed out in increasing order and never reused, so a stale
/// handle can never alias a newer registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct SlotId(pub(super) u64);

/// Handle owning a single registration with a [`Signal`](super::Signal).
///
/// Dropping the handle disconnects it. Moving it is free: the signal tracks
/// the registration by id, not by the handle's address, so a connection
/// stored in a collection or returned from a function keeps delivering.
///
/// Connections are deliberately not `Clone` - a copy would be two handles
/// claiming the same logical subscription.
pub struct Connection<P: ?Sized> {
    list: Weak<RefCell<SlotList<P>>>,
    id: SlotId,
}

impl<P: ?Sized> Connection<P> {
    pub(super) fn new(list: Weak<RefCell<SlotList<P>>>, id: SlotId) -> Self {
        Self { list, id }
    }

    /// Disconnects this handle from its signal. Idempotent; a no-op when the
    /// signal is already gone.
    ///
    /// Safe to call from inside a fan-out, including against an entry that
    /// has not been visited yet: the slot is tombstoned in place and skipped
    /// when the fan-out reaches it.
    pub fn disconnect(&mut self) {
        if let Some(list) = self.list.upgrade() {
            let displaced = list.borrow_mut().tombstone(self.id);
            // The callback's captures may reach back into the slot list;
            // drop it with the borrow released.
            drop(displaced);
        }
        self.list = Weak::new();
    }

    /// True while the signal is alive and this registration has not been
    /// disconnected.
    pub fn is_connected(&self) -> bool {
        match self.list.upgrade() {
            Some(list) => list.borrow().is_live(self.id),
            None => false,
        }
    }
}

impl<P: ?Sized> Drop for Connection<P> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<P: ?Sized> fmt::Debug for Connection<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("slot", &self.id.0)
            .field("connected", &self.is_connected())
            .finish()
    }
}
