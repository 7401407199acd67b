//! Signal implementation.
//!
//! Provides the [`Signal`] fan-out core and the slot list shared between a
//! signal and its connection handles.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

use super::connection::{Connection, SlotId};

/// Boxed callback stored in one slot.
type SlotFn<P> = Box<dyn FnMut(&P)>;

/// Lifecycle of one slot entry.
///
/// `Running` marks a callback that has been checked out by an in-flight
/// fan-out; the entry is still considered connected, but a nested emit must
/// not re-enter it and a disconnect laid against it turns into a tombstone
/// that the dispatcher honors on check-in.
enum SlotState<P: ?Sized> {
    Connected(SlotFn<P>),
    Running,
    Disconnected,
}

impl<P: ?Sized> SlotState<P> {
    fn is_live(&self) -> bool {
        !matches!(self, SlotState::Disconnected)
    }
}

struct SlotEntry<P: ?Sized> {
    id: SlotId,
    state: SlotState<P>,
}

/// Ordered slot storage shared by a [`Signal`] and its connections.
///
/// Slots are addressed by their [`SlotId`], never by index, so compaction can
/// move entries without invalidating any handle. Ids are handed out in
/// increasing order and never reused.
pub(super) struct SlotList<P: ?Sized> {
    slots: Vec<SlotEntry<P>>,
    next_id: u64,
    /// True while tombstoned entries are waiting for compaction.
    dirty: bool,
    /// Number of fan-outs currently iterating this list. Compaction and
    /// eager clearing are only allowed at depth zero.
    emit_depth: usize,
}

impl<P: ?Sized> SlotList<P> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            next_id: 0,
            dirty: false,
            emit_depth: 0,
        }
    }

    fn insert(&mut self, callback: SlotFn<P>) -> SlotId {
        let id = SlotId(self.next_id);
        self.next_id += 1;
        self.slots.push(SlotEntry {
            id,
            state: SlotState::Connected(callback),
        });
        id
    }

    /// Tombstones the slot in place; the backing vector is never shrunk here
    /// so an in-flight fan-out keeps its indices.
    ///
    /// Returns the displaced callback, if any, so the caller can drop it
    /// after releasing the borrow: its captures may hold connections back
    /// into this very list.
    pub(super) fn tombstone(&mut self, id: SlotId) -> Option<SlotFn<P>> {
        let entry = self.slots.iter_mut().find(|entry| entry.id == id)?;
        match mem::replace(&mut entry.state, SlotState::Disconnected) {
            SlotState::Connected(callback) => {
                self.dirty = true;
                Some(callback)
            }
            SlotState::Running => {
                // Checked out by a running fan-out; the dispatcher drops the
                // callback on check-in when it finds the tombstone.
                self.dirty = true;
                None
            }
            SlotState::Disconnected => None,
        }
    }

    pub(super) fn is_live(&self, id: SlotId) -> bool {
        self.slots
            .iter()
            .any(|entry| entry.id == id && entry.state.is_live())
    }

    fn compact(&mut self) {
        if self.dirty {
            self.slots.retain(|entry| entry.state.is_live());
            self.dirty = false;
        }
    }

    /// Takes the callback out of the slot at `index` for invocation.
    ///
    /// Returns `None` for tombstones and for slots whose callback is already
    /// out with a fan-out further up the stack.
    fn check_out(&mut self, index: usize) -> Option<(SlotId, SlotFn<P>)> {
        let entry = self.slots.get_mut(index)?;
        match mem::replace(&mut entry.state, SlotState::Running) {
            SlotState::Connected(callback) => Some((entry.id, callback)),
            previous => {
                entry.state = previous;
                None
            }
        }
    }

    /// Returns a checked-out callback to its slot.
    ///
    /// If the slot was disconnected while the callback was out, the callback
    /// is handed back to the caller to be dropped outside the borrow.
    fn check_in(&mut self, id: SlotId, callback: SlotFn<P>) -> Option<SlotFn<P>> {
        match self.slots.iter_mut().find(|entry| entry.id == id) {
            Some(entry) if matches!(entry.state, SlotState::Running) => {
                entry.state = SlotState::Connected(callback);
                None
            }
            _ => Some(callback),
        }
    }

    fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.state.is_live())
            .count()
    }
}

/// Ordered fan-out of one payload type to connected callbacks.
///
/// A signal owns the slot list; [`Connection`] handles reach back into it
/// through `Weak` references, so signal and connections can be dropped in any
/// order. The payload type may be unsized (the event bus instantiates
/// `Signal<dyn Any>`).
///
/// Emission is synchronous and reentrant-safe: a callback may connect,
/// disconnect (itself included) or emit on the same signal. A mutation made
/// during a fan-out affects that pass only as far as documented on
/// [`Signal::emit`]; every later pass sees a fully consistent list.
pub struct Signal<P: ?Sized> {
    inner: Rc<RefCell<SlotList<P>>>,
}

impl<P: ?Sized> Signal<P> {
    /// Creates an empty signal.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty signal with room for `capacity` connections.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotList::with_capacity(capacity))),
        }
    }

    /// Registers `callback` and returns the connection handle owning the
    /// registration. Always succeeds.
    ///
    /// Connecting during a fan-out is allowed; the new entry is first
    /// visited by the next emit.
    pub fn connect<F>(&self, callback: F) -> Connection<P>
    where
        F: FnMut(&P) + 'static,
    {
        let id = self.inner.borrow_mut().insert(Box::new(callback));
        Connection::new(Rc::downgrade(&self.inner), id)
    }

    /// Invokes every connected callback with `payload`, in insertion order.
    ///
    /// Tombstones left by earlier disconnects are compacted first, unless a
    /// fan-out is already running higher up the stack. Entries connected
    /// during the pass are not visited by it; entries tombstoned during the
    /// pass are skipped when reached; a nested emit skips any slot whose
    /// callback is currently running.
    pub fn emit(&self, payload: &P) {
        let fixed = {
            let mut list = self.inner.borrow_mut();
            if list.emit_depth == 0 {
                list.compact();
            }
            list.emit_depth += 1;
            list.slots.len()
        };

        for index in 0..fixed {
            // The borrow is released before the callback runs; user code is
            // free to touch this signal again.
            let checked_out = self.inner.borrow_mut().check_out(index);
            let Some((id, mut callback)) = checked_out else {
                continue;
            };
            callback(payload);
            let displaced = self.inner.borrow_mut().check_in(id, callback);
            drop(displaced);
        }

        self.inner.borrow_mut().emit_depth -= 1;
    }

    /// Disconnects every connection.
    ///
    /// During a fan-out the entries are tombstoned in place; otherwise the
    /// slot list is cleared outright.
    pub fn disconnect_all(&self) {
        let displaced: Vec<SlotFn<P>> = {
            let mut list = self.inner.borrow_mut();
            if list.emit_depth == 0 {
                list.dirty = false;
                list.slots
                    .drain(..)
                    .filter_map(|entry| match entry.state {
                        SlotState::Connected(callback) => Some(callback),
                        _ => None,
                    })
                    .collect()
            } else {
                let callbacks = list
                    .slots
                    .iter_mut()
                    .filter_map(|entry| {
                        match mem::replace(&mut entry.state, SlotState::Disconnected) {
                            SlotState::Connected(callback) => Some(callback),
                            _ => None,
                        }
                    })
                    .collect();
                list.dirty = true;
                callbacks
            }
        };
        // Dropped with the borrow released; captures may hold connections to
        // this signal.
        drop(displaced);
    }

    /// Number of connected entries, tombstones excluded.
    pub fn count(&self) -> usize {
        self.inner.borrow().live_count()
    }

    /// True when no connection is live.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Removes tombstoned entries now instead of waiting for the next emit.
    /// No-op while a fan-out is running.
    pub fn compact(&self) {
        let mut list = self.inner.borrow_mut();
        if list.emit_depth == 0 {
            list.compact();
        }
    }

    /// Second handle onto the same slot list, used by the bus to fan out
    /// without holding its signal map borrowed.
    pub(crate) fn share(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: ?Sized> Default for Signal<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> fmt::Debug for Signal<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connected", &self.count())
            .finish()
    }
}
