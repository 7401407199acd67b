//! Event bus implementation.
//!
//! Provides the [`EventBus`] struct: one lazily-created signal per event
//! type, typed subscribe/emit on top, and introspection for diagnostics.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::events::{Event, EventTypeId};
use super::receiver::{EventConnection, Receive, Receiver};
use crate::signal::Signal;

/// Configuration for the event bus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Slot capacity reserved when a signal is first created.
    pub signal_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { signal_capacity: 8 }
    }
}

/// Snapshot of bus occupancy, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Distinct event types that have been subscribed to or emitted.
    pub signals: usize,
    /// Currently connected subscriptions across all signals.
    pub subscribers: usize,
}

/// Typed publish/subscribe bus.
///
/// The bus owns one [`Signal`] per event type, created lazily on first
/// subscribe or emit and kept for the bus's lifetime. Receivers own the
/// connections made on their behalf; the bus never holds a strong reference
/// to a receiver, so destroying one silently removes its subscriptions.
///
/// The bus is single-threaded by construction and delivery is synchronous:
/// `emit` runs the entire fan-out on the caller's thread before returning.
/// Callbacks may re-enter the bus (subscribe, emit, disconnect) freely; the
/// effect of such a mutation on the in-flight fan-out is limited to what
/// [`Signal::emit`] documents, and every later emit sees a consistent state.
pub struct EventBus {
    signals: RefCell<HashMap<EventTypeId, Signal<dyn Any>>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Creates a bus with default configuration.
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Creates a bus with custom configuration.
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            signals: RefCell::new(HashMap::new()),
            config,
        }
    }

    /// Resolves the signal for `id`, creating it on first use. Returns a
    /// shared handle so the map borrow is released before any fan-out.
    fn signal_for(&self, id: EventTypeId) -> Signal<dyn Any> {
        let mut signals = self.signals.borrow_mut();
        signals
            .entry(id)
            .or_insert_with(|| Signal::with_capacity(self.config.signal_capacity))
            .share()
    }

    /// Subscribes `receiver` to events of type `E`.
    ///
    /// The connection is parked in the receiver's own [`ConnectionSet`]
    /// (via [`Receiver::connections`]), so it lives exactly as long as the
    /// receiver. A receiver lacking a matching [`Receive<E>`] implementation
    /// is rejected at compile time.
    ///
    /// [`ConnectionSet`]: super::receiver::ConnectionSet
    pub fn subscribe<E, R>(&self, receiver: &Rc<R>)
    where
        E: Event,
        R: Receive<E> + Receiver + 'static,
    {
        let type_id = EventTypeId::of::<E>();
        let target = Rc::downgrade(receiver);
        let connection = self.signal_for(type_id).connect(move |event: &dyn Any| {
            // A receiver that died before its connections were cleaned up is
            // simply skipped.
            let Some(target) = target.upgrade() else {
                return;
            };
            if let Some(event) = event.downcast_ref::<E>() {
                target.receive(event);
            }
        });
        receiver.connections().track(connection);
        tracing::debug!(event_type = %type_id, "receiver subscribed");
    }

    /// Subscribes a bare callback to events of type `E`.
    ///
    /// The caller keeps the returned connection; dropping or disconnecting
    /// it ends the subscription.
    pub fn subscribe_with<E, F>(&self, mut callback: F) -> EventConnection
    where
        E: Event,
        F: FnMut(&E) + 'static,
    {
        let type_id = EventTypeId::of::<E>();
        let connection = self.signal_for(type_id).connect(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                callback(event);
            }
        });
        tracing::debug!(event_type = %type_id, "callback subscribed");
        connection
    }

    /// Emits `event` to every current subscriber of its type, in
    /// subscription order.
    ///
    /// The value lives exactly for the duration of the fan-out and is
    /// dropped when `emit` returns. Emitting a type nobody subscribed to is
    /// legal and has no effect besides lazily creating its signal.
    pub fn emit<E: Event>(&self, event: E) {
        let type_id = EventTypeId::of::<E>();
        let signal = self.signal_for(type_id);
        tracing::trace!(event_type = %type_id, subscribers = signal.count(), "emitting");
        signal.emit(&event);
    }

    /// Currently connected subscriptions across every signal.
    pub fn subscriber_count(&self) -> usize {
        self.signals
            .borrow()
            .values()
            .map(|signal| signal.count())
            .sum()
    }

    /// Connected subscriptions for one event type; zero when the type has
    /// never been used.
    pub fn subscribers_of<E: Event>(&self) -> usize {
        self.signals
            .borrow()
            .get(&EventTypeId::of::<E>())
            .map_or(0, |signal| signal.count())
    }

    /// Distinct event types seen so far.
    pub fn signal_count(&self) -> usize {
        self.signals.borrow().len()
    }

    /// Snapshot of bus occupancy.
    pub fn stats(&self) -> BusStats {
        BusStats {
            signals: self.signal_count(),
            subscribers: self.subscriber_count(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("signals", &self.signal_count())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::receiver::ConnectionSet;
    use std::cell::Cell;

    struct Bumped {
        amount: i32,
    }

    struct Renamed {
        name: &'static str,
    }

    #[derive(Default)]
    struct Logger {
        seen: RefCell<Vec<i32>>,
        names: RefCell<Vec<&'static str>>,
        connections: ConnectionSet,
    }

    impl Receiver for Logger {
        fn connections(&self) -> &ConnectionSet {
            &self.connections
        }
    }

    impl Receive<Bumped> for Logger {
        fn receive(&self, event: &Bumped) {
            self.seen.borrow_mut().push(event.amount);
        }
    }

    impl Receive<Renamed> for Logger {
        fn receive(&self, event: &Renamed) {
            self.names.borrow_mut().push(event.name);
        }
    }

    #[derive(Default)]
    struct Counter {
        total: Cell<i32>,
        connections: ConnectionSet,
    }

    impl Receiver for Counter {
        fn connections(&self) -> &ConnectionSet {
            &self.connections
        }
    }

    impl Receive<Bumped> for Counter {
        fn receive(&self, event: &Bumped) {
            self.total.set(self.total.get() + event.amount);
        }
    }

    #[test]
    fn test_emit_reaches_subscribers_in_subscription_order() {
        struct Ping;
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&order);
        let second = Rc::clone(&order);
        let third = Rc::clone(&order);
        let _a = bus.subscribe_with::<Ping, _>(move |_| first.borrow_mut().push("a"));
        let _b = bus.subscribe_with::<Ping, _>(move |_| second.borrow_mut().push("b"));
        let _c = bus.subscribe_with::<Ping, _>(move |_| third.borrow_mut().push("c"));

        bus.emit(Ping);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_destroyed_receiver_stops_receiving() {
        let bus = EventBus::new();
        let logger = Rc::new(Logger::default());
        let counter = Rc::new(Counter::default());
        bus.subscribe::<Bumped, _>(&logger);
        bus.subscribe::<Bumped, _>(&counter);
        assert_eq!(logger.connections().connected_count(), 1);

        bus.emit(Bumped { amount: 5 });
        assert_eq!(*logger.seen.borrow(), vec![5]);
        assert_eq!(counter.total.get(), 5);

        drop(counter);
        bus.emit(Bumped { amount: 3 });
        assert_eq!(*logger.seen.borrow(), vec![5, 3]);
        assert_eq!(bus.subscribers_of::<Bumped>(), 1);
    }

    #[test]
    fn test_emit_without_subscribers_is_a_no_op() {
        struct Unheard;
        let bus = EventBus::new();
        bus.emit(Unheard);
        assert_eq!(bus.subscribers_of::<Unheard>(), 0);
        // Lazy signal creation is the only observable effect.
        assert_eq!(bus.signal_count(), 1);
    }

    #[test]
    fn test_emissions_route_by_event_type() {
        let bus = EventBus::new();
        let logger = Rc::new(Logger::default());
        bus.subscribe::<Bumped, _>(&logger);
        bus.subscribe::<Renamed, _>(&logger);

        bus.emit(Bumped { amount: 2 });
        bus.emit(Renamed { name: "vole" });
        bus.emit(Bumped { amount: 4 });

        assert_eq!(*logger.seen.borrow(), vec![2, 4]);
        assert_eq!(*logger.names.borrow(), vec!["vole"]);
        assert_eq!(logger.connections().connected_count(), 2);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hits);
        let mut connection =
            bus.subscribe_with::<Bumped, _>(move |_| counter.set(counter.get() + 1));

        bus.emit(Bumped { amount: 1 });
        assert_eq!(hits.get(), 1);

        connection.disconnect();
        connection.disconnect();
        bus.emit(Bumped { amount: 2 });
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.subscribers_of::<Bumped>(), 0);
    }

    #[test]
    fn test_callback_may_emit_another_event_type() {
        struct Ping;
        struct Pong;
        let bus = Rc::new(EventBus::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let ping_log = Rc::clone(&log);
        let nested_bus = Rc::clone(&bus);
        let _ping = bus.subscribe_with::<Ping, _>(move |_| {
            ping_log.borrow_mut().push("ping");
            nested_bus.emit(Pong);
        });

        let pong_log = Rc::clone(&log);
        let _pong = bus.subscribe_with::<Pong, _>(move |_| pong_log.borrow_mut().push("pong"));

        bus.emit(Ping);
        assert_eq!(*log.borrow(), vec!["ping", "pong"]);
    }

    #[test]
    fn test_subscription_made_mid_delivery_lands_on_next_emit() {
        let bus = Rc::new(EventBus::new());
        let hits = Rc::new(Cell::new(0));
        let spawned = Rc::new(RefCell::new(Vec::new()));

        let nested_bus = Rc::clone(&bus);
        let nested_hits = Rc::clone(&hits);
        let nested_spawned = Rc::clone(&spawned);
        let _spawner = bus.subscribe_with::<Bumped, _>(move |_| {
            let late_hits = Rc::clone(&nested_hits);
            nested_spawned.borrow_mut().push(
                nested_bus.subscribe_with::<Bumped, _>(move |event: &Bumped| {
                    late_hits.set(late_hits.get() + event.amount);
                }),
            );
        });

        bus.emit(Bumped { amount: 1 });
        assert_eq!(hits.get(), 0);

        bus.emit(Bumped { amount: 1 });
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_stats_snapshot_serializes() {
        let bus = EventBus::new();
        let logger = Rc::new(Logger::default());
        bus.subscribe::<Bumped, _>(&logger);

        let stats = bus.stats();
        assert_eq!(
            stats,
            BusStats {
                signals: 1,
                subscribers: 1
            }
        );

        let json = serde_json::to_value(stats).expect("stats should serialize");
        assert_eq!(json["signals"], 1);
        assert_eq!(json["subscribers"], 1);
    }

    #[test]
    fn test_configured_capacity_does_not_change_behavior() {
        let bus = EventBus::with_config(EventBusConfig { signal_capacity: 1 });
        let logger = Rc::new(Logger::default());
        let counter = Rc::new(Counter::default());
        bus.subscribe::<Bumped, _>(&logger);
        bus.subscribe::<Bumped, _>(&counter);

        bus.emit(Bumped { amount: 1 });
        assert_eq!(*logger.seen.borrow(), vec![1]);
        assert_eq!(counter.total.get(), 1);
    }
}
