//! Event identity.
//!
//! Every distinct event type is assigned a process-wide [`EventTypeId`] the
//! first time it is subscribed to or emitted. The registry behind the ids is
//! initialized once and lives for the rest of the process.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;
use serde::Serialize;

/// Marker for types that can travel over the event bus.
///
/// Blanket-implemented for every `'static` type: being an event is a
/// structural property of the type, not an inheritance relationship.
pub trait Event: Any {}

impl<T: Any> Event for T {}

/// Process-wide identity of one event type.
///
/// Ids are assigned on first use, in strictly increasing order, and stay
/// stable for the process lifetime: every use of the same type observes the
/// same id, distinct types observe distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventTypeId(u64);

/// Registry mapping Rust type ids to their assigned bus identity.
static REGISTRY: OnceLock<RwLock<HashMap<TypeId, EventTypeId>>> = OnceLock::new();

impl EventTypeId {
    /// Returns the identity assigned to `E`, assigning the next id when `E`
    /// is seen for the first time.
    pub fn of<E: Event>() -> Self {
        let registry = REGISTRY.get_or_init(|| RwLock::new(HashMap::new()));
        let key = TypeId::of::<E>();
        if let Some(id) = registry.read().get(&key) {
            return *id;
        }
        let mut types = registry.write();
        let next = Self(types.len() as u64);
        *types.entry(key).or_insert(next)
    }

    /// Raw integer value, for diagnostics.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spawned;
    struct Despawned;

    #[test]
    fn test_same_type_same_id() {
        assert_eq!(EventTypeId::of::<Spawned>(), EventTypeId::of::<Spawned>());
    }

    #[test]
    fn test_distinct_types_distinct_ids() {
        assert_ne!(EventTypeId::of::<Spawned>(), EventTypeId::of::<Despawned>());
    }

    #[test]
    fn test_ids_increase_in_first_use_order() {
        struct First;
        struct Second;
        let first = EventTypeId::of::<First>();
        let second = EventTypeId::of::<Second>();
        assert!(second > first);
    }

    #[test]
    fn test_display_shows_raw_id() {
        let id = EventTypeId::of::<Spawned>();
        assert_eq!(format!("{}", id), format!("EventType({})", id.raw()));
    }

    #[test]
    fn test_id_serializes_as_integer() {
        let id = EventTypeId::of::<Spawned>();
        let json = serde_json::to_value(id).expect("id should serialize");
        assert_eq!(json, serde_json::json!(id.raw()));
    }
}
