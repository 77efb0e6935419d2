//! Entities: optional payloads threaded through successive events.

use std::sync::atomic::{AtomicU64, Ordering};

static ENTITY_COUNT: AtomicU64 = AtomicU64::new(0);

/// A payload carried from event to event, e.g. a packet.
///
/// The kernel treats this opaquely; only vertex `run` bodies inspect
/// an entity's contents. The id comes from a process-wide counter,
/// matching `original_source/OoO_EventSet.h`'s `atomic<size_t>
/// _entityCount`; this assumes a single model per process, which is
/// the only case in scope (see DESIGN.md).
#[derive(Debug, Clone)]
pub struct Entity {
    id: u64,
    gen_time: f64,
    exit_time: Option<f64>,
    payload: EntityPayload,
}

/// User-defined entity contents. Left as an opaque bag of fields since
/// the spec puts concrete entity types (packets) out of scope; a
/// topology module attaches whatever it needs here.
#[derive(Debug, Clone, Default)]
pub struct EntityPayload(pub Vec<i64>);

impl Entity {
    pub fn new(gen_time: f64) -> Self {
        Self {
            id: ENTITY_COUNT.fetch_add(1, Ordering::Relaxed),
            gen_time,
            exit_time: None,
            payload: EntityPayload::default(),
        }
    }

    pub fn with_payload(gen_time: f64, payload: EntityPayload) -> Self {
        Self {
            id: ENTITY_COUNT.fetch_add(1, Ordering::Relaxed),
            gen_time,
            exit_time: None,
            payload,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn gen_time(&self) -> f64 {
        self.gen_time
    }

    pub fn exit_time(&self) -> Option<f64> {
        self.exit_time
    }

    pub fn set_exit_time(&mut self, time: f64) {
        self.exit_time = Some(time);
    }

    pub fn payload(&self) -> &EntityPayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut EntityPayload {
        &mut self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_monotone_within_a_process() {
        let a = Entity::new(0.0);
        let b = Entity::new(0.0);
        assert!(b.id() > a.id());
    }

    #[test]
    fn exit_time_starts_unset() {
        let e = Entity::new(1.5);
        assert_eq!(e.exit_time(), None);
        let mut e = e;
        e.set_exit_time(9.0);
        assert_eq!(e.exit_time(), Some(9.0));
    }
}
