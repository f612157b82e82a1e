//! Entity emission.
//!
//! Builders hand finished entities to an [`EntitySink`]. The in-memory
//! [`Emitter`] keeps first-seen order and merges repeated ids, so an address
//! shared by many subjects is stored once.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::Entity;

/// Destination for emitted entities.
pub trait EntitySink: Send + Sync {
    /// Accept an entity. Returns `true` only when its id was not seen before.
    fn emit(&self, entity: Entity) -> bool;
}

#[derive(Debug, Default)]
struct EmitterState {
    order: Vec<String>,
    by_id: HashMap<String, Entity>,
}

/// Collects emitted entities in memory.
#[derive(Debug, Default)]
pub struct Emitter {
    state: Mutex<EmitterState>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entities in first-emitted order.
    pub fn entities(&self) -> Vec<Entity> {
        let state = self.lock();
        state
            .order
            .iter()
            .filter_map(|id| state.by_id.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EmitterState> {
        // A panic while holding the lock leaves the maps consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EntitySink for Emitter {
    fn emit(&self, entity: Entity) -> bool {
        let Some(id) = entity.id.clone() else {
            log::warn!("Dropping {} entity without id", entity.schema);
            return false;
        };

        let mut guard = self.lock();
        let state = &mut *guard;
        match state.by_id.get_mut(&id) {
            Some(existing) => {
                if existing.schema != entity.schema {
                    log::warn!(
                        "Entity {} emitted as {} and {}; keeping {}",
                        id,
                        existing.schema,
                        entity.schema,
                        existing.schema
                    );
                }
                existing.merge(&entity);
                log::trace!("Merged repeated entity {}", id);
                false
            }
            None => {
                state.order.push(id.clone());
                state.by_id.insert(id, entity);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(id: &str, name: &str) -> Entity {
        let mut entity = Entity::new("Company").with_id(id);
        entity.add("name", name);
        entity
    }

    #[test]
    fn test_emit_keeps_order() {
        let emitter = Emitter::new();
        assert!(emitter.emit(company("b", "Beta")));
        assert!(emitter.emit(company("a", "Alpha")));

        let ids: Vec<_> = emitter
            .entities()
            .into_iter()
            .filter_map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_emit_merges_repeated_id() {
        let emitter = Emitter::new();
        assert!(emitter.emit(company("a", "Alpha")));
        assert!(!emitter.emit(company("a", "Alpha Ltd")));

        assert_eq!(emitter.len(), 1);
        let entity = &emitter.entities()[0];
        assert_eq!(entity.get("name"), ["Alpha", "Alpha Ltd"]);
    }

    #[test]
    fn test_emit_rejects_missing_id() {
        let emitter = Emitter::new();
        assert!(!emitter.emit(Entity::new("Address")));
        assert!(emitter.is_empty());
    }
}
