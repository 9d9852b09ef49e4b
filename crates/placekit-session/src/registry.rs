//! Anchor registry: bookkeeping for anchored entities in the scene
//!
//! Invariant: the record list always equals the set of anchors live in
//! the engine's scene. Removal detaches from the scene and drops the
//! record as one logical operation.

use placekit_ar::ArEngine;
use placekit_core::{AnchorId, AnchorRecord, EntityId};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct AnchorRegistry {
    records: Vec<AnchorRecord>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly anchored entity
    pub fn add(&mut self, record: AnchorRecord) {
        debug!(anchor = %record.anchor, model = %record.model, "Registered anchor");
        self.records.push(record);
    }

    pub fn get(&self, anchor: &AnchorId) -> Option<&AnchorRecord> {
        self.records.iter().find(|r| &r.anchor == anchor)
    }

    /// The record owning a placed entity, if any
    pub fn find_by_entity(&self, entity: &EntityId) -> Option<&AnchorRecord> {
        self.records.iter().find(|r| &r.entity == entity)
    }

    /// Detach an anchor from the scene and drop its record
    ///
    /// Unknown identifiers are ignored; a stale deletion request must
    /// not fault the coordinator. Returns whether a record was removed.
    pub fn remove(&mut self, engine: &dyn ArEngine, anchor: &AnchorId) -> bool {
        let Some(index) = self.records.iter().position(|r| &r.anchor == anchor) else {
            debug!(anchor = %anchor, "Remove requested for unknown anchor, ignoring");
            return false;
        };
        engine.remove_anchor(anchor);
        let record = self.records.remove(index);
        info!(anchor = %record.anchor, model = %record.model, "Removed anchor");
        true
    }

    /// Detach every anchor and empty the registry
    ///
    /// Used before restoring a persisted scene so stale bookkeeping
    /// never survives a reload.
    pub fn clear_all(&mut self, engine: &dyn ArEngine) {
        for record in &self.records {
            engine.remove_anchor(&record.anchor);
        }
        let count = self.records.len();
        self.records.clear();
        if count > 0 {
            info!(count, "Cleared anchor registry");
        }
    }

    pub fn records(&self) -> &[AnchorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placekit_ar::{EngineCommand, SimEngine};
    use placekit_core::{ModelCategory, ModelKey, RenderableHandle, Transform};

    fn placed(engine: &SimEngine, name: &str) -> AnchorRecord {
        let anchor = engine.add_anchor(Transform::IDENTITY, &format!("model-{name}"));
        let entity = engine.place_renderable(&anchor, &RenderableHandle::generate(), 0.5);
        AnchorRecord {
            anchor,
            entity,
            model: ModelKey::new(name, ModelCategory::Midway),
        }
    }

    #[test]
    fn test_remove_detaches_and_forgets() {
        let engine = SimEngine::new();
        let mut registry = AnchorRegistry::new();
        let record = placed(&engine, "Pacman_Arcade");
        let anchor = record.anchor.clone();
        registry.add(record);

        assert!(registry.remove(&engine, &anchor));
        assert!(registry.is_empty());
        assert_eq!(engine.live_anchor_count(), 0);
    }

    #[test]
    fn test_remove_unknown_anchor_is_noop() {
        let engine = SimEngine::new();
        let mut registry = AnchorRegistry::new();
        registry.add(placed(&engine, "Pacman_Arcade"));
        engine.take_commands();

        assert!(!registry.remove(&engine, &AnchorId::generate()));
        assert_eq!(registry.len(), 1);
        assert!(engine.commands().is_empty());
    }

    #[test]
    fn test_clear_all_detaches_everything() {
        let engine = SimEngine::new();
        let mut registry = AnchorRegistry::new();
        registry.add(placed(&engine, "Pacman_Arcade"));
        registry.add(placed(&engine, "Defender_Arcade"));
        engine.take_commands();

        registry.clear_all(&engine);
        assert!(registry.is_empty());
        assert_eq!(engine.live_anchor_count(), 0);
        assert_eq!(
            engine
                .commands()
                .iter()
                .filter(|c| matches!(c, EngineCommand::RemoveAnchor(_)))
                .count(),
            2
        );
    }

    #[test]
    fn test_find_by_entity() {
        let engine = SimEngine::new();
        let mut registry = AnchorRegistry::new();
        let record = placed(&engine, "Pacman_Arcade");
        let entity = record.entity.clone();
        registry.add(record);

        assert!(registry.find_by_entity(&entity).is_some());
        assert!(registry.find_by_entity(&EntityId::generate()).is_none());
    }
}
