//! Deletion coordination: at most one entity armed at a time
//!
//! Highlight state is a pure function of the armed slot. Re-arming on
//! a different entity un-highlights the old one before highlighting
//! the new one, so no frame ever shows two highlighted entities.

use placekit_ar::ArEngine;
use placekit_core::EntityId;
use tracing::{debug, info, warn};

use crate::registry::AnchorRegistry;

#[derive(Debug, Default)]
pub struct DeletionCoordinator {
    armed: Option<EntityId>,
}

impl DeletionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an entity for deletion, disarming any previous one
    pub fn arm(&mut self, engine: &dyn ArEngine, entity: EntityId) {
        match &self.armed {
            None => {
                info!(entity = %entity, "Arming entity for deletion");
                engine.set_highlight(&entity, true);
            }
            Some(previous) if previous != &entity => {
                info!(previous = %previous, entity = %entity, "Re-arming deletion on new entity");
                engine.set_highlight(previous, false);
                engine.set_highlight(&entity, true);
            }
            Some(_) => {
                // Already armed on this entity.
                return;
            }
        }
        self.armed = Some(entity);
    }

    /// Disarm without touching the registry
    pub fn cancel(&mut self, engine: &dyn ArEngine) {
        if let Some(entity) = self.armed.take() {
            info!(entity = %entity, "Canceled deletion");
            engine.set_highlight(&entity, false);
        }
    }

    /// Delete the armed entity's anchor and disarm
    ///
    /// If the entity's owning anchor cannot be resolved, the deletion
    /// is abandoned and the registry is left untouched. Returns whether
    /// an anchor was removed. No-op when nothing is armed.
    pub fn confirm(&mut self, engine: &dyn ArEngine, registry: &mut AnchorRegistry) -> bool {
        let Some(entity) = self.armed.take() else {
            debug!("confirm_deletion with nothing armed");
            return false;
        };

        match registry.find_by_entity(&entity).map(|r| r.anchor.clone()) {
            Some(anchor) => registry.remove(engine, &anchor),
            None => {
                warn!(entity = %entity, "No owning anchor for armed entity, abandoning deletion");
                engine.set_highlight(&entity, false);
                false
            }
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn armed_entity(&self) -> Option<&EntityId> {
        self.armed.as_ref()
    }
}
