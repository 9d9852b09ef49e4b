//! Placement coordination: selection, pending placement, and recents
//!
//! The pending slot is deliberately a single `Option`: only the newest
//! confirmed placement survives until the next tick, and confirming
//! again before it is consumed overwrites it. The recents log is
//! append-only; deduplication happens at read time only.

use placekit_core::{AnchorId, ModelKey};
use std::collections::HashSet;
use tracing::{debug, info};

/// A confirmed placement waiting for the next scene-update tick
///
/// `anchor` is absent for user-confirmed placements (resolved via
/// raycast on the next tick) and present for placements restored from
/// a persisted world map.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPlacement {
    pub model: ModelKey,
    pub anchor: Option<AnchorId>,
}

/// Tracks the selected model, the pending placement slot, and the
/// ordered history of placed models
#[derive(Debug, Default)]
pub struct PlacementCoordinator {
    selected: Option<ModelKey>,
    pending: Option<PendingPlacement>,
    recents: Vec<ModelKey>,
}

impl PlacementCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a model for placement
    pub fn select(&mut self, model: ModelKey) {
        info!(model = %model, "Selected model for placement");
        self.selected = Some(model);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&ModelKey> {
        self.selected.as_ref()
    }

    /// Confirm placement of the selected model
    ///
    /// Clears the selection and fills the pending slot, overwriting an
    /// unconsumed placement. No-op when nothing is selected.
    pub fn confirm(&mut self) {
        let Some(model) = self.selected.take() else {
            debug!("confirm called with no model selected");
            return;
        };
        let previous = self.pending.replace(PendingPlacement {
            model,
            anchor: None,
        });
        if let Some(dropped) = previous {
            debug!(model = %dropped.model, "Overwrote unconsumed pending placement");
        }
    }

    /// Queue a placement restored from a persisted world map
    pub fn push_restored(&mut self, model: ModelKey, anchor: AnchorId) {
        info!(model = %model, anchor = %anchor, "Queued restored placement");
        self.pending = Some(PendingPlacement {
            model,
            anchor: Some(anchor),
        });
    }

    /// Consume the pending placement, if any; called once per tick
    pub fn take_pending(&mut self) -> Option<PendingPlacement> {
        self.pending.take()
    }

    /// Append a model to the placed history
    pub fn record_placed(&mut self, model: ModelKey) {
        self.recents.push(model);
    }

    /// The raw append-only history, most recent last
    pub fn recents(&self) -> &[ModelKey] {
        &self.recents
    }

    /// Recents for display: most recent first, each identity once
    pub fn recents_deduplicated(&self) -> Vec<ModelKey> {
        let mut seen = HashSet::new();
        self.recents
            .iter()
            .rev()
            .filter(|m| seen.insert((*m).clone()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placekit_core::ModelCategory;

    fn key(name: &str) -> ModelKey {
        ModelKey::new(name, ModelCategory::Atari)
    }

    #[test]
    fn test_confirm_clears_selection() {
        let mut placement = PlacementCoordinator::new();
        placement.select(key("Asteroids_Arcade"));
        assert!(placement.selected().is_some());

        placement.confirm();
        assert!(placement.selected().is_none());
        assert_eq!(
            placement.take_pending().unwrap().model,
            key("Asteroids_Arcade")
        );
    }

    #[test]
    fn test_confirm_without_selection_is_noop() {
        let mut placement = PlacementCoordinator::new();
        placement.confirm();
        assert!(placement.take_pending().is_none());
    }

    #[test]
    fn test_pending_slot_keeps_newest_only() {
        let mut placement = PlacementCoordinator::new();
        placement.select(key("Asteroids_Arcade"));
        placement.confirm();
        placement.select(key("Centipede_Arcade"));
        placement.confirm();

        let pending = placement.take_pending().unwrap();
        assert_eq!(pending.model, key("Centipede_Arcade"));
        assert!(pending.anchor.is_none());
        assert!(placement.take_pending().is_none());
    }

    #[test]
    fn test_restored_placement_carries_anchor() {
        let mut placement = PlacementCoordinator::new();
        let anchor = AnchorId::generate();
        placement.push_restored(key("Asteroids_Arcade"), anchor.clone());

        let pending = placement.take_pending().unwrap();
        assert_eq!(pending.anchor, Some(anchor));
    }

    #[test]
    fn test_recents_dedup_most_recent_first() {
        let mut placement = PlacementCoordinator::new();
        let (a, b, c) = (key("A"), key("B"), key("C"));
        for m in [&a, &b, &a, &c, &b] {
            placement.record_placed(m.clone());
        }

        assert_eq!(placement.recents_deduplicated(), vec![b, c, a]);
        // The underlying log is untouched by the read-time transform.
        assert_eq!(placement.recents().len(), 5);
    }
}
