//! Anchor, entity, and tracking types exchanged with the AR engine
//!
//! The engine owns the live scene graph; the coordination layer only
//! ever holds the opaque identifiers defined here and issues commands
//! against them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ModelKey;

/// Engine-assigned identifier for an anchor, stable for its lifetime
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub String);

impl AnchorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate a fresh identifier (used by engine implementations)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-assigned identifier for a placed scene entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generate a fresh identifier (used by engine implementations)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-reported confidence/completeness of the spatial map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingQuality {
    /// No map data yet
    NotAvailable,
    /// Tracking is running but the map is incomplete
    Limited,
    /// Map exists and is still growing
    Extending,
    /// Map covers the visible environment
    Mapped,
}

impl Default for TrackingQuality {
    fn default() -> Self {
        Self::NotAvailable
    }
}

impl TrackingQuality {
    /// Whether the map is complete enough to be saved
    pub fn supports_persistence(&self) -> bool {
        matches!(self, TrackingQuality::Mapped | TrackingQuality::Extending)
    }
}

/// World-space rigid transform, column-major 4x4
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform(pub [[f32; 4]; 4]);

impl Transform {
    pub const IDENTITY: Transform = Transform([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Identity rotation at the given world position
    pub fn from_translation(translation: [f32; 3]) -> Self {
        let mut m = Self::IDENTITY;
        m.0[3][0] = translation[0];
        m.0[3][1] = translation[1];
        m.0[3][2] = translation[2];
        m
    }

    /// World position component
    pub fn translation(&self) -> [f32; 3] {
        [self.0[3][0], self.0[3][1], self.0[3][2]]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Bookkeeping record for one anchored entity in the live scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRecord {
    /// Engine-assigned anchor identifier
    pub anchor: AnchorId,
    /// The entity parented under the anchor
    pub entity: EntityId,
    /// Which model the entity renders
    pub model: ModelKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_quality_persistence_gate() {
        assert!(TrackingQuality::Mapped.supports_persistence());
        assert!(TrackingQuality::Extending.supports_persistence());
        assert!(!TrackingQuality::Limited.supports_persistence());
        assert!(!TrackingQuality::NotAvailable.supports_persistence());
    }

    #[test]
    fn test_transform_translation() {
        let t = Transform::from_translation([1.0, 2.0, 3.0]);
        assert_eq!(t.translation(), [1.0, 2.0, 3.0]);
        assert_eq!(Transform::IDENTITY.translation(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(AnchorId::generate(), AnchorId::generate());
        assert_ne!(EntityId::generate(), EntityId::generate());
    }
}
