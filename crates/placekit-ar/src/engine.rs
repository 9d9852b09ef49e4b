//! The AR engine collaborator interface
//!
//! The engine owns camera tracking, plane detection, the scene graph,
//! and spatial-map serialization. The coordination layer issues
//! commands and receives opaque identifiers and snapshots back; it
//! never holds a scene-graph reference.

use async_trait::async_trait;
use placekit_core::{AnchorId, EntityId, RenderableHandle, SettingsDiff, TrackingQuality, Transform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("world map unavailable: {0}")]
    MapUnavailable(String),
    #[error("engine rejected command: {0}")]
    Rejected(String),
}

/// Per-frame snapshot reported by the engine
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Camera pose in world space
    pub camera: Transform,
    /// Current spatial-mapping quality
    pub tracking_quality: TrackingQuality,
}

/// Normalized screen coordinates for raycast queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    /// Center of the screen, where placements are resolved
    pub const CENTER: ScreenPoint = ScreenPoint { x: 0.5, y: 0.5 };
}

/// Commands and queries against the platform AR engine
///
/// All methods except [`fetch_current_map`](ArEngine::fetch_current_map)
/// are synchronous and must return promptly; they are invoked from
/// inside the per-frame tick.
#[async_trait]
pub trait ArEngine: Send + Sync {
    /// Latest frame snapshot, if the session is running
    fn current_frame(&self) -> Option<Frame>;

    /// Project a ray from the given screen point into the tracked
    /// environment; `None` when no real-world surface is hit
    fn raycast(&self, origin: ScreenPoint) -> Option<Transform>;

    /// Create a tracked anchor at the given world transform
    fn add_anchor(&self, transform: Transform, name: &str) -> AnchorId;

    /// Remove an anchor and everything parented under it
    fn remove_anchor(&self, anchor: &AnchorId);

    /// Parent a clone of the renderable under the anchor, scaled by
    /// the model's compensation factor
    fn place_renderable(
        &self,
        anchor: &AnchorId,
        renderable: &RenderableHandle,
        scale: f32,
    ) -> EntityId;

    /// Toggle the deletion highlight on a placed entity
    fn set_highlight(&self, entity: &EntityId, highlighted: bool);

    /// Show or hide the placement focus indicator
    fn set_focus_indicator(&self, visible: bool);

    /// Push changed session toggles into the running configuration
    fn apply_settings(&self, diff: &SettingsDiff);

    /// Serialize the current spatial map; resolves off the tick thread
    async fn fetch_current_map(&self) -> Result<Vec<u8>, EngineError>;

    /// Restart tracking with the given map as initial world state,
    /// resetting tracking and removing all existing anchors
    fn restart_tracking_with_map(&self, map: &[u8]) -> Result<(), EngineError>;
}
