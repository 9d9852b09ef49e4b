//! Scripted in-memory engine and loader
//!
//! `SimEngine` records every command it receives and answers queries
//! from scripted state, so the coordination layer can be exercised
//! without a live AR runtime. `SimLoader` does the same for asset
//! loads. Both are used by the session tests and are usable for
//! headless development.

use async_trait::async_trait;
use placekit_core::{
    AnchorId, EntityId, RenderableHandle, SettingsDiff, TrackingQuality, Transform,
};
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::debug;

use crate::engine::{ArEngine, EngineError, Frame, ScreenPoint};
use crate::loader::{AssetLoader, LoadError};

/// One command issued against the engine, in order
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    AddAnchor { anchor: AnchorId, name: String },
    RemoveAnchor(AnchorId),
    PlaceRenderable {
        anchor: AnchorId,
        entity: EntityId,
        renderable: RenderableHandle,
        scale: f32,
    },
    SetHighlight { entity: EntityId, highlighted: bool },
    SetFocusIndicator(bool),
    ApplySettings(SettingsDiff),
    RestartTracking { map: Vec<u8> },
}

#[derive(Debug, Default)]
struct SimState {
    quality: TrackingQuality,
    camera: Transform,
    raycast_result: Option<Transform>,
    map_blob: Option<Vec<u8>>,
    map_error: Option<String>,
    anchors: HashSet<AnchorId>,
    commands: Vec<EngineCommand>,
}

/// Scripted AR engine double
#[derive(Debug, Default)]
pub struct SimEngine {
    state: Mutex<SimState>,
}

impl SimEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine ready for placement: mapped tracking, raycast hits at
    /// the origin, and a map blob available for fetching
    pub fn ready() -> Self {
        let sim = Self::new();
        sim.set_tracking_quality(TrackingQuality::Mapped);
        sim.set_raycast_result(Some(Transform::IDENTITY));
        sim.set_map_blob(b"sim world map".to_vec());
        sim
    }

    pub fn set_tracking_quality(&self, quality: TrackingQuality) {
        self.state.lock().unwrap().quality = quality;
    }

    pub fn set_raycast_result(&self, result: Option<Transform>) {
        self.state.lock().unwrap().raycast_result = result;
    }

    pub fn set_map_blob(&self, blob: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.map_blob = Some(blob);
        state.map_error = None;
    }

    pub fn fail_map_fetch(&self, reason: &str) {
        let mut state = self.state.lock().unwrap();
        state.map_blob = None;
        state.map_error = Some(reason.to_string());
    }

    /// Every command issued so far, in order
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Drain the command log
    pub fn take_commands(&self) -> Vec<EngineCommand> {
        std::mem::take(&mut self.state.lock().unwrap().commands)
    }

    /// Number of anchors currently live in the simulated scene
    pub fn live_anchor_count(&self) -> usize {
        self.state.lock().unwrap().anchors.len()
    }

    /// Highlight commands issued for one entity, in order
    pub fn highlights_for(&self, entity: &EntityId) -> Vec<bool> {
        self.state
            .lock()
            .unwrap()
            .commands
            .iter()
            .filter_map(|c| match c {
                EngineCommand::SetHighlight { entity: e, highlighted } if e == entity => {
                    Some(*highlighted)
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ArEngine for SimEngine {
    fn current_frame(&self) -> Option<Frame> {
        let state = self.state.lock().unwrap();
        Some(Frame {
            camera: state.camera,
            tracking_quality: state.quality,
        })
    }

    fn raycast(&self, _origin: ScreenPoint) -> Option<Transform> {
        self.state.lock().unwrap().raycast_result
    }

    fn add_anchor(&self, _transform: Transform, name: &str) -> AnchorId {
        let anchor = AnchorId::generate();
        let mut state = self.state.lock().unwrap();
        state.anchors.insert(anchor.clone());
        state.commands.push(EngineCommand::AddAnchor {
            anchor: anchor.clone(),
            name: name.to_string(),
        });
        anchor
    }

    fn remove_anchor(&self, anchor: &AnchorId) {
        let mut state = self.state.lock().unwrap();
        state.anchors.remove(anchor);
        state.commands.push(EngineCommand::RemoveAnchor(anchor.clone()));
    }

    fn place_renderable(
        &self,
        anchor: &AnchorId,
        renderable: &RenderableHandle,
        scale: f32,
    ) -> EntityId {
        let entity = EntityId::generate();
        self.state
            .lock()
            .unwrap()
            .commands
            .push(EngineCommand::PlaceRenderable {
                anchor: anchor.clone(),
                entity: entity.clone(),
                renderable: renderable.clone(),
                scale,
            });
        entity
    }

    fn set_highlight(&self, entity: &EntityId, highlighted: bool) {
        self.state
            .lock()
            .unwrap()
            .commands
            .push(EngineCommand::SetHighlight {
                entity: entity.clone(),
                highlighted,
            });
    }

    fn set_focus_indicator(&self, visible: bool) {
        self.state
            .lock()
            .unwrap()
            .commands
            .push(EngineCommand::SetFocusIndicator(visible));
    }

    fn apply_settings(&self, diff: &SettingsDiff) {
        debug!(?diff, "Sim engine applying settings");
        self.state
            .lock()
            .unwrap()
            .commands
            .push(EngineCommand::ApplySettings(*diff));
    }

    async fn fetch_current_map(&self) -> Result<Vec<u8>, EngineError> {
        let state = self.state.lock().unwrap();
        if let Some(reason) = &state.map_error {
            return Err(EngineError::MapUnavailable(reason.clone()));
        }
        state
            .map_blob
            .clone()
            .ok_or_else(|| EngineError::MapUnavailable("no map scripted".to_string()))
    }

    fn restart_tracking_with_map(&self, map: &[u8]) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state.anchors.clear();
        state.commands.push(EngineCommand::RestartTracking {
            map: map.to_vec(),
        });
        Ok(())
    }
}

/// Scripted asset loader double
#[derive(Debug, Default)]
pub struct SimLoader {
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
}

impl SimLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a load failure for one model name
    pub fn fail_for(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    /// Every load request received so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetLoader for SimLoader {
    async fn load_renderable(&self, name: &str) -> Result<RenderableHandle, LoadError> {
        self.requests.lock().unwrap().push(name.to_string());
        if self.failing.lock().unwrap().contains(name) {
            return Err(LoadError::NotFound(name.to_string()));
        }
        Ok(RenderableHandle::generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_bookkeeping() {
        let sim = SimEngine::new();
        let a = sim.add_anchor(Transform::IDENTITY, "model-Pacman_Arcade");
        let _b = sim.add_anchor(Transform::IDENTITY, "model-Defender_Arcade");
        assert_eq!(sim.live_anchor_count(), 2);

        sim.remove_anchor(&a);
        assert_eq!(sim.live_anchor_count(), 1);

        sim.restart_tracking_with_map(b"map").unwrap();
        assert_eq!(sim.live_anchor_count(), 0);
    }

    #[test]
    fn test_command_log_order() {
        let sim = SimEngine::new();
        sim.set_focus_indicator(true);
        sim.set_focus_indicator(false);
        let commands = sim.take_commands();
        assert_eq!(
            commands,
            vec![
                EngineCommand::SetFocusIndicator(true),
                EngineCommand::SetFocusIndicator(false),
            ]
        );
        assert!(sim.commands().is_empty());
    }

    #[tokio::test]
    async fn test_scripted_map_fetch() {
        let sim = SimEngine::new();
        assert!(sim.fetch_current_map().await.is_err());

        sim.set_map_blob(b"blob".to_vec());
        assert_eq!(sim.fetch_current_map().await.unwrap(), b"blob");

        sim.fail_map_fetch("relocalizing");
        assert!(matches!(
            sim.fetch_current_map().await,
            Err(EngineError::MapUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_scripted_load_failure() {
        let loader = SimLoader::new();
        loader.fail_for("Broken_Arcade");

        assert!(loader.load_renderable("Pacman_Arcade").await.is_ok());
        assert!(matches!(
            loader.load_renderable("Broken_Arcade").await,
            Err(LoadError::NotFound(_))
        ));
        assert_eq!(loader.requests(), vec!["Pacman_Arcade", "Broken_Arcade"]);
    }
}
