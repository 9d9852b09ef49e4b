//! The per-frame session driver
//!
//! A [`Session`] owns all coordinator state and is driven by the
//! platform's frame-update callback: every tick it drains completed
//! asynchronous work, updates the focus indicator, consumes the
//! pending placement, recomputes persistence availability, and
//! services outstanding save/load requests, in that order. All state
//! mutation happens on the tick thread; asset loads and map fetches
//! are spawned as fire-and-forget tasks whose results come back
//! through the completion channel.

use placekit_ar::{ArEngine, AssetLoader, EngineError, LoadError, ScreenPoint};
use placekit_core::{
    AnchorId, AnchorRecord, Catalog, EntityId, MapStore, ModelKey, RenderableHandle,
    SessionSettings,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::deletion::DeletionCoordinator;
use crate::persistence::{PersistenceError, ScenePersistenceService};
use crate::placement::{PendingPlacement, PlacementCoordinator};
use crate::registry::AnchorRegistry;

/// Completed asynchronous work, delivered back onto the tick thread
enum Completion {
    RenderableLoaded {
        name: String,
        /// Present when the load was triggered by an anchor restored
        /// from a persisted world map
        restored_anchor: Option<AnchorId>,
        result: Result<RenderableHandle, LoadError>,
    },
    MapFetched(Result<Vec<u8>, EngineError>),
}

/// Reportable conditions surfaced to the UI layer
#[derive(Debug)]
pub enum SessionNotice {
    /// An asset failed to load; the user may re-attempt by re-selecting
    LoadFailed { name: String, error: LoadError },
    /// The scene was saved to the fixed path
    SceneSaved,
    /// A save was abandoned
    SaveFailed(PersistenceError),
    /// Tracking was restarted from the persisted scene
    SceneRestored,
    /// A restore was abandoned; the live scene is untouched
    RestoreFailed(PersistenceError),
}

/// The coordination session for one app run
pub struct Session {
    engine: Arc<dyn ArEngine>,
    loader: Arc<dyn AssetLoader>,
    catalog: Catalog,
    placement: PlacementCoordinator,
    registry: AnchorRegistry,
    deletion: DeletionCoordinator,
    persistence: ScenePersistenceService,
    settings: SessionSettings,
    anchor_prefix: String,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    notices: Vec<SessionNotice>,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        engine: Arc<dyn ArEngine>,
        loader: Arc<dyn AssetLoader>,
    ) -> Self {
        let catalog = match &config.catalog.path {
            Some(path) => match Catalog::from_file(Path::new(path)) {
                Ok(catalog) => catalog,
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to load catalog, using built-in");
                    Catalog::builtin()
                }
            },
            None => Catalog::builtin(),
        };

        let settings = config.settings;
        engine.apply_settings(&settings.full_diff());

        let store = MapStore::new(&config.persistence.path);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        info!(
            models = catalog.len(),
            persistence = %config.persistence.path,
            "Session initialized"
        );

        Self {
            engine,
            loader,
            catalog,
            placement: PlacementCoordinator::new(),
            registry: AnchorRegistry::new(),
            deletion: DeletionCoordinator::new(),
            persistence: ScenePersistenceService::new(store),
            settings,
            anchor_prefix: config.placement.anchor_name_prefix,
            completions_tx,
            completions_rx,
            notices: Vec::new(),
        }
    }

    // ---- UI-facing operations ----

    /// Select a model for placement, starting its asset load if the
    /// renderable is not already cached
    pub fn select_model(&mut self, name: &str) {
        let Some(model) = self.catalog.find(name) else {
            warn!(model = name, "Unknown model selected, ignoring");
            return;
        };
        let key = model.key.clone();
        if !model.is_loaded() {
            self.spawn_load(key.name.clone(), None);
        }
        self.placement.select(key);
    }

    /// Clear the current selection without placing
    pub fn cancel_selection(&mut self) {
        self.placement.clear_selection();
    }

    /// Confirm placement of the selected model; no-op when nothing is
    /// selected
    pub fn confirm_placement(&mut self) {
        self.placement.confirm();
    }

    /// Arm an entity for deletion
    pub fn arm_for_deletion(&mut self, entity: EntityId) {
        self.deletion.arm(&*self.engine, entity);
    }

    /// Delete the armed entity's anchor
    pub fn confirm_deletion(&mut self) -> bool {
        self.deletion.confirm(&*self.engine, &mut self.registry)
    }

    /// Disarm without deleting
    pub fn cancel_deletion(&mut self) {
        self.deletion.cancel(&*self.engine);
    }

    /// Request that the scene be saved on the next tick
    pub fn request_save(&mut self) -> Result<(), PersistenceError> {
        self.persistence.request_save()
    }

    /// Request that the persisted scene be restored on the next tick
    pub fn request_load(&mut self) {
        self.persistence.request_load();
    }

    /// Replace the session toggles, pushing only the changed ones into
    /// the engine configuration
    pub fn update_settings(&mut self, settings: SessionSettings) {
        let diff = self.settings.diff(&settings);
        if !diff.is_empty() {
            info!(?diff, "Applying settings change");
            self.engine.apply_settings(&diff);
        }
        self.settings = settings;
    }

    /// Engine session callback: anchors were added (or restored from a
    /// persisted map). Anchors whose name carries the model prefix are
    /// queued for placement once their renderable is available.
    pub fn on_anchors_added(&mut self, anchors: &[(AnchorId, String)]) {
        for (anchor, name) in anchors {
            let Some(model_name) = name.strip_prefix(&self.anchor_prefix) else {
                continue;
            };
            info!(model = model_name, anchor = %anchor, "Engine reported model anchor");
            let Some(model) = self.catalog.find(model_name) else {
                warn!(model = model_name, "Anchor names a model missing from the catalog");
                continue;
            };
            if model.is_loaded() {
                self.placement
                    .push_restored(model.key.clone(), anchor.clone());
            } else {
                self.spawn_load(model_name.to_string(), Some(anchor.clone()));
            }
        }
    }

    // ---- Read-only observables ----

    pub fn selected_model(&self) -> Option<&ModelKey> {
        self.placement.selected()
    }

    pub fn is_deletion_armed(&self) -> bool {
        self.deletion.is_armed()
    }

    pub fn is_persistence_available(&self) -> bool {
        self.persistence.is_available()
    }

    /// Whether a previous save exists on disk
    pub fn has_saved_scene(&self) -> bool {
        self.persistence.has_saved_scene()
    }

    /// Recently placed models, most recent first, each identity once
    pub fn recents(&self) -> Vec<ModelKey> {
        self.placement.recents_deduplicated()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn anchor_count(&self) -> usize {
        self.registry.len()
    }

    /// Drain reportable conditions accumulated since the last call
    pub fn take_notices(&mut self) -> Vec<SessionNotice> {
        std::mem::take(&mut self.notices)
    }

    // ---- The frame-update driver ----

    /// Run one scene-update tick. Invoked once per rendered frame; the
    /// step order is fixed because persistence availability depends on
    /// the registry state after any placement resolved this tick.
    pub fn tick(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.handle_completion(completion);
        }

        // 1. Focus indicator follows the selection.
        self.engine
            .set_focus_indicator(self.placement.selected().is_some());

        // 2. Consume the pending placement, if any.
        if let Some(pending) = self.placement.take_pending() {
            self.resolve_placement(pending);
        }

        // 3. Re-evaluate persistence availability.
        let quality = self
            .engine
            .current_frame()
            .map(|f| f.tracking_quality)
            .unwrap_or_default();
        self.persistence
            .update_availability(quality, !self.registry.is_empty());

        // 4. Service outstanding save/load requests, one per tick.
        if self.persistence.begin_save() {
            self.spawn_map_fetch();
        } else if self.persistence.begin_load() {
            self.restore_scene();
        }
    }

    fn resolve_placement(&mut self, pending: PendingPlacement) {
        let (handle, scale) = match self.catalog.find(&pending.model.name) {
            Some(model) => match &model.renderable {
                Some(handle) => (handle.clone(), model.scale_compensation),
                None => {
                    debug!(model = %pending.model, "Renderable not loaded yet, dropping placement");
                    return;
                }
            },
            None => {
                warn!(model = %pending.model, "Pending placement for unknown model, dropping");
                return;
            }
        };

        match pending.anchor {
            // Restored anchor: place directly, no raycast, no recents.
            Some(anchor) => {
                let entity = self.engine.place_renderable(&anchor, &handle, scale);
                info!(model = %pending.model, anchor = %anchor, "Placed restored model");
                self.registry.add(AnchorRecord {
                    anchor,
                    entity,
                    model: pending.model,
                });
            }
            None => {
                let Some(transform) = self.engine.raycast(ScreenPoint::CENTER) else {
                    debug!(model = %pending.model, "No surface under raycast, dropping placement");
                    return;
                };
                let name = format!("{}{}", self.anchor_prefix, pending.model.name);
                let anchor = self.engine.add_anchor(transform, &name);
                let entity = self.engine.place_renderable(&anchor, &handle, scale);
                info!(model = %pending.model, anchor = %anchor, "Placed model");
                self.registry.add(AnchorRecord {
                    anchor: anchor.clone(),
                    entity,
                    model: pending.model.clone(),
                });
                self.placement.record_placed(pending.model);
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::RenderableLoaded {
                name,
                restored_anchor,
                result,
            } => match result {
                Ok(handle) => {
                    // Last writer wins; the slot is keyed by identity.
                    self.catalog.set_renderable(&name, handle);
                    info!(model = name, "Renderable loaded");
                    if let Some(anchor) = restored_anchor {
                        if let Some(model) = self.catalog.find(&name) {
                            self.placement.push_restored(model.key.clone(), anchor);
                        }
                    }
                }
                Err(error) => {
                    warn!(model = name, error = %error, "Unable to load renderable");
                    self.notices.push(SessionNotice::LoadFailed { name, error });
                }
            },
            Completion::MapFetched(result) => match self.persistence.complete_save(result) {
                Ok(()) => self.notices.push(SessionNotice::SceneSaved),
                Err(e) => {
                    warn!(error = %e, "Save abandoned");
                    self.notices.push(SessionNotice::SaveFailed(e));
                }
            },
        }
    }

    fn spawn_load(&self, name: String, restored_anchor: Option<AnchorId>) {
        let loader = self.loader.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = loader.load_renderable(&name).await;
            let _ = tx.send(Completion::RenderableLoaded {
                name,
                restored_anchor,
                result,
            });
        });
    }

    fn spawn_map_fetch(&self) {
        let engine = self.engine.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = engine.fetch_current_map().await;
            let _ = tx.send(Completion::MapFetched(result));
        });
    }

    /// Restore the persisted scene: decode first, and only tear down
    /// the live scene once the record is known to be valid.
    fn restore_scene(&mut self) {
        let record = match self.persistence.read_saved_scene() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Unable to read persisted scene, canceling restore");
                self.notices.push(SessionNotice::RestoreFailed(e));
                return;
            }
        };

        self.catalog.clear_renderables();
        self.registry.clear_all(&*self.engine);

        if let Err(e) = self.engine.restart_tracking_with_map(&record.blob) {
            warn!(error = %e, "Engine refused tracking restart");
            self.notices
                .push(SessionNotice::RestoreFailed(PersistenceError::Restart(e)));
            return;
        }

        info!(saved_at = %record.saved_at, "Restarted tracking from persisted scene");
        self.notices.push(SessionNotice::SceneRestored);
    }
}
