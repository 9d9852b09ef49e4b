//! Scene persistence service: save/restore requests and availability
//!
//! Save is asynchronous: the map fetch is dispatched off the tick and
//! its completion is delivered back on the next tick. A second save
//! request while one is in flight is rejected. Availability is a pure
//! predicate over tracking quality and the anchor registry, recomputed
//! every tick.

use placekit_ar::EngineError;
use placekit_core::{MapRecord, MapStore, StoreError, TrackingQuality};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("world map unavailable: {0}")]
    MapUnavailable(EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("engine restart failed: {0}")]
    Restart(EngineError),
}

/// Coordinates spatial-map persistence against the fixed-path store
#[derive(Debug)]
pub struct ScenePersistenceService {
    store: MapStore,
    save_requested: bool,
    load_requested: bool,
    save_in_flight: bool,
    available: bool,
}

impl ScenePersistenceService {
    pub fn new(store: MapStore) -> Self {
        Self {
            store,
            save_requested: false,
            load_requested: false,
            save_in_flight: false,
            available: false,
        }
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    /// Whether persistence is currently offerable to the user
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Recompute availability; called once per tick, never cached
    pub fn update_availability(&mut self, quality: TrackingQuality, has_anchors: bool) {
        self.available = quality.supports_persistence() && has_anchors;
    }

    /// Whether a previous save exists on disk
    pub fn has_saved_scene(&self) -> bool {
        self.store.exists()
    }

    /// Ask for the scene to be saved on the next tick
    pub fn request_save(&mut self) -> Result<(), PersistenceError> {
        if self.save_in_flight {
            warn!("Save requested while a save is in flight, rejecting");
            return Err(PersistenceError::SaveInProgress);
        }
        self.save_requested = true;
        Ok(())
    }

    /// Ask for the persisted scene to be restored on the next tick
    pub fn request_load(&mut self) {
        self.load_requested = true;
    }

    /// Consume a pending save request, marking the save in flight
    pub fn begin_save(&mut self) -> bool {
        if !self.save_requested {
            return false;
        }
        self.save_requested = false;
        self.save_in_flight = true;
        info!("Save scene to local file system");
        true
    }

    /// Finish an in-flight save with the fetched map blob
    ///
    /// A fetch or write failure abandons the save; it is reported, not
    /// retried.
    pub fn complete_save(
        &mut self,
        fetched: Result<Vec<u8>, EngineError>,
    ) -> Result<(), PersistenceError> {
        self.save_in_flight = false;
        let blob = fetched.map_err(PersistenceError::MapUnavailable)?;
        self.store.save(&blob)?;
        Ok(())
    }

    /// Consume a pending load request
    pub fn begin_load(&mut self) -> bool {
        if !self.load_requested {
            return false;
        }
        self.load_requested = false;
        info!("Load scene from local file system");
        true
    }

    /// Read and decode the persisted record; malformed input is a
    /// recoverable error, never fatal
    pub fn read_saved_scene(&self) -> Result<MapRecord, PersistenceError> {
        Ok(self.store.load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ScenePersistenceService {
        ScenePersistenceService::new(MapStore::new(dir.path().join("arcade.worldmap")))
    }

    #[test]
    fn test_availability_requires_quality_and_anchors() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);

        svc.update_availability(TrackingQuality::Limited, true);
        assert!(!svc.is_available());

        svc.update_availability(TrackingQuality::Mapped, false);
        assert!(!svc.is_available());

        svc.update_availability(TrackingQuality::Mapped, true);
        assert!(svc.is_available());

        svc.update_availability(TrackingQuality::Extending, true);
        assert!(svc.is_available());

        // Quality dropping back to limited wins regardless of anchors.
        svc.update_availability(TrackingQuality::Limited, true);
        assert!(!svc.is_available());
    }

    #[test]
    fn test_concurrent_save_rejected() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);

        svc.request_save().unwrap();
        assert!(svc.begin_save());

        assert!(matches!(
            svc.request_save(),
            Err(PersistenceError::SaveInProgress)
        ));

        svc.complete_save(Ok(b"map".to_vec())).unwrap();
        svc.request_save().unwrap();
    }

    #[test]
    fn test_failed_fetch_abandons_save() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);

        svc.request_save().unwrap();
        assert!(svc.begin_save());
        let err = svc
            .complete_save(Err(EngineError::MapUnavailable("relocalizing".into())))
            .unwrap_err();
        assert!(matches!(err, PersistenceError::MapUnavailable(_)));
        assert!(!svc.has_saved_scene());

        // The in-flight flag is released so the user can retry.
        svc.request_save().unwrap();
    }

    #[test]
    fn test_save_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);

        svc.request_save().unwrap();
        assert!(svc.begin_save());
        svc.complete_save(Ok(b"the map".to_vec())).unwrap();

        assert!(svc.has_saved_scene());
        assert_eq!(svc.read_saved_scene().unwrap().blob, b"the map");
    }

    #[test]
    fn test_begin_consumes_requests() {
        let dir = TempDir::new().unwrap();
        let mut svc = service(&dir);

        assert!(!svc.begin_save());
        assert!(!svc.begin_load());

        svc.request_load();
        assert!(svc.begin_load());
        assert!(!svc.begin_load());
    }
}
