//! Placekit Core - Model catalog, anchor types, and world-map storage
//!
//! This crate provides the foundational types for the Placekit system:
//! - Model catalog with per-model scale compensation and renderable caching
//! - Anchor, entity, and tracking-quality types exchanged with the AR engine
//! - Session settings with explicit diff-based application
//! - World-map store for persisting the engine's spatial map to disk

pub mod anchor;
pub mod model;
pub mod settings;
pub mod store;

pub use anchor::{AnchorId, AnchorRecord, EntityId, TrackingQuality, Transform};
pub use model::{Catalog, CatalogError, Model, ModelCategory, ModelKey, RenderableHandle};
pub use settings::{SessionSettings, SettingsDiff};
pub use store::{MapRecord, MapStore, StoreError};
