//! Placekit Session - Scene placement and persistence coordination
//!
//! This crate is the coordination layer between the UI shell and the
//! platform AR engine:
//! - Placement coordinator: selection, single-slot pending placement,
//!   and the recently-placed history
//! - Anchor registry: bookkeeping for every anchored entity in the
//!   live scene
//! - Deletion coordinator: the arm/confirm/cancel state machine with
//!   highlight transitions
//! - Scene persistence service: save/restore of the engine's spatial
//!   map with an explicit availability predicate
//! - [`Session`]: the per-frame driver that ties them together

pub mod config;
pub mod deletion;
pub mod persistence;
pub mod placement;
pub mod registry;
pub mod session;

pub use config::{ConfigError, SessionConfig};
pub use deletion::DeletionCoordinator;
pub use persistence::{PersistenceError, ScenePersistenceService};
pub use placement::{PendingPlacement, PlacementCoordinator};
pub use registry::AnchorRegistry;
pub use session::{Session, SessionNotice};
