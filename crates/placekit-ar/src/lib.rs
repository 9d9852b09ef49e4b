//! Placekit AR - Integration boundary to the platform AR engine
//!
//! The tracking/reconstruction engine and the asset loader are external
//! collaborators. This crate defines the traits the coordination layer
//! programs against, plus [`sim::SimEngine`] and [`sim::SimLoader`],
//! scripted in-memory doubles for tests and headless runs.

pub mod engine;
pub mod loader;
pub mod sim;

pub use engine::{ArEngine, EngineError, Frame, ScreenPoint};
pub use loader::{AssetLoader, LoadError};
pub use sim::{EngineCommand, SimEngine, SimLoader};
