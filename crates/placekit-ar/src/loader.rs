//! The asset loader collaborator interface

use async_trait::async_trait;
use placekit_core::RenderableHandle;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("failed to decode asset {name}: {reason}")]
    Decode { name: String, reason: String },
}

/// Converts a model name into a renderable handle, asynchronously
///
/// Implementations must never block the caller; completion is awaited
/// off the tick thread and delivered back as a session completion.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load_renderable(&self, name: &str) -> Result<RenderableHandle, LoadError>;
}
