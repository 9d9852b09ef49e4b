//! Placeable model definitions and the model catalog
//!
//! The catalog is the static registry of models the user can place.
//! Each entry carries a per-model scale compensation factor and a cache
//! slot for the loaded renderable, populated on first successful load
//! and cleared before a persisted scene is restored.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Manufacturer category for a placeable model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelCategory {
    Atari,
    DataEast,
    Gottlieb,
    Midway,
    Nintendo,
    Sega,
    Taito,
    Williams,
}

impl ModelCategory {
    /// All categories, in display order
    pub const ALL: [ModelCategory; 8] = [
        ModelCategory::Atari,
        ModelCategory::DataEast,
        ModelCategory::Gottlieb,
        ModelCategory::Midway,
        ModelCategory::Nintendo,
        ModelCategory::Sega,
        ModelCategory::Taito,
        ModelCategory::Williams,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ModelCategory::Atari => "Atari",
            ModelCategory::DataEast => "Data East",
            ModelCategory::Gottlieb => "Gottlieb",
            ModelCategory::Midway => "Midway",
            ModelCategory::Nintendo => "Nintendo",
            ModelCategory::Sega => "Sega",
            ModelCategory::Taito => "Taito",
            ModelCategory::Williams => "Williams",
        }
    }
}

/// Identity of a model: name plus category
///
/// Two models with the same key are interchangeable; equality, recents
/// deduplication, and pending placements all operate on the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    /// Unique model name (also the asset name)
    pub name: String,
    /// Manufacturer category
    pub category: ModelCategory,
}

impl ModelKey {
    pub fn new(name: impl Into<String>, category: ModelCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Opaque handle to a loaded renderable asset, issued by the asset loader
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderableHandle(pub Uuid);

impl RenderableHandle {
    /// Generate a fresh handle (used by loader implementations)
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A placeable model definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Model identity
    #[serde(flatten)]
    pub key: ModelKey,
    /// Scale factor applied to the renderable at placement time
    #[serde(default = "default_scale")]
    pub scale_compensation: f32,
    /// Cached renderable handle; absent until the first successful load
    #[serde(skip)]
    pub renderable: Option<RenderableHandle>,
}

fn default_scale() -> f32 {
    0.5
}

impl Model {
    /// Create a model with the default scale compensation (0.5)
    pub fn new(name: impl Into<String>, category: ModelCategory) -> Self {
        Self {
            key: ModelKey::new(name, category),
            scale_compensation: default_scale(),
            renderable: None,
        }
    }

    /// Override the scale compensation factor
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale_compensation = scale;
        self
    }

    /// Whether the renderable for this model is already cached
    pub fn is_loaded(&self) -> bool {
        self.renderable.is_some()
    }
}

// Equality is identity only; the cache slot and scale do not participate.
impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Model {}

/// Static registry of placeable models
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    models: Vec<Model>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    /// The built-in arcade cabinet catalog
    pub fn builtin() -> Self {
        Self {
            models: vec![
                Model::new("Pacman_Arcade", ModelCategory::Midway),
                Model::new("Asteroids_Arcade", ModelCategory::Atari),
                Model::new("Centipede_Arcade", ModelCategory::Atari).with_scale(1.0),
                Model::new("Defender_Arcade", ModelCategory::Williams),
                Model::new("DonkeyKong_Arcade", ModelCategory::Nintendo),
                Model::new("MortalKombat_Arcade", ModelCategory::Midway),
                Model::new("Q*bert_Arcade", ModelCategory::Gottlieb),
                Model::new("SpaceInvaders_Arcade", ModelCategory::Taito),
            ],
        }
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        info!(path = %path.display(), models = catalog.models.len(), "Loaded model catalog");
        Ok(catalog)
    }

    /// Add a model to the catalog
    pub fn add(&mut self, model: Model) {
        self.models.push(model);
    }

    /// All models in a category
    pub fn in_category(&self, category: ModelCategory) -> Vec<&Model> {
        self.models
            .iter()
            .filter(|m| m.key.category == category)
            .collect()
    }

    /// Find a model by name
    pub fn find(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.key.name == name)
    }

    /// Find a model by name, mutably
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.key.name == name)
    }

    /// Cached renderable for a model, if any
    pub fn renderable(&self, name: &str) -> Option<&RenderableHandle> {
        self.find(name).and_then(|m| m.renderable.as_ref())
    }

    /// Store a loaded renderable in the model's cache slot
    ///
    /// Completions are keyed by model identity, so a late completion
    /// for a superseded request simply overwrites the slot.
    pub fn set_renderable(&mut self, name: &str, handle: RenderableHandle) {
        if let Some(model) = self.find_mut(name) {
            model.renderable = Some(handle);
        }
    }

    /// Evict every cached renderable (done before restoring a scene)
    pub fn clear_renderables(&mut self) {
        for model in &mut self.models {
            model.renderable = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
