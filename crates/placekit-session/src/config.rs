//! Session configuration loading

use placekit_core::SessionSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Main session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Initial toggle values, applied to the engine on session start
    #[serde(default)]
    pub settings: SessionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Fixed path for the persisted world map
    #[serde(default = "default_map_path")]
    pub path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            path: default_map_path(),
        }
    }
}

fn default_map_path() -> String {
    "./arcade.worldmap".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Prefix for engine anchor names, used to recover the model name
    /// when anchors are restored from a persisted map
    #[serde(default = "default_anchor_prefix")]
    pub anchor_name_prefix: String,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            anchor_name_prefix: default_anchor_prefix(),
        }
    }
}

fn default_anchor_prefix() -> String {
    "model-".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Optional JSON catalog file; the built-in catalog is used when
    /// absent
    #[serde(default)]
    pub path: Option<String>,
}

/// Load configuration from file, falling back to defaults when the
/// file does not exist
pub fn load_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.persistence.path, "./arcade.worldmap");
        assert_eq!(config.placement.anchor_name_prefix, "model-");
        assert!(config.catalog.path.is_none());
        assert!(!config.settings.people_occlusion);
    }

    #[test]
    fn test_partial_toml() {
        let config: SessionConfig = toml::from_str(
            r#"
            [persistence]
            path = "/data/scene.worldmap"

            [settings]
            object_occlusion = true
            "#,
        )
        .unwrap();
        assert_eq!(config.persistence.path, "/data/scene.worldmap");
        assert!(config.settings.object_occlusion);
        assert!(!config.settings.multiuser);
        assert_eq!(config.placement.anchor_name_prefix, "model-");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(Path::new("./no-such-placekit.toml")).unwrap();
        assert_eq!(config.persistence.path, "./arcade.worldmap");
    }
}
