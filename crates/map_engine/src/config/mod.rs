//! Configuration system
//!
//! Settings for the rendering core and the entity-class registry. Supports
//! TOML and RON files, dispatched on the file extension.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Render-core settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Enable the lit (interaction) render mode
    pub lighting_enabled: bool,

    /// Initial capacity of the per-group untransformed-object scratch list
    ///
    /// Sized for large static scenes so the depth and interaction passes
    /// don't reallocate mid-frame.
    pub batch_reserve: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            lighting_enabled: true,
            batch_reserve: 10000,
        }
    }
}

/// Entity-class registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EclassSettings {
    /// Paths searched by the def-file loader (an external collaborator;
    /// this core only parses the token streams it is handed)
    pub def_paths: Vec<String>,
}

impl Default for EclassSettings {
    fn default() -> Self {
        Self {
            def_paths: vec!["def/".to_string()],
        }
    }
}

/// Top-level configuration for the rendering core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Render-core settings
    pub render: RenderSettings,

    /// Entity-class registry settings
    pub eclass: EclassSettings,
}

impl Config for CoreConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = CoreConfig::default();
        assert!(config.render.lighting_enabled);
        assert_eq!(config.render.batch_reserve, 10000);
        assert_eq!(config.eclass.def_paths, vec!["def/".to_string()]);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = CoreConfig::default();
        config.render.lighting_enabled = false;
        config.render.batch_reserve = 64;
        config.eclass.def_paths = vec!["def/".to_string(), "mod/def/".to_string()];

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: CoreConfig = toml::from_str(&text).unwrap();

        assert!(!parsed.render.lighting_enabled);
        assert_eq!(parsed.render.batch_reserve, 64);
        assert_eq!(parsed.eclass.def_paths.len(), 2);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = CoreConfig::default().save_to_file("settings.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
