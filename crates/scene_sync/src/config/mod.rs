//! Configuration system
//!
//! Hosts and the library loader read their settings from [`SyncConfig`], which
//! can be loaded from TOML or RON files through the [`Config`] trait.

use std::time::Duration;

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

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
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
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

/// Default ES module build of the rendering library
pub const DEFAULT_MODULE_URL: &str = "https://unpkg.com/three@0.160.0/build/three.module.js";

/// Default classic-script fallbacks, tried in order
pub const DEFAULT_FALLBACK_SOURCES: [&str; 2] = [
    "https://cdn.jsdelivr.net/npm/three@0.160.0/build/three.min.js",
    "https://unpkg.com/three@0.160.0/build/three.min.js",
];

/// Default wait for a fallback source to expose the library
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 5_000;

/// Top-level configuration for scene synchronization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Rendering library acquisition
    pub loader: LoaderConfig,

    /// Per-host render loop behavior
    pub render: RenderLoopConfig,
}

impl Config for SyncConfig {}

/// Where and how the rendering library is acquired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Module imported before any fallback is tried; `None` skips the import
    pub module_url: Option<String>,

    /// Script sources tried in order when the module import fails
    pub fallback_sources: Vec<String>,

    /// How long to wait for each fallback to expose the library
    pub source_timeout_ms: u64,
}

impl LoaderConfig {
    /// Create a loader configuration with no sources at all
    pub fn empty() -> Self {
        Self {
            module_url: None,
            fallback_sources: Vec::new(),
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
        }
    }

    /// Set the module URL
    pub fn with_module_url(mut self, url: impl Into<String>) -> Self {
        self.module_url = Some(url.into());
        self
    }

    /// Append a fallback script source
    pub fn with_fallback(mut self, source: impl Into<String>) -> Self {
        self.fallback_sources.push(source.into());
        self
    }

    /// Set the per-source timeout in milliseconds
    pub fn with_source_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.source_timeout_ms = timeout_ms;
        self
    }

    /// Per-source timeout as a [`Duration`]
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            module_url: Some(DEFAULT_MODULE_URL.to_string()),
            fallback_sources: DEFAULT_FALLBACK_SOURCES.iter().map(|s| (*s).to_string()).collect(),
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
        }
    }
}

/// Render loop settings applied to every host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLoopConfig {
    /// Start the render loop as soon as a host becomes ready
    pub autostart: bool,
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self { autostart: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [loader]
            source_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.loader.source_timeout(), Duration::from_millis(250));
        assert_eq!(config.loader.module_url.as_deref(), Some(DEFAULT_MODULE_URL));
        assert_eq!(config.loader.fallback_sources.len(), 2);
        assert!(config.render.autostart);
    }

    #[test]
    fn test_ron_round_trip_through_files() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("scene_sync_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let config = SyncConfig {
            loader: LoaderConfig::empty().with_fallback("a.js").with_source_timeout_ms(10),
            render: RenderLoopConfig { autostart: false },
        };
        config.save_to_file(&path).unwrap();
        let loaded = SyncConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = SyncConfig::default().save_to_file("config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
