//! Crate configuration
//!
//! Configuration files can be written as TOML, RON or JSON. The format is
//! picked from the file extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// File formats configuration can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration that can be loaded from and saved to files
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse configuration text
    fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render configuration text
    fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let rendered = match format {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
            ConfigFormat::Ron => {
                ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| e.to_string())
            }
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
        };
        rendered.map_err(ConfigError::Serialize)
    }

    /// Load configuration from a file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, format)
    }

    /// Save configuration to a file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.render(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Errors produced while loading, saving or validating configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file couldn't be read or written
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents are malformed
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The configuration couldn't be rendered
    #[error("failed to serialize config: {0}")]
    Serialize(String),

    /// The file extension is not one of the supported formats
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter, e.g. `"info"` or `"scene_graph=debug"`
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the global logger with this configuration
    pub fn init(&self) {
        crate::foundation::logging::init_with_level(&self.log_level);
    }
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Emit a warning when a material or drawable class can't be resolved
    pub warn_unresolved: bool,
    /// Number of paint nodes to reserve space for up front
    pub initial_cache_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            warn_unresolved: true,
            initial_cache_capacity: 256,
        }
    }
}

impl RendererConfig {
    /// Set whether unresolved classes are reported
    pub fn with_warn_unresolved(mut self, enabled: bool) -> Self {
        self.warn_unresolved = enabled;
        self
    }

    /// Set the initial paint node capacity
    pub fn with_initial_cache_capacity(mut self, capacity: usize) -> Self {
        self.initial_cache_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_cache_capacity > 1 << 20 {
            return Err(ConfigError::Invalid(format!(
                "initial cache capacity {} is unreasonably large",
                self.initial_cache_capacity
            )));
        }
        Ok(())
    }
}

/// Top-level configuration for the scene graph crate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneGraphConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Renderer configuration
    pub renderer: RendererConfig,
}

impl SceneGraphConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.renderer.validate()
    }
}

impl Config for SceneGraphConfig {}
