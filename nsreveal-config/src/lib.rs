//! Shared configuration loader for nsreveal.
//!
//! `defaults/nsreveal.default.toml` is embedded into every binary so that docs and runtime
//! behavior stay in sync. Applications layer user-specific files on top of those defaults via
//! [`Loader`] before deserializing into [`RevealConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use nsreveal_engine::reveal::policy::ExclusionPolicy;
use nsreveal_engine::{EngineLimits, Mode, Settings};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError as LoadError;

const DEFAULT_TOML: &str = include_str!("../defaults/nsreveal.default.toml");

/// Top-level configuration consumed by nsreveal applications.
#[derive(Debug, Clone, Deserialize)]
pub struct RevealConfig {
    pub engine: EngineConfig,
    pub exclude: ExcludeConfig,
    pub watcher: WatcherConfig,
}

/// Initial mapping and mode.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub mode: Mode,
    pub namespaces: Vec<String>,
}

/// Elements the engine must not touch.
#[derive(Debug, Clone, Deserialize)]
pub struct ExcludeConfig {
    pub tags: Vec<String>,
    pub content_editable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    pub max_flush_rounds: usize,
}

impl RevealConfig {
    /// Shared settings seeded from `engine.namespaces` and `engine.mode`.
    pub fn settings(&self) -> Settings {
        Settings::new(&self.engine.namespaces, self.engine.mode)
    }

    pub fn policy(&self) -> ExclusionPolicy {
        ExclusionPolicy::new(&self.exclude.tags, self.exclude.content_editable)
    }

    pub fn limits(&self) -> EngineLimits {
        EngineLimits {
            max_flush_rounds: self.watcher.max_flush_rounds,
        }
    }
}

/// Name of the project-level configuration file picked up from the working directory.
pub const PROJECT_CONFIG: &str = "nsreveal.toml";

/// Builds a [`RevealConfig`] from the embedded defaults plus any number of TOML layers.
///
/// Layers apply in the order they are added; overrides always win.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    /// Add `path` as a layer. Building fails if it does not exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_layer(path.as_ref(), true)
    }

    /// Add `path` as a layer if it exists.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_layer(path.as_ref(), false)
    }

    fn with_layer(mut self, path: &Path, required: bool) -> Self {
        let layer = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(layer);
        self
    }

    /// Force `key` (dotted path, e.g. `engine.mode`) to `value`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<RevealConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
