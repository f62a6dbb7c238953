//! Configuration loader for the retro console.
//!
//! `defaults/retro.default.toml` is embedded into the binary so that the documented defaults and
//! runtime behavior stay in sync. Applications layer user files and command line overrides on top
//! of those defaults via [`Loader`] before deserializing into [`RetroConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/retro.default.toml");

/// Top-level configuration consumed by the retro binary.
#[derive(Debug, Clone, Deserialize)]
pub struct RetroConfig {
    pub display: DisplayConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    pub keys: KeysConfig,
}

/// Geometry and frame rate of the emulated screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub fps: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Console key bindings, one key name per button.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeysConfig {
    pub x: String,
    pub y: String,
    pub a: String,
    pub b: String,
    pub start: String,
    pub power: String,
    pub reset: String,
    pub quit: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for command line flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<RetroConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<RetroConfig, ConfigError> {
    Loader::new().build()
}
