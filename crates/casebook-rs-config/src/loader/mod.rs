//! Layered configuration loader.
//!
//! A casebook config is assembled from up to four JSON5 files: system, user,
//! working directory, then any runtime paths. Each file is schema-checked on
//! its own and laid over the previous ones; the result is validated once.

mod layer_io;
mod merge;
mod schema;


use crate::{CasebookConfig, ConfigError};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name looked up in the system, user and working directories.
const CONFIG_FILE_NAME: &str = "casebook.json5";

/// Config together with the files it was built from.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: CasebookConfig,
    /// Applied layers, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

/// Where a layer came from. Variants are listed in merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    System,
    User,
    Cwd,
    /// Explicit paths; these must exist.
    Runtime,
}

impl fmt::Display for ConfigLayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Cwd => "cwd",
            Self::Runtime => "runtime",
        })
    }
}

/// A file that contributed to the config.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Where to look for layers. `None` skips the system or user layer.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    pub cwd: PathBuf,
    pub system_config_path: Option<PathBuf>,
    pub user_config_path: Option<PathBuf>,
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Platform default locations, with the cwd layer read from `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::system_layer_path(),
            user_config_path: layer_io::user_layer_path(),
            runtime_paths: Vec::new(),
        }
    }

    /// Append a runtime layer; later ones win.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }

    fn candidates(&self, cwd: &Path) -> Vec<(ConfigLayerSource, PathBuf)> {
        let fixed = [
            (ConfigLayerSource::System, self.system_config_path.clone()),
            (ConfigLayerSource::User, self.user_config_path.clone()),
            (ConfigLayerSource::Cwd, Some(cwd.join(CONFIG_FILE_NAME))),
        ];
        fixed
            .into_iter()
            .filter_map(|(source, path)| path.map(|path| (source, path)))
            .chain(
                self.runtime_paths
                    .iter()
                    .map(|path| (ConfigLayerSource::Runtime, path.clone())),
            )
            .collect()
    }
}

impl CasebookConfig {
    /// Load exactly one file, as given by `--config`.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config file (path={})", path.display());
        let value = layer_io::read_layer(ConfigLayerSource::Runtime, path)?
            .ok_or_else(|| ConfigError::MissingLayer(path.to_path_buf()))?;
        from_merged(value)
    }

    /// Load a config from JSON5 text.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading inline config (len={})", contents.len());
        let value = layer_io::parse(contents)?;
        schema::validate_layer_schema(&value, "inline config")?;
        from_merged(value)
    }

    /// Load every layer found around `cwd` at the platform default locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load the layers described by `options`.
    ///
    /// Missing system, user and cwd files are skipped; a missing runtime file
    /// is an error. A file reached twice is applied once, at its first slot.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = layer_io::resolve_cwd(&options.cwd)?;
        let mut merged = Value::Object(serde_json::Map::new());
        let mut layers = Vec::new();
        let mut applied = HashSet::new();

        for (source, path) in options.candidates(&cwd) {
            if !applied.insert(layer_io::identity(&path)) {
                debug!(
                    "config layer already applied (source={source}, path={})",
                    path.display()
                );
                continue;
            }
            match layer_io::read_layer(source, &path)? {
                Some(value) => {
                    merge::overlay(&mut merged, value);
                    layers.push(ConfigLayer { source, path });
                }
                None if source == ConfigLayerSource::Runtime => {
                    return Err(ConfigError::MissingLayer(path));
                }
                None => debug!("config layer absent (source={source}, path={})", path.display()),
            }
        }

        let config = from_merged(merged)?;
        info!(
            "config loaded (cwd={}, layers={}, remote_enabled={})",
            cwd.display(),
            layers.len(),
            config.remote.enabled
        );
        Ok(LayeredConfig { config, layers })
    }

    /// Cross-field rules checked after all layers are merged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot.path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "snapshot.path cannot be empty".to_string(),
            ));
        }
        if self.remote.key_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "remote.key_prefix cannot be empty".to_string(),
            ));
        }
        if self.remote.enabled {
            let Some(base_url) = self.remote.base_url.as_deref() else {
                return Err(ConfigError::Invalid(
                    "remote.base_url is required when remote sync is enabled".to_string(),
                ));
            };
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "remote.base_url must be an http(s) url: {base_url}"
                )));
            }
        }
        Ok(())
    }
}

fn from_merged(value: Value) -> Result<CasebookConfig, ConfigError> {
    let config: CasebookConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
