//! Configuration schema for Casebook.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root config for the Casebook CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CasebookConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Local snapshot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Snapshot file used by the save/load menu entries. Must exist to save.
    #[serde(default = "default_snapshot_path")]
    pub path: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "casebook.bin".to_string()
}

/// Remote key-value backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub auth_secret: Option<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Per-call timeout; `0` disables the bound.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RemoteConfig {
    /// Timeout as a duration, `None` when unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            auth_secret: None,
            key_prefix: default_key_prefix(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_key_prefix() -> String {
    "patient-".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}
