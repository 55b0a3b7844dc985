//! Public surface for Casebook.
//!
//! This crate re-exports the registry and config crates and hosts the thin
//! controller and interactive shell used by the `casebook` binary.

pub mod controller;
pub mod shell;

/// Re-export for convenience.
pub use casebook_rs_config as config;
/// Re-export for convenience.
pub use casebook_rs_registry as registry;

use casebook_rs_config::RemoteConfig;
use casebook_rs_registry::{
    DisabledBackend, HttpKvBackend, RecordStore, RemoteBackend, RemoteSettings,
};
use log::info;
use std::sync::Arc;

#[inline]
/// Initialize logging using env_logger with millisecond timestamps.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Build a record store wired to the backend described by `remote`.
///
/// Disabled or unconfigured remotes get a backend that refuses every call,
/// which the store logs and ignores.
pub fn build_store(remote: &RemoteConfig) -> RecordStore {
    let backend: Arc<dyn RemoteBackend> = match (remote.enabled, remote.base_url.as_deref()) {
        (true, Some(base_url)) => {
            Arc::new(HttpKvBackend::new(base_url, remote.auth_secret.clone()))
        }
        _ => {
            info!("remote sync disabled");
            Arc::new(DisabledBackend)
        }
    };
    RecordStore::new(
        backend,
        RemoteSettings {
            key_prefix: remote.key_prefix.clone(),
            timeout: remote.timeout(),
        },
    )
}
