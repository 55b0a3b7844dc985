use casebook_rs_registry::{DisabledBackend, RecordStore, RemoteBackend, RemoteSettings};
use std::sync::Arc;
use std::time::Duration;

/// Store with remote sync switched off.
pub fn offline_store() -> RecordStore {
    RecordStore::new(Arc::new(DisabledBackend), RemoteSettings::default())
}

/// Store talking to `backend` with the default prefix and an optional timeout.
pub fn store_with(backend: Arc<dyn RemoteBackend>, timeout: Option<Duration>) -> RecordStore {
    RecordStore::new(
        backend,
        RemoteSettings {
            timeout,
            ..RemoteSettings::default()
        },
    )
}
