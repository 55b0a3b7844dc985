//! Person record registry with local snapshots and remote key-value sync.

pub mod error;
pub mod model;
pub mod remote;
pub mod snapshot;
pub mod store;

/// Registry error types.
pub use error::{RegistryError, RemoteError};
/// Person record model and dedup rules.
pub use model::{DedupRule, PersonRecord, RecordId, person_label, same_name};
/// Remote backend interface and built-in implementations.
pub use remote::{
    DEFAULT_KEY_PREFIX, DisabledBackend, HttpKvBackend, RemoteBackend, RemoteSettings,
};
/// Record store.
pub use store::RecordStore;
