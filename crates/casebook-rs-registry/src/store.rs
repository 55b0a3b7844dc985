//! In-memory record collection with snapshot and remote persistence.

use crate::error::{RegistryError, RemoteError};
use crate::model::{DedupRule, PersonRecord, RecordId, observe_id, same_name};
use crate::remote::{RemoteBackend, RemoteSettings};
use crate::snapshot;
use log::{debug, info, warn};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Ordered, deduplicated collection of person records.
///
/// Local snapshot operations are synchronous and report their failures.
/// Remote operations are spawned onto the current Tokio runtime and never
/// report failures: the returned handles only say that an attempt finished.
pub struct RecordStore {
    records: Vec<PersonRecord>,
    dedup: DedupRule,
    backend: Arc<dyn RemoteBackend>,
    remote: RemoteSettings,
}

impl RecordStore {
    /// Create an empty store talking to `backend`.
    pub fn new(backend: Arc<dyn RemoteBackend>, remote: RemoteSettings) -> Self {
        info!(
            "initialized record store (key_prefix={}, timeout={:?})",
            remote.key_prefix, remote.timeout
        );
        Self {
            records: Vec::new(),
            dedup: same_name,
            backend,
            remote,
        }
    }

    /// Replace the rule used to detect duplicate records.
    pub fn with_dedup_rule(mut self, rule: DedupRule) -> Self {
        self.dedup = rule;
        self
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&PersonRecord> {
        self.records.iter().find(|record| record.name() == name)
    }

    /// Records flagged as infected, in insertion order.
    pub fn infected(&self) -> impl Iterator<Item = &PersonRecord> {
        self.records.iter().filter(|record| record.is_infected())
    }

    /// Append `record` unless a duplicate is already stored.
    ///
    /// Returns `false` and leaves the collection untouched on a duplicate.
    pub fn add_record(&mut self, record: PersonRecord) -> bool {
        let dedup = self.dedup;
        if self.records.iter().any(|existing| dedup(existing, &record)) {
            debug!("duplicate record rejected (id={})", record.id());
            return false;
        }
        observe_id(record.id());
        debug!(
            "record added (id={}, infected={}, total={})",
            record.id(),
            record.is_infected(),
            self.records.len() + 1
        );
        self.records.push(record);
        true
    }

    /// Remote key for a record id.
    pub fn remote_key(&self, id: RecordId) -> String {
        format!("{}{}", self.remote.key_prefix, id)
    }

    /// Push a copy of `record` to the remote backend in the background.
    ///
    /// Fire-and-forget: the call returns immediately, failures are only logged
    /// and nothing is retried. Dropping the handle detaches the task; awaiting
    /// it only tells that the attempt is over, not whether it succeeded.
    /// Must be called from within a Tokio runtime.
    pub fn upsert_remote(&self, record: &PersonRecord) -> JoinHandle<()> {
        let key = self.remote_key(record.id());
        let record = record.clone();
        let backend = Arc::clone(&self.backend);
        let timeout = self.remote.timeout;
        tokio::spawn(async move {
            match bounded(timeout, backend.put(&key, &record)).await {
                Ok(()) => debug!("remote upsert finished (key={key})"),
                Err(err) => warn!("remote upsert dropped (key={key}): {err}"),
            }
        })
    }

    /// Fetch the record stored remotely under `id` in the background.
    ///
    /// Missing keys and every remote failure resolve to `None`. Dropping the
    /// handle keeps the read fire-and-forget. Must be called from within a
    /// Tokio runtime.
    pub fn fetch_remote(&self, id: RecordId) -> JoinHandle<Option<PersonRecord>> {
        let key = self.remote_key(id);
        let backend = Arc::clone(&self.backend);
        let timeout = self.remote.timeout;
        tokio::spawn(async move {
            match bounded(timeout, backend.get(&key)).await {
                Ok(record) => {
                    debug!("remote fetch finished (key={key}, found={})", record.is_some());
                    record
                }
                Err(err) => {
                    warn!("remote fetch dropped (key={key}): {err}");
                    None
                }
            }
        })
    }

    /// Overwrite the snapshot at `path` with the whole collection.
    ///
    /// Precondition: `path` must already exist as a regular file (directly or
    /// through a symlink). When it does not, returns `Ok(false)` without
    /// creating anything. The existing file is rewritten in place.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<bool, RegistryError> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("snapshot target missing (path={})", path.display());
            return Ok(false);
        }
        let bytes = snapshot::encode(&self.records)?;
        match snapshot::overwrite_existing(path, &bytes) {
            Ok(()) => {}
            Err(RegistryError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("snapshot target vanished (path={})", path.display());
                return Ok(false);
            }
            Err(err) => return Err(err),
        }
        info!(
            "snapshot saved (path={}, records={})",
            path.display(),
            self.records.len()
        );
        Ok(true)
    }

    /// Replace the collection with the snapshot stored at `path`.
    ///
    /// Returns `Ok(false)` when `path` does not exist. On any error the
    /// current collection is left as it was.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<bool, RegistryError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("snapshot source missing (path={})", path.display());
            return Ok(false);
        }
        let bytes = std::fs::read(path)?;
        let records = snapshot::decode(&bytes)?;
        for record in &records {
            observe_id(record.id());
        }
        info!(
            "snapshot loaded (path={}, records={}, replaced={})",
            path.display(),
            records.len(),
            self.records.len()
        );
        self.records = records;
        Ok(true)
    }
}

/// Run a remote call, bounded by `timeout` when one is set.
async fn bounded<T, F>(timeout: Option<std::time::Duration>, call: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| RemoteError::Timeout(limit))?,
        None => call.await,
    }
}
