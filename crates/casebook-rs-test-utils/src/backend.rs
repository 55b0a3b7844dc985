use async_trait::async_trait;
use casebook_rs_registry::{PersonRecord, RemoteBackend, RemoteError};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Backend keeping records in a map and remembering every put.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: Mutex<HashMap<String, PersonRecord>>,
    puts: Mutex<Vec<String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: impl Into<String>, record: PersonRecord) -> Self {
        self.entries.lock().insert(key.into(), record);
        self
    }

    pub fn entry(&self, key: &str) -> Option<PersonRecord> {
        self.entries.lock().get(key).cloned()
    }

    /// Keys written so far, in call order.
    pub fn put_keys(&self) -> Vec<String> {
        self.puts.lock().clone()
    }
}

#[async_trait]
impl RemoteBackend for InMemoryBackend {
    async fn put(&self, key: &str, record: &PersonRecord) -> Result<(), RemoteError> {
        self.puts.lock().push(key.to_string());
        self.entries.lock().insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PersonRecord>, RemoteError> {
        Ok(self.entries.lock().get(key).cloned())
    }
}

/// Backend failing every call with a server error status.
#[derive(Debug, Default)]
pub struct FailingBackend {
    calls: Mutex<usize>,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }

    fn fail(&self, key: &str) -> RemoteError {
        *self.calls.lock() += 1;
        RemoteError::Status {
            key: key.to_string(),
            status: 500,
        }
    }
}

#[async_trait]
impl RemoteBackend for FailingBackend {
    async fn put(&self, key: &str, _record: &PersonRecord) -> Result<(), RemoteError> {
        Err(self.fail(key))
    }

    async fn get(&self, key: &str) -> Result<Option<PersonRecord>, RemoteError> {
        Err(self.fail(key))
    }
}

/// Backend whose calls never complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct StalledBackend;

#[async_trait]
impl RemoteBackend for StalledBackend {
    async fn put(&self, _key: &str, _record: &PersonRecord) -> Result<(), RemoteError> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<PersonRecord>, RemoteError> {
        std::future::pending::<()>().await;
        Ok(None)
    }
}
