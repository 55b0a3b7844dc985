//! Remote key-value backends used for per-record sync.

use crate::error::RemoteError;
use crate::model::PersonRecord;
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;

/// Default prefix prepended to record ids to form remote keys.
pub const DEFAULT_KEY_PREFIX: &str = "patient-";

#[async_trait]
/// Keyed store the registry pushes records to.
///
/// Implementations are best-effort: the store never retries and never surfaces
/// their errors to its callers.
pub trait RemoteBackend: Send + Sync {
    /// Write `record` under `key`, replacing any previous value.
    async fn put(&self, key: &str, record: &PersonRecord) -> Result<(), RemoteError>;

    /// Read the record stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<PersonRecord>, RemoteError>;
}

/// Store-side settings for remote sync.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    /// Prefix for every remote key.
    pub key_prefix: String,
    /// Upper bound for a single remote call; `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            timeout: None,
        }
    }
}

/// Backend used when remote sync is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledBackend;

#[async_trait]
impl RemoteBackend for DisabledBackend {
    async fn put(&self, _key: &str, _record: &PersonRecord) -> Result<(), RemoteError> {
        Err(RemoteError::Disabled)
    }

    async fn get(&self, _key: &str) -> Result<Option<PersonRecord>, RemoteError> {
        Err(RemoteError::Disabled)
    }
}

/// Realtime-database style REST backend.
///
/// Each key maps to `{base_url}/{key}.json`; writes are `PUT`s of the record
/// JSON and a `null` body on read means the key is absent.
#[derive(Debug, Clone)]
pub struct HttpKvBackend {
    base_url: String,
    auth_secret: Option<String>,
    client: reqwest::Client,
}

impl HttpKvBackend {
    /// Create a backend rooted at `base_url`.
    pub fn new(base_url: &str, auth_secret: Option<String>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        info!(
            "initialized http kv backend (base_url={}, auth={})",
            base_url,
            auth_secret.is_some()
        );
        Self {
            base_url,
            auth_secret,
            client: reqwest::Client::new(),
        }
    }

    fn key_url(&self, key: &str) -> String {
        format!("{}/{}.json", self.base_url, key)
    }

    fn request(&self, method: reqwest::Method, key: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.key_url(key));
        match self.auth_secret.as_deref() {
            Some(secret) => builder.query(&[("auth", secret)]),
            None => builder,
        }
    }
}

#[async_trait]
impl RemoteBackend for HttpKvBackend {
    async fn put(&self, key: &str, record: &PersonRecord) -> Result<(), RemoteError> {
        let resp = self
            .request(reqwest::Method::PUT, key)
            .json(record)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }
        debug!("remote put ok (key={key}, status={})", status.as_u16());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<PersonRecord>, RemoteError> {
        let resp = self.request(reqwest::Method::GET, key).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await?;
        let record: Option<PersonRecord> = serde_json::from_slice(&body)?;
        debug!("remote get ok (key={key}, found={})", record.is_some());
        Ok(record)
    }
}
