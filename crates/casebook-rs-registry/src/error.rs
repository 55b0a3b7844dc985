//! Error types for registry operations.

use std::time::Duration;

/// Errors returned by local store and snapshot operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Record could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    /// Snapshot bytes are not a valid collection.
    #[error("invalid snapshot: {0}")]
    Decode(String),
    /// Encoded record does not fit in a snapshot frame.
    #[error("record frame too large: {0} bytes")]
    FrameTooLarge(usize),
    /// Collection is larger than a snapshot can count.
    #[error("too many records for one snapshot: {0}")]
    TooManyRecords(usize),
    /// Identifier outside the range records may carry.
    #[error("record id {0} is out of range")]
    InvalidId(u64),
    /// Every identifier has been handed out.
    #[error("record id sequence exhausted")]
    IdsExhausted,
}

/// Errors raised while talking to a remote backend.
///
/// These never leave the store: remote calls run detached and only log them.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Transport failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Backend answered with a non-success status.
    #[error("remote returned status {status} for key {key}")]
    Status { key: String, status: u16 },
    /// Payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The call did not finish in time.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),
    /// Remote sync is switched off.
    #[error("remote backend disabled")]
    Disabled,
}
