//! Error types for calsync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A draft or event that cannot be sent to the remote store.
///
/// These are detected before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("End ({end}) is before start ({start})")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Event has no id")]
    MissingId,

    #[error("Event {0} already exists")]
    AlreadyPersisted(String),
}

/// A failed call against the remote event store.
///
/// Never propagated past the controller: it is logged and folded into an
/// outcome value the UI shell can inspect.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RemoteCallFailure {
    #[error("Remote store unreachable: {0}")]
    Transport(String),

    #[error("Remote call timed out after {0}s")]
    Timeout(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote store rejected the request: {0}")]
    Rejected(String),

    #[error("Unexpected response from remote store: {0}")]
    Protocol(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),
}

/// Errors that can occur outside of the sync workflow itself
/// (configuration, files, serialization).
#[derive(Error, Debug)]
pub enum CalSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),
}

impl From<serde_json::Error> for CalSyncError {
    fn from(err: serde_json::Error) -> Self {
        CalSyncError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CalSyncError {
    fn from(err: config::ConfigError) -> Self {
        CalSyncError::Config(err.to_string())
    }
}

/// Result type alias for calsync operations.
pub type CalSyncResult<T> = Result<T, CalSyncError>;
