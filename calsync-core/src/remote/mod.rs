//! The remote event store: the backend of record for events.

pub mod memory;
pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteCallFailure;
use crate::event::ScopeKind;
use crate::record::EventRecord;

pub use memory::{CallCounts, MemorySnapshot, MemoryStore};
pub use provider::Provider;

/// Backend operations the controller depends on.
///
/// Every call either succeeds or reports a [`RemoteCallFailure`]; there is
/// no cancellation once a call has been issued.
#[async_trait]
pub trait RemoteEventStore: Send + Sync {
    /// All events, or only those related to `scope_id`.
    async fn list(&self, scope_id: Option<&str>) -> Result<Vec<EventRecord>, RemoteCallFailure>;

    /// Persist a new event and return its generated id.
    async fn create(&self, record: &EventRecord) -> Result<String, RemoteCallFailure>;

    async fn update(&self, record: &EventRecord) -> Result<(), RemoteCallFailure>;

    async fn delete(&self, id: &str) -> Result<(), RemoteCallFailure>;

    /// Whether `scope_id` refers to a person or to some other record.
    async fn resolve_scope_kind(&self, scope_id: &str) -> Result<ScopeKind, RemoteCallFailure>;
}

/// Provider-specific settings, passed through to the provider untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}
