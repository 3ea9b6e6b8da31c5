//! In-process remote store.
//!
//! Backs the local provider binary and doubles as the store used in tests:
//! it can be switched offline and counts the calls it receives.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::RemoteCallFailure;
use crate::event::ScopeKind;
use crate::record::{EventRecord, Owner};
use crate::remote::RemoteEventStore;

/// Number of calls received per operation, including failed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub resolve_scope_kind: usize,
}

impl CallCounts {
    pub fn writes(&self) -> usize {
        self.create + self.update + self.delete
    }

    pub fn total(&self) -> usize {
        self.list + self.writes() + self.resolve_scope_kind
    }
}

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub records: Vec<EventRecord>,
    /// Scope ids that refer to people
    #[serde(default)]
    pub people: BTreeSet<String>,
    /// Scope ids that refer to any other kind of record
    #[serde(default)]
    pub others: BTreeSet<String>,
    /// Display name stamped on records created through this store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<String, EventRecord>,
    people: BTreeSet<String>,
    others: BTreeSet<String>,
    owner_name: Option<String>,
    offline: bool,
    calls: CallCounts,
}

impl State {
    fn check_online(&self) -> Result<(), RemoteCallFailure> {
        if self.offline {
            return Err(RemoteCallFailure::Transport("store is offline".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: MemorySnapshot) -> Self {
        let records = snapshot
            .records
            .into_iter()
            .filter_map(|record| record.id.clone().map(|id| (id, record)))
            .collect();

        MemoryStore {
            state: Mutex::new(State {
                records,
                people: snapshot.people,
                others: snapshot.others,
                owner_name: snapshot.owner_name,
                ..Default::default()
            }),
        }
    }

    pub async fn snapshot(&self) -> MemorySnapshot {
        let state = self.state.lock().await;
        MemorySnapshot {
            records: state.records.values().cloned().collect(),
            people: state.people.clone(),
            others: state.others.clone(),
            owner_name: state.owner_name.clone(),
        }
    }

    /// Register a scope id and the kind of record it refers to.
    pub async fn add_scope(&self, scope_id: &str, kind: ScopeKind) {
        let mut state = self.state.lock().await;
        match kind {
            ScopeKind::Person => state.people.insert(scope_id.to_string()),
            ScopeKind::Other => state.others.insert(scope_id.to_string()),
        };
    }

    /// While offline every call fails with a transport error.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    pub async fn calls(&self) -> CallCounts {
        self.state.lock().await.calls
    }

    /// Insert a record directly, bypassing the call counters.
    pub async fn seed(&self, record: EventRecord) {
        if let Some(id) = record.id.clone() {
            self.state.lock().await.records.insert(id, record);
        }
    }
}

fn in_scope(record: &EventRecord, scope_id: Option<&str>) -> bool {
    match scope_id {
        None => true,
        Some(scope) => {
            record.who_id.as_deref() == Some(scope) || record.what_id.as_deref() == Some(scope)
        }
    }
}

#[async_trait]
impl RemoteEventStore for MemoryStore {
    async fn list(&self, scope_id: Option<&str>) -> Result<Vec<EventRecord>, RemoteCallFailure> {
        let mut state = self.state.lock().await;
        state.calls.list += 1;
        state.check_online()?;

        Ok(state
            .records
            .values()
            .filter(|record| in_scope(record, scope_id))
            .cloned()
            .collect())
    }

    async fn create(&self, record: &EventRecord) -> Result<String, RemoteCallFailure> {
        let mut state = self.state.lock().await;
        state.calls.create += 1;
        state.check_online()?;

        if record.id.is_some() {
            return Err(RemoteCallFailure::Rejected(
                "new records must not carry an id".into(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut stored = record.clone();
        stored.id = Some(id.clone());
        stored.owner = state.owner_name.clone().map(|name| Owner { name });
        state.records.insert(id.clone(), stored);

        Ok(id)
    }

    async fn update(&self, record: &EventRecord) -> Result<(), RemoteCallFailure> {
        let mut state = self.state.lock().await;
        state.calls.update += 1;
        state.check_online()?;

        let id = record
            .id
            .as_deref()
            .ok_or_else(|| RemoteCallFailure::Rejected("update requires an id".into()))?;
        let existing = state
            .records
            .get_mut(id)
            .ok_or_else(|| RemoteCallFailure::NotFound(id.to_string()))?;

        let owner = existing.owner.take();
        *existing = EventRecord {
            owner,
            ..record.clone()
        };

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteCallFailure> {
        let mut state = self.state.lock().await;
        state.calls.delete += 1;
        state.check_online()?;

        state
            .records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RemoteCallFailure::NotFound(id.to_string()))
    }

    async fn resolve_scope_kind(&self, scope_id: &str) -> Result<ScopeKind, RemoteCallFailure> {
        let mut state = self.state.lock().await;
        state.calls.resolve_scope_kind += 1;
        state.check_online()?;

        if state.people.contains(scope_id) {
            Ok(ScopeKind::Person)
        } else if state.others.contains(scope_id) {
            Ok(ScopeKind::Other)
        } else {
            Err(RemoteCallFailure::NotFound(scope_id.to_string()))
        }
    }
}
