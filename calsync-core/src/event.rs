//! The calendar event as the controller and view see it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::truncate_to_millis;

/// A calendar event.
///
/// `id` is `None` while the event is a draft; the remote store assigns it on
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Option<String>,
    pub title: String,
    #[serde(with = "crate::time::canonical")]
    pub start: DateTime<Utc>,
    #[serde(with = "crate::time::canonical")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<Relation>,
    /// Display only. Never sent back on writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

/// What an event is about: a person ("who") or any other record ("what").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Relation {
    Who(String),
    What(String),
}

impl Relation {
    pub fn id(&self) -> &str {
        match self {
            Relation::Who(id) | Relation::What(id) => id,
        }
    }
}

/// The kind of record a scope id points to, as reported by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Person,
    Other,
}

impl ScopeKind {
    pub fn relation(self, scope_id: &str) -> Relation {
        match self {
            ScopeKind::Person => Relation::Who(scope_id.to_string()),
            ScopeKind::Other => Relation::What(scope_id.to_string()),
        }
    }
}

/// Client-side lifecycle of a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    /// Drafted, no id yet
    Pending,
    /// Id assigned by the remote store
    Persisted,
    /// Persisted and updated at least once since
    Modified,
    /// Removed after a confirmed remote delete
    Deleted,
}

impl EventState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_become(self, next: EventState) -> bool {
        use EventState::*;
        matches!(
            (self, next),
            (Pending, Persisted)
                | (Persisted, Modified)
                | (Modified, Modified)
                | (Persisted, Deleted)
                | (Modified, Deleted)
        )
    }
}

impl CalendarEvent {
    /// The persisted id, or [`ValidationError::MissingId`] for drafts.
    pub fn require_id(&self) -> Result<&str, ValidationError> {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ValidationError::MissingId),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.require_id().is_ok()
    }

    /// Check the invariants every event must hold before it is written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.end < self.start {
            return Err(ValidationError::EndBeforeStart {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// The event as the remote store will hold it: times at millisecond
    /// precision and no empty id.
    pub fn normalized(self) -> CalendarEvent {
        CalendarEvent {
            id: self.id.filter(|id| !id.is_empty()),
            start: truncate_to_millis(self.start),
            end: truncate_to_millis(self.end),
            ..self
        }
    }

    /// Copy of this event moved to a new time slot.
    pub fn moved_to(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            start,
            end,
            ..self.clone()
        }
    }
}
