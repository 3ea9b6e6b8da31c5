//! Backend wire shape of an event and its mapping to [`CalendarEvent`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::event::{CalendarEvent, Relation};
use crate::time::{parse_timestamp, to_canonical};

/// An event as the remote store sends and receives it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subject: String,
    pub start_date_time: String,
    pub end_date_time: String,
    #[serde(default)]
    pub is_all_day_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
}

/// Nested owner reference; only the display name is read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
}

/// Why a record coming back from the remote store was not accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("record has no id")]
    MissingId,

    #[error("record {0} has both a who and a what reference")]
    ConflictingRelations(String),

    #[error("record {id}: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationError,
    },
}

impl TryFrom<EventRecord> for CalendarEvent {
    type Error = MappingError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .filter(|id| !id.is_empty())
            .ok_or(MappingError::MissingId)?;

        let related_to = match (record.who_id, record.what_id) {
            (Some(_), Some(_)) => return Err(MappingError::ConflictingRelations(id)),
            (Some(who), None) => Some(Relation::Who(who)),
            (None, Some(what)) => Some(Relation::What(what)),
            (None, None) => None,
        };

        let invalid = |source| MappingError::Invalid {
            id: id.clone(),
            source,
        };

        // Records always carry UTC timestamps
        let start = parse_timestamp(&record.start_date_time, chrono_tz::UTC).map_err(invalid)?;
        let end = parse_timestamp(&record.end_date_time, chrono_tz::UTC).map_err(invalid)?;

        let event = CalendarEvent {
            id: Some(id.clone()),
            title: record.subject,
            start,
            end,
            all_day: record.is_all_day_event,
            description: record.description,
            related_to,
            owner_name: record.owner.map(|owner| owner.name),
        };
        event.validate().map_err(invalid)?;

        Ok(event)
    }
}

impl From<&CalendarEvent> for EventRecord {
    fn from(event: &CalendarEvent) -> Self {
        let (who_id, what_id) = match &event.related_to {
            Some(Relation::Who(id)) => (Some(id.clone()), None),
            Some(Relation::What(id)) => (None, Some(id.clone())),
            None => (None, None),
        };

        EventRecord {
            id: event.id.clone(),
            subject: event.title.clone(),
            start_date_time: to_canonical(&event.start),
            end_date_time: to_canonical(&event.end),
            is_all_day_event: event.all_day,
            description: event.description.clone(),
            who_id,
            what_id,
            owner: None,
        }
    }
}
