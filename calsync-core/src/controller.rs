//! The controller reconciling the local event list with the remote store.
//!
//! One controller is created per view session. It owns the event list the
//! view renders from; mutations only happen after the remote store has
//! answered. Operations take `&mut self`, so calls on one controller are
//! serialized and never interleave.

use std::collections::HashSet;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::draft::Draft;
use crate::error::{RemoteCallFailure, ValidationError};
use crate::event::{CalendarEvent, EventState, Relation};
use crate::record::EventRecord;
use crate::remote::RemoteEventStore;

/// An event in the local list together with its lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub event: CalendarEvent,
    pub state: EventState,
}

/// Result of a full load.
///
/// `Empty` is a valid terminal state, distinct from `Failed` even though
/// both leave the list empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded(usize),
    Empty,
    Failed(RemoteCallFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum CreateOutcome {
    Created(CalendarEvent),
    Failed(RemoteCallFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated(CalendarEvent),
    Failed(RemoteCallFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Confirmed by the remote store; the list was then reloaded
    Deleted { refresh: LoadOutcome },
    Failed(RemoteCallFailure),
}

impl LoadOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}

impl CreateOutcome {
    pub fn event(&self) -> Option<&CalendarEvent> {
        match self {
            CreateOutcome::Created(event) => Some(event),
            CreateOutcome::Failed(_) => None,
        }
    }
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }
}

pub struct EventSyncController<S> {
    store: S,
    tz: Tz,
    scope_id: Option<String>,
    events: Vec<TrackedEvent>,
}

impl<S: RemoteEventStore> EventSyncController<S> {
    pub fn new(store: S, tz: Tz, scope_id: Option<String>) -> Self {
        EventSyncController {
            store,
            tz,
            scope_id,
            events: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// The record this session is restricted to, if any.
    pub fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    // SNAPSHOTS:

    /// Current events, ordered by start then id for stable rendering.
    pub fn events(&self) -> Vec<CalendarEvent> {
        let mut events: Vec<CalendarEvent> =
            self.events.iter().map(|tracked| tracked.event.clone()).collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CalendarEvent> {
        self.tracked(id).map(|tracked| &tracked.event)
    }

    pub fn state_of(&self, id: &str) -> Option<EventState> {
        self.tracked(id).map(|tracked| tracked.state)
    }

    fn tracked(&self, id: &str) -> Option<&TrackedEvent> {
        self.events
            .iter()
            .find(|tracked| tracked.event.id.as_deref() == Some(id))
    }

    fn tracked_mut(&mut self, id: &str) -> Option<&mut TrackedEvent> {
        self.events
            .iter_mut()
            .find(|tracked| tracked.event.id.as_deref() == Some(id))
    }

    // OPERATIONS:

    /// Replace the local list with whatever the remote store holds.
    ///
    /// Records that do not map to a valid event are skipped. Events that
    /// were modified during this session keep their `Modified` state.
    pub async fn load_all(&mut self, scope_id: Option<&str>) -> LoadOutcome {
        debug!(scope_id, "loading events");

        let records = match self.store.list(scope_id).await {
            Ok(records) => records,
            Err(failure) => {
                error!(%failure, scope_id, "failed to load events");
                self.events.clear();
                return LoadOutcome::Failed(failure);
            }
        };

        let modified: HashSet<String> = self
            .events
            .iter()
            .filter(|tracked| tracked.state == EventState::Modified)
            .filter_map(|tracked| tracked.event.id.clone())
            .collect();

        let mut seen = HashSet::new();
        let mut events = Vec::with_capacity(records.len());

        for record in records {
            let event = match CalendarEvent::try_from(record) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "skipping event record");
                    continue;
                }
            };

            // Mapping guarantees an id
            let Some(id) = event.id.clone() else { continue };
            if !seen.insert(id.clone()) {
                warn!(id = %id, "skipping duplicate event record");
                continue;
            }

            let state = if modified.contains(&id) {
                EventState::Modified
            } else {
                EventState::Persisted
            };
            events.push(TrackedEvent { event, state });
        }

        self.events = events;
        info!(count = self.events.len(), scope_id, "events loaded");

        if self.events.is_empty() {
            LoadOutcome::Empty
        } else {
            LoadOutcome::Loaded(self.events.len())
        }
    }

    /// Reload using the session scope.
    pub async fn reload(&mut self) -> LoadOutcome {
        let scope_id = self.scope_id.clone();
        self.load_all(scope_id.as_deref()).await
    }

    /// Persist a new event.
    ///
    /// Invalid drafts are rejected before the remote store is contacted. The
    /// event only enters the local list once the store has assigned an id.
    pub async fn create(&mut self, draft: CalendarEvent) -> Result<CreateOutcome, ValidationError> {
        if let Some(id) = draft.id.as_deref().filter(|id| !id.is_empty()) {
            return Err(ValidationError::AlreadyPersisted(id.to_string()));
        }
        draft.validate()?;
        let draft = draft.normalized();

        let record = EventRecord::from(&draft);
        let id = match self.store.create(&record).await {
            Ok(id) if !id.is_empty() => id,
            Ok(_) => {
                let failure = RemoteCallFailure::Protocol("remote store returned an empty id".into());
                error!(%failure, title = %draft.title, "failed to create event");
                return Ok(CreateOutcome::Failed(failure));
            }
            Err(failure) => {
                error!(%failure, title = %draft.title, "failed to create event");
                return Ok(CreateOutcome::Failed(failure));
            }
        };

        let event = CalendarEvent {
            id: Some(id.clone()),
            owner_name: None,
            ..draft
        };

        // A store handing out an id we already hold is answered by replacing
        // the stale entry, keeping ids unique.
        self.events.retain(|tracked| tracked.event.id.as_deref() != Some(id.as_str()));
        self.events.push(TrackedEvent {
            event: event.clone(),
            state: EventState::Persisted,
        });
        info!(id = %id, title = %event.title, "event created");

        Ok(CreateOutcome::Created(event))
    }

    /// Validate a user draft in the session time zone, then [`create`](Self::create) it.
    pub async fn create_from_draft(
        &mut self,
        draft: &Draft,
        related_to: Option<Relation>,
    ) -> Result<CreateOutcome, ValidationError> {
        let event = draft.validate(self.tz, related_to)?;
        self.create(event).await
    }

    /// Write new times/title of a persisted event to the remote store.
    ///
    /// On failure the local list is left as it was; reverting the view is up
    /// to the caller (see [`on_user_drop_event`](Self::on_user_drop_event)).
    pub async fn update(&mut self, event: CalendarEvent) -> Result<UpdateOutcome, ValidationError> {
        let id = event.require_id()?.to_string();
        event.validate()?;
        let event = event.normalized();

        let Some(prior) = self.tracked(&id) else {
            warn!(id = %id, "update for an event not in the local list");
            return Ok(UpdateOutcome::Failed(RemoteCallFailure::NotFound(id)));
        };
        let owner_name = prior.event.owner_name.clone();

        if let Err(failure) = self.store.update(&EventRecord::from(&event)).await {
            error!(%failure, id = %id, "failed to update event");
            return Ok(UpdateOutcome::Failed(failure));
        }

        let updated = CalendarEvent { owner_name, ..event };
        if let Some(tracked) = self.tracked_mut(&id) {
            debug_assert!(tracked.state.can_become(EventState::Modified));
            tracked.event = updated.clone();
            tracked.state = EventState::Modified;
        }
        info!(id = %id, "event updated");

        Ok(UpdateOutcome::Updated(updated))
    }

    /// Delete an event, then reload the whole list from the remote store.
    ///
    /// Nothing is removed locally unless the store confirms the delete.
    pub async fn delete(&mut self, id: &str) -> Result<DeleteOutcome, ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::MissingId);
        }

        if self.tracked(id).is_none() {
            warn!(id, "delete for an event not in the local list");
            return Ok(DeleteOutcome::Failed(RemoteCallFailure::NotFound(id.to_string())));
        }

        if let Err(failure) = self.store.delete(id).await {
            error!(%failure, id, "failed to delete event");
            return Ok(DeleteOutcome::Failed(failure));
        }
        info!(id, "event deleted");

        // Reload rather than splice, so concurrent writers are picked up too
        let refresh = self.reload().await;
        if self.tracked(id).is_some() {
            warn!(id, "remote store still lists a deleted event; hiding it");
            self.events.retain(|tracked| tracked.event.id.as_deref() != Some(id));
        }

        Ok(DeleteOutcome::Deleted { refresh })
    }
}
