//! Intent hooks: what the calendar view calls when the user acts.
//!
//! Each hook returns the minimal deltas the view must apply plus an optional
//! notification to show. The view never touches the remote store itself.

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::controller::{
    CreateOutcome, DeleteOutcome, EventSyncController, LoadOutcome, UpdateOutcome,
};
use crate::draft::{Draft, DraftForm};
use crate::error::{RemoteCallFailure, ValidationError};
use crate::event::{CalendarEvent, Relation};
use crate::remote::RemoteEventStore;

/// A change the calendar view applies to stay in step with the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ViewDelta {
    /// Throw away everything rendered and show exactly these events
    Replaced(Vec<CalendarEvent>),
    Added(CalendarEvent),
    Updated(CalendarEvent),
    /// Put an optimistically moved event back where it was
    Reverted(CalendarEvent),
    Removed(String),
    /// Navigate to the edit page of an event
    OpenEditor { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A toast for the user. How it is shown is up to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            title: "Success!".into(),
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notification {
            title: "Heads up".into(),
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            title: "Oops".into(),
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntentResponse {
    pub deltas: Vec<ViewDelta>,
    pub notification: Option<Notification>,
}

impl IntentResponse {
    fn new(deltas: Vec<ViewDelta>, notification: Option<Notification>) -> Self {
        IntentResponse {
            deltas,
            notification,
        }
    }

    fn notify(notification: Notification) -> Self {
        Self::new(Vec::new(), Some(notification))
    }

    /// Whether the notification, if any, reports a problem.
    pub fn is_error(&self) -> bool {
        self.notification
            .as_ref()
            .is_some_and(|n| n.level == NotificationLevel::Error)
    }
}

fn failure_message(failure: &RemoteCallFailure) -> String {
    format!("Something went wrong: {failure}")
}

fn rejected_message(error: &ValidationError) -> String {
    format!("Please review the event: {error}")
}

impl<S: RemoteEventStore> EventSyncController<S> {
    /// The view was opened: load the session's events.
    pub async fn on_view_opened(&mut self) -> IntentResponse {
        let outcome = self.reload().await;
        let replaced = vec![ViewDelta::Replaced(self.events())];

        match outcome {
            LoadOutcome::Loaded(_) => IntentResponse::new(replaced, None),
            LoadOutcome::Empty => {
                IntentResponse::new(replaced, Some(Notification::info("No events are found")))
            }
            LoadOutcome::Failed(failure) => IntentResponse::new(
                replaced,
                Some(Notification::error(format!(
                    "Could not load events: {failure}"
                ))),
            ),
        }
    }

    /// The user selected a time range: pre-fill the new-event form.
    ///
    /// A range running from midnight to midnight in the session time zone is
    /// treated as an all-day selection.
    pub fn on_user_select_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DraftForm {
        let is_local_midnight = |dt: DateTime<Utc>| dt.with_timezone(&self.tz()).time() == NaiveTime::MIN;
        let all_day = end > start && is_local_midnight(start) && is_local_midnight(end);

        DraftForm::for_range(start, end, all_day, self.scope_id().map(String::from))
    }

    /// The user clicked an event: open its editor if we know it.
    pub fn on_user_click_event(&self, id: &str) -> Option<ViewDelta> {
        self.get(id).map(|_| ViewDelta::OpenEditor { id: id.to_string() })
    }

    /// The user dragged an event to a new slot.
    ///
    /// The view has already moved it. If the remote store does not accept
    /// the new times, `revert` is called with the event as it was before the
    /// drag and a [`ViewDelta::Reverted`] is returned; the local list is
    /// unchanged in that case.
    pub async fn on_user_drop_event<F>(
        &mut self,
        id: &str,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
        revert: F,
    ) -> IntentResponse
    where
        F: FnOnce(&CalendarEvent),
    {
        let Some(prior) = self.get(id).cloned() else {
            warn!(id, "drop for an unknown event");
            return IntentResponse::new(
                vec![ViewDelta::Removed(id.to_string())],
                Some(Notification::error(format!("Event {id} no longer exists"))),
            );
        };

        let moved = prior.moved_to(new_start, new_end);
        let message = match self.update(moved).await {
            Ok(UpdateOutcome::Updated(event)) => {
                let message = format!("\"{}\" was moved", event.title);
                return IntentResponse::new(
                    vec![ViewDelta::Updated(event)],
                    Some(Notification::success(message)),
                );
            }
            Ok(UpdateOutcome::Failed(failure)) => failure_message(&failure),
            Err(error) => rejected_message(&error),
        };

        revert(&prior);
        IntentResponse::new(
            vec![ViewDelta::Reverted(prior)],
            Some(Notification::error(message)),
        )
    }

    /// The user saved the new-event form.
    ///
    /// With a scope id (from the draft, else the session) the remote store is
    /// asked what kind of record it is, to tag the event as "who" or "what".
    pub async fn on_user_submit_draft(&mut self, draft: Draft) -> IntentResponse {
        // Validate before any remote call, relation included
        if let Err(error) = draft.validate(self.tz(), None) {
            return IntentResponse::notify(Notification::error(rejected_message(&error)));
        }

        let scope_id = draft
            .scope_id
            .clone()
            .or_else(|| self.scope_id().map(String::from));
        let related_to = match scope_id {
            Some(scope_id) => Some(self.relation_for(&scope_id).await),
            None => None,
        };

        match self.create_from_draft(&draft, related_to).await {
            Ok(CreateOutcome::Created(event)) => {
                let message = format!("The event: \"{}\" has been created successfully", event.title);
                IntentResponse::new(
                    vec![ViewDelta::Added(event)],
                    Some(Notification::success(message)),
                )
            }
            Ok(CreateOutcome::Failed(failure)) => {
                IntentResponse::notify(Notification::error(failure_message(&failure)))
            }
            Err(error) => IntentResponse::notify(Notification::error(rejected_message(&error))),
        }
    }

    /// The user asked to delete an event.
    pub async fn on_user_request_delete(&mut self, id: &str) -> IntentResponse {
        match self.delete(id).await {
            Ok(DeleteOutcome::Deleted { refresh }) => {
                let notification = match refresh {
                    LoadOutcome::Failed(failure) => Notification::error(format!(
                        "The event was deleted but events could not be reloaded: {failure}"
                    )),
                    _ => Notification::success("The event has been deleted"),
                };
                IntentResponse::new(vec![ViewDelta::Replaced(self.events())], Some(notification))
            }
            Ok(DeleteOutcome::Failed(failure)) => {
                IntentResponse::notify(Notification::error(failure_message(&failure)))
            }
            Err(error) => IntentResponse::notify(Notification::error(rejected_message(&error))),
        }
    }

    /// Relation for a scope id; falls back to "what" when the kind cannot be
    /// resolved.
    async fn relation_for(&self, scope_id: &str) -> Relation {
        match self.store().resolve_scope_kind(scope_id).await {
            Ok(kind) => kind.relation(scope_id),
            Err(failure) => {
                warn!(%failure, scope_id, "could not resolve scope kind, tagging as what");
                Relation::What(scope_id.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ScopeKind;
    use crate::record::EventRecord;
    use crate::remote::MemoryStore;
    use chrono::TimeZone;
    use std::cell::RefCell;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    async fn with_event() -> EventSyncController<MemoryStore> {
        let store = MemoryStore::new();
        store
            .seed(EventRecord {
                id: Some("evt".into()),
                subject: "Planning".into(),
                start_date_time: "2024-01-01T09:00:00.000Z".into(),
                end_date_time: "2024-01-01T10:00:00.000Z".into(),
                ..Default::default()
            })
            .await;
        let mut ctl = EventSyncController::new(store, chrono_tz::UTC, None);
        ctl.reload().await;
        ctl
    }

    #[test]
    fn select_range_prefills_form() {
        let ctl = EventSyncController::new(MemoryStore::new(), chrono_tz::UTC, Some("003P".into()));
        let form = ctl.on_user_select_range(at(9), at(10));

        assert_eq!(form.start, "2024-01-01T09:00:00.000Z");
        assert_eq!(form.scope_id.as_deref(), Some("003P"));
        assert!(!form.all_day);
    }

    #[test]
    fn midnight_to_midnight_is_all_day() {
        let ctl = EventSyncController::new(MemoryStore::new(), chrono_tz::UTC, None);
        let form = ctl.on_user_select_range(
            at(0),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        );
        assert!(form.all_day);
    }

    #[tokio::test]
    async fn click_opens_editor_for_known_events_only() {
        let ctl = with_event().await;
        assert_eq!(
            ctl.on_user_click_event("evt"),
            Some(ViewDelta::OpenEditor { id: "evt".into() })
        );
        assert_eq!(ctl.on_user_click_event("other"), None);
    }

    #[tokio::test]
    async fn successful_drop_does_not_revert() {
        let mut ctl = with_event().await;
        let reverted = RefCell::new(None);

        let response = ctl
            .on_user_drop_event("evt", at(13), at(14), |e| *reverted.borrow_mut() = Some(e.clone()))
            .await;

        assert!(reverted.borrow().is_none());
        assert!(matches!(response.deltas.as_slice(), [ViewDelta::Updated(e)] if e.start == at(13)));
        assert!(!response.is_error());
    }

    #[tokio::test]
    async fn failed_drop_reverts_exactly_once() {
        let mut ctl = with_event().await;
        let before = ctl.get("evt").cloned().unwrap();
        ctl.store().set_offline(true).await;
        let mut calls = Vec::new();

        let response = ctl
            .on_user_drop_event("evt", at(13), at(14), |e| calls.push(e.clone()))
            .await;

        assert_eq!(calls, vec![before.clone()]);
        assert_eq!(response.deltas, vec![ViewDelta::Reverted(before.clone())]);
        assert!(response.is_error());
        assert_eq!(ctl.get("evt"), Some(&before));
    }

    #[tokio::test]
    async fn invalid_drop_reverts_without_remote_call() {
        let mut ctl = with_event().await;
        let mut reverted = false;

        let response = ctl
            .on_user_drop_event("evt", at(14), at(13), |_| reverted = true)
            .await;

        assert!(reverted);
        assert!(response.is_error());
        assert_eq!(ctl.store().calls().await.update, 0);
    }

    #[tokio::test]
    async fn submit_tags_person_scope_as_who() {
        let store = MemoryStore::new();
        store.add_scope("003P", ScopeKind::Person).await;
        let mut ctl = EventSyncController::new(store, chrono_tz::UTC, Some("003P".into()));

        let response = ctl
            .on_user_submit_draft(Draft::new("Call", "2024-01-01T09:00", "2024-01-01T09:30"))
            .await;

        match response.deltas.as_slice() {
            [ViewDelta::Added(event)] => {
                assert_eq!(event.related_to, Some(Relation::Who("003P".into())));
            }
            other => panic!("unexpected deltas: {other:?}"),
        }
        assert_eq!(
            response.notification.map(|n| n.message),
            Some("The event: \"Call\" has been created successfully".to_string())
        );
    }

    #[tokio::test]
    async fn submit_falls_back_to_what_for_unknown_scope() {
        let mut ctl = EventSyncController::new(MemoryStore::new(), chrono_tz::UTC, None);
        let mut draft = Draft::new("Visit", "2024-01-01T09:00", "2024-01-01T10:00");
        draft.scope_id = Some("a0B".into());

        let response = ctl.on_user_submit_draft(draft).await;

        assert!(matches!(
            response.deltas.as_slice(),
            [ViewDelta::Added(e)] if e.related_to == Some(Relation::What("a0B".into()))
        ));
    }

    #[tokio::test]
    async fn invalid_submit_never_reaches_store() {
        let store = MemoryStore::new();
        store.add_scope("003P", ScopeKind::Person).await;
        let mut ctl = EventSyncController::new(store, chrono_tz::UTC, Some("003P".into()));

        let response = ctl
            .on_user_submit_draft(Draft::new("Bad", "2024-01-01T10:00:00Z", "2024-01-01T09:00:00Z"))
            .await;

        assert!(response.deltas.is_empty());
        assert!(response.is_error());
        assert_eq!(ctl.store().calls().await.total(), 0);
    }

    #[tokio::test]
    async fn delete_replaces_view_with_reloaded_list() {
        let mut ctl = with_event().await;
        let response = ctl.on_user_request_delete("evt").await;

        assert_eq!(response.deltas, vec![ViewDelta::Replaced(Vec::new())]);
        assert!(!response.is_error());
    }

    #[tokio::test]
    async fn failed_delete_only_notifies() {
        let mut ctl = with_event().await;
        ctl.store().set_offline(true).await;

        let response = ctl.on_user_request_delete("evt").await;

        assert!(response.deltas.is_empty());
        assert!(response.is_error());
        assert_eq!(ctl.len(), 1);
    }

    #[tokio::test]
    async fn empty_view_gets_info_notification() {
        let mut ctl = EventSyncController::new(MemoryStore::new(), chrono_tz::UTC, None);
        let response = ctl.on_view_opened().await;

        assert_eq!(response.deltas, vec![ViewDelta::Replaced(Vec::new())]);
        assert_eq!(
            response.notification.map(|n| n.level),
            Some(NotificationLevel::Info)
        );
    }
}
