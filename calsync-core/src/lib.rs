//! Core of calsync: keeps a calendar view's events in step with a remote
//! event store.
//!
//! - `controller` owns the local event list and talks to the store
//! - `intent` holds the hooks a view calls and the deltas it gets back
//! - `remote` defines the store trait, the provider protocol and its
//!   implementations

pub mod config;
pub mod controller;
pub mod draft;
pub mod error;
pub mod event;
pub mod intent;
pub mod record;
pub mod remote;
pub mod time;

pub use controller::{
    CreateOutcome, DeleteOutcome, EventSyncController, LoadOutcome, TrackedEvent, UpdateOutcome,
};
pub use draft::{Draft, DraftForm};
pub use error::{CalSyncError, CalSyncResult, RemoteCallFailure, ValidationError};
pub use event::{CalendarEvent, EventState, Relation, ScopeKind};
pub use intent::{IntentResponse, Notification, NotificationLevel, ViewDelta};
pub use record::EventRecord;
pub use remote::RemoteEventStore;
