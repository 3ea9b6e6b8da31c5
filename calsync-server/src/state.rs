use std::sync::Arc;

use calsync_core::{EventSyncController, RemoteEventStore};
use tokio::sync::Mutex;

/// Shared application state
///
/// One controller per server: requests queue on the mutex, so operations
/// on the event list never interleave.
pub struct AppState<S> {
    pub controller: Arc<Mutex<EventSyncController<S>>>,
}

impl<S: RemoteEventStore> AppState<S> {
    pub fn new(controller: EventSyncController<S>) -> Self {
        AppState {
            controller: Arc::new(Mutex::new(controller)),
        }
    }
}

// Manual impl: deriving would require `S: Clone`
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            controller: Arc::clone(&self.controller),
        }
    }
}
