//! Event endpoints: one per view intent

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use calsync_core::time::parse_timestamp;
use calsync_core::{
    CalendarEvent, Draft, DraftForm, IntentResponse, LoadOutcome, RemoteEventStore,
};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router<S: RemoteEventStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/events", get(list_events::<S>).post(submit_draft::<S>))
        .route("/events/select", post(select_range::<S>))
        .route("/events/{id}", axum::routing::delete(delete_event::<S>))
        .route("/events/{id}/click", post(click_event::<S>))
        .route("/events/{id}/drop", post(drop_event::<S>))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub scope: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    #[serde(flatten)]
    pub outcome: LoadOutcome,
    pub events: Vec<CalendarEvent>,
}

/// GET /events?scope= - Reload events from the remote store
async fn list_events<S: RemoteEventStore + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<ListQuery>,
) -> Json<ListResponse> {
    let mut controller = state.controller.lock().await;

    let outcome = match query.scope.as_deref() {
        Some(scope) => controller.load_all(Some(scope)).await,
        None => controller.reload().await,
    };

    Json(ListResponse {
        outcome,
        events: controller.events(),
    })
}

/// A time range as entered in the browser
#[derive(Deserialize)]
pub struct RangeRequest {
    pub start: String,
    pub end: String,
}

/// POST /events/select - Pre-fill the new-event form for a selected range
async fn select_range<S: RemoteEventStore + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<RangeRequest>,
) -> Result<Json<DraftForm>, AppError> {
    let controller = state.controller.lock().await;
    let start = parse_timestamp(&req.start, controller.tz()).map_err(AppError::unprocessable)?;
    let end = parse_timestamp(&req.end, controller.tz()).map_err(AppError::unprocessable)?;

    Ok(Json(controller.on_user_select_range(start, end)))
}

/// POST /events - Save the new-event form
async fn submit_draft<S: RemoteEventStore + 'static>(
    State(state): State<AppState<S>>,
    Json(draft): Json<Draft>,
) -> Json<IntentResponse> {
    let mut controller = state.controller.lock().await;
    Json(controller.on_user_submit_draft(draft).await)
}

/// POST /events/:id/click - Ask where to go for an event
async fn click_event<S: RemoteEventStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<IntentResponse>, AppError> {
    let controller = state.controller.lock().await;
    let delta = controller
        .on_user_click_event(&id)
        .ok_or_else(|| AppError::not_found(&id))?;

    Ok(Json(IntentResponse {
        deltas: vec![delta],
        notification: None,
    }))
}

/// POST /events/:id/drop - An event was dragged to a new slot
///
/// The browser has already moved the event; a `reverted` delta in the
/// response tells it to move the event back.
async fn drop_event<S: RemoteEventStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<RangeRequest>,
) -> Result<Json<IntentResponse>, AppError> {
    let mut controller = state.controller.lock().await;
    let start = parse_timestamp(&req.start, controller.tz()).map_err(AppError::unprocessable)?;
    let end = parse_timestamp(&req.end, controller.tz()).map_err(AppError::unprocessable)?;

    let response = controller
        .on_user_drop_event(&id, start, end, |prior| {
            info!(id = ?prior.id, "reverting dropped event");
        })
        .await;

    Ok(Json(response))
}

/// DELETE /events/:id - Delete an event and return the reloaded list
async fn delete_event<S: RemoteEventStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Json<IntentResponse> {
    let mut controller = state.controller.lock().await;
    Json(controller.on_user_request_delete(&id).await)
}
