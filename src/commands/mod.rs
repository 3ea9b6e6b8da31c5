pub mod config;
pub mod delete;
pub mod events;
pub mod move_event;
pub mod new;

use anyhow::Result;
use calsync_core::{EventSyncController, LoadOutcome, RemoteEventStore};

use crate::utils::tui;

/// Load the session's events behind a spinner, failing on a remote error.
pub async fn load<S: RemoteEventStore>(
    controller: &mut EventSyncController<S>,
    scope: Option<&str>,
) -> Result<LoadOutcome> {
    let spinner = tui::create_spinner("Loading events".to_string());
    let outcome = match scope {
        Some(scope) => controller.load_all(Some(scope)).await,
        None => controller.reload().await,
    };
    spinner.finish_and_clear();

    if let LoadOutcome::Failed(failure) = &outcome {
        anyhow::bail!("Could not load events: {failure}");
    }

    Ok(outcome)
}
