use anyhow::Result;
use calsync_core::{EventSyncController, LoadOutcome, RemoteEventStore};
use owo_colors::OwoColorize;

use crate::render::render_agenda;

pub async fn run<S: RemoteEventStore>(
    controller: &mut EventSyncController<S>,
    scope: Option<&str>,
) -> Result<()> {
    if let LoadOutcome::Empty = super::load(controller, scope).await? {
        println!("{}", "No events are found".dimmed());
        return Ok(());
    }

    let tz = controller.tz();
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();
    for line in render_agenda(&controller.events(), tz, today) {
        println!("{line}");
    }

    Ok(())
}
