use anyhow::Result;
use calsync_core::RemoteEventStore;
use calsync_core::remote::protocol::CreateEvent;
use tracing::info;

use super::open_store;

/// Returns the id generated for the new event.
pub async fn handle(cmd: CreateEvent) -> Result<String> {
    let local = open_store(&cmd.remote_config)?;

    // Ids are ours to hand out
    let mut record = cmd.record;
    record.id = None;

    let id = local.events.create(&record).await?;
    local.save().await?;
    info!(id = %id, subject = %record.subject, "created event");

    Ok(id)
}
