use anyhow::Result;
use calsync_core::RemoteEventStore;
use calsync_core::remote::protocol::DeleteEvent;
use tracing::info;

use super::open_store;

pub async fn handle(cmd: DeleteEvent) -> Result<()> {
    let local = open_store(&cmd.remote_config)?;
    local.events.delete(&cmd.event_id).await?;
    local.save().await?;
    info!(id = %cmd.event_id, "deleted event");
    Ok(())
}
