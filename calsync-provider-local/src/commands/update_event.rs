use anyhow::Result;
use calsync_core::RemoteEventStore;
use calsync_core::remote::protocol::UpdateEvent;

use super::open_store;

pub async fn handle(cmd: UpdateEvent) -> Result<()> {
    let local = open_store(&cmd.remote_config)?;
    local.events.update(&cmd.record).await?;
    local.save().await
}
