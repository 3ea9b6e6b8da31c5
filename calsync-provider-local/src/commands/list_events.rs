use anyhow::Result;
use calsync_core::EventRecord;
use calsync_core::RemoteEventStore;
use calsync_core::remote::protocol::ListEvents;

use super::open_store;

pub async fn handle(cmd: ListEvents) -> Result<Vec<EventRecord>> {
    let local = open_store(&cmd.remote_config)?;
    let records = local.events.list(cmd.scope_id.as_deref()).await?;
    Ok(records)
}
