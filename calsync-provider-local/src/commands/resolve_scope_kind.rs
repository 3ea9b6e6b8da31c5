use anyhow::Result;
use calsync_core::remote::protocol::ResolveScopeKind;
use calsync_core::{RemoteEventStore, ScopeKind};

use super::open_store;

/// Scope ids are classified by the `people` and `others` lists of the
/// store file.
pub async fn handle(cmd: ResolveScopeKind) -> Result<ScopeKind> {
    let local = open_store(&cmd.remote_config)?;
    let kind = local.events.resolve_scope_kind(&cmd.scope_id).await?;
    Ok(kind)
}
