pub mod create_event;
pub mod delete_event;
pub mod list_events;
pub mod resolve_scope_kind;
pub mod update_event;

use anyhow::Result;

use crate::remote_config::LocalRemoteConfig;
use crate::store::LocalStore;

/// Open the store file named by a request's remote config.
pub fn open_store(remote_config: &serde_json::Map<String, serde_json::Value>) -> Result<LocalStore> {
    let config = LocalRemoteConfig::try_from(remote_config)?;
    LocalStore::open(&config.store_path()?)
}
