//! Local provider remote configuration.
//!
//! This provides type safety for the local provider's settings while
//! calsync-core remains provider-agnostic with its generic RemoteConfig.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

static DEFAULT_STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalRemoteConfig {
    /// Store file; defaults to the platform data directory
    pub local_path: Option<String>,
}

impl LocalRemoteConfig {
    /// Resolved store file path, with `~` expanded.
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.local_path {
            Some(path) => Ok(PathBuf::from(shellexpand::tilde(path).into_owned())),
            None => {
                let data_dir = dirs::data_dir()
                    .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
                Ok(data_dir.join("calsync").join(DEFAULT_STORE_FILE))
            }
        }
    }
}

impl TryFrom<&serde_json::Map<String, serde_json::Value>> for LocalRemoteConfig {
    type Error = anyhow::Error;

    fn try_from(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let local_path = match map.get("local_path") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(path)) => Some(path.clone()),
            Some(other) => anyhow::bail!("local_path must be a string, got {other}"),
        };

        Ok(Self { local_path })
    }
}
