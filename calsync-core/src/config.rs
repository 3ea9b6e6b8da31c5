//! calsync configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CalSyncError, CalSyncResult};
use crate::remote::{Provider, RemoteConfig};

const DEFAULT_PROVIDER: &str = "local";
const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SERVER_PORT: u16 = 4097;

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}

/// Configuration at ~/.config/calsync/config.toml, overridable with
/// `CALSYNC_*` environment variables (e.g. `CALSYNC_TIMEZONE`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    /// Provider binary suffix: `calsync-provider-<provider>`
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Provider-specific settings, passed through verbatim
    #[serde(default)]
    pub remote: RemoteConfig,

    /// IANA time zone used to read naive timestamps
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Restrict the session to events related to this record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            provider: default_provider(),
            remote: RemoteConfig::default(),
            timezone: default_timezone(),
            provider_timeout_secs: default_timeout_secs(),
            scope_id: None,
            server_port: default_server_port(),
        }
    }
}

/// `CALSYNC_TIMEZONE=...`; nested keys use `__`, e.g. `CALSYNC_REMOTE__LOCAL_PATH`.
fn environment() -> Environment {
    Environment::with_prefix("CALSYNC")
        .prefix_separator("_")
        .separator("__")
}

impl SyncConfig {
    pub fn config_path() -> CalSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalSyncError::Config("Could not determine config directory".into()))?
            .join("calsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented template there
    /// on first use.
    pub fn load() -> CalSyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (optional) layered with the environment.
    pub fn load_from(path: &Path) -> CalSyncResult<Self> {
        Self::load_layered(path, environment())
    }

    fn load_layered(path: &Path, env: Environment) -> CalSyncResult<Self> {
        let config: SyncConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        // Fail early on a bad zone rather than at the first naive timestamp
        config.tz()?;

        Ok(config)
    }

    pub fn tz(&self) -> CalSyncResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CalSyncError::UnknownTimeZone(self.timezone.clone()))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// The remote store described by this config.
    pub fn provider(&self) -> Provider {
        Provider::new(&self.provider, self.remote.clone()).with_timeout(self.provider_timeout())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalSyncResult<()> {
        let contents = format!(
            "\
# calsync configuration

# Remote event store, resolved as calsync-provider-<provider> in PATH:
# provider = \"{DEFAULT_PROVIDER}\"

# Time zone for timestamps entered without an offset:
# timezone = \"{DEFAULT_TIMEZONE}\"

# Seconds to wait for the provider before giving up:
# provider_timeout_secs = {DEFAULT_TIMEOUT_SECS}

# Only show events related to this record:
# scope_id = \"0015e00000AbCdE\"

# Port for calsync-server:
# server_port = {DEFAULT_SERVER_PORT}

# Provider-specific settings:
# [remote]
# local_path = \"~/.local/share/calsync/store.json\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
