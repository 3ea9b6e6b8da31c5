//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `calsync-provider-local`) using JSON over stdin/stdout.
//! Each call spawns the provider, writes one request line and reads one
//! response.
//!
//! Providers manage their own storage and credentials. Core just passes
//! provider-specific parameters from the config.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::error::RemoteCallFailure;
use crate::event::ScopeKind;
use crate::record::EventRecord;
use crate::remote::protocol::{
    Command, CreateEvent, DeleteEvent, ErrorKind, ListEvents, ProviderCommand, Request, Response,
    ResolveScopeKind, UpdateEvent,
};
use crate::remote::{RemoteConfig, RemoteEventStore};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A remote store reached through a `calsync-provider-<name>` binary.
#[derive(Clone, Debug)]
pub struct Provider {
    name: String,
    config: RemoteConfig,
    timeout: Duration,
}

impl Provider {
    pub fn new(name: &str, config: RemoteConfig) -> Self {
        Provider {
            name: name.to_string(),
            config,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary_name(&self) -> String {
        format!("calsync-provider-{}", self.name)
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    fn binary_path(&self) -> Result<PathBuf, RemoteCallFailure> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| RemoteCallFailure::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> Result<C::Response, RemoteCallFailure> {
        let command = C::command();
        debug!(provider = %self.name, ?command, "calling provider");

        timeout(self.timeout, self.call_raw(command, cmd))
            .await
            .map_err(|_| RemoteCallFailure::Timeout(self.timeout.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> Result<R, RemoteCallFailure> {
        let params =
            serde_json::to_value(params).map_err(|e| RemoteCallFailure::Protocol(e.to_string()))?;
        let request_json = serde_json::to_string(&Request { command, params })
            .map_err(|e| RemoteCallFailure::Protocol(e.to_string()))?;

        let binary_path = self.binary_path()?;

        let mut child = TokioCommand::new(&binary_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RemoteCallFailure::Transport(format!(
                    "Failed to spawn {}: {}",
                    binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RemoteCallFailure::Transport("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await
            .map_err(|e| RemoteCallFailure::Transport(e.to_string()))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RemoteCallFailure::Transport(e.to_string()))?;

        if !output.status.success() {
            return Err(RemoteCallFailure::Transport(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        parse_response(&response_str)
    }
}

/// Decode the first response line written by a provider.
fn parse_response<R: DeserializeOwned>(raw: &str) -> Result<R, RemoteCallFailure> {
    let line = raw
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| RemoteCallFailure::Protocol("Provider returned no response".into()))?;

    let response: Response<R> = serde_json::from_str(line)
        .map_err(|e| RemoteCallFailure::Protocol(format!("Failed to parse response: {e}")))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error {
            error,
            kind: ErrorKind::NotFound,
        } => Err(RemoteCallFailure::NotFound(error)),
        Response::Error { error, .. } => Err(RemoteCallFailure::Rejected(error)),
    }
}

#[async_trait]
impl RemoteEventStore for Provider {
    async fn list(&self, scope_id: Option<&str>) -> Result<Vec<EventRecord>, RemoteCallFailure> {
        self.call(ListEvents {
            remote_config: self.remote_config(),
            scope_id: scope_id.map(String::from),
        })
        .await
    }

    async fn create(&self, record: &EventRecord) -> Result<String, RemoteCallFailure> {
        self.call(CreateEvent {
            remote_config: self.remote_config(),
            record: record.clone(),
        })
        .await
    }

    async fn update(&self, record: &EventRecord) -> Result<(), RemoteCallFailure> {
        self.call(UpdateEvent {
            remote_config: self.remote_config(),
            record: record.clone(),
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteCallFailure> {
        self.call(DeleteEvent {
            remote_config: self.remote_config(),
            event_id: id.to_string(),
        })
        .await
    }

    async fn resolve_scope_kind(&self, scope_id: &str) -> Result<ScopeKind, RemoteCallFailure> {
        self.call(ResolveScopeKind {
            remote_config: self.remote_config(),
            scope_id: scope_id.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_name_follows_convention() {
        let provider = Provider::new("local", RemoteConfig::default());
        assert_eq!(provider.binary_name(), "calsync-provider-local");
    }

    #[test]
    fn parses_success_line() {
        let id: String = parse_response("{\"status\":\"success\",\"data\":\"evt-1\"}\n").unwrap();
        assert_eq!(id, "evt-1");
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let result: Result<(), _> =
            parse_response(r#"{"status":"error","error":"gone","kind":"not_found"}"#);
        assert_eq!(result, Err(RemoteCallFailure::NotFound("gone".into())));
    }

    #[test]
    fn other_errors_are_rejections() {
        let result: Result<(), _> = parse_response(r#"{"status":"error","error":"nope"}"#);
        assert_eq!(result, Err(RemoteCallFailure::Rejected("nope".into())));
    }

    #[test]
    fn empty_output_is_a_protocol_error() {
        let result: Result<(), _> = parse_response("\n");
        assert!(matches!(result, Err(RemoteCallFailure::Protocol(_))));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let provider = Provider::new("does-not-exist-anywhere", RemoteConfig::default());
        let result = provider.list(None).await;
        assert_eq!(
            result,
            Err(RemoteCallFailure::ProviderNotInstalled(
                "calsync-provider-does-not-exist-anywhere".into()
            ))
        );
    }
}
