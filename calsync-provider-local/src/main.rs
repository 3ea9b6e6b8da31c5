//! calsync-provider-local - file-backed event store for calsync
//!
//! This binary implements the calsync provider protocol, communicating
//! with calsync via JSON over stdin/stdout.
//!
//! Events live in a single JSON file:
//!   ~/.local/share/calsync/store.json  (or `local_path` in the remote config)

mod commands;
mod remote_config;
mod store;

use std::future::Future;
use std::io::{self, BufRead, Write};

use calsync_core::RemoteCallFailure;
use calsync_core::remote::protocol::{Command, ErrorKind, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {}", e)),
        };

        if let Err(e) = writeln!(stdout, "{}", response).and_then(|_| stdout.flush()) {
            error!("Failed to write response: {}", e);
            break;
        }
    }
}

async fn handle_request(request: Request) -> String {
    match request.command {
        Command::ListEvents => dispatch(request.params, commands::list_events::handle).await,
        Command::CreateEvent => dispatch(request.params, commands::create_event::handle).await,
        Command::UpdateEvent => dispatch(request.params, commands::update_event::handle).await,
        Command::DeleteEvent => dispatch(request.params, commands::delete_event::handle).await,
        Command::ResolveScopeKind => {
            dispatch(request.params, commands::resolve_scope_kind::handle).await
        }
    }
}

/// Decode params into a typed command, run its handler, encode the result.
async fn dispatch<C, T, F, Fut>(params: serde_json::Value, handler: F) -> String
where
    C: DeserializeOwned,
    T: Serialize,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let cmd: C = match serde_json::from_value(params) {
        Ok(cmd) => cmd,
        Err(e) => return Response::error(&format!("Invalid params: {}", e)),
    };

    match handler(cmd).await {
        Ok(data) => Response::success(data),
        Err(e) => {
            let kind = match e.downcast_ref::<RemoteCallFailure>() {
                Some(RemoteCallFailure::NotFound(_)) => ErrorKind::NotFound,
                _ => ErrorKind::Other,
            };
            Response::error_of_kind(&format!("{:#}", e), kind)
        }
    }
}
