mod commands;
mod render;
mod utils;

use anyhow::Result;
use calsync_core::EventSyncController;
use calsync_core::config::SyncConfig;
use calsync_core::remote::Provider;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calsync")]
#[command(about = "Keep calendar events in step with a remote event store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events
    Events {
        /// Only show events related to this record
        #[arg(long)]
        scope: Option<String>,
    },
    /// Create a new event
    New {
        title: String,

        /// Start date/time (e.g. "2025-03-20T15:00" or "2025-03-20")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long)]
        end: String,

        #[arg(long)]
        all_day: bool,

        #[arg(long)]
        description: Option<String>,

        /// Record to attach the event to
        #[arg(long)]
        scope: Option<String>,
    },
    /// Move an event to a new time
    Move {
        id: String,

        #[arg(short, long)]
        start: String,

        #[arg(short, long)]
        end: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete an event
    Delete { id: String },
    /// Show configuration, or create the config file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented config template
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Events { scope } => {
            let mut controller = controller()?;
            commands::events::run(&mut controller, scope.as_deref()).await
        }
        Commands::New {
            title,
            start,
            end,
            all_day,
            description,
            scope,
        } => {
            let mut controller = controller()?;
            let draft = commands::new::draft(title, start, end, all_day, description, scope);
            commands::new::run(&mut controller, draft).await
        }
        Commands::Move { id, start, end, yes } => {
            let mut controller = controller()?;
            commands::move_event::run(&mut controller, &id, &start, &end, yes).await
        }
        Commands::Delete { id } => {
            let mut controller = controller()?;
            commands::delete::run(&mut controller, &id).await
        }
        Commands::Config { action } => match action {
            Some(ConfigAction::Init) => commands::config::init(),
            None => commands::config::run(),
        },
    }
}

fn controller() -> Result<EventSyncController<Provider>> {
    let config = SyncConfig::load()?;
    Ok(EventSyncController::new(
        config.provider(),
        config.tz()?,
        config.scope_id.clone(),
    ))
}
