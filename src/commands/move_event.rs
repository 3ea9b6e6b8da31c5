use anyhow::Result;
use calsync_core::time::parse_timestamp;
use calsync_core::{EventSyncController, RemoteEventStore};
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::render::{Render, render_event};

pub async fn run<S: RemoteEventStore>(
    controller: &mut EventSyncController<S>,
    id: &str,
    start: &str,
    end: &str,
    yes: bool,
) -> Result<()> {
    super::load(controller, None).await?;

    let tz = controller.tz();
    let Some(prior) = controller.get(id).cloned() else {
        anyhow::bail!("Event '{}' not found", id);
    };
    let new_start = parse_timestamp(start, tz)?;
    let new_end = parse_timestamp(end, tz)?;

    println!("{}", render_event(&prior, tz).dimmed());
    println!("{}", render_event(&prior.moved_to(new_start, new_end), tz));

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Are you sure about this change?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Change discarded".dimmed());
            return Ok(());
        }
    }

    let response = controller
        .on_user_drop_event(id, new_start, new_end, |prior| {
            eprintln!("{}", render_event(prior, tz).yellow());
        })
        .await;

    if let Some(notification) = &response.notification {
        println!("{}", notification.render());
    }
    if response.is_error() {
        anyhow::bail!("Event was not moved");
    }

    Ok(())
}
