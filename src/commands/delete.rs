use anyhow::Result;
use calsync_core::{EventSyncController, RemoteEventStore};

use crate::render::Render;

pub async fn run<S: RemoteEventStore>(controller: &mut EventSyncController<S>, id: &str) -> Result<()> {
    super::load(controller, None).await?;

    let response = controller.on_user_request_delete(id).await;

    if let Some(notification) = &response.notification {
        println!("{}", notification.render());
    }
    if response.is_error() {
        anyhow::bail!("Event was not deleted");
    }

    Ok(())
}
