use anyhow::Result;
use calsync_core::{Draft, EventSyncController, RemoteEventStore};

use crate::render::Render;

pub fn draft(
    title: String,
    start: String,
    end: String,
    all_day: bool,
    description: Option<String>,
    scope: Option<String>,
) -> Draft {
    Draft {
        all_day,
        description,
        scope_id: scope,
        ..Draft::new(title, start, end)
    }
}

pub async fn run<S: RemoteEventStore>(
    controller: &mut EventSyncController<S>,
    draft: Draft,
) -> Result<()> {
    let response = controller.on_user_submit_draft(draft).await;

    if let Some(notification) = &response.notification {
        println!("{}", notification.render());
    }
    if response.is_error() {
        anyhow::bail!("Event was not created");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::remote::MemoryStore;
    use calsync_core::{Relation, ScopeKind};

    #[tokio::test]
    async fn scoped_draft_is_attached_to_person() {
        let store = MemoryStore::new();
        store.add_scope("003P", ScopeKind::Person).await;
        let mut controller = EventSyncController::new(store, chrono_tz::UTC, None);

        let draft = draft(
            "Call".into(),
            "2024-03-01T10:00".into(),
            "2024-03-01T10:30".into(),
            false,
            Some("Quarterly review".into()),
            Some("003P".into()),
        );
        run(&mut controller, draft).await.unwrap();

        let events = controller.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].related_to, Some(Relation::Who("003P".into())));
        assert_eq!(events[0].description.as_deref(), Some("Quarterly review"));
    }

    #[tokio::test]
    async fn invalid_draft_is_an_error() {
        let mut controller = EventSyncController::new(MemoryStore::new(), chrono_tz::UTC, None);
        let draft = draft(
            "  ".into(),
            "2024-03-01T10:00".into(),
            "2024-03-01T10:30".into(),
            false,
            None,
            None,
        );

        assert!(run(&mut controller, draft).await.is_err());
        assert_eq!(controller.store().calls().await.total(), 0);
    }
}
