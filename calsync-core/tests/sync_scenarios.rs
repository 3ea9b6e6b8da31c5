use calsync_core::remote::MemoryStore;
use calsync_core::time::to_canonical;
use calsync_core::{
    CreateOutcome, DeleteOutcome, Draft, EventSyncController, LoadOutcome, RemoteCallFailure,
    ValidationError,
};

fn controller() -> EventSyncController<MemoryStore> {
    EventSyncController::new(MemoryStore::new(), chrono_tz::UTC, None)
}

#[tokio::test]
async fn demo_draft_round_trips_through_the_store() {
    let mut ctl = controller();
    let draft = Draft::new("Demo", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");

    let outcome = ctl.create_from_draft(&draft, None).await.unwrap();
    let created = outcome.event().cloned().expect("create should succeed");
    let created_id = created.id.clone().unwrap();

    assert_eq!(ctl.load_all(None).await, LoadOutcome::Loaded(1));
    let events = ctl.events();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Demo");
    assert_eq!(events[0].id.as_deref(), Some(created_id.as_str()));
    assert!(!created_id.is_empty());
    assert_eq!(to_canonical(&events[0].start), "2024-01-01T09:00:00.000Z");
    assert_eq!(to_canonical(&events[0].end), "2024-01-01T10:00:00.000Z");
}

#[tokio::test]
async fn created_id_matches_store_and_appears_once() {
    let mut ctl = controller();
    let draft = Draft::new("Sync", "2024-02-01T09:00", "2024-02-01T09:30");

    let Ok(CreateOutcome::Created(event)) = ctl.create_from_draft(&draft, None).await else {
        panic!("create should succeed");
    };

    let stored = ctl.store().snapshot().await.records;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, event.id);

    ctl.load_all(None).await;
    let matching = ctl.events().into_iter().filter(|e| e.id == event.id).count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn bad_draft_is_rejected_without_backend_call() {
    let mut ctl = controller();
    let draft = Draft::new("Bad", "2024-01-01T10:00:00Z", "2024-01-01T09:00:00Z");

    let result = ctl.create_from_draft(&draft, None).await;

    assert!(matches!(result, Err(ValidationError::EndBeforeStart { .. })));
    assert_eq!(ctl.store().calls().await.total(), 0);
}

#[tokio::test]
async fn failed_create_keeps_list_length() {
    let mut ctl = controller();
    ctl.create_from_draft(&Draft::new("Kept", "2024-01-01T08:00", "2024-01-01T09:00"), None)
        .await
        .unwrap();
    let before = ctl.len();

    ctl.store().set_offline(true).await;
    let outcome = ctl
        .create_from_draft(&Draft::new("Lost", "2024-01-01T10:00", "2024-01-01T11:00"), None)
        .await
        .unwrap();

    assert!(matches!(outcome, CreateOutcome::Failed(RemoteCallFailure::Transport(_))));
    assert_eq!(ctl.len(), before);
}

#[tokio::test]
async fn deleted_id_never_comes_back() {
    let mut ctl = controller();
    let outcome = ctl
        .create_from_draft(&Draft::new("Gone", "2024-01-01T08:00", "2024-01-01T09:00"), None)
        .await
        .unwrap();
    let id = outcome.event().and_then(|e| e.id.clone()).unwrap();

    assert!(ctl.delete(&id).await.unwrap().is_deleted());

    for _ in 0..2 {
        ctl.load_all(None).await;
        assert!(ctl.get(&id).is_none());
    }
}

#[tokio::test]
async fn deleting_unknown_id_fails_and_keeps_list() {
    let mut ctl = controller();
    ctl.create_from_draft(&Draft::new("Stay", "2024-01-01T08:00", "2024-01-01T09:00"), None)
        .await
        .unwrap();
    let before = ctl.events();

    let outcome = ctl.delete("does-not-exist").await.unwrap();

    assert!(matches!(outcome, DeleteOutcome::Failed(RemoteCallFailure::NotFound(_))));
    assert_eq!(ctl.events(), before);
}

#[tokio::test]
async fn repeated_loads_are_identical() {
    let mut ctl = controller();
    for (title, hour) in [("One", "08"), ("Two", "10"), ("Three", "12")] {
        let draft = Draft::new(title, format!("2024-01-01T{hour}:00"), format!("2024-01-01T{hour}:45"));
        ctl.create_from_draft(&draft, None).await.unwrap();
    }

    ctl.load_all(None).await;
    let first = ctl.events();
    ctl.load_all(None).await;
    let second = ctl.events();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn scope_with_no_records_is_empty_not_failed() {
    let mut ctl = controller();
    ctl.create_from_draft(&Draft::new("Unscoped", "2024-01-01T08:00", "2024-01-01T09:00"), None)
        .await
        .unwrap();

    assert_eq!(ctl.load_all(Some("001NoEvents")).await, LoadOutcome::Empty);
    assert!(ctl.is_empty());

    ctl.store().set_offline(true).await;
    assert!(matches!(
        ctl.load_all(Some("001NoEvents")).await,
        LoadOutcome::Failed(RemoteCallFailure::Transport(_))
    ));
}

#[tokio::test]
async fn created_event_looks_the_same_after_reload() {
    let mut ctl = controller();
    let draft = Draft::new("Precise", "2024-01-01T09:00:00.123456Z", "2024-01-01T10:00:00.999999Z");

    ctl.create_from_draft(&draft, None).await.unwrap();
    let before = ctl.events();
    ctl.load_all(None).await;

    assert_eq!(ctl.events(), before);
    assert_eq!(to_canonical(&before[0].start), "2024-01-01T09:00:00.123Z");
    assert_eq!(to_canonical(&before[0].end), "2024-01-01T10:00:00.999Z");
}
