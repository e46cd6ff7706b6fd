use storage::repository::{SlotRepository, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_slot_roundtrip_and_overwrite() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_slot_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get_item("learning-progress").await.unwrap(), None);

    repo.set_item("learning-progress", r#"{"m1":{"status":"in-progress"}}"#)
        .await
        .unwrap();
    repo.set_item("learning-progress", r#"{"m1":{"status":"completed"}}"#)
        .await
        .unwrap();

    let stored = repo.get_item("learning-progress").await.unwrap();
    assert_eq!(stored.as_deref(), Some(r#"{"m1":{"status":"completed"}}"#));

    repo.remove_item("learning-progress").await.unwrap();
    assert_eq!(repo.get_item("learning-progress").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let url = "sqlite:file:memdb_migrate_twice?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set_item("slot", "{}").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get_item("slot").await.unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn storage_sqlite_keeps_slots_separate() {
    let storage = Storage::sqlite("sqlite:file:memdb_slots_separate?mode=memory&cache=shared")
        .await
        .expect("storage");

    storage.slots.set_item("math", r#"{"calculus":{}}"#).await.unwrap();
    storage.slots.set_item("aws", r#"{"ec2":{}}"#).await.unwrap();

    assert_eq!(
        storage.slots.get_item("math").await.unwrap().as_deref(),
        Some(r#"{"calculus":{}}"#)
    );
    assert_eq!(
        storage.slots.get_item("aws").await.unwrap().as_deref(),
        Some(r#"{"ec2":{}}"#)
    );
}
