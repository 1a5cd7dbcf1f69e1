//! Integration tests for the database-backed history store.
//!
//! These tests verify that:
//! - Loading a new user creates exactly one empty record
//! - Loading an existing user refreshes the display name only
//! - Archiving snapshots non-empty history and skips empty history

use parley_core::{ChatMessage, HistoryStore};
use parley_entities::conversations;
use parley_store::DatabaseHistoryStore;
use sea_orm::{ConnectOptions, EntityTrait, PaginatorTrait};

async fn memory_store() -> DatabaseHistoryStore {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // A single pooled connection keeps the in-memory database alive and shared.
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    DatabaseHistoryStore::connect(options)
        .await
        .expect("Failed to open in-memory database")
}

fn transcript() -> Vec<ChatMessage> {
    vec![
        ChatMessage::user("What is Rust?"),
        ChatMessage::assistant("A systems programming language."),
        ChatMessage::user("Is it fast?"),
        ChatMessage::assistant("Yes."),
    ]
}

#[tokio::test]
async fn test_load_or_create_is_idempotent() {
    let store = memory_store().await;

    let first = store
        .load_or_create(1001, "alice")
        .await
        .expect("Failed to create record");
    assert_eq!(first.user_id, 1001);
    assert!(first.messages.is_empty());

    let second = store
        .load_or_create(1001, "alice")
        .await
        .expect("Failed to load record");
    assert_eq!(second, first);

    let rows = conversations::Entity::find()
        .count(store.db())
        .await
        .expect("Failed to count rows");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_load_refreshes_display_name_without_touching_messages() {
    let store = memory_store().await;

    store
        .load_or_create(1002, "bob")
        .await
        .expect("Failed to create record");
    store
        .replace_messages(1002, &transcript())
        .await
        .expect("Failed to store messages");

    let renamed = store
        .load_or_create(1002, "robert")
        .await
        .expect("Failed to load record");
    assert_eq!(renamed.display_name, "robert");
    assert_eq!(renamed.messages, transcript());

    let stored = conversations::Entity::find_by_id(1002_i64)
        .one(store.db())
        .await
        .expect("Failed to query record")
        .expect("Record should exist");
    assert_eq!(stored.username, "robert");
}

#[tokio::test]
async fn test_replace_messages_overwrites_transcript() {
    let store = memory_store().await;

    store
        .load_or_create(1003, "carol")
        .await
        .expect("Failed to create record");
    store
        .replace_messages(1003, &transcript())
        .await
        .expect("Failed to store messages");
    store
        .replace_messages(1003, &[])
        .await
        .expect("Failed to clear messages");

    let loaded = store
        .load_or_create(1003, "carol")
        .await
        .expect("Failed to load record");
    assert!(loaded.messages.is_empty());
}

#[tokio::test]
async fn test_archive_snapshots_non_empty_history() {
    let store = memory_store().await;

    store
        .archive(1004, "dave", &transcript())
        .await
        .expect("Failed to archive");

    let archives = store
        .archived_conversations(1004)
        .await
        .expect("Failed to list archives");
    assert_eq!(archives.len(), 1);
    assert_eq!(archives[0].user_id, 1004);
    assert_eq!(archives[0].display_name, "dave");
    assert_eq!(archives[0].messages, transcript());
}

#[tokio::test]
async fn test_archive_skips_empty_history() {
    let store = memory_store().await;

    store
        .archive(1005, "erin", &[])
        .await
        .expect("Archiving nothing should not fail");

    let archives = store
        .archived_conversations(1005)
        .await
        .expect("Failed to list archives");
    assert!(archives.is_empty());
}

#[tokio::test]
async fn test_archives_are_kept_per_user_in_order() {
    let store = memory_store().await;

    store
        .archive(1006, "frank", &transcript()[..2])
        .await
        .expect("Failed to archive first");
    store
        .archive(1006, "frank", &transcript())
        .await
        .expect("Failed to archive second");
    store
        .archive(1007, "grace", &transcript())
        .await
        .expect("Failed to archive other user");

    let archives = store
        .archived_conversations(1006)
        .await
        .expect("Failed to list archives");
    assert_eq!(archives.len(), 2);
    assert_eq!(archives[0].messages.len(), 2);
    assert_eq!(archives[1].messages.len(), 4);
}
