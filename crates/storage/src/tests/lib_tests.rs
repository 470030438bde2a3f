use super::*;

#[tokio::test]
async fn duplicate_names_are_rejected_without_mutation() {
    let store = SuggestionStore::in_memory();
    assert_eq!(
        store.add_name("Luna").await.expect("add"),
        AddOutcome::Created
    );
    assert_eq!(
        store.add_name("Luna").await.expect("add again"),
        AddOutcome::AlreadyExists
    );
    assert_eq!(store.entry_count().await, 1);
}

#[tokio::test]
async fn empty_names_never_enter_the_registry() {
    let store = SuggestionStore::in_memory();
    assert_eq!(
        store.add_name("").await.expect("add"),
        AddOutcome::AlreadyExists
    );
    assert_eq!(store.entry_count().await, 0);
}

#[tokio::test]
async fn votes_increment_by_exactly_one() {
    let store = SuggestionStore::in_memory();
    store.add_name("Luna").await.expect("add");
    assert_eq!(store.record_vote("Luna").await.expect("vote"), Some(1));
    assert_eq!(store.record_vote("Luna").await.expect("vote"), Some(2));
    assert_eq!(store.votes_for("Luna").await, Some(2));
}

#[tokio::test]
async fn voting_for_unknown_name_leaves_persisted_bytes_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("suggestions.json");
    let store = SuggestionStore::open(&path).await.expect("open");
    store.add_name("Luna").await.expect("add");

    let before = std::fs::read(&path).expect("file before");
    assert_eq!(store.record_vote("Nyx").await.expect("vote"), None);
    let after = std::fs::read(&path).expect("file after");
    assert_eq!(before, after);
}

#[tokio::test]
async fn reopening_reproduces_names_order_and_tallies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("suggestions.json");

    let store = SuggestionStore::open(&path).await.expect("open");
    for name in ["Cleo", "Atlas", "Biscuit"] {
        store.add_name(name).await.expect("add");
    }
    store.record_vote("Atlas").await.expect("vote");
    store.record_vote("Atlas").await.expect("vote");
    drop(store);

    let reopened = SuggestionStore::open(&path).await.expect("reopen");
    assert_eq!(reopened.names().await, ["Cleo", "Atlas", "Biscuit"]);
    assert_eq!(reopened.votes_for("Atlas").await, Some(2));
    assert_eq!(reopened.votes_for("Cleo").await, Some(0));

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).expect("raw file")).expect("json");
    assert_eq!(raw["Atlas"]["votes"], 2);
    assert_eq!(raw["Atlas"]["priority"], 0);
}

#[tokio::test]
async fn serialized_key_order_is_insertion_order() {
    let mut registry = Registry::default();
    for name in ["Zorro", "Ada", "Mochi"] {
        registry.insert(name);
    }
    let text = serde_json::to_string(&registry).expect("serialize");
    let zorro = text.find("Zorro").expect("Zorro");
    let ada = text.find("Ada").expect("Ada");
    let mochi = text.find("Mochi").expect("Mochi");
    assert!(zorro < ada && ada < mochi);
}

#[tokio::test]
async fn entries_missing_fields_default_to_zero() {
    let registry: Registry = serde_json::from_str(r#"{"Luna": {}}"#).expect("parse");
    assert_eq!(registry.votes_for("Luna"), Some(0));
}

#[tokio::test]
async fn malformed_file_falls_back_to_empty_registry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("suggestions.json");
    std::fs::write(&path, b"{ not json").expect("write garbage");

    let store = SuggestionStore::open(&path).await.expect("open");
    assert_eq!(store.entry_count().await, 0);
}

#[tokio::test]
async fn missing_file_starts_empty_and_is_created_on_first_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("suggestions.json");

    let store = SuggestionStore::open(&path).await.expect("open");
    assert_eq!(store.entry_count().await, 0);
    assert!(!path.exists());

    store.add_name("Luna").await.expect("add");
    assert!(path.exists(), "file should exist: {}", path.display());
}

#[tokio::test]
async fn pages_slice_the_insertion_order() {
    let store = SuggestionStore::in_memory();
    for i in 0..7 {
        store.add_name(&format!("name-{i}")).await.expect("add");
    }
    let first = store.page_of(0, 5).await;
    assert_eq!(first.len(), 5);
    assert_eq!(first[0].0, "name-0");
    assert_eq!(first[4].0, "name-4");

    let second = store.page_of(1, 5).await;
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].0, "name-5");

    assert!(store.page_of(2, 5).await.is_empty());
}
