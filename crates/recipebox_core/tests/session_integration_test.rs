//! Integration tests for whole recipe sessions against the bundled stores

use std::sync::Arc;
use std::time::Duration;

use recipebox_core::filter::SearchOutcome;
use recipebox_core::mirror::{Collection, MirrorEvent};
use recipebox_core::page::Page;
use recipebox_core::store::{
    CollectionStore, ErrorCallback, JsonFileStore, MemoryStore, SnapshotCallback, StorePath,
    StoreResult, SubscriptionError, SubscriptionId,
};
use recipebox_core::{RecipeBoxError, RecipeDraft, RecipeSession};
use serde_json::Value;
use tempfile::TempDir;

const USER: &str = "currentUser";

#[test]
fn two_sessions_share_one_store() {
    let store = Arc::new(MemoryStore::new());
    let mut phone = RecipeSession::start(Arc::clone(&store), USER).unwrap();
    let mut tablet = RecipeSession::start(Arc::clone(&store), USER).unwrap();

    phone.add_category("Dessert").unwrap();
    let cake = phone
        .add_recipe(
            RecipeDraft::new("Chocolate Cake")
                .category("Dessert")
                .ingredient("cocoa")
                .step("bake"),
        )
        .unwrap();

    tablet.pump();
    assert_eq!(tablet.state().categories(), &["Dessert"]);
    assert_eq!(tablet.state().recipe(&cake.id), Some(&cake));

    // A duplicate check uses the tablet's own mirrored list.
    assert!(matches!(
        tablet.add_category("Dessert"),
        Err(RecipeBoxError::DuplicateCategory(_))
    ));

    tablet.set_bookmarked(&cake.id, true).unwrap();
    phone.pump();
    phone.open_bookmarks();
    assert_eq!(phone.state().page().recipes().map(|r| r.len()), Some(1));
}

#[test]
fn users_are_isolated() {
    let store = Arc::new(MemoryStore::new());
    let mut alice = RecipeSession::start(Arc::clone(&store), "alice").unwrap();
    let mut bob = RecipeSession::start(Arc::clone(&store), "bob").unwrap();

    alice.add_category("Soup").unwrap();
    alice.add_recipe(RecipeDraft::new("Stew")).unwrap();

    assert_eq!(bob.pump(), 0);
    assert!(bob.state().categories().is_empty());
    // The same name is free in another user's scope.
    bob.add_category("Soup").unwrap();
}

#[test]
fn repeated_sessions_do_not_accumulate_listeners() {
    let store = Arc::new(MemoryStore::new());
    for _ in 0..5 {
        let session = RecipeSession::start(Arc::clone(&store), USER).unwrap();
        assert_eq!(store.listener_count(), 2);
        drop(session);
    }
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn file_store_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let id = {
        let store = Arc::new(JsonFileStore::open(&path).unwrap());
        let mut session = RecipeSession::start(store, USER).unwrap();
        session.add_category("Soup").unwrap();
        let stew = session
            .add_recipe(RecipeDraft::new("Kimchi Stew").category("Soup"))
            .unwrap();
        stew.id
    };

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let mut session = RecipeSession::start(store, USER).unwrap();
    assert_eq!(session.state().categories(), &["Soup"]);

    match session.search("stew") {
        SearchOutcome::Single(recipe) => assert_eq!(recipe.id, id),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(matches!(session.state().page(), Page::RecipeDetail { .. }));

    // Wire keys are the ones the mobile client reads.
    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let record = &raw["users"][USER]["recipes"][id.as_str()];
    assert_eq!(record["userNickname"], USER);
    assert_eq!(record["bookMarked"], false);
    assert_eq!(record["category"][0], "Soup");
}

#[test]
fn undecodable_records_are_skipped_not_deleted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(
        &path,
        r#"{ "users": { "currentUser": { "recipes": {
            "ok": { "name": "Toast" },
            "broken": { "name": 12 }
        } } } }"#,
    )
    .unwrap();

    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let session = RecipeSession::start(Arc::clone(&store), USER).unwrap();

    assert_eq!(session.state().recipes().len(), 1);
    assert!(
        store
            .get(&StorePath::recipe(USER, "broken").unwrap())
            .unwrap()
            .is_some()
    );
}

/// A store that refuses every subscription and every write.
struct OfflineStore;

impl CollectionStore for OfflineStore {
    fn subscribe(
        &self,
        path: &StorePath,
        _on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> SubscriptionId {
        on_error(&SubscriptionError {
            path: path.clone(),
            reason: "offline".to_string(),
        });
        0
    }

    fn unsubscribe(&self, _id: SubscriptionId) -> bool {
        false
    }

    fn set(&self, path: &StorePath, _value: Value) -> StoreResult<()> {
        Err(RecipeBoxError::WriteRejected {
            path: path.to_string(),
            reason: "offline".to_string(),
        })
    }

    fn remove(&self, path: &StorePath) -> StoreResult<()> {
        self.set(path, Value::Null)
    }

    fn get(&self, _path: &StorePath) -> StoreResult<Option<Value>> {
        Ok(None)
    }
}

#[test]
fn offline_store_leaves_session_empty_but_usable() {
    let mut session = RecipeSession::start(Arc::new(OfflineStore), USER).unwrap();

    assert!(!session.state().is_loaded());
    assert!(session.state().recipes().is_empty());

    session.open_category_dialog();
    let err = session.add_category("Soup").unwrap_err();
    assert!(matches!(err, RecipeBoxError::WriteRejected { .. }));
    assert!(session.state().category_dialog().is_some());

    session.open_add();
    assert!(session.add_recipe(RecipeDraft::new("Toast")).is_err());
    assert_eq!(session.state().page(), &Page::AddRecipe);
}

#[tokio::test]
async fn next_event_sees_writes_from_another_thread() {
    let store = Arc::new(MemoryStore::new());
    let mut session = RecipeSession::start(Arc::clone(&store), USER).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
            let path = StorePath::category(USER, "Breakfast").unwrap();
            store.set(&path, Value::Bool(true)).unwrap();
        })
    };

    let event = tokio::time::timeout(Duration::from_secs(5), session.next_event())
        .await
        .expect("timed out waiting for snapshot")
        .unwrap();
    writer.join().unwrap();

    assert_eq!(event, MirrorEvent::CategoriesChanged(vec!["Breakfast".into()]));
    assert_eq!(session.state().categories(), &["Breakfast"]);
}

#[tokio::test]
async fn cancelled_listener_is_reported_through_next_event() {
    let store = Arc::new(MemoryStore::new());
    let mut session = RecipeSession::start(Arc::clone(&store), USER).unwrap();

    store.deny_read(&StorePath::user(USER).unwrap(), "permission denied");

    let mut failed = Vec::new();
    for _ in 0..2 {
        match session.next_event().await {
            Some(MirrorEvent::SubscriptionFailed { collection, .. }) => failed.push(collection),
            other => panic!("unexpected event {:?}", other),
        }
    }
    failed.sort_by_key(|c| c.to_string());
    assert_eq!(failed, vec![Collection::Categories, Collection::Recipes]);
    assert!(session.state().is_loaded());
}

#[test]
fn unsaved_category_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let mut session = RecipeSession::start(Arc::clone(&store), USER).unwrap();
    session.add_category("Dessert").unwrap();
    session.pump();

    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    session.open_category_dialog();
    let err = session.add_category("Soup").unwrap_err();
    assert!(matches!(err, RecipeBoxError::FileWrite { .. }));
    assert_eq!(session.pump(), 0);
    assert_eq!(session.state().categories(), &["Dessert"]);
    let dialog = session.state().category_dialog().unwrap();
    assert_eq!(dialog.draft, "Soup");
    assert!(dialog.error.is_some());

    std::fs::remove_dir(&path).unwrap();
    assert_eq!(session.add_category("Soup").unwrap(), "Soup");
    session.pump();
    assert_eq!(session.state().categories(), &["Dessert", "Soup"]);
    assert!(session.state().category_dialog().is_none());
}

#[test]
fn mirror_matches_store_after_concurrent_writers() {
    for _ in 0..20 {
        let store = Arc::new(MemoryStore::new());
        let mut session = RecipeSession::start(Arc::clone(&store), USER).unwrap();

        let writers: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..20 {
                        let name = format!("c{:02}-{:02}", t, i);
                        let path = StorePath::category(USER, &name).unwrap();
                        store.set(&path, Value::Bool(true)).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        session.pump();

        let stored = store
            .get(&StorePath::categories(USER).unwrap())
            .unwrap()
            .unwrap();
        let mut expected: Vec<String> = stored.as_object().unwrap().keys().cloned().collect();
        expected.sort();
        assert_eq!(expected.len(), 160);
        assert_eq!(session.state().categories(), expected.as_slice());
    }
}

#[test]
fn session_started_during_writes_catches_up() {
    for _ in 0..20 {
        let store = Arc::new(MemoryStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..40 {
                    let path = StorePath::category(USER, &format!("c{:02}", i)).unwrap();
                    store.set(&path, Value::Bool(true)).unwrap();
                }
            })
        };

        let mut session = RecipeSession::start(Arc::clone(&store), USER).unwrap();
        writer.join().unwrap();
        session.pump();

        assert_eq!(session.state().categories().len(), 40);
    }
}
