//! Shared fixtures for unit tests.

use serde_json::{Value, json};

use crate::mirror::{MirrorEvent, MirrorEvents};
use crate::model::Recipe;
use crate::store::MemoryStore;

/// Everything currently queued on a mirror channel.
pub fn drain(rx: &mut MirrorEvents) -> Vec<MirrorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// A recipe record in its stored form.
pub fn recipe_value(id: &str, name: &str, categories: &[&str], bookmarked: bool) -> Value {
    json!({
        "id": id,
        "userNickname": "currentUser",
        "name": name,
        "ingredients": [],
        "method": [],
        "category": categories,
        "bookMarked": bookmarked,
    })
}

/// A decoded recipe.
pub fn recipe(id: &str, name: &str, categories: &[&str], bookmarked: bool) -> Recipe {
    Recipe {
        id: id.to_string(),
        user_nickname: "currentUser".to_string(),
        name: name.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        bookmarked,
        ..Recipe::default()
    }
}

/// A store with two categories and three recipes for `currentUser`.
pub fn seeded_store() -> MemoryStore {
    MemoryStore::from_value(json!({
        "users": { "currentUser": {
            "categories": { "Dessert": true, "Soup": true },
            "recipes": {
                "r1": recipe_value("r1", "Chocolate Cake", &["Dessert"], true),
                "r2": recipe_value("r2", "Vanilla Tart", &["Dessert"], false),
                "r3": recipe_value("r3", "Kimchi Stew", &["Soup"], false),
            }
        } }
    }))
}
