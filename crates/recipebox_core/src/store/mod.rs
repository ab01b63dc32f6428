//! Keyed collection store abstraction.
//!
//! This module defines the [`CollectionStore`] trait which abstracts over the
//! backing store the mirror listens to. A store is a JSON tree addressed by
//! slash-separated [`StorePath`]s, with listeners that receive the full
//! [`Snapshot`] of a node whenever anything at or below it changes.
//!
//! # Layout
//!
//! All data is namespaced by the user nickname:
//!
//! ```text
//! users/{user}/categories/{category_name} -> true
//! users/{user}/recipes/{recipe_id}        -> Recipe object
//! ```
//!
//! Two implementations ship with the crate: [`MemoryStore`] (in-memory, with
//! access rules for exercising failure paths) and [`JsonFileStore`] (a memory
//! store persisted to a JSON file after each write).

mod file;
mod memory;
mod registry;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use registry::{ErrorCallback, Listener, ListenerRegistry, SnapshotCallback, SubscriptionId};

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::error::RecipeBoxError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, RecipeBoxError>;

/// Characters the hosted database refuses in keys.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Check that `key` is usable as a single path segment.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let invalid = |reason: &str| RecipeBoxError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("keys must not be empty"));
    }
    if let Some(c) = key.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
        return Err(invalid(&format!("'{}' is not allowed in keys", c)));
    }
    if key.chars().any(|c| c.is_ascii_control()) {
        return Err(invalid("control characters are not allowed in keys"));
    }
    Ok(())
}

/// The hosted database's default child ordering.
///
/// Keys that parse as 32-bit integers come first, in numeric order. All
/// other keys follow in lexicographic order.
pub fn key_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<i32>(), b.parse::<i32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// A validated path into the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the store.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a slash-separated path. Empty segments are ignored, so
    /// `"/users//alice/"` is the same as `"users/alice"`.
    pub fn parse(path: &str) -> StoreResult<Self> {
        let mut out = Self::root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            out = out.child(segment)?;
        }
        Ok(out)
    }

    /// Append one key.
    pub fn child(&self, key: &str) -> StoreResult<Self> {
        validate_key(key)?;
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }

    /// `users/{user}`
    pub fn user(user: &str) -> StoreResult<Self> {
        Self::root().child("users")?.child(user)
    }

    /// `users/{user}/categories`
    pub fn categories(user: &str) -> StoreResult<Self> {
        Self::user(user)?.child("categories")
    }

    /// `users/{user}/recipes`
    pub fn recipes(user: &str) -> StoreResult<Self> {
        Self::user(user)?.child("recipes")
    }

    /// `users/{user}/categories/{name}`
    pub fn category(user: &str, name: &str) -> StoreResult<Self> {
        Self::categories(user)?.child(name)
    }

    /// `users/{user}/recipes/{id}`
    pub fn recipe(user: &str, id: &str) -> StoreResult<Self> {
        Self::recipes(user)?.child(id)
    }

    /// Path segments from the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, or `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// True if `self` equals `other` or lies below it.
    pub fn starts_with(&self, other: &StorePath) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    /// True if a write at one path can change the value seen at the other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Full contents of one node, as its ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: StorePath,
    children: Vec<(String, Value)>,
}

impl Snapshot {
    /// Build a snapshot from the value stored at `path`.
    ///
    /// Objects contribute their entries in [`key_order`]. Anything else
    /// (a missing node, a scalar) yields an empty snapshot.
    pub fn from_value(path: StorePath, value: Option<&Value>) -> Self {
        let mut children: Vec<(String, Value)> = match value {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Vec::new(),
        };
        children.sort_by(|a, b| key_order(&a.0, &b.0));
        Self { path, children }
    }

    /// The path this snapshot was taken at.
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Children as `(key, value)` pairs in iteration order.
    pub fn children(&self) -> &[(String, Value)] {
        &self.children
    }

    /// Child keys in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(k, _)| k.as_str())
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when the node has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A listener was rejected or cancelled by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionError {
    /// Path the listener was registered at.
    pub path: StorePath,
    /// Store-provided reason (e.g. "permission denied").
    pub reason: String,
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener at '{}' cancelled: {}", self.path, self.reason)
    }
}

/// Trait for keyed collection stores with change subscriptions.
///
/// Each listener sees snapshots in the order the writes were applied, even
/// when writes come from several threads, and the last snapshot it receives
/// matches the store. A listener must not be invoked after
/// [`unsubscribe`](CollectionStore::unsubscribe) has returned for it.
/// Listener callbacks must not write to the store they listen to.
pub trait CollectionStore: Send + Sync {
    /// Register a listener for the node at `path`.
    ///
    /// The current snapshot is delivered before this returns; afterwards a
    /// fresh full snapshot is delivered after every write that overlaps
    /// `path`. If the store refuses or later cancels the listener,
    /// `on_error` is called once and the listener is dropped.
    fn subscribe(
        &self,
        path: &StorePath,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> SubscriptionId;

    /// Remove a listener.
    ///
    /// Returns `true` if the listener was still registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Replace the value at `path`.
    fn set(&self, path: &StorePath, value: Value) -> StoreResult<()>;

    /// Delete the value at `path`. Removing a missing node is not an error.
    fn remove(&self, path: &StorePath) -> StoreResult<()>;

    /// Read the current value at `path` once.
    fn get(&self, path: &StorePath) -> StoreResult<Option<Value>>;
}

impl<S: CollectionStore + ?Sized> CollectionStore for std::sync::Arc<S> {
    fn subscribe(
        &self,
        path: &StorePath,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> SubscriptionId {
        (**self).subscribe(path, on_snapshot, on_error)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        (**self).unsubscribe(id)
    }

    fn set(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        (**self).set(path, value)
    }

    fn remove(&self, path: &StorePath) -> StoreResult<()> {
        (**self).remove(path)
    }

    fn get(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        (**self).get(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_scoped_paths() {
        assert_eq!(
            StorePath::categories("alice").unwrap().to_string(),
            "users/alice/categories"
        );
        assert_eq!(
            StorePath::recipe("alice", "r1").unwrap().to_string(),
            "users/alice/recipes/r1"
        );
    }

    #[test]
    fn test_invalid_keys_rejected() {
        for key in ["", "a.b", "a/b", "a#b", "a$b", "a[0]", "tab\there"] {
            assert!(
                matches!(validate_key(key), Err(RecipeBoxError::InvalidKey { .. })),
                "expected {:?} to be rejected",
                key
            );
        }
        assert!(validate_key("Korean BBQ").is_ok());
        assert!(validate_key("디저트").is_ok());
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let path = StorePath::parse("/users//alice/").unwrap();
        assert_eq!(path, StorePath::user("alice").unwrap());
        assert_eq!(StorePath::parse("").unwrap(), StorePath::root());
    }

    #[test]
    fn test_overlaps() {
        let recipes = StorePath::recipes("alice").unwrap();
        let one = StorePath::recipe("alice", "r1").unwrap();
        let user = StorePath::user("alice").unwrap();
        let cats = StorePath::categories("alice").unwrap();

        assert!(one.overlaps(&recipes));
        assert!(recipes.overlaps(&one));
        assert!(user.overlaps(&recipes));
        assert!(!cats.overlaps(&recipes));
        assert!(!one.overlaps(&StorePath::recipes("bob").unwrap()));
    }

    #[test]
    fn test_snapshot_orders_children_by_key() {
        let path = StorePath::categories("alice").unwrap();
        let value = json!({ "Soup": true, "Bread": true, "Noodles": true });
        let snap = Snapshot::from_value(path, Some(&value));
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["Bread", "Noodles", "Soup"]);
    }

    #[test]
    fn test_integer_keys_sort_first_and_numerically() {
        let path = StorePath::recipes("alice").unwrap();
        let value = json!({ "b": 1, "10": 1, "2": 1, "-3": 1, "A": 1, "2147483648": 1 });
        let snap = Snapshot::from_value(path, Some(&value));
        assert_eq!(
            snap.keys().collect::<Vec<_>>(),
            vec!["-3", "2", "10", "2147483648", "A", "b"]
        );
    }

    #[test]
    fn test_snapshot_of_missing_or_scalar_node_is_empty() {
        let path = StorePath::categories("alice").unwrap();
        assert!(Snapshot::from_value(path.clone(), None).is_empty());
        assert!(Snapshot::from_value(path, Some(&json!(true))).is_empty());
    }
}
