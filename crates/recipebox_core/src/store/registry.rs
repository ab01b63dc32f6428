//! Listener registry for store subscriptions.
//!
//! Stores keep their listeners here. Each listener is registered at a
//! [`StorePath`] and holds a snapshot callback plus an error callback.
//! Lookups hand back cloned callbacks so that stores can invoke them
//! after releasing the registry lock; a callback that writes back into the
//! store must not deadlock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::{Snapshot, StorePath, SubscriptionError};

/// A unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback receiving the full snapshot of the subscribed node.
///
/// Callbacks run on the writer's thread and should not block for extended periods.
pub type SnapshotCallback = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Callback receiving a rejection or cancellation of the subscription.
pub type ErrorCallback = Arc<dyn Fn(&SubscriptionError) + Send + Sync>;

/// A registered listener.
#[derive(Clone)]
pub struct Listener {
    /// Path the listener watches.
    pub path: StorePath,
    /// Snapshot delivery.
    pub on_snapshot: SnapshotCallback,
    /// Failure delivery.
    pub on_error: ErrorCallback,
}

/// Thread-safe registry of store listeners.
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<SubscriptionId, Listener>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate an id without registering anything.
    ///
    /// Used for listeners that are rejected up front: the caller still gets
    /// an id back, and unsubscribing it is a harmless no-op.
    pub fn reserve_id(&self) -> SubscriptionId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Register a listener and return its id.
    pub fn register(
        &self,
        path: StorePath,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> SubscriptionId {
        let id = self.reserve_id();
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.insert(
            id,
            Listener {
                path,
                on_snapshot,
                on_error,
            },
        );
        id
    }

    /// Remove a listener.
    ///
    /// Returns the listener if it was still registered.
    pub fn remove(&self, id: SubscriptionId) -> Option<Listener> {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.remove(&id)
    }

    /// Look up a single listener.
    pub fn get(&self, id: SubscriptionId) -> Option<Listener> {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        listeners.get(&id).cloned()
    }

    /// All listeners whose path overlaps `changed`, ordered by id.
    pub fn affected_by(&self, changed: &StorePath) -> Vec<(SubscriptionId, Listener)> {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        let mut hits: Vec<_> = listeners
            .iter()
            .filter(|(_, l)| l.path.overlaps(changed))
            .map(|(id, l)| (*id, l.clone()))
            .collect();
        hits.sort_by_key(|(id, _)| *id);
        hits
    }

    /// Remove and return all listeners whose path overlaps `path`, ordered by id.
    pub fn drain_overlapping(&self, path: &StorePath) -> Vec<(SubscriptionId, Listener)> {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let ids: Vec<SubscriptionId> = listeners
            .iter()
            .filter(|(_, l)| l.path.overlaps(path))
            .map(|(id, _)| *id)
            .collect();
        let mut drained: Vec<_> = ids
            .into_iter()
            .filter_map(|id| listeners.remove(&id).map(|l| (id, l)))
            .collect();
        drained.sort_by_key(|(id, _)| *id);
        drained
    }

    /// Get the number of active listeners.
    pub fn len(&self) -> usize {
        let listeners = self.listeners.read().unwrap_or_else(|e| e.into_inner());
        listeners.len()
    }

    /// Check if there are no active listeners.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all listeners.
    pub fn clear(&self) {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        listeners.clear();
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &self.len())
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn noop_snapshot() -> SnapshotCallback {
        Arc::new(|_snapshot| {})
    }

    fn noop_error() -> ErrorCallback {
        Arc::new(|_err| {})
    }

    #[test]
    fn test_register_and_remove() {
        let registry = ListenerRegistry::new();
        let path = StorePath::recipes("alice").unwrap();
        let id = registry.register(path, noop_snapshot(), noop_error());

        assert_eq!(registry.len(), 1);
        assert!(registry.remove(id).is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn test_remove_nonexistent() {
        let registry = ListenerRegistry::new();
        assert!(registry.remove(999).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = ListenerRegistry::new();
        let path = StorePath::recipes("alice").unwrap();
        let a = registry.register(path.clone(), noop_snapshot(), noop_error());
        let b = registry.reserve_id();
        let c = registry.register(path, noop_snapshot(), noop_error());
        assert!(a != b && b != c && a != c);
    }

    #[test]
    fn test_affected_by_matches_ancestors_and_descendants() {
        let registry = ListenerRegistry::new();
        let recipes = registry.register(
            StorePath::recipes("alice").unwrap(),
            noop_snapshot(),
            noop_error(),
        );
        let _cats = registry.register(
            StorePath::categories("alice").unwrap(),
            noop_snapshot(),
            noop_error(),
        );

        let hits = registry.affected_by(&StorePath::recipe("alice", "r1").unwrap());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, recipes);

        let hits = registry.affected_by(&StorePath::user("alice").unwrap());
        assert_eq!(hits.len(), 2);

        let hits = registry.affected_by(&StorePath::user("bob").unwrap());
        assert!(hits.is_empty());
    }

    #[test]
    fn test_drain_overlapping_removes_only_matching() {
        let registry = ListenerRegistry::new();
        registry.register(
            StorePath::recipes("alice").unwrap(),
            noop_snapshot(),
            noop_error(),
        );
        registry.register(
            StorePath::recipes("bob").unwrap(),
            noop_snapshot(),
            noop_error(),
        );

        let drained = registry.drain_overlapping(&StorePath::user("alice").unwrap());
        assert_eq!(drained.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_cloned_callbacks_are_invocable_after_lookup() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let path = StorePath::recipes("alice").unwrap();
        let id = registry.register(
            path.clone(),
            Arc::new(move |_snapshot| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
            noop_error(),
        );

        let listener = registry.get(id).unwrap();
        (listener.on_snapshot)(&Snapshot::from_value(path, None));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
