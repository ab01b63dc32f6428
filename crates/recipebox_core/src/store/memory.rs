//! In-memory store implementation.
//!
//! This provides an in-memory [`CollectionStore`] holding a single JSON
//! tree. It backs unit tests and the file store, and carries simple access
//! rules so that rejected listeners and rejected writes can be exercised
//! without a network.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde_json::{Map, Value};

use super::registry::{ErrorCallback, ListenerRegistry, SnapshotCallback, SubscriptionId};
use super::{CollectionStore, Snapshot, StorePath, StoreResult, SubscriptionError};
use crate::error::RecipeBoxError;

/// In-memory JSON tree with change listeners.
///
/// Cloning a `MemoryStore` yields a handle onto the same tree and listeners.
/// Empty objects and `null` values are pruned on write, so a node exists
/// only while it holds data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    root: RwLock<Value>,
    listeners: ListenerRegistry,
    /// Held from taking a snapshot until every listener has received it
    delivery: Mutex<()>,
    /// Paths readers may not listen to, with the reported reason
    read_rules: RwLock<Vec<(StorePath, String)>>,
    /// Paths writers may not touch, with the reported reason
    write_rules: RwLock<Vec<(StorePath, String)>>,
}

/// A snapshot ready to be handed to one listener.
struct Delivery {
    id: SubscriptionId,
    callback: SnapshotCallback,
    snapshot: Snapshot,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `value` as its root.
    pub fn from_value(value: Value) -> Self {
        let mut root = value;
        prune(&mut root);
        let store = Self::default();
        *store.inner.root.write().unwrap_or_else(|e| e.into_inner()) = root;
        store
    }

    /// Copy of the whole tree.
    pub fn to_value(&self) -> Value {
        self.inner
            .root
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Refuse reads at `path` (and anything overlapping it).
    ///
    /// Active listeners that overlap `path` are cancelled: each receives
    /// its error callback once and is removed. Later subscriptions are
    /// rejected the same way.
    pub fn deny_read(&self, path: &StorePath, reason: impl Into<String>) {
        let reason = reason.into();
        let _delivery = self.lock_delivery();
        self.inner
            .read_rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.clone(), reason.clone()));

        let cancelled = self.inner.listeners.drain_overlapping(path);
        for (id, listener) in cancelled {
            log::debug!("MemoryStore: cancelling listener {} at {}", id, listener.path);
            (listener.on_error)(&SubscriptionError {
                path: listener.path.clone(),
                reason: reason.clone(),
            });
        }
    }

    /// Refuse writes at `path` (and anything overlapping it).
    pub fn deny_write(&self, path: &StorePath, reason: impl Into<String>) {
        self.inner
            .write_rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.clone(), reason.into()));
    }

    /// Drop all access rules. Cancelled listeners stay cancelled.
    pub fn clear_rules(&self) {
        self.inner
            .read_rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.inner
            .write_rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn rule_for(rules: &RwLock<Vec<(StorePath, String)>>, path: &StorePath) -> Option<String> {
        rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|(rule, _)| rule.overlaps(path))
            .map(|(_, reason)| reason.clone())
    }

    fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        self.inner.delivery.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write `value` at `path`, then notify every overlapping listener.
    ///
    /// `before_commit` sees the whole tree as it will be after the write.
    /// If it fails the tree is left untouched and nobody is notified.
    /// Writers are serialized from computing the new tree until the last
    /// callback returns, so listeners see snapshots in commit order.
    pub(super) fn write_checked<C>(
        &self,
        path: &StorePath,
        value: Value,
        before_commit: C,
    ) -> StoreResult<()>
    where
        C: FnOnce(&Value) -> StoreResult<()>,
    {
        if let Some(reason) = Self::rule_for(&self.inner.write_rules, path) {
            log::debug!("MemoryStore: write to {} rejected: {}", path, reason);
            return Err(RecipeBoxError::WriteRejected {
                path: path.to_string(),
                reason,
            });
        }

        let _delivery = self.lock_delivery();
        let deliveries: Vec<Delivery> = {
            let mut root = self.inner.root.write().unwrap_or_else(|e| e.into_inner());
            let mut next = root.clone();
            set_at(&mut next, path.segments(), value);
            prune(&mut next);
            before_commit(&next)?;
            *root = next;

            self.inner
                .listeners
                .affected_by(path)
                .into_iter()
                .map(|(id, listener)| Delivery {
                    id,
                    snapshot: Snapshot::from_value(
                        listener.path.clone(),
                        value_at(&root, &listener.path),
                    ),
                    callback: listener.on_snapshot,
                })
                .collect()
        };

        for delivery in deliveries {
            // Skip listeners removed while earlier callbacks ran.
            if self.inner.listeners.get(delivery.id).is_none() {
                continue;
            }
            (delivery.callback)(&delivery.snapshot);
        }
        Ok(())
    }
}

impl CollectionStore for MemoryStore {
    fn subscribe(
        &self,
        path: &StorePath,
        on_snapshot: SnapshotCallback,
        on_error: ErrorCallback,
    ) -> SubscriptionId {
        if let Some(reason) = Self::rule_for(&self.inner.read_rules, path) {
            let id = self.inner.listeners.reserve_id();
            log::debug!("MemoryStore: listener {} at {} rejected: {}", id, path, reason);
            on_error(&SubscriptionError {
                path: path.clone(),
                reason,
            });
            return id;
        }

        let _delivery = self.lock_delivery();
        let (id, snapshot) = {
            let root = self.inner.root.read().unwrap_or_else(|e| e.into_inner());
            let id = self
                .inner
                .listeners
                .register(path.clone(), Arc::clone(&on_snapshot), on_error);
            (id, Snapshot::from_value(path.clone(), value_at(&root, path)))
        };

        log::debug!(
            "MemoryStore: listener {} at {} ({} children)",
            id,
            path,
            snapshot.len()
        );
        on_snapshot(&snapshot);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.remove(id).is_some()
    }

    fn set(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        self.write_checked(path, value, |_| Ok(()))
    }

    fn remove(&self, path: &StorePath) -> StoreResult<()> {
        self.write_checked(path, Value::Null, |_| Ok(()))
    }

    fn get(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        if let Some(reason) = Self::rule_for(&self.inner.read_rules, path) {
            return Err(RecipeBoxError::Subscription {
                path: path.to_string(),
                reason,
            });
        }
        let root = self.inner.root.read().unwrap_or_else(|e| e.into_inner());
        Ok(value_at(&root, path).cloned())
    }
}

/// Walk `path` down from `root`.
fn value_at<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() { None } else { Some(current) }
}

/// Replace the value at `segments`, creating intermediate objects.
///
/// Non-object intermediates are overwritten, as the hosted database does
/// when a child is written beneath a scalar.
fn set_at(root: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *root = value;
        return;
    };

    if !root.is_object() {
        if value.is_null() {
            return;
        }
        *root = Value::Object(Map::new());
    }
    let Value::Object(map) = root else {
        return;
    };

    if rest.is_empty() {
        if value.is_null() {
            map.remove(first);
        } else {
            map.insert(first.clone(), value);
        }
        return;
    }

    match map.get_mut(first) {
        Some(child) => set_at(child, rest, value),
        None if value.is_null() => {}
        None => {
            let mut child = Value::Object(Map::new());
            set_at(&mut child, rest, value);
            map.insert(first.clone(), child);
        }
    }
}

/// Remove nulls and empty objects, bottom-up.
fn prune(value: &mut Value) {
    if let Value::Object(map) = value {
        for child in map.values_mut() {
            prune(child);
        }
        map.retain(|_, child| match child {
            Value::Null => false,
            Value::Object(m) => !m.is_empty(),
            _ => true,
        });
        if map.is_empty() {
            *value = Value::Null;
        }
    }
}
