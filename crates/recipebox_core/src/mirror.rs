//! Remote collection mirror.
//!
//! A [`Mirror`] listens to a user's `categories` and `recipes` nodes and
//! turns every snapshot into a typed [`MirrorEvent`] on an unbounded
//! channel. Each event carries the complete decoded collection, so the
//! consumer replaces its local copy wholesale; there are no deltas.
//!
//! ```text
//! store listener ──snapshot──> decode ──MirrorEvent──> channel ──> SessionState::apply
//! ```
//!
//! The mirror never touches view state itself. Dropping it (or calling
//! [`Mirror::unsubscribe`]) releases both listeners.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::model::Recipe;
use crate::store::{
    CollectionStore, ErrorCallback, Snapshot, SnapshotCallback, StorePath, SubscriptionError,
    SubscriptionId,
};

/// The two mirrored collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `users/{user}/categories`
    Categories,
    /// `users/{user}/recipes`
    Recipes,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Categories => write!(f, "categories"),
            Collection::Recipes => write!(f, "recipes"),
        }
    }
}

/// A change delivered by the mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorEvent {
    /// Full list of category names, in store order.
    CategoriesChanged(Vec<String>),
    /// Every recipe that decoded, in store order.
    RecipesChanged(Vec<Recipe>),
    /// The store rejected or cancelled a listener. No further events will
    /// arrive for that collection.
    SubscriptionFailed {
        /// Which collection lost its listener.
        collection: Collection,
        /// Store-provided reason.
        reason: String,
    },
}

/// Receiving end of a mirror's events.
pub type MirrorEvents = mpsc::UnboundedReceiver<MirrorEvent>;

/// Category names in a snapshot, in iteration order.
pub fn decode_categories(snapshot: &Snapshot) -> Vec<String> {
    snapshot.keys().map(String::from).collect()
}

/// Recipes in a snapshot, in iteration order.
///
/// Entries that fail to decode are logged and skipped.
pub fn decode_recipes(snapshot: &Snapshot) -> Vec<Recipe> {
    snapshot
        .children()
        .iter()
        .filter_map(|(key, value)| match Recipe::decode(key, value) {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                log::warn!(
                    "Skipping recipe '{}' at {}: {}",
                    key,
                    snapshot.path(),
                    e
                );
                None
            }
        })
        .collect()
}

/// Live subscription to one user's categories and recipes.
pub struct Mirror<S: CollectionStore> {
    store: Arc<S>,
    user: String,
    subscriptions: Vec<SubscriptionId>,
}

impl<S: CollectionStore> Mirror<S> {
    /// Register both listeners for `user`.
    ///
    /// The store delivers the current contents immediately, so by the time
    /// this returns the receiver already holds one event per collection
    /// (or a failure event).
    pub fn subscribe(store: Arc<S>, user: &str) -> Result<(Self, MirrorEvents)> {
        let categories = StorePath::categories(user)?;
        let recipes = StorePath::recipes(user)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let subscriptions = vec![
            store.subscribe(
                &categories,
                categories_callback(tx.clone()),
                error_callback(Collection::Categories, tx.clone()),
            ),
            store.subscribe(
                &recipes,
                recipes_callback(tx.clone()),
                error_callback(Collection::Recipes, tx),
            ),
        ];

        log::info!("Mirror: subscribed to {} and {}", categories, recipes);
        Ok((
            Self {
                store,
                user: user.to_string(),
                subscriptions,
            },
            rx,
        ))
    }

    /// The user this mirror is scoped to.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Whether listeners are still held.
    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Release both listeners. Safe to call more than once.
    pub fn unsubscribe(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for id in self.subscriptions.drain(..) {
            self.store.unsubscribe(id);
        }
        log::info!("Mirror: unsubscribed for user {}", self.user);
    }
}

impl<S: CollectionStore> Drop for Mirror<S> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl<S: CollectionStore> fmt::Debug for Mirror<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror")
            .field("user", &self.user)
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

fn send(tx: &mpsc::UnboundedSender<MirrorEvent>, event: MirrorEvent) {
    if tx.send(event).is_err() {
        log::debug!("Mirror: receiver dropped, discarding event");
    }
}

fn categories_callback(tx: mpsc::UnboundedSender<MirrorEvent>) -> SnapshotCallback {
    Arc::new(move |snapshot: &Snapshot| {
        let categories = decode_categories(snapshot);
        log::debug!("Mirror: {} categories at {}", categories.len(), snapshot.path());
        send(&tx, MirrorEvent::CategoriesChanged(categories));
    })
}

fn recipes_callback(tx: mpsc::UnboundedSender<MirrorEvent>) -> SnapshotCallback {
    Arc::new(move |snapshot: &Snapshot| {
        let recipes = decode_recipes(snapshot);
        log::debug!(
            "Mirror: {} of {} recipes decoded at {}",
            recipes.len(),
            snapshot.len(),
            snapshot.path()
        );
        send(&tx, MirrorEvent::RecipesChanged(recipes));
    })
}

fn error_callback(
    collection: Collection,
    tx: mpsc::UnboundedSender<MirrorEvent>,
) -> ErrorCallback {
    Arc::new(move |err: &SubscriptionError| {
        log::warn!("Mirror: {} listener failed: {}", collection, err);
        send(
            &tx,
            MirrorEvent::SubscriptionFailed {
                collection,
                reason: err.reason.clone(),
            },
        );
    })
}
