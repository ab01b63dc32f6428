//! One visit to the recipe feature.
//!
//! [`SessionState`] is the only owner of the mirrored lists and the view
//! state derived from them. Mirror events reach it through
//! [`SessionState::apply`] and nowhere else, so a write issued by
//! [`RecipeSession`] never changes local lists directly: the store echoes
//! the change back as a snapshot, and the next [`RecipeSession::pump`]
//! (or [`RecipeSession::next_event`]) picks it up.
//!
//! ```text
//! action ──write──> store ──snapshot──> Mirror ──event──> SessionState::apply
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::error::{RecipeBoxError, Result};
use crate::filter::{self, SearchOutcome};
use crate::mirror::{Mirror, MirrorEvent, MirrorEvents};
use crate::model::{Recipe, RecipeDraft, validate_category_name};
use crate::page::{Navigation, Page};
use crate::store::{CollectionStore, StorePath};

/// State of the add-category dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDialog {
    /// Name last submitted.
    pub draft: String,
    /// Why the last submission failed.
    pub error: Option<String>,
}

/// State of the search dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchDialog {
    /// Query last submitted.
    pub query: String,
    /// The last query matched nothing.
    pub no_results: bool,
}

/// Everything the recipe screens render from.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    user: String,
    categories: Vec<String>,
    recipes: Vec<Recipe>,
    page: Page,
    category_dialog: Option<CategoryDialog>,
    search_dialog: Option<SearchDialog>,
    categories_loaded: bool,
    recipes_loaded: bool,
}

impl SessionState {
    /// Empty state on the menu page.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            categories: Vec::new(),
            recipes: Vec::new(),
            page: Page::Menu,
            category_dialog: None,
            search_dialog: None,
            categories_loaded: false,
            recipes_loaded: false,
        }
    }

    /// Fold one mirror event into the state.
    ///
    /// Lists are replaced wholesale. A new recipe list also refreshes the
    /// current page. A subscription failure changes nothing: the lists keep
    /// whatever they last held.
    pub fn apply(&mut self, event: MirrorEvent) {
        match event {
            MirrorEvent::CategoriesChanged(categories) => {
                self.categories = categories;
                self.categories_loaded = true;
            }
            MirrorEvent::RecipesChanged(recipes) => {
                self.recipes = recipes;
                self.recipes_loaded = true;
                self.page = self.page.refresh(&self.recipes);
            }
            MirrorEvent::SubscriptionFailed { collection, reason } => {
                log::debug!(
                    "Session: keeping stale {} after failure: {}",
                    collection,
                    reason
                );
            }
        }
    }

    /// The user this state belongs to.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Category names, in store order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// All mirrored recipes, in store order.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Mirrored recipe with the given id.
    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Current page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The add-category dialog, if open.
    pub fn category_dialog(&self) -> Option<&CategoryDialog> {
        self.category_dialog.as_ref()
    }

    /// The search dialog, if open.
    pub fn search_dialog(&self) -> Option<&SearchDialog> {
        self.search_dialog.as_ref()
    }

    /// Both collections have delivered at least one snapshot.
    pub fn is_loaded(&self) -> bool {
        self.categories_loaded && self.recipes_loaded
    }

    fn navigate(&mut self, nav: Navigation) {
        self.page = self.page.navigate(nav, &self.recipes);
    }
}

/// A live session: the mirror, its event stream, and the state it feeds.
///
/// Dropping the session releases the store listeners.
pub struct RecipeSession<S: CollectionStore> {
    store: Arc<S>,
    mirror: Mirror<S>,
    events: MirrorEvents,
    state: SessionState,
}

impl<S: CollectionStore> RecipeSession<S> {
    /// Subscribe to `user`'s collections and apply the initial snapshots.
    pub fn start(store: Arc<S>, user: &str) -> Result<Self> {
        let (mirror, events) = Mirror::subscribe(Arc::clone(&store), user)?;
        let mut session = Self {
            store,
            mirror,
            events,
            state: SessionState::new(user),
        };
        session.pump();
        log::info!(
            "Session: started for {} ({} categories, {} recipes)",
            user,
            session.state.categories.len(),
            session.state.recipes.len()
        );
        Ok(session)
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The store this session writes to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Whether the mirror still holds its listeners.
    pub fn is_active(&self) -> bool {
        self.mirror.is_active()
    }

    /// Apply every event already queued. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.state.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it.
    ///
    /// Returns `None` once the session has ended and the channel is empty.
    pub async fn next_event(&mut self) -> Option<MirrorEvent> {
        let event = self.events.recv().await?;
        self.state.apply(event.clone());
        Some(event)
    }

    /// Release the listeners and discard anything still queued.
    pub fn end(&mut self) {
        if !self.mirror.is_active() {
            return;
        }
        self.mirror.unsubscribe();
        self.events.close();
        while self.events.try_recv().is_ok() {}
        log::info!("Session: ended for {}", self.state.user);
    }

    // Page actions

    /// Show the new-recipe form.
    pub fn open_add(&mut self) {
        self.state.navigate(Navigation::OpenAdd);
    }

    /// Show the recipes in `category`.
    pub fn select_category(&mut self, category: &str) {
        self.state
            .navigate(Navigation::SelectCategory(category.to_string()));
    }

    /// Show bookmarked recipes.
    pub fn open_bookmarks(&mut self) {
        self.state.navigate(Navigation::OpenBookmarks);
    }

    /// Show one mirrored recipe.
    pub fn open_recipe(&mut self, id: &str) -> Result<()> {
        let recipe = self
            .state
            .recipe(id)
            .cloned()
            .ok_or_else(|| RecipeBoxError::RecipeNotFound(id.to_string()))?;
        self.state.navigate(Navigation::ShowRecipe(recipe));
        Ok(())
    }

    /// Return to the menu.
    pub fn back(&mut self) {
        self.state.navigate(Navigation::Back);
    }

    // Category dialog

    /// Open the add-category dialog with an empty draft.
    pub fn open_category_dialog(&mut self) {
        self.state.category_dialog = Some(CategoryDialog::default());
    }

    /// Dismiss the add-category dialog.
    pub fn close_category_dialog(&mut self) {
        self.state.category_dialog = None;
    }

    /// Create a category.
    ///
    /// Blank and duplicate names are rejected without touching the store.
    /// On success the dialog closes; on any failure it stays open with the
    /// error recorded so the user can retry. Returns the stored name.
    pub fn add_category(&mut self, name: &str) -> Result<String> {
        let result = validate_category_name(name, &self.state.categories).and_then(|name| {
            let path = StorePath::category(&self.state.user, &name)?;
            self.store.set(&path, serde_json::Value::Bool(true))?;
            Ok(name)
        });

        match &result {
            Ok(stored) => {
                log::info!("Session: added category '{}'", stored);
                self.state.category_dialog = None;
            }
            Err(e) => {
                log::debug!("Session: add category '{}' failed: {}", name, e);
                self.state.category_dialog = Some(CategoryDialog {
                    draft: name.to_string(),
                    error: Some(e.to_string()),
                });
            }
        }
        result
    }

    // Recipe writes

    /// Create a recipe owned by the session user.
    ///
    /// Returns to the menu on success. On failure the page is unchanged, so
    /// an open form stays open.
    pub fn add_recipe(&mut self, draft: RecipeDraft) -> Result<Recipe> {
        let recipe = draft.into_recipe(&self.state.user)?;
        self.write_recipe(&recipe)?;
        log::info!("Session: added recipe '{}' ({})", recipe.name, recipe.id);
        self.state.navigate(Navigation::Back);
        Ok(recipe)
    }

    /// Replace a mirrored recipe with `recipe`.
    pub fn update_recipe(&mut self, recipe: Recipe) -> Result<()> {
        if recipe.name.trim().is_empty() {
            return Err(RecipeBoxError::BlankRecipeName);
        }
        if self.state.recipe(&recipe.id).is_none() {
            return Err(RecipeBoxError::RecipeNotFound(recipe.id));
        }
        self.write_recipe(&recipe)
    }

    /// Set or clear the bookmark on a mirrored recipe.
    pub fn set_bookmarked(&mut self, id: &str, bookmarked: bool) -> Result<Recipe> {
        let recipe = self
            .state
            .recipe(id)
            .map(|r| r.with_bookmarked(bookmarked))
            .ok_or_else(|| RecipeBoxError::RecipeNotFound(id.to_string()))?;
        self.write_recipe(&recipe)?;
        Ok(recipe)
    }

    /// Remove a mirrored recipe from the store.
    pub fn delete_recipe(&mut self, id: &str) -> Result<()> {
        if self.state.recipe(id).is_none() {
            return Err(RecipeBoxError::RecipeNotFound(id.to_string()));
        }
        let path = StorePath::recipe(&self.state.user, id)?;
        self.store.remove(&path)?;
        log::info!("Session: deleted recipe {}", id);
        Ok(())
    }

    fn write_recipe(&self, recipe: &Recipe) -> Result<()> {
        let path = StorePath::recipe(&self.state.user, &recipe.id)?;
        self.store.set(&path, recipe.to_value()?)
    }

    // Search dialog

    /// Open the search dialog.
    pub fn open_search_dialog(&mut self) {
        self.state.search_dialog = Some(SearchDialog::default());
    }

    /// Dismiss the search dialog.
    pub fn close_search_dialog(&mut self) {
        self.state.search_dialog = None;
    }

    /// Search recipe names and move to whatever the result calls for.
    ///
    /// No match keeps the dialog open and flags it. One match closes the
    /// dialog and shows that recipe. Several close it and show the list.
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        let outcome = filter::search(&self.state.recipes, query);
        log::debug!("Session: search '{}' matched {}", query, outcome.len());

        match &outcome {
            SearchOutcome::NoResults => {
                self.state.search_dialog = Some(SearchDialog {
                    query: query.to_string(),
                    no_results: true,
                });
            }
            SearchOutcome::Single(recipe) => {
                self.state.search_dialog = None;
                self.state.navigate(Navigation::ShowRecipe(recipe.clone()));
            }
            SearchOutcome::Many(recipes) => {
                self.state.search_dialog = None;
                self.state.navigate(Navigation::ShowResults {
                    query: query.to_string(),
                    recipes: recipes.clone(),
                });
            }
        }
        outcome
    }
}

impl<S: CollectionStore> std::fmt::Debug for RecipeSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeSession")
            .field("mirror", &self.mirror)
            .field("state", &self.state)
            .finish()
    }
}
