//! Filtered views over the mirrored recipe list.
//!
//! Everything here is a pure function of its inputs: results are owned
//! clones in input order, and the input slice is never modified.

use serde::Serialize;

use crate::model::Recipe;

/// Recipes filed under `category`.
pub fn by_category(recipes: &[Recipe], category: &str) -> Vec<Recipe> {
    recipes
        .iter()
        .filter(|r| r.in_category(category))
        .cloned()
        .collect()
}

/// Bookmarked recipes.
pub fn by_bookmark(recipes: &[Recipe]) -> Vec<Recipe> {
    recipes.iter().filter(|r| r.bookmarked).cloned().collect()
}

/// Recipes whose name contains `query`, ignoring case.
///
/// A blank query matches everything.
pub fn by_substring(recipes: &[Recipe], query: &str) -> Vec<Recipe> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return recipes.to_vec();
    }
    recipes
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// What a name search found, shaped by how the caller should react.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "recipes", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Nothing matched.
    NoResults,
    /// Exactly one match; show it directly.
    Single(Recipe),
    /// Two or more matches; show the list.
    Many(Vec<Recipe>),
}

impl SearchOutcome {
    /// Classify a list of matches.
    pub fn from_matches(mut matches: Vec<Recipe>) -> Self {
        match matches.len() {
            0 => SearchOutcome::NoResults,
            1 => SearchOutcome::Single(matches.remove(0)),
            _ => SearchOutcome::Many(matches),
        }
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::NoResults => 0,
            SearchOutcome::Single(_) => 1,
            SearchOutcome::Many(recipes) => recipes.len(),
        }
    }

    /// True for [`SearchOutcome::NoResults`].
    pub fn is_empty(&self) -> bool {
        matches!(self, SearchOutcome::NoResults)
    }
}

/// Search recipe names for `query`.
pub fn search(recipes: &[Recipe], query: &str) -> SearchOutcome {
    SearchOutcome::from_matches(by_substring(recipes, query))
}
