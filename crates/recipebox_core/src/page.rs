//! Page selection.
//!
//! A flat selector over the screens of the recipe feature. There is no
//! history stack: every page goes back to [`Page::Menu`], and a new session
//! always starts there.

use std::fmt;

use serde::Serialize;

use crate::filter;
use crate::model::Recipe;

/// What a [`Page::RecipeList`] was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ListSource {
    /// Recipes filed under a category.
    Category(String),
    /// Results of a name search.
    Search(String),
}

/// The page currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    /// Category buttons plus the add, bookmark, and search entries.
    #[default]
    Menu,
    /// The new-recipe form.
    AddRecipe,
    /// A filtered list of recipes.
    RecipeList {
        /// Where the list came from.
        source: ListSource,
        /// The recipes shown.
        recipes: Vec<Recipe>,
    },
    /// Bookmarked recipes.
    Bookmarks {
        /// The recipes shown.
        recipes: Vec<Recipe>,
    },
    /// One recipe in full.
    RecipeDetail {
        /// The recipe shown.
        recipe: Recipe,
    },
}

/// A user action that changes the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Open the new-recipe form.
    OpenAdd,
    /// Show recipes in a category.
    SelectCategory(String),
    /// Show bookmarked recipes.
    OpenBookmarks,
    /// Show a list of search results.
    ShowResults {
        /// The query that produced them.
        query: String,
        /// The matches.
        recipes: Vec<Recipe>,
    },
    /// Show one recipe.
    ShowRecipe(Recipe),
    /// Return to the menu.
    Back,
}

impl Page {
    /// The page reached by `nav`, with lists derived from `recipes`.
    pub fn navigate(&self, nav: Navigation, recipes: &[Recipe]) -> Page {
        let next = match nav {
            Navigation::OpenAdd => Page::AddRecipe,
            Navigation::SelectCategory(name) => Page::RecipeList {
                recipes: filter::by_category(recipes, &name),
                source: ListSource::Category(name),
            },
            Navigation::OpenBookmarks => Page::Bookmarks {
                recipes: filter::by_bookmark(recipes),
            },
            Navigation::ShowResults { query, recipes } => Page::RecipeList {
                source: ListSource::Search(query),
                recipes,
            },
            Navigation::ShowRecipe(recipe) => Page::RecipeDetail { recipe },
            Navigation::Back => Page::Menu,
        };
        log::debug!("Page: {} -> {}", self, next);
        next
    }

    /// Re-derive this page after a new recipe snapshot.
    ///
    /// Category and bookmark lists are recomputed. Search results stay as
    /// they were returned. A detail page follows its recipe by id and falls
    /// back to the menu if the recipe is gone.
    pub fn refresh(&self, recipes: &[Recipe]) -> Page {
        match self {
            Page::RecipeList {
                source: ListSource::Category(name),
                ..
            } => Page::RecipeList {
                source: ListSource::Category(name.clone()),
                recipes: filter::by_category(recipes, name),
            },
            Page::Bookmarks { .. } => Page::Bookmarks {
                recipes: filter::by_bookmark(recipes),
            },
            Page::RecipeDetail { recipe } => match recipes.iter().find(|r| r.id == recipe.id) {
                Some(current) => Page::RecipeDetail {
                    recipe: current.clone(),
                },
                None => {
                    log::debug!("Page: recipe {} removed, back to menu", recipe.id);
                    Page::Menu
                }
            },
            other => other.clone(),
        }
    }

    /// The recipe list shown on this page, if it has one.
    pub fn recipes(&self) -> Option<&[Recipe]> {
        match self {
            Page::RecipeList { recipes, .. } | Page::Bookmarks { recipes } => Some(recipes),
            _ => None,
        }
    }

    /// Whether this is the menu.
    pub fn is_menu(&self) -> bool {
        matches!(self, Page::Menu)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Menu => write!(f, "menu"),
            Page::AddRecipe => write!(f, "add recipe"),
            Page::RecipeList {
                source: ListSource::Category(name),
                ..
            } => write!(f, "category '{}'", name),
            Page::RecipeList {
                source: ListSource::Search(query),
                ..
            } => write!(f, "search '{}'", query),
            Page::Bookmarks { .. } => write!(f, "bookmarks"),
            Page::RecipeDetail { recipe } => write!(f, "recipe '{}'", recipe.name),
        }
    }
}
