//! Shared utilities for CLI commands

use std::sync::Arc;

use recipebox_core::Recipe;
use recipebox_core::config::Config;
use recipebox_core::store::JsonFileStore;
use serde::Serialize;

use crate::cli::{CliSession, block_on};

/// Open the configured store and start a session on it.
/// Prints the error and returns `None` on failure.
pub fn open_session(config: &Config) -> Option<CliSession> {
    let store = match JsonFileStore::open(&config.store_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("✗ Could not open store: {}", e);
            return None;
        }
    };

    match CliSession::start(Arc::new(store), &config.user_nickname) {
        Ok(session) => Some(session),
        Err(e) => {
            eprintln!("✗ Could not start session: {}", e);
            None
        }
    }
}

/// Block until the store echoes the last write back to the session.
///
/// Only call this after a write succeeded; a rejected write produces no
/// snapshot.
pub fn await_echo(session: &mut CliSession) {
    match block_on(session.next_event()) {
        Some(event) => log::debug!("Store echoed write: {:?}", event),
        None => log::debug!("Session closed before the write was echoed"),
    }
}

/// Find a recipe by exact id, unique id prefix, or exact name (case-insensitive).
///
/// A blank query matches nothing.
pub fn resolve_recipe(session: &CliSession, query: &str) -> Result<Recipe, String> {
    let query = query.trim();
    if query.is_empty() {
        return Err("Give a recipe id or name".to_string());
    }
    let recipes = session.state().recipes();

    if let Some(recipe) = recipes.iter().find(|r| r.id == query) {
        return Ok(recipe.clone());
    }

    let by_prefix: Vec<&Recipe> = recipes.iter().filter(|r| r.id.starts_with(query)).collect();
    match by_prefix.len() {
        1 => return Ok(by_prefix[0].clone()),
        0 => {}
        n => return Err(format!("'{}' matches {} recipe ids, use more characters", query, n)),
    }

    let by_name: Vec<&Recipe> = recipes
        .iter()
        .filter(|r| r.name.eq_ignore_ascii_case(query))
        .collect();
    match by_name.as_slice() {
        [recipe] => Ok((*recipe).clone()),
        [] => Err(format!("No recipe matches '{}'", query)),
        many => Err(format!(
            "{} recipes are named '{}', use an id instead",
            many.len(),
            query
        )),
    }
}

/// One-line summary used in lists
pub fn recipe_line(recipe: &Recipe) -> String {
    let short_id: String = recipe.id.chars().take(8).collect();
    let mark = if recipe.bookmarked { "★" } else { " " };
    if recipe.categories.is_empty() {
        format!("{} {}  {}", mark, short_id, recipe.name)
    } else {
        let categories: Vec<&str> = recipe.categories.iter().map(String::as_str).collect();
        format!(
            "{} {}  {} [{}]",
            mark,
            short_id,
            recipe.name,
            categories.join(", ")
        )
    }
}

/// Print a list of recipes, one per line
pub fn print_recipe_list(recipes: &[Recipe]) {
    for recipe in recipes {
        println!("  {}", recipe_line(recipe));
    }
}

/// Print a recipe in full
pub fn print_recipe(recipe: &Recipe) {
    println!("{}", recipe.name);
    println!("{}", "=".repeat(recipe.name.chars().count()));
    println!("Id: {}", recipe.id);
    println!("Owner: {}", recipe.user_nickname);
    if !recipe.categories.is_empty() {
        let categories: Vec<&str> = recipe.categories.iter().map(String::as_str).collect();
        println!("Categories: {}", categories.join(", "));
    }
    if recipe.bookmarked {
        println!("Bookmarked: yes");
    }

    println!();
    println!("Ingredients:");
    if recipe.ingredients.is_empty() {
        println!("  (none)");
    }
    for line in &recipe.ingredients {
        println!("  - {}", line);
    }

    println!();
    println!("Method:");
    if recipe.method.is_empty() {
        println!("  (none)");
    }
    for (i, step) in recipe.method.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}

/// Print a value as pretty JSON. Returns false if it could not be encoded.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!("✗ Could not encode JSON: {}", e);
            false
        }
    }
}
