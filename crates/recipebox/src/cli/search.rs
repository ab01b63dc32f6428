//! Search command handler

use recipebox_core::config::Config;
use recipebox_core::filter::SearchOutcome;
use recipebox_core::page::Page;

use crate::cli::util::{open_session, print_json, print_recipe, print_recipe_list};

/// Handle the search command
pub fn handle_search(config: &Config, query: &str, json: bool) -> bool {
    let Some(mut session) = open_session(config) else {
        return false;
    };

    session.open_search_dialog();
    let outcome = session.search(query);

    if json {
        return print_json(&outcome);
    }

    match (&outcome, session.state().page()) {
        (SearchOutcome::NoResults, _) => {
            println!("No recipes match '{}'.", query);
        }
        (SearchOutcome::Single(_), Page::RecipeDetail { recipe }) => {
            print_recipe(recipe);
        }
        (SearchOutcome::Many(_), Page::RecipeList { recipes, .. }) => {
            println!("{} recipes match '{}':\n", recipes.len(), query);
            print_recipe_list(recipes);
        }
        (_, page) => {
            log::warn!("Search landed on unexpected page {}", page);
        }
    }
    true
}
