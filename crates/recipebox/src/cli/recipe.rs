//! Recipe command handlers

use recipebox_core::RecipeDraft;
use recipebox_core::config::Config;
use recipebox_core::page::Page;

use crate::cli::args::RecipeCommands;
use crate::cli::util::{
    await_echo, open_session, print_json, print_recipe, print_recipe_list, resolve_recipe,
};

/// Handle recipe subcommands
pub fn handle_recipe_command(command: RecipeCommands, config: &Config) -> bool {
    match command {
        RecipeCommands::Add {
            name,
            ingredients,
            steps,
            categories,
            bookmark,
        } => {
            let mut draft = RecipeDraft::new(name).bookmarked(bookmark);
            draft.ingredients = ingredients;
            draft.method = steps;
            draft.categories = categories.into_iter().collect();
            handle_add(config, draft)
        }

        RecipeCommands::List {
            category,
            bookmarked,
            json,
        } => handle_list(config, category.as_deref(), bookmarked, json),

        RecipeCommands::Show { recipe, json } => handle_show(config, &recipe, json),

        RecipeCommands::Bookmark { recipe, off } => handle_bookmark(config, &recipe, !off),

        RecipeCommands::Delete { recipe } => handle_delete(config, &recipe),
    }
}

/// Handle the 'recipe add' command
fn handle_add(config: &Config, draft: RecipeDraft) -> bool {
    let Some(mut session) = open_session(config) else {
        return false;
    };

    let unknown: Vec<&String> = draft
        .categories
        .iter()
        .filter(|c| !session.state().categories().contains(*c))
        .collect();
    if !unknown.is_empty() {
        log::warn!("Filing under categories that do not exist yet: {:?}", unknown);
    }

    session.open_add();
    match session.add_recipe(draft) {
        Ok(recipe) => {
            await_echo(&mut session);
            println!("✓ Added recipe '{}'", recipe.name);
            println!("  Id: {}", recipe.id);
            true
        }
        Err(e) => {
            eprintln!("✗ Error adding recipe: {}", e);
            false
        }
    }
}

/// Handle the 'recipe list' command
fn handle_list(config: &Config, category: Option<&str>, bookmarked: bool, json: bool) -> bool {
    let Some(mut session) = open_session(config) else {
        return false;
    };

    if let Some(category) = category {
        session.select_category(category);
    } else if bookmarked {
        session.open_bookmarks();
    }

    let state = session.state();
    let recipes = state.page().recipes().unwrap_or(state.recipes());

    if json {
        return print_json(recipes);
    }

    if recipes.is_empty() {
        match state.page() {
            Page::Menu => println!("No recipes yet."),
            page => println!("No recipes in {}.", page),
        }
        return true;
    }

    print_recipe_list(recipes);
    true
}

/// Handle the 'recipe show' command
fn handle_show(config: &Config, query: &str, json: bool) -> bool {
    let Some(mut session) = open_session(config) else {
        return false;
    };

    let recipe = match resolve_recipe(&session, query) {
        Ok(recipe) => recipe,
        Err(message) => {
            eprintln!("✗ {}", message);
            return false;
        }
    };

    if let Err(e) = session.open_recipe(&recipe.id) {
        eprintln!("✗ {}", e);
        return false;
    }

    match session.state().page() {
        Page::RecipeDetail { recipe } if json => print_json(recipe),
        Page::RecipeDetail { recipe } => {
            print_recipe(recipe);
            true
        }
        page => {
            eprintln!("✗ Expected a recipe page, got {}", page);
            false
        }
    }
}

/// Handle the 'recipe bookmark' command
fn handle_bookmark(config: &Config, query: &str, bookmarked: bool) -> bool {
    let Some(mut session) = open_session(config) else {
        return false;
    };

    let recipe = match resolve_recipe(&session, query) {
        Ok(recipe) => recipe,
        Err(message) => {
            eprintln!("✗ {}", message);
            return false;
        }
    };

    if recipe.bookmarked == bookmarked {
        println!("  '{}' is already {}", recipe.name, bookmark_word(bookmarked));
        return true;
    }

    match session.set_bookmarked(&recipe.id, bookmarked) {
        Ok(updated) => {
            await_echo(&mut session);
            println!("✓ '{}' {}", updated.name, bookmark_word(bookmarked));
            true
        }
        Err(e) => {
            eprintln!("✗ Error updating bookmark: {}", e);
            false
        }
    }
}

fn bookmark_word(bookmarked: bool) -> &'static str {
    if bookmarked { "bookmarked" } else { "not bookmarked" }
}

/// Handle the 'recipe delete' command
fn handle_delete(config: &Config, query: &str) -> bool {
    let Some(mut session) = open_session(config) else {
        return false;
    };

    let recipe = match resolve_recipe(&session, query) {
        Ok(recipe) => recipe,
        Err(message) => {
            eprintln!("✗ {}", message);
            return false;
        }
    };

    match session.delete_recipe(&recipe.id) {
        Ok(()) => {
            await_echo(&mut session);
            println!("✓ Deleted recipe '{}'", recipe.name);
            true
        }
        Err(e) => {
            eprintln!("✗ Error deleting recipe: {}", e);
            false
        }
    }
}
