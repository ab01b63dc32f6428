//! Category command handlers

use recipebox_core::config::Config;
use recipebox_core::filter;

use crate::cli::args::CategoryCommands;
use crate::cli::util::{await_echo, open_session};

/// Handle category subcommands
pub fn handle_category_command(command: CategoryCommands, config: &Config) -> bool {
    match command {
        CategoryCommands::Add { name } => handle_add(config, &name),
        CategoryCommands::List => handle_list(config),
    }
}

/// Handle the 'category add' command
fn handle_add(config: &Config, name: &str) -> bool {
    let Some(mut session) = open_session(config) else {
        return false;
    };

    session.open_category_dialog();
    match session.add_category(name) {
        Ok(stored) => {
            await_echo(&mut session);
            println!("✓ Added category '{}'", stored);
            true
        }
        Err(e) => {
            let message = session
                .state()
                .category_dialog()
                .and_then(|d| d.error.clone())
                .unwrap_or_else(|| e.to_string());
            eprintln!("✗ {}", message);
            false
        }
    }
}

/// Handle the 'category list' command
fn handle_list(config: &Config) -> bool {
    let Some(session) = open_session(config) else {
        return false;
    };
    let state = session.state();

    if state.categories().is_empty() {
        println!("No categories yet.");
        println!("Use 'recipebox category add <name>' to create one.");
        return true;
    }

    for category in state.categories() {
        let count = filter::by_category(state.recipes(), category).len();
        println!("  {} ({})", category, count);
    }
    true
}
