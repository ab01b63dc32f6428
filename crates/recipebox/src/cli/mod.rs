/// Clap argument definitions
mod args;

/// `category add`, `category list`
mod category;

/// Config command handlers
mod config;

/// `recipe` subcommands
mod recipe;

/// Search command handler
mod search;

/// Shared CLI utilities
mod util;

use clap::Parser;
use std::path::PathBuf;

use recipebox_core::RecipeSession;
use recipebox_core::config::Config;
use recipebox_core::store::JsonFileStore;

/// Session type used by every command: a file-backed store.
pub type CliSession = RecipeSession<JsonFileStore>;

/// Helper to run async operations in sync context
fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures_lite::future::block_on(f)
}

pub use args::Cli;
use args::Commands;

/// Main entry point for the CLI
pub fn run_cli() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = resolve_config(cli.user, cli.store);
    log::debug!(
        "Using user '{}' with store {}",
        config.user_nickname,
        config.store_path.display()
    );

    // Execute commands and track success
    let success = match cli.command {
        Commands::Init => handle_init(&config),

        Commands::Config { command } => config::handle_config_command(command, &config),

        Commands::Category { command } => category::handle_category_command(command, &config),

        Commands::Recipe { command } => recipe::handle_recipe_command(command, &config),

        Commands::Search { query, json } => search::handle_search(&config, &query, json),
    };

    if !success {
        std::process::exit(1);
    }
}

/// Config file values with command-line overrides applied
fn resolve_config(user: Option<String>, store: Option<PathBuf>) -> Config {
    let mut config = Config::load_or_default();
    if let Some(user) = user {
        config.user_nickname = user;
    }
    if let Some(store) = store {
        config.store_path = store;
    }
    config
}

/// Handle the init command
/// Returns true on success, false on error
fn handle_init(config: &Config) -> bool {
    match Config::init(config.user_nickname.clone(), Some(config.store_path.clone())) {
        Ok(saved) => {
            println!("✓ Initialized recipebox configuration");
            println!("  User: {}", saved.user_nickname);
            println!("  Store: {}", saved.store_path.display());
            if let Some(config_path) = Config::config_path() {
                println!("  Config file: {}", config_path.display());
            }
        }
        Err(e) => {
            eprintln!("✗ Error initializing config: {}", e);
            return false;
        }
    }

    // Opening the store validates an existing file before anything is written to it.
    match JsonFileStore::open(&config.store_path) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("✗ Store at {} is unusable: {}", config.store_path.display(), e);
            false
        }
    }
}
