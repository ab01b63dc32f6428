//! Config command handlers

use recipebox_core::RecipeBoxError;
use recipebox_core::config::Config;

use crate::cli::args::ConfigCommands;

pub fn handle_config_command(command: Option<ConfigCommands>, config: &Config) -> bool {
    match command {
        None | Some(ConfigCommands::Show) => {
            show_config(config);
            true
        }
    }
}

/// Show the resolved configuration and where it came from
fn show_config(config: &Config) {
    println!("Recipebox Configuration");
    println!("=======================");
    println!("User: {}", config.user_nickname);
    println!("Store: {}", config.store_path.display());
    match Config::config_path() {
        Some(path) if Config::is_initialized() => println!("Config file: {}", path.display()),
        Some(path) => {
            println!("Config file: {} (not created yet)", path.display());
            println!();
            println!("{}", RecipeBoxError::ConfigNotInitialized);
        }
        None => println!("Config file: ({})", RecipeBoxError::NoConfigDir),
    }
}
