use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recipebox")]
#[command(about = "Keep a recipe collection in a realtime store", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Override the user nickname from config
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Override the store file location from config
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file with the current user and store location
    Init,

    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Manage categories
    #[command(alias = "cat")]
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },

    /// Search recipe names (case-insensitive)
    Search {
        /// Text to look for in recipe names
        query: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category
    Add {
        /// Category name
        name: String,
    },

    /// List categories with their recipe counts
    List,
}

#[derive(Subcommand)]
pub enum RecipeCommands {
    /// Add a recipe
    Add {
        /// Recipe name
        name: String,

        /// Ingredient line (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,

        /// Method step (repeatable)
        #[arg(short = 'm', long = "step")]
        steps: Vec<String>,

        /// Category to file under (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Bookmark the new recipe
        #[arg(short, long)]
        bookmark: bool,
    },

    /// List recipes
    #[command(alias = "ls")]
    List {
        /// Only recipes in this category
        #[arg(short, long, conflicts_with = "bookmarked")]
        category: Option<String>,

        /// Only bookmarked recipes
        #[arg(short, long)]
        bookmarked: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one recipe
    Show {
        /// Recipe id, unique id prefix, or exact name
        recipe: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set or clear a bookmark
    Bookmark {
        /// Recipe id, unique id prefix, or exact name
        recipe: String,

        /// Clear the bookmark instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// Delete a recipe
    #[command(alias = "rm")]
    Delete {
        /// Recipe id, unique id prefix, or exact name
        recipe: String,
    },
}
