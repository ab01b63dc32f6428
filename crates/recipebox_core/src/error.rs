use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for recipebox operations
#[derive(Debug, Error)]
pub enum RecipeBoxError {
    // IO errors
    /// Reading a config or store file failed.
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing a config or store file (or creating its directory) failed.
    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // Serialization errors
    /// A store file or record could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store file parsed, but its root is not an object.
    #[error("Store file '{0}' does not contain a JSON object at its root")]
    InvalidStoreFile(PathBuf),

    // Config errors
    /// The config file is not valid TOML for [`Config`](crate::config::Config).
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The config could not be written as TOML.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The platform has no config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// No config file has been written yet.
    #[error("Configuration not initialized. Run 'recipebox init' first.")]
    ConfigNotInitialized,

    // Validation errors (rejected before anything is written)
    /// A category name was empty after trimming.
    #[error("Category name must not be blank")]
    BlankCategory,

    /// The category is already in the mirrored list.
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),

    /// A recipe name was empty after trimming.
    #[error("Recipe name must not be blank")]
    BlankRecipeName,

    /// A key the store would refuse.
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// No mirrored recipe has this id.
    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    // Store errors
    /// The store refused a write.
    #[error("Write to '{path}' rejected: {reason}")]
    WriteRejected { path: String, reason: String },

    /// The store refused a read.
    #[error("Subscription to '{path}' failed: {reason}")]
    Subscription { path: String, reason: String },
}

/// Result type alias for recipebox operations
pub type Result<T> = std::result::Result<T, RecipeBoxError>;
