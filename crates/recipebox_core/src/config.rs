//! Configuration types for recipebox.
//!
//! [`Config`] holds the user identity a session is scoped to and the
//! location of the local store file. It is persisted as TOML (typically at
//! `~/.config/recipebox/config.toml` on Unix systems).
//!
//! # Example
//!
//! ```ignore
//! use recipebox_core::config::Config;
//!
//! let config = Config::load()?;
//! let store = JsonFileStore::open(&config.store_path)?;
//! let session = RecipeSession::start(Arc::new(store), &config.user_nickname)?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RecipeBoxError, Result};

/// Nickname used when none is configured.
pub const DEFAULT_USER: &str = "currentUser";

/// User-configurable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Nickname that scopes every read and write in the store
    #[serde(default = "default_user")]
    pub user_nickname: String,

    /// JSON file backing the local store
    pub store_path: PathBuf,
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

impl Config {
    /// Create a config with the given nickname and store location
    pub fn new(user_nickname: impl Into<String>, store_path: PathBuf) -> Self {
        Self {
            user_nickname: user_nickname.into(),
            store_path,
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RecipeBoxError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RecipeBoxError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| RecipeBoxError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load config from `path`, falling back to `default` if it is missing
    /// or unreadable.
    pub fn load_from_or(path: &Path, default: Config) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    log::warn!("Ignoring unreadable config {:?}: {}", path, e);
                }
                default
            }
        }
    }
}

// ============================================================================
// Native-only implementation (not available in WASM)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_USER, Self::default_store_path())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Config {
    /// Get the config file path (~/.config/recipebox/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("recipebox").join("config.toml"))
    }

    /// Default store location (~/.local/share/recipebox/store.json on Linux)
    pub fn default_store_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recipebox")
            .join("store.json")
    }

    /// Whether a config file exists at the default location
    pub fn is_initialized() -> bool {
        Self::config_path().is_some_and(|path| path.exists())
    }

    /// Load config from default location, or return default if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }

        Ok(Config::default())
    }

    /// Load config from the default location, ignoring errors
    pub fn load_or_default() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from_or(&path, Config::default()),
            None => Config::default(),
        }
    }

    /// Save config to default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(RecipeBoxError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Write a config with the given values to the default location
    pub fn init(user_nickname: impl Into<String>, store_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::new(
            user_nickname,
            store_path.unwrap_or_else(Self::default_store_path),
        );
        config.save()?;
        Ok(config)
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_USER, PathBuf::from("/recipebox/store.json"))
    }
}
