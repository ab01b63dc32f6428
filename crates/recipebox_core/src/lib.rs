#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Configuration options
pub mod config;

/// Error (common error types)
pub mod error;

/// Filters and name search over mirrored recipes
pub mod filter;

/// Live mirror of a user's categories and recipes
pub mod mirror;

/// Recipe and category records
pub mod model;

/// Page selection
pub mod page;

/// Recipe session (mirror, state, and writes)
pub mod session;

/// Keyed collection store abstraction
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use error::{RecipeBoxError, Result};
pub use model::{Recipe, RecipeDraft};
pub use session::{RecipeSession, SessionState};
