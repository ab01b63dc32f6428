//! Recipe and category data model.
//!
//! [`Recipe`] is the record stored under `users/{user}/recipes/{id}`. Its
//! JSON form keeps the key names the mobile client has always written
//! (`userNickname`, `category`, `bookMarked`), so existing data decodes
//! unchanged.
//!
//! Categories have no record of their own: a category is a key under
//! `users/{user}/categories` holding `true`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::{RecipeBoxError, Result};
use crate::store::validate_key;

/// A recipe owned by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    /// Unique id, generated on the client before the first write.
    pub id: String,
    /// Nickname of the owning user.
    pub user_nickname: String,
    /// Display name.
    pub name: String,
    /// Ingredients, in display order.
    pub ingredients: Vec<String>,
    /// Method steps, in order.
    pub method: Vec<String>,
    /// Category membership.
    #[serde(rename = "category")]
    pub categories: BTreeSet<String>,
    /// Whether the user bookmarked this recipe.
    #[serde(rename = "bookMarked")]
    pub bookmarked: bool,
}

impl Recipe {
    /// Decode the record stored under `key`.
    ///
    /// Missing fields take their defaults. A record without an id takes
    /// the key it is stored under.
    pub fn decode(key: &str, value: &Value) -> std::result::Result<Self, serde_json::Error> {
        let mut recipe: Recipe = serde_json::from_value(value.clone())?;
        if recipe.id.is_empty() {
            recipe.id = key.to_string();
        }
        Ok(recipe)
    }

    /// Encode for storage.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Whether this recipe belongs to `category`.
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Copy of this recipe with the bookmark flag replaced.
    pub fn with_bookmarked(&self, bookmarked: bool) -> Self {
        Self {
            bookmarked,
            ..self.clone()
        }
    }
}

/// The user-entered parts of a new recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeDraft {
    /// Display name.
    pub name: String,
    /// Ingredient lines.
    pub ingredients: Vec<String>,
    /// Method steps.
    pub method: Vec<String>,
    /// Categories to file the recipe under.
    pub categories: BTreeSet<String>,
    /// Start out bookmarked.
    pub bookmarked: bool,
}

impl RecipeDraft {
    /// Start a draft with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an ingredient line.
    pub fn ingredient(mut self, line: impl Into<String>) -> Self {
        self.ingredients.push(line.into());
        self
    }

    /// Add a method step.
    pub fn step(mut self, line: impl Into<String>) -> Self {
        self.method.push(line.into());
        self
    }

    /// File under a category.
    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.categories.insert(name.into());
        self
    }

    /// Set the bookmark flag.
    pub fn bookmarked(mut self, bookmarked: bool) -> Self {
        self.bookmarked = bookmarked;
        self
    }

    /// Turn the draft into a recipe with a fresh id.
    ///
    /// The name is trimmed and must not be blank. Blank ingredient and
    /// method lines are dropped, the rest are trimmed.
    pub fn into_recipe(self, owner: &str) -> Result<Recipe> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RecipeBoxError::BlankRecipeName);
        }

        Ok(Recipe {
            id: uuid::Uuid::new_v4().to_string(),
            user_nickname: owner.to_string(),
            name: name.to_string(),
            ingredients: clean_lines(self.ingredients),
            method: clean_lines(self.method),
            categories: self
                .categories
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            bookmarked: self.bookmarked,
        })
    }
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Check a new category name against the current set.
///
/// Returns the trimmed name. Rejects blank names, names that cannot be
/// used as a store key, and names already present.
pub fn validate_category_name(name: &str, existing: &[String]) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecipeBoxError::BlankCategory);
    }
    validate_key(name)?;
    if existing.iter().any(|c| c == name) {
        return Err(RecipeBoxError::DuplicateCategory(name.to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_wire_format() {
        let value = json!({
            "id": "r1",
            "userNickname": "currentUser",
            "name": "Kimchi Stew",
            "ingredients": ["kimchi", "pork"],
            "method": ["fry", "simmer"],
            "category": ["Soup", "Korean"],
            "bookMarked": true
        });

        let recipe = Recipe::decode("r1", &value).unwrap();
        assert_eq!(recipe.user_nickname, "currentUser");
        assert_eq!(recipe.ingredients, vec!["kimchi", "pork"]);
        assert!(recipe.in_category("Korean"));
        assert!(recipe.bookmarked);
    }

    #[test]
    fn test_decode_fills_missing_fields() {
        let recipe = Recipe::decode("key-7", &json!({ "name": "Toast" })).unwrap();
        assert_eq!(recipe.id, "key-7");
        assert!(recipe.ingredients.is_empty());
        assert!(!recipe.bookmarked);
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        assert!(Recipe::decode("a", &json!(true)).is_err());
        assert!(Recipe::decode("a", &json!({ "name": 42 })).is_err());
        assert!(Recipe::decode("a", &json!({ "bookMarked": "yes" })).is_err());
    }

    #[test]
    fn test_encode_uses_wire_keys() {
        let recipe = RecipeDraft::new("Toast")
            .category("Breakfast")
            .into_recipe("alice")
            .unwrap();
        let value = recipe.to_value().unwrap();

        assert_eq!(value["userNickname"], json!("alice"));
        assert_eq!(value["category"], json!(["Breakfast"]));
        assert_eq!(value["bookMarked"], json!(false));
    }

    #[test]
    fn test_draft_assigns_unique_ids() {
        let a = RecipeDraft::new("Toast").into_recipe("alice").unwrap();
        let b = RecipeDraft::new("Toast").into_recipe("alice").unwrap();
        assert_ne!(a.id, b.id);
        assert!(validate_key(&a.id).is_ok());
    }

    #[test]
    fn test_draft_cleans_input() {
        let recipe = RecipeDraft::new("  Pancakes ")
            .ingredient("flour")
            .ingredient("   ")
            .step(" mix ")
            .category(" ")
            .into_recipe("alice")
            .unwrap();

        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.ingredients, vec!["flour"]);
        assert_eq!(recipe.method, vec!["mix"]);
        assert!(recipe.categories.is_empty());
    }

    #[test]
    fn test_draft_rejects_blank_name() {
        let err = RecipeDraft::new("   ").into_recipe("alice").unwrap_err();
        assert!(matches!(err, RecipeBoxError::BlankRecipeName));
    }

    #[test]
    fn test_with_bookmarked_keeps_everything_else() {
        let recipe = RecipeDraft::new("Toast").into_recipe("alice").unwrap();
        let marked = recipe.with_bookmarked(true);
        assert!(marked.bookmarked);
        assert_eq!(marked.id, recipe.id);
        assert_eq!(marked.name, recipe.name);
    }

    #[test]
    fn test_validate_category_name() {
        let existing = vec!["Soup".to_string()];

        assert_eq!(validate_category_name(" Bread ", &existing).unwrap(), "Bread");
        assert!(matches!(
            validate_category_name("   ", &existing),
            Err(RecipeBoxError::BlankCategory)
        ));
        assert!(matches!(
            validate_category_name("Soup", &existing),
            Err(RecipeBoxError::DuplicateCategory(_))
        ));
        assert!(matches!(
            validate_category_name("a/b", &existing),
            Err(RecipeBoxError::InvalidKey { .. })
        ));
    }
}
