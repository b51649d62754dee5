//! Recipe record, write-side draft and normalization helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another recipe.
//! - `title` and `procedure` are non-blank.
//! - `ingredients` holds at least one entry.
//! - `ingredients` and `tags` entries are trimmed and non-empty; order and
//!   duplicates are preserved, case is preserved.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static INGREDIENT_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\r\n]+").expect("valid ingredient separator regex"));

/// Stable identifier of a persisted recipe.
pub type RecipeId = Uuid;

/// Persisted recipe as returned by every read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    /// Ingredient tokens in the order they were written.
    pub ingredients: Vec<String>,
    pub procedure: String,
    pub tags: Vec<String>,
    /// Unix epoch milliseconds, assigned by the store.
    pub created_at: i64,
}

/// Normalized recipe fields ready for persistence.
///
/// The store assigns `id` and `created_at`; this type only carries content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub procedure: String,
    pub tags: Vec<String>,
}

/// Validation failures for recipe content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    /// A required field is absent or blank.
    MissingField(&'static str),
    /// A sequence entry is empty or carries surrounding whitespace.
    InvalidEntry { field: &'static str, value: String },
}

impl Display for RecipeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidEntry { field, value } => {
                write!(f, "invalid `{field}` entry `{value}`: entries must be trimmed and non-empty")
            }
        }
    }
}

impl Error for RecipeValidationError {}

impl NewRecipe {
    /// Checks the content invariants enforced on every write.
    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        if self.title.trim().is_empty() {
            return Err(RecipeValidationError::MissingField("title"));
        }
        if self.ingredients.is_empty() {
            return Err(RecipeValidationError::MissingField("ingredients"));
        }
        if self.procedure.trim().is_empty() {
            return Err(RecipeValidationError::MissingField("procedure"));
        }

        validate_entries("ingredients", &self.ingredients)?;
        validate_entries("tags", &self.tags)?;
        Ok(())
    }
}

fn validate_entries(field: &'static str, entries: &[String]) -> Result<(), RecipeValidationError> {
    for entry in entries {
        if entry.is_empty() || entry.trim().len() != entry.len() {
            return Err(RecipeValidationError::InvalidEntry {
                field,
                value: entry.clone(),
            });
        }
    }
    Ok(())
}

/// Splits raw comma-separated tag input into trimmed, non-empty tags.
///
/// Order, duplicates and case are kept as entered.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits raw ingredient text into trimmed, non-empty tokens.
///
/// Commas and line breaks both separate ingredients, so a one-per-line
/// textarea and a comma list produce the same tokens.
pub fn split_ingredients(raw: &str) -> Vec<String> {
    INGREDIENT_SEPARATOR_RE
        .split(raw)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses an externally supplied recipe id.
///
/// Returns `None` for malformed input and for the nil uuid, which the store
/// never assigns.
pub fn parse_recipe_id(raw: &str) -> Option<RecipeId> {
    Uuid::parse_str(raw.trim()).ok().filter(|id| !id.is_nil())
}

#[cfg(test)]
mod tests {
    use super::{parse_recipe_id, split_ingredients, split_tags, NewRecipe, RecipeValidationError};

    fn draft() -> NewRecipe {
        NewRecipe {
            title: "Omelette".to_string(),
            ingredients: vec!["egg".to_string(), "butter".to_string()],
            procedure: "Whisk and fry.".to_string(),
            tags: vec!["breakfast".to_string()],
        }
    }

    #[test]
    fn split_tags_trims_and_drops_empty_entries() {
        assert_eq!(
            split_tags(" Dessert, quick ,,  ,Dessert,"),
            vec!["Dessert", "quick", "Dessert"]
        );
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn split_ingredients_accepts_commas_and_lines() {
        assert_eq!(
            split_ingredients("flour, egg\r\nsugar\n\n, milk "),
            vec!["flour", "egg", "sugar", "milk"]
        );
    }

    #[test]
    fn validate_accepts_normalized_draft() {
        assert_eq!(draft().validate(), Ok(()));
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut recipe = draft();
        recipe.title = "   ".to_string();
        assert_eq!(
            recipe.validate(),
            Err(RecipeValidationError::MissingField("title"))
        );

        let mut recipe = draft();
        recipe.ingredients.clear();
        assert_eq!(
            recipe.validate(),
            Err(RecipeValidationError::MissingField("ingredients"))
        );

        let mut recipe = draft();
        recipe.procedure.clear();
        assert_eq!(
            recipe.validate(),
            Err(RecipeValidationError::MissingField("procedure"))
        );
    }

    #[test]
    fn validate_rejects_untrimmed_entries() {
        let mut recipe = draft();
        recipe.tags.push(" brunch".to_string());
        assert!(matches!(
            recipe.validate(),
            Err(RecipeValidationError::InvalidEntry { field: "tags", .. })
        ));
    }

    #[test]
    fn parse_recipe_id_rejects_malformed_and_nil() {
        assert!(parse_recipe_id("not-a-uuid").is_none());
        assert!(parse_recipe_id("00000000-0000-0000-0000-000000000000").is_none());
        assert!(parse_recipe_id(" 11111111-2222-4333-8444-555555555555 ").is_some());
    }
}
