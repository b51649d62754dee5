//! Search intent to store predicate translation.
//!
//! # Responsibility
//! - Turn raw user search input into a [`RecipeFilter`].
//! - Provide an in-memory evaluation of every filter.
//!
//! # Invariants
//! - Building a filter has no side effects and never touches storage.
//! - SQL evaluation in the store agrees with [`RecipeFilter::matches`].
//! - Free-text matching is case-insensitive; tag matching is case-sensitive.

use crate::db::fold_case;
use crate::model::recipe::Recipe;

/// Joins ingredient tokens for free-text matching, so a term may span
/// several ingredients (`"flour, egg"`).
pub const INGREDIENT_TEXT_SEPARATOR: &str = ", ";

/// Predicate over recipes understood by every `RecipeStore`.
///
/// Payloads are [`Normalized`]; build filters through `by_text`,
/// `by_ingredients` and `by_tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeFilter {
    /// Every record.
    All,
    /// Case-folded, non-empty substring searched in title, the joined
    /// ingredient list, procedure and tags.
    Text(Normalized<String>),
    /// Case-folded, trimmed ingredient tokens that must all be present.
    /// An empty item can never be satisfied.
    Ingredients(Normalized<Vec<String>>),
    /// Trimmed tag compared exactly. An empty tag can never be satisfied.
    Tag(Normalized<String>),
}

/// Filter payload that has gone through the `RecipeFilter` constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<T>(T);

impl<T> Normalized<T> {
    pub fn get(&self) -> &T {
        &self.0
    }
}

impl RecipeFilter {
    /// Free-text filter; an empty term matches everything.
    ///
    /// The term is case-folded but otherwise used verbatim (no trimming).
    pub fn by_text(term: &str) -> Self {
        if term.is_empty() {
            Self::All
        } else {
            Self::Text(Normalized(fold_case(term)))
        }
    }

    /// Ingredient-set filter: all `items` must be present on a record.
    pub fn by_ingredients<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Ingredients(Normalized(
            items
                .into_iter()
                .map(|item| fold_case(item.as_ref().trim()))
                .collect(),
        ))
    }

    /// Single-tag filter with exact, case-sensitive comparison.
    pub fn by_tag(tag: &str) -> Self {
        Self::Tag(Normalized(tag.trim().to_string()))
    }

    /// Returns whether no record can ever satisfy this filter.
    ///
    /// Stores may skip the query entirely in that case.
    pub fn is_unsatisfiable(&self) -> bool {
        match self {
            Self::All | Self::Text(_) => false,
            Self::Ingredients(items) => items.get().iter().any(String::is_empty),
            Self::Tag(tag) => tag.get().is_empty(),
        }
    }

    /// Evaluates the filter against one record in memory.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Self::All => true,
            Self::Text(term) => {
                let contains = |value: &str| fold_case(value).contains(term.get().as_str());
                contains(recipe.title.as_str())
                    || contains(recipe.ingredients.join(INGREDIENT_TEXT_SEPARATOR).as_str())
                    || contains(recipe.procedure.as_str())
                    || recipe.tags.iter().any(|tag| contains(tag.as_str()))
            }
            Self::Ingredients(items) => items.get().iter().all(|wanted| {
                !wanted.is_empty()
                    && recipe
                        .ingredients
                        .iter()
                        .any(|have| fold_case(have) == *wanted)
            }),
            Self::Tag(tag) => {
                let tag = tag.get();
                !tag.is_empty() && recipe.tags.iter().any(|have| have == tag)
            }
        }
    }
}

/// Splits a raw comma-separated ingredient query.
///
/// Empty items are kept on purpose so `"egg,"` asks for an empty ingredient
/// and matches nothing.
pub fn split_ingredient_query(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// Raw search parameters as received from the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIntent {
    /// Free-text term.
    pub text: Option<String>,
    /// Comma-separated ingredient list.
    pub ingredients: Option<String>,
    /// Single tag.
    pub tag: Option<String>,
}

impl SearchIntent {
    /// Resolves the intent to exactly one filter.
    ///
    /// A non-empty free-text term wins over ingredients, which win over tag.
    /// Blank ingredient or tag fields count as not set, so a form that
    /// submits every field still falls through to the one filled in.
    /// There is no combined mode.
    pub fn to_filter(&self) -> RecipeFilter {
        if let Some(text) = self.text.as_deref().filter(|text| !text.is_empty()) {
            return RecipeFilter::by_text(text);
        }
        if let Some(raw) = self.ingredients.as_deref().filter(|raw| !raw.trim().is_empty()) {
            return RecipeFilter::by_ingredients(split_ingredient_query(raw));
        }
        if let Some(tag) = self.tag.as_deref().filter(|tag| !tag.trim().is_empty()) {
            return RecipeFilter::by_tag(tag);
        }
        RecipeFilter::All
    }
}
