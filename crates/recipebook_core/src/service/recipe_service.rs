//! Recipe use-case service.
//!
//! # Responsibility
//! - Serve list/search, add, view and delete requests from raw parameters.
//! - Normalize tags and ingredients before persistence.
//! - Map store outcomes to the catalog error taxonomy.
//!
//! # Invariants
//! - The service holds no recipe state; every read is a fresh store query.
//! - A missing record is reported as `RecipeLookup::NotFound` or `false`,
//!   never as an error.
//! - Only `add_recipe` and `delete_recipe` mutate persisted state.

use crate::model::recipe::{
    parse_recipe_id, split_ingredients, split_tags, NewRecipe, Recipe, RecipeId,
    RecipeValidationError,
};
use crate::query::{split_ingredient_query, RecipeFilter, SearchIntent};
use crate::repo::recipe_repo::{RecipeStore, StoreError};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, RecipeServiceError>;

/// Service error for recipe use-cases.
#[derive(Debug)]
pub enum RecipeServiceError {
    /// A required field is absent or blank.
    Validation(RecipeValidationError),
    /// Storage could not be reached or the query failed.
    StoreUnavailable(StoreError),
}

impl Display for RecipeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StoreUnavailable(err) => write!(f, "recipe store unavailable: {err}"),
        }
    }
}

impl Error for RecipeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
        }
    }
}

impl From<RecipeValidationError> for RecipeServiceError {
    fn from(value: RecipeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RecipeServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// List page parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    /// Optional free-text term.
    pub search: Option<String>,
}

/// Add-recipe form fields as submitted.
///
/// `name`, `email` and `description` are accepted for compatibility with the
/// add form but are not part of the recipe record and are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddRecipeRequest {
    pub title: Option<String>,
    /// Free text; commas or line breaks separate ingredients.
    pub ingredients: Option<String>,
    pub procedure: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
}

impl AddRecipeRequest {
    fn dropped_field_count(&self) -> usize {
        [&self.name, &self.email, &self.description]
            .iter()
            .filter(|value| value.is_some())
            .count()
    }
}

/// Outcome of a fetch-by-id use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeLookup {
    Found(Recipe),
    NotFound,
}

impl RecipeLookup {
    /// Converts into `Option`, dropping the found/not-found distinction.
    pub fn into_option(self) -> Option<Recipe> {
        match self {
            Self::Found(recipe) => Some(recipe),
            Self::NotFound => None,
        }
    }
}

/// Recipe service facade over a store implementation.
pub struct RecipeService<S: RecipeStore> {
    store: S,
}

impl<S: RecipeStore> RecipeService<S> {
    /// Creates a service that owns the provided store handle.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists every recipe, or the free-text matches when `search` is non-empty.
    pub fn list_or_search(&self, query: &ListQuery) -> ServiceResult<Vec<Recipe>> {
        match query.search.as_deref().filter(|term| !term.is_empty()) {
            Some(term) => self.run_query("text", &RecipeFilter::by_text(term)),
            None => self.run_query("all", &RecipeFilter::All),
        }
    }

    /// Normalizes and persists a new recipe.
    ///
    /// # Errors
    /// - `Validation` when `title`, `ingredients` or `procedure` is absent or
    ///   blank. Nothing is persisted in that case.
    /// - `StoreUnavailable` when the write fails.
    pub fn add_recipe(&self, request: AddRecipeRequest) -> ServiceResult<RecipeId> {
        let recipe = match normalize_request(&request) {
            Ok(recipe) => recipe,
            Err(err) => {
                warn!(
                    "event=recipe_add module=service status=error error_code=validation error={}",
                    err
                );
                return Err(err.into());
            }
        };

        match self.store.create(&recipe) {
            Ok(id) => {
                info!(
                    "event=recipe_add module=service status=ok recipe_id={} ingredients={} tags={} dropped_fields={}",
                    id,
                    recipe.ingredients.len(),
                    recipe.tags.len(),
                    request.dropped_field_count()
                );
                Ok(id)
            }
            Err(err) => Err(log_failure("recipe_add", err)),
        }
    }

    /// Looks up the recipe shown on the delete confirmation view.
    ///
    /// A malformed id resolves to `NotFound`.
    pub fn get_for_delete_confirmation(&self, raw_id: &str) -> ServiceResult<RecipeLookup> {
        self.lookup("recipe_delete_confirm", raw_id)
    }

    /// Looks up one recipe for the detail view.
    pub fn view_recipe(&self, raw_id: &str) -> ServiceResult<RecipeLookup> {
        self.lookup("recipe_view", raw_id)
    }

    /// Deletes one recipe; returns whether a record was removed.
    ///
    /// Deleting an unknown or malformed id is not an error.
    pub fn delete_recipe(&self, raw_id: &str) -> ServiceResult<bool> {
        let Some(id) = parse_recipe_id(raw_id) else {
            info!("event=recipe_delete module=service status=ok deleted=false reason=malformed_id");
            return Ok(false);
        };

        match self.store.delete_by_id(id) {
            Ok(deleted) => {
                info!(
                    "event=recipe_delete module=service status=ok recipe_id={} deleted={}",
                    id, deleted
                );
                Ok(deleted)
            }
            Err(err) => Err(log_failure("recipe_delete", err)),
        }
    }

    /// Returns recipes that contain every comma-separated ingredient.
    pub fn search_by_ingredients(&self, raw_list: &str) -> ServiceResult<Vec<Recipe>> {
        let filter = RecipeFilter::by_ingredients(split_ingredient_query(raw_list));
        self.run_query("ingredients", &filter)
    }

    /// Returns recipes carrying exactly `tag`.
    pub fn search_by_tag(&self, tag: &str) -> ServiceResult<Vec<Recipe>> {
        self.run_query("tag", &RecipeFilter::by_tag(tag))
    }

    /// Resolves a combined search request through the mode precedence rule.
    pub fn search(&self, intent: &SearchIntent) -> ServiceResult<Vec<Recipe>> {
        self.run_query("intent", &intent.to_filter())
    }

    /// Lists distinct tags for tag navigation.
    pub fn list_tags(&self) -> ServiceResult<Vec<String>> {
        self.store
            .list_tags()
            .map_err(|err| log_failure("tag_list", err))
    }

    fn lookup(&self, event: &'static str, raw_id: &str) -> ServiceResult<RecipeLookup> {
        let Some(id) = parse_recipe_id(raw_id) else {
            debug!("event={} module=service status=ok found=false reason=malformed_id", event);
            return Ok(RecipeLookup::NotFound);
        };

        match self.store.find_by_id(id) {
            Ok(Some(recipe)) => Ok(RecipeLookup::Found(recipe)),
            Ok(None) => {
                debug!("event={} module=service status=ok recipe_id={} found=false", event, id);
                Ok(RecipeLookup::NotFound)
            }
            Err(err) => Err(log_failure(event, err)),
        }
    }

    fn run_query(&self, mode: &'static str, filter: &RecipeFilter) -> ServiceResult<Vec<Recipe>> {
        let started_at = Instant::now();
        let result = match filter {
            RecipeFilter::All => self.store.find_all(),
            _ => self.store.find_matching(filter),
        };

        match result {
            Ok(recipes) => {
                debug!(
                    "event=recipe_query module=service status=ok mode={} results={} duration_ms={}",
                    mode,
                    recipes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(recipes)
            }
            Err(err) => Err(log_failure("recipe_query", err)),
        }
    }
}

fn normalize_request(request: &AddRecipeRequest) -> Result<NewRecipe, RecipeValidationError> {
    let title = required_text("title", request.title.as_deref())?;
    let ingredients = split_ingredients(request.ingredients.as_deref().unwrap_or_default());
    if ingredients.is_empty() {
        return Err(RecipeValidationError::MissingField("ingredients"));
    }
    let procedure = required_text("procedure", request.procedure.as_deref())?;
    let tags = split_tags(request.tags.as_deref().unwrap_or_default());

    Ok(NewRecipe {
        title,
        ingredients,
        procedure,
        tags,
    })
}

fn required_text(
    field: &'static str,
    value: Option<&str>,
) -> Result<String, RecipeValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(RecipeValidationError::MissingField(field)),
    }
}

fn log_failure(event: &'static str, err: StoreError) -> RecipeServiceError {
    let err = RecipeServiceError::from(err);
    match &err {
        RecipeServiceError::Validation(inner) => warn!(
            "event={} module=service status=error error_code=validation error={}",
            event, inner
        ),
        RecipeServiceError::StoreUnavailable(inner) => error!(
            "event={} module=service status=error error_code=store_unavailable error={}",
            event, inner
        ),
    }
    err
}
