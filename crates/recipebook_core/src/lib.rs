//! Core catalog logic for the recipe book.
//! This crate is the single source of truth for recipe invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{CatalogConfig, ConfigError};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::recipe::{
    parse_recipe_id, split_ingredients, split_tags, NewRecipe, Recipe, RecipeId,
    RecipeValidationError,
};
pub use query::{split_ingredient_query, RecipeFilter, SearchIntent};
pub use repo::recipe_repo::{RecipeStore, SqliteRecipeStore, StoreError, StoreResult};
pub use service::recipe_service::{
    AddRecipeRequest, ListQuery, RecipeLookup, RecipeService, RecipeServiceError, ServiceResult,
};
