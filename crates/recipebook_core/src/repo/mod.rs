//! Record store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the recipe service is written against.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store writes must enforce `NewRecipe::validate()` before persistence.
//! - A missing record is a normal outcome (`None` / `false`), not an error.

pub mod recipe_repo;
