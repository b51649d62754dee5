//! Recipe domain model.
//!
//! # Responsibility
//! - Define the canonical record shape used by store, query and service code.
//! - Own the text normalization rules applied before persistence.
//!
//! # Invariants
//! - Every recipe is identified by a stable `RecipeId` assigned by the store.
//! - Tag and ingredient entries are trimmed and non-empty once normalized.

pub mod recipe;
