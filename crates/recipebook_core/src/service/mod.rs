//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate query building and store calls into use-case level APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod recipe_service;
