//! Command-line front end for the recipe catalog.
//!
//! # Responsibility
//! - Map subcommands onto `RecipeService` use-cases.
//! - Render results as text or JSON.
//!
//! # Invariants
//! - "Not found" and "no results" are messages, not failures.
//! - With `--json` every outcome, including not-found, is one JSON value.
//! - Validation and storage failures exit non-zero.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use recipebook_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use recipebook_core::db::{close_db, open_db};
use recipebook_core::{
    init_logging, AddRecipeRequest, CatalogConfig, ListQuery, Recipe, RecipeId, RecipeLookup,
    RecipeService, RecipeStore, SqliteRecipeStore,
};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "recipebook")]
#[command(version, about = "Store, search and delete recipes", long_about = None)]
struct Cli {
    /// SQLite database path (overrides RECIPEBOOK_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log level: trace|debug|info|warn|error (overrides RECIPEBOOK_LOG_LEVEL).
    /// Requires a log directory; without one nothing is logged.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute log directory (overrides RECIPEBOOK_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all recipes, or those matching a free-text term
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a recipe
    Add {
        #[arg(long)]
        title: Option<String>,
        /// Comma- or newline-separated ingredients
        #[arg(long)]
        ingredients: Option<String>,
        #[arg(long)]
        procedure: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Show one recipe
    Show { id: String },
    /// Delete a recipe (prints a confirmation view unless --yes is given)
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Recipes containing every listed ingredient
    ByIngredients {
        /// Comma-separated ingredients
        list: String,
    },
    /// Recipes carrying a tag (case-sensitive)
    ByTag { tag: String },
    /// List known tags
    Tags,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli, |key| std::env::var(key).ok())?;

    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let outcome = {
        let store = SqliteRecipeStore::try_new(&conn)?;
        let service = RecipeService::new(store);
        execute(&service, cli.command)?
    };
    close_db(conn)?;
    println!("{}", outcome.render(cli.json)?);
    Ok(())
}

/// Merges flags over `env`, which maps a variable name to its value.
fn resolve_config<F>(cli: &Cli, env: F) -> Result<CatalogConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let flag = |key: &str| match key {
        ENV_DB_PATH => cli
            .db
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned()),
        ENV_LOG_LEVEL => cli.log_level.clone(),
        ENV_LOG_DIR => cli.log_dir.clone(),
        _ => None,
    };
    let config = CatalogConfig::from_lookup(|key| flag(key).or_else(|| env(key)))?;

    // Without a log directory there is no logger for the level to apply to.
    if cli.log_level.is_some() && config.log_dir.is_none() {
        bail!("--log-level needs --log-dir or {ENV_LOG_DIR}");
    }
    Ok(config)
}

/// Result of one subcommand, rendered as text or JSON.
#[derive(Debug)]
enum Outcome {
    Recipes(Vec<Recipe>),
    Added(RecipeId),
    NotFound(String),
    ConfirmDelete(Recipe),
    Deleted { id: String, deleted: bool },
    Tags(Vec<String>),
}

impl Outcome {
    fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(&self.to_json())?);
        }
        Ok(self.to_text())
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Recipes(recipes) => json!(recipes),
            Self::Added(id) => json!({ "id": id }),
            Self::NotFound(id) => json!({ "id": id, "found": false }),
            Self::ConfirmDelete(recipe) => json!({
                "id": recipe.id,
                "deleted": false,
                "confirm_required": true,
                "recipe": recipe,
            }),
            Self::Deleted { id, deleted } => json!({ "id": id, "deleted": deleted }),
            Self::Tags(tags) => json!(tags),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Self::Recipes(recipes) if recipes.is_empty() => "No recipes found".to_string(),
            Self::Recipes(recipes) => recipes
                .iter()
                .map(format_recipe)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Added(id) => format!("Added recipe {id}"),
            Self::NotFound(id) | Self::Deleted { id, deleted: false } => {
                format!("Recipe {id} not found")
            }
            Self::ConfirmDelete(recipe) => format!(
                "{}\nDelete \"{}\"? Re-run with --yes to confirm.",
                format_recipe(recipe),
                recipe.title
            ),
            Self::Deleted { id, deleted: true } => format!("Deleted recipe {id}"),
            Self::Tags(tags) => tags.join("\n"),
        }
    }
}

fn execute<S: RecipeStore>(service: &RecipeService<S>, command: Command) -> Result<Outcome> {
    let outcome = match command {
        Command::List { search } => {
            Outcome::Recipes(service.list_or_search(&ListQuery { search })?)
        }
        Command::Add {
            title,
            ingredients,
            procedure,
            tags,
        } => {
            let id = service.add_recipe(AddRecipeRequest {
                title,
                ingredients,
                procedure,
                tags,
                ..AddRecipeRequest::default()
            })?;
            info!("event=cli_add module=cli status=ok recipe_id={}", id);
            Outcome::Added(id)
        }
        Command::Show { id } => match service.view_recipe(&id)? {
            RecipeLookup::Found(recipe) => Outcome::Recipes(vec![recipe]),
            RecipeLookup::NotFound => Outcome::NotFound(id),
        },
        Command::Delete { id, yes } => match service.get_for_delete_confirmation(&id)? {
            RecipeLookup::NotFound => Outcome::NotFound(id),
            RecipeLookup::Found(recipe) if !yes => Outcome::ConfirmDelete(recipe),
            RecipeLookup::Found(_) => {
                let deleted = service.delete_recipe(&id)?;
                Outcome::Deleted { id, deleted }
            }
        },
        Command::ByIngredients { list } => {
            Outcome::Recipes(service.search_by_ingredients(&list)?)
        }
        Command::ByTag { tag } => Outcome::Recipes(service.search_by_tag(&tag)?),
        Command::Tags => Outcome::Tags(service.list_tags()?),
    };
    Ok(outcome)
}

fn format_recipe(recipe: &Recipe) -> String {
    let mut lines = vec![
        format!("{} [{}]", recipe.title, recipe.id),
        format!("  ingredients: {}", recipe.ingredients.join(", ")),
    ];
    if !recipe.tags.is_empty() {
        lines.push(format!("  tags: {}", recipe.tags.join(", ")));
    }
    for line in recipe.procedure.lines() {
        lines.push(format!("  | {line}"));
    }
    lines.join("\n")
}
