//! Recipe store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/find/delete/query APIs over the `recipes` collection.
//! - Keep SQL details, including filter translation, inside this module.
//!
//! # Invariants
//! - Write paths call `NewRecipe::validate()` before any SQL mutation.
//! - A recipe and its ingredient/tag rows are written and removed together.
//! - Read paths reject undecodable persisted state instead of masking it.
//! - Every listing is ordered by `created_at ASC, rowid ASC`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::recipe::{NewRecipe, Recipe, RecipeId, RecipeValidationError};
use crate::query::{RecipeFilter, INGREDIENT_TEXT_SEPARATOR};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RECIPE_SELECT_SQL: &str = "SELECT
    recipes.uuid AS uuid,
    recipes.title AS title,
    recipes.procedure AS procedure,
    recipes.created_at AS created_at
FROM recipes";

const RECIPE_ORDER_SQL: &str = " ORDER BY recipes.created_at ASC, recipes.rowid ASC";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("recipes", &["uuid", "title", "procedure", "created_at"]),
    ("recipe_ingredients", &["recipe_uuid", "position", "name"]),
    ("recipe_tags", &["recipe_uuid", "position", "name"]),
];

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for recipe persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(RecipeValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted recipe data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecipeValidationError> for StoreError {
    fn from(value: RecipeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for recipe records.
pub trait RecipeStore {
    /// Persists a new recipe and returns its store-assigned id.
    fn create(&self, recipe: &NewRecipe) -> StoreResult<RecipeId>;
    /// Returns the recipe, or `None` when no record has this id.
    fn find_by_id(&self, id: RecipeId) -> StoreResult<Option<Recipe>>;
    /// Returns every recipe.
    fn find_all(&self) -> StoreResult<Vec<Recipe>>;
    /// Returns the recipes satisfying `filter`.
    fn find_matching(&self, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>>;
    /// Removes a recipe; returns whether a record was actually deleted.
    fn delete_by_id(&self, id: RecipeId) -> StoreResult<bool>;
    /// Returns distinct tag values in ascending order.
    fn list_tags(&self) -> StoreResult<Vec<String>>;
}

/// SQLite-backed recipe store.
pub struct SqliteRecipeStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecipeStore<'conn> {
    /// Constructs a store from a connection prepared by `db::open_db*`.
    ///
    /// Rejects connections whose schema is missing or at another version.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_recipes(&self, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>> {
        if filter.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let mut sql = format!("{RECIPE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        push_filter_sql(filter, &mut sql, &mut bind_values);
        sql.push_str(RECIPE_ORDER_SQL);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut recipes = Vec::new();
        while let Some(row) = rows.next()? {
            recipes.push(parse_recipe_row(self.conn, row)?);
        }

        Ok(recipes)
    }
}

impl RecipeStore for SqliteRecipeStore<'_> {
    fn create(&self, recipe: &NewRecipe) -> StoreResult<RecipeId> {
        recipe.validate()?;

        let id = Uuid::new_v4();
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO recipes (uuid, title, procedure) VALUES (?1, ?2, ?3);",
            params![id_text.as_str(), recipe.title.as_str(), recipe.procedure.as_str()],
        )?;
        insert_entries(&tx, "recipe_ingredients", &id_text, &recipe.ingredients)?;
        insert_entries(&tx, "recipe_tags", &id_text, &recipe.tags)?;

        tx.commit()?;
        Ok(id)
    }

    fn find_by_id(&self, id: RecipeId) -> StoreResult<Option<Recipe>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECIPE_SELECT_SQL} WHERE recipes.uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_recipe_row(self.conn, row)?));
        }

        Ok(None)
    }

    fn find_all(&self) -> StoreResult<Vec<Recipe>> {
        self.query_recipes(&RecipeFilter::All)
    }

    fn find_matching(&self, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>> {
        self.query_recipes(filter)
    }

    fn delete_by_id(&self, id: RecipeId) -> StoreResult<bool> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM recipe_ingredients WHERE recipe_uuid = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute(
            "DELETE FROM recipe_tags WHERE recipe_uuid = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM recipes WHERE uuid = ?1;", [id_text.as_str()])?;

        tx.commit()?;
        Ok(changed > 0)
    }

    fn list_tags(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT name FROM recipe_tags ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get("name")?);
        }
        Ok(tags)
    }
}

fn push_filter_sql(filter: &RecipeFilter, sql: &mut String, bind_values: &mut Vec<Value>) {
    match filter {
        RecipeFilter::All => {}
        RecipeFilter::Text(term) => {
            sql.push_str(
                " AND (
                    instr(fold_case(recipes.title), ?) > 0
                    OR instr(fold_case(recipes.procedure), ?) > 0
                    OR instr(
                        fold_case(coalesce((
                            SELECT group_concat(ri.name, ? ORDER BY ri.position)
                            FROM recipe_ingredients ri
                            WHERE ri.recipe_uuid = recipes.uuid
                        ), '')),
                        ?
                    ) > 0
                    OR EXISTS (
                        SELECT 1
                        FROM recipe_tags rt
                        WHERE rt.recipe_uuid = recipes.uuid
                          AND instr(fold_case(rt.name), ?) > 0
                    )
                )",
            );
            let term = term.get();
            bind_values.extend([
                Value::Text(term.clone()),
                Value::Text(term.clone()),
                Value::Text(INGREDIENT_TEXT_SEPARATOR.to_string()),
                Value::Text(term.clone()),
                Value::Text(term.clone()),
            ]);
        }
        RecipeFilter::Ingredients(items) => {
            for item in items.get() {
                sql.push_str(
                    " AND EXISTS (
                        SELECT 1
                        FROM recipe_ingredients ri
                        WHERE ri.recipe_uuid = recipes.uuid
                          AND fold_case(ri.name) = ?
                    )",
                );
                bind_values.push(Value::Text(item.clone()));
            }
        }
        RecipeFilter::Tag(tag) => {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM recipe_tags rt
                    WHERE rt.recipe_uuid = recipes.uuid
                      AND rt.name = ?
                )",
            );
            bind_values.push(Value::Text(tag.get().clone()));
        }
    }
}

fn insert_entries(
    conn: &Connection,
    table: &'static str,
    recipe_uuid: &str,
    entries: &[String],
) -> StoreResult<()> {
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {table} (recipe_uuid, position, name) VALUES (?1, ?2, ?3);"
    ))?;
    for (position, entry) in entries.iter().enumerate() {
        stmt.execute(params![recipe_uuid, position as i64, entry.as_str()])?;
    }
    Ok(())
}

fn load_entries(
    conn: &Connection,
    table: &'static str,
    recipe_uuid: &str,
) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name FROM {table} WHERE recipe_uuid = ?1 ORDER BY position ASC;"
    ))?;
    let mut rows = stmt.query([recipe_uuid])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(row.get(0)?);
    }
    Ok(entries)
}

fn parse_recipe_row(conn: &Connection, row: &Row<'_>) -> StoreResult<Recipe> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in recipes.uuid"))
    })?;

    Ok(Recipe {
        id,
        title: row.get("title")?,
        ingredients: load_entries(conn, "recipe_ingredients", &uuid_text)?,
        procedure: row.get("procedure")?,
        tags: load_entries(conn, "recipe_tags", &uuid_text)?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(StoreError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
