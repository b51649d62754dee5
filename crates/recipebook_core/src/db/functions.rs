//! Scalar SQL functions shared by catalog queries.
//!
//! SQLite's built-in `lower()` only folds ASCII. Search predicates use
//! `fold_case()` instead so SQL evaluation matches `str::to_lowercase`.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Name of the case-folding function visible to SQL.
pub const FOLD_CASE_FN: &str = "fold_case";

/// Case-folds text the same way SQL `fold_case()` does.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Registers catalog SQL functions on `conn`.
///
/// Safe to call more than once; re-registration replaces the function.
pub fn register_sql_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| fold_case(&text)))
        },
    )
}
