//! Versioned catalog schema.
//!
//! The catalog ships one schema step. New steps append to `SCHEMA_STEPS`
//! with the next version number; existing steps are never edited.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    ddl: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    ddl: include_str!("0001_recipes.sql"),
}];

/// Relation between a database's recorded version and this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// Steps after the recorded version still have to run.
    Behind(u32),
    UpToDate,
    /// Written by a newer build; refused.
    Ahead(u32),
}

/// Highest schema version this build knows.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Compares the recorded schema version against `latest_version()`.
pub fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let recorded = current_user_version(conn)?;
    Ok(match recorded.cmp(&latest_version()) {
        std::cmp::Ordering::Less => SchemaState::Behind(recorded),
        std::cmp::Ordering::Equal => SchemaState::UpToDate,
        std::cmp::Ordering::Greater => SchemaState::Ahead(recorded),
    })
}

/// Brings the schema up to date inside one transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = match schema_state(conn)? {
        SchemaState::UpToDate => return Ok(()),
        SchemaState::Ahead(recorded) => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: recorded,
                latest_supported: latest_version(),
            })
        }
        SchemaState::Behind(recorded) => recorded,
    };

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > from) {
        tx.execute_batch(step.ddl)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_schema module=db status=ok from_version={} to_version={}",
        from,
        latest_version()
    );
    Ok(())
}
