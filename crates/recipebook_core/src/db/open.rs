//! Connection lifecycle: open, prepare, close.

use super::functions::register_sql_functions;
use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy)]
enum Target<'a> {
    File(&'a Path),
    Memory,
}

impl Display for Target<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(_) => f.write_str("file"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Opens (creating if needed) the catalog database at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_target(Target::File(path.as_ref()))
}

/// Opens a private in-memory catalog. Each call starts empty.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(Target::Memory)
}

/// Closes `conn`, reporting errors SQLite raises while shutting down.
pub fn close_db(conn: Connection) -> DbResult<()> {
    conn.close().map_err(|(_, err)| {
        error!("event=db_close module=db status=error error={}", err);
        DbError::Sqlite(err)
    })?;
    info!("event=db_close module=db status=ok");
    Ok(())
}

fn open_target(target: Target<'_>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = connect(target).and_then(|mut conn| {
        prepare(&mut conn)?;
        Ok(conn)
    });

    let elapsed_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            target, elapsed_ms
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error={}",
            target, elapsed_ms, err
        ),
    }
    result
}

fn connect(target: Target<'_>) -> DbResult<Connection> {
    let conn = match target {
        Target::File(path) => Connection::open(path)?,
        Target::Memory => Connection::open_in_memory()?,
    };
    Ok(conn)
}

/// Foreign keys back the ingredient/tag cascade.
fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    register_sql_functions(conn)?;
    apply_migrations(conn)
}
