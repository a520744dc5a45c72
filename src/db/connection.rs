use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, error, info};

use crate::errors::StoreResult;

/// Schema for the single entry table. Column order here is the order every
/// insert binds its values in.
const CREATE_BECK_TABLE: &str = "CREATE TABLE IF NOT EXISTS beck_table (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    beck_date TEXT,
    beck_time TEXT,
    sadness INTEGER,
    outlook INTEGER,
    guilt INTEGER,
    solitude INTEGER,
    sexdrive INTEGER,
    hygiene INTEGER,
    decisiveness INTEGER,
    effort INTEGER,
    interest INTEGER,
    pessimism INTEGER,
    victimhood INTEGER,
    sleep INTEGER,
    beck_summary INTEGER
)";

/// Put the database file in place on first run. When `target` is missing and
/// a seed database exists, the seed is copied; otherwise the file is left for
/// SQLite to create when the connection opens. An existing target is never
/// touched.
pub fn initialize_database(target: &Path, seed: &Path) -> StoreResult<()> {
    if target.exists() {
        return Ok(());
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    if seed.is_file() && seed != target {
        fs::copy(seed, target)?;
        info!(seed = %seed.display(), target = %target.display(), "copied seed database");
    } else {
        debug!(target = %target.display(), "creating fresh database");
    }

    Ok(())
}

/// Open the SQLite file at `path`, creating it if needed.
pub fn open_connection(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path).inspect_err(|err| {
        error!(path = %path.display(), error = %err, "unable to open database");
    })?;
    Ok(conn)
}

/// Create `beck_table` if it does not exist yet. Safe to run on every start.
pub fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute(CREATE_BECK_TABLE, []).inspect_err(|err| {
        error!(error = %err, "error creating table beck_table");
    })?;
    Ok(())
}
