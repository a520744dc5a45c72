use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::{debug, error, info};

use crate::errors::{StoreError, StoreResult};
use crate::models::Entry;

use super::connection::{ensure_schema, initialize_database, open_connection};
use super::entries::{delete_entries, fetch_entries, insert_entry};

/// Owner of the one SQLite connection the app uses. Workflows borrow the
/// store; nothing else holds the handle.
pub struct RecordStore {
    conn: Option<Connection>,
}

impl RecordStore {
    /// Place the database file (copying `seed` on first run), open it, and make
    /// sure the schema exists.
    pub fn open(path: &Path, seed: &Path) -> StoreResult<Self> {
        initialize_database(path, seed).inspect_err(|err| {
            error!(path = %path.display(), error = %err, "unable to create database");
        })?;
        let store = Self::from_connection(open_connection(path)?)?;
        info!(path = %path.display(), "database initialized");
        Ok(store)
    }

    /// Private in-memory database with the same schema.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self { conn: Some(conn) };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> StoreResult<()> {
        ensure_schema(self.conn()?)
    }

    /// Insert one entry from a positional snapshot and return its id.
    pub fn insert_entry(&self, values: &[Value]) -> StoreResult<i64> {
        match insert_entry(self.conn()?, values) {
            Ok(id) => {
                debug!(id, "inserted entry");
                Ok(id)
            }
            Err(err @ StoreError::ValueCount { .. }) => {
                error!(error = %err, "value count mismatch for beck_table insert");
                Err(err)
            }
            Err(err) => {
                error!(error = %err, "error inserting data into beck_table");
                Err(err)
            }
        }
    }

    /// Current contents of the table, oldest first.
    pub fn query_all_entries(&self) -> StoreResult<Vec<Entry>> {
        fetch_entries(self.conn()?)
    }

    /// Remove the given ids; returns how many rows were actually deleted.
    pub fn delete_entries(&mut self, ids: &BTreeSet<i64>) -> StoreResult<usize> {
        let conn = self.conn.as_mut().ok_or(StoreError::Closed)?;
        let removed = delete_entries(conn, ids).inspect_err(|err| {
            error!(error = %err, "error deleting entries from beck_table");
        })?;
        debug!(requested = ids.len(), removed, "deleted entries");
        Ok(removed)
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Release the connection. Calling this again is a no-op.
    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        match conn.close() {
            Ok(()) => info!("database closed"),
            Err((_, err)) => error!(error = %err, "error closing database"),
        }
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entries::INSERT_VALUE_COUNT;
    use tempfile::tempdir;

    fn snapshot(items: [i64; 12]) -> Vec<Value> {
        let mut values = vec![
            Value::Text("2024-01-15".into()),
            Value::Text("09:30:00".into()),
        ];
        values.extend(items.iter().map(|v| Value::Integer(*v)));
        values.push(Value::Integer(items.iter().filter(|v| **v > 0).sum()));
        values
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("beck.sqlite");
        let seed = dir.path().join("no-seed.sqlite");

        let mut store = RecordStore::open(&path, &seed).unwrap();
        let id = store
            .insert_entry(&snapshot([3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]))
            .unwrap();
        store.close();

        let reopened = RecordStore::open(&path, &seed).unwrap();
        let entries = reopened.query_all_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].summary, 3);
    }

    #[test]
    fn snapshot_length_matches_insert() {
        assert_eq!(snapshot([0; 12]).len(), INSERT_VALUE_COUNT);
    }

    #[test]
    fn count_mismatch_is_reported() {
        let store = RecordStore::open_in_memory().unwrap();
        let mut values = snapshot([1; 12]);
        values.pop();

        let err = store.insert_entry(&values).unwrap_err();
        assert!(matches!(err, StoreError::ValueCount { expected: 15, got: 14 }));
        assert!(store.query_all_entries().unwrap().is_empty());
    }

    #[test]
    fn delete_then_query_has_no_trace_of_row() {
        let mut store = RecordStore::open_in_memory().unwrap();
        let id = store.insert_entry(&snapshot([1; 12])).unwrap();

        assert_eq!(store.delete_entries(&BTreeSet::from([id])).unwrap(), 1);
        assert!(store.query_all_entries().unwrap().iter().all(|e| e.id != id));
        assert_eq!(store.delete_entries(&BTreeSet::from([id])).unwrap(), 0);
    }

    #[test]
    fn close_is_idempotent_and_blocks_further_use() {
        let mut store = RecordStore::open_in_memory().unwrap();
        store.close();
        store.close();

        assert!(!store.is_open());
        assert!(matches!(store.query_all_entries(), Err(StoreError::Closed)));
        assert!(matches!(
            store.insert_entry(&snapshot([0; 12])),
            Err(StoreError::Closed)
        ));
        assert!(matches!(
            store.delete_entries(&BTreeSet::from([1])),
            Err(StoreError::Closed)
        ));
    }
}
