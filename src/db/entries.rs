use std::collections::BTreeSet;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::errors::{StoreError, StoreResult};
use crate::models::{Entry, ItemScores, ITEM_COUNT};

/// Number of values an insert binds: date, time, the items, and the summary.
pub const INSERT_VALUE_COUNT: usize = ITEM_COUNT + 3;

const INSERT_ENTRY: &str = "INSERT INTO beck_table (
    beck_date, beck_time,
    sadness, outlook, guilt, solitude, sexdrive, hygiene,
    decisiveness, effort, interest, pessimism, victimhood, sleep,
    beck_summary
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

const SELECT_ENTRIES: &str = "SELECT id, beck_date, beck_time,
    sadness, outlook, guilt, solitude, sexdrive, hygiene,
    decisiveness, effort, interest, pessimism, victimhood, sleep,
    beck_summary
 FROM beck_table
 ORDER BY id";

/// Bind `values` positionally into one INSERT and return the new row id.
///
/// The statement's placeholder count is checked against `values.len()` before
/// anything executes, so a short or long snapshot fails with
/// [`StoreError::ValueCount`] and writes nothing.
pub fn insert_entry(conn: &Connection, values: &[Value]) -> StoreResult<i64> {
    let mut stmt = conn.prepare_cached(INSERT_ENTRY)?;

    let expected = stmt.parameter_count();
    if values.len() != expected {
        return Err(StoreError::ValueCount {
            expected,
            got: values.len(),
        });
    }

    stmt.execute(params_from_iter(values))?;
    Ok(conn.last_insert_rowid())
}

/// Every stored entry in insertion order.
pub fn fetch_entries(conn: &Connection) -> StoreResult<Vec<Entry>> {
    let mut stmt = conn.prepare_cached(SELECT_ENTRIES)?;
    let entries = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// Remove the given rows in one transaction and return how many existed.
/// Ids that are not present are skipped silently.
pub fn delete_entries(conn: &mut Connection, ids: &BTreeSet<i64>) -> StoreResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let mut removed = 0;
    {
        let mut stmt = tx.prepare("DELETE FROM beck_table WHERE id = ?1")?;
        for id in ids {
            removed += stmt.execute(params![id])?;
        }
    }
    tx.commit()?;
    Ok(removed)
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let mut items = [0i64; ITEM_COUNT];
    for (offset, slot) in items.iter_mut().enumerate() {
        *slot = row.get(3 + offset)?;
    }

    Ok(Entry {
        id: row.get(0)?,
        date: row.get(1)?,
        time: row.get(2)?,
        items: ItemScores::from_values(items),
        summary: row.get(3 + ITEM_COUNT)?,
    })
}
