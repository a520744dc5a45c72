//! Typed failures of the record store. UI code wraps these in `anyhow` when it
//! only needs a message; tests match on the variants.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The number of bound values differs from the statement's placeholders.
    /// Raised before the statement runs, so nothing is written.
    #[error("expected {expected} bind values, got {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not locate home directory")]
    HomeDirUnavailable,

    #[error("database connection is closed")]
    Closed,
}

pub type StoreResult<T> = Result<T, StoreError>;
