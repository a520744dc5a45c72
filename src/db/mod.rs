//! Persistence module split across logical submodules.

mod connection;
mod entries;
mod store;

pub use connection::{ensure_schema, initialize_database, open_connection};
pub use entries::{delete_entries, fetch_entries, insert_entry, INSERT_VALUE_COUNT};
pub use store::RecordStore;
