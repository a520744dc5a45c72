//! Core library surface for the Beck Tracker TUI.
//!
//! The binary only wires these pieces together: the record store owns the
//! SQLite file, the UI owns the questionnaire form and the entry table, and
//! config/logging supply file locations and the log sink.
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer.
pub use db::RecordStore;

pub use config::Settings;
pub use errors::{StoreError, StoreResult};
pub use models::{summary_score, Entry, Item, ItemScores};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
