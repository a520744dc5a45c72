//! Binary entry point: open the database, restore the last page, and drive
//! the Ratatui event loop until the user exits.
use anyhow::Context;
use beck_tracker::config::{data_dir, db_path, seed_db_path, settings_path};
use beck_tracker::logging::init_logging;
use beck_tracker::{run_app, App, RecordStore, Settings};
use tracing::{error, info};

/// Startup failures (no home directory, unwritable data directory, a file
/// SQLite refuses to open) end the process with an error instead of leaving
/// the form running against a dead store.
fn main() -> anyhow::Result<()> {
    let data_dir = data_dir()?;
    let _log_guard = init_logging(&data_dir)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting beck-tracker");

    let store = RecordStore::open(&db_path()?, &seed_db_path()).context("failed to open database")?;
    let entries = store
        .query_all_entries()
        .context("failed to load entries")?;
    info!(count = entries.len(), "loaded entries");

    let settings_path = settings_path()?;
    let settings = Settings::load(&settings_path);

    let mut app = App::new(store, entries, &settings);
    let result = run_app(&mut app);

    if let Err(err) = app.settings().save(&settings_path) {
        error!(error = %format!("{err:#}"), "failed to save settings");
    }
    app.shutdown();

    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "ui loop failed");
    }
    result
}
