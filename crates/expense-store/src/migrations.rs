//! Database migrations.
//!
//! Migrations run in order and are tracked in the `migrations` table.

use crate::StoreResult;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    info!(current_version, target_version = CURRENT_VERSION, "Running migrations");

    if current_version < 1 {
        migrate_v1_expenses(conn)?;
    }

    info!("Migrations complete");
    Ok(())
}

fn record_migration(conn: &Connection, version: i32, name: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    debug!(version, name, "Migration applied");
    Ok(())
}

/// V1: the expenses table.
///
/// `id` is the storage key and never leaves this crate; `expense_id` is the
/// public identity every mutation correlates on.
fn migrate_v1_expenses(conn: &Connection) -> StoreResult<()> {
    info!("Applying migration v1: expenses");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            expense_id TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            entry_type TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_on TEXT NOT NULL,
            updated_on TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expenses_owner
            ON expenses(user_id, is_deleted);

        CREATE INDEX IF NOT EXISTS idx_expenses_owner_date
            ON expenses(user_id, date);
        ",
    )?;

    record_migration(conn, 1, "expenses")
}
