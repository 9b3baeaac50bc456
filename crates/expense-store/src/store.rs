//! Async store handle over a dedicated SQLite thread.
//!
//! All operations are sent to a single background thread via channel, so
//! the Tokio runtime never blocks on SQLite and queries execute in FIFO
//! order. Only SQL should run inside `call()` closures.

use crate::{migrations, queries, StoreError, StoreResult};
use crate::{ExpenseQuery, SummaryBucket, SummaryPeriod};
use chrono::{DateTime, Utc};
use expense_protocol_types::{ExpenseId, ExpenseRecord, OwnerId, ValidatedExpense};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::info;

/// Convert a tokio_rusqlite::Error to StoreError.
fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> StoreError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => StoreError::Sqlite(e),
        tokio_rusqlite::Error::ConnectionClosed => {
            StoreError::Connection("Connection closed".to_string())
        }
        other => StoreError::Connection(other.to_string()),
    }
}

/// Handle to the expense store.
///
/// Cheap to clone; all clones share the same executor thread.
#[derive(Clone)]
pub struct ExpenseStore {
    conn: Connection,
    path: String,
}

impl ExpenseStore {
    /// Open a store at the given path, creating the file and running any
    /// pending migrations.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "Opening expense store");

        let conn = Connection::open(path_str.clone())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA foreign_keys = ON;
                PRAGMA temp_store = MEMORY;
                PRAGMA busy_timeout = 5000;
                ",
            )?;
            Ok(())
        })
        .await
        .map_err(from_tokio_rusqlite)?;

        let store = Self {
            conn,
            path: path_str.clone(),
        };
        store.call(|conn| migrations::run_migrations(conn)).await?;

        info!(path = %path_str, "Expense store initialized with WAL mode");
        Ok(store)
    }

    /// Open an in-memory store for testing.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self {
            conn,
            path: ":memory:".to_string(),
        };
        store.call(|conn| migrations::run_migrations(conn)).await?;
        Ok(store)
    }

    /// Execute a closure on the store's connection.
    ///
    /// The closure runs on the dedicated SQLite thread; the caller's task
    /// is parked until the result is ready.
    pub async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let outer = self.conn.call(move |conn| Ok(f(conn))).await;
        match outer {
            Ok(inner) => inner,
            Err(e) => Err(from_tokio_rusqlite(e)),
        }
    }

    /// Insert a record unless one with the same id already exists.
    /// Returns `true` if a row was inserted.
    pub async fn insert_if_absent(&self, record: ExpenseRecord) -> StoreResult<bool> {
        self.call(move |conn| queries::insert_expense_if_absent(conn, &record))
            .await
    }

    /// Replace the mutable fields of a live record, scoped by
    /// `(expense_id, owner)`. Returns `true` if a row matched.
    pub async fn update_where(
        &self,
        expense_id: ExpenseId,
        owner: OwnerId,
        fields: ValidatedExpense,
        updated_on: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.call(move |conn| {
            queries::update_expense_where(conn, &expense_id, &owner, &fields, updated_on)
        })
        .await
    }

    /// Soft-delete a record, scoped by `(expense_id, owner)`. Returns
    /// `true` if a row matched.
    pub async fn mark_deleted(
        &self,
        expense_id: ExpenseId,
        owner: OwnerId,
        updated_on: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.call(move |conn| queries::mark_expense_deleted(conn, &expense_id, &owner, updated_on))
            .await
    }

    /// Direct lookup by public identity; returns soft-deleted rows too.
    pub async fn get(&self, expense_id: ExpenseId) -> StoreResult<Option<ExpenseRecord>> {
        self.call(move |conn| queries::get_expense(conn, &expense_id))
            .await
    }

    /// List an owner's live expenses.
    pub async fn list(&self, owner: OwnerId, query: ExpenseQuery) -> StoreResult<Vec<ExpenseRecord>> {
        self.call(move |conn| queries::list_expenses(conn, &owner, &query))
            .await
    }

    /// Count the rows [`ExpenseStore::list`] paginates over.
    pub async fn count(&self, owner: OwnerId, query: ExpenseQuery) -> StoreResult<i64> {
        self.call(move |conn| queries::count_expenses(conn, &owner, &query))
            .await
    }

    /// Periodic income/expense totals for an owner.
    pub async fn summary(
        &self,
        owner: OwnerId,
        period: SummaryPeriod,
    ) -> StoreResult<Vec<SummaryBucket>> {
        self.call(move |conn| queries::summarize_expenses(conn, &owner, period))
            .await
    }

    /// The database file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Close the store, waiting for pending operations to finish.
    ///
    /// Clones of this handle stop working once any of them is closed.
    pub async fn close(self) -> StoreResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to close store: {e:?}")))?;
        info!(path = %self.path, "Expense store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use expense_protocol_types::EntryType;
    use tempfile::tempdir;

    fn record(expense_id: &str, owner: &str) -> ExpenseRecord {
        let now = Utc::now();
        ExpenseRecord {
            expense_id: ExpenseId::from_string(expense_id),
            user_id: OwnerId::from_string(owner),
            title: "Lunch".to_string(),
            description: None,
            amount: 12.5,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            entry_type: EntryType::Debit,
            is_deleted: false,
            created_on: now,
            updated_on: now,
        }
    }

    #[tokio::test]
    async fn open_on_disk_and_query() {
        let dir = tempdir().unwrap();
        let store = ExpenseStore::open(&dir.path().join("expenses.db")).await.unwrap();

        assert!(store.insert_if_absent(record("e-1", "u-1")).await.unwrap());
        let stored = store.get(ExpenseId::from_string("e-1")).await.unwrap().unwrap();
        assert_eq!(stored.title, "Lunch");
    }

    #[tokio::test]
    async fn clones_share_the_executor() {
        let store = ExpenseStore::open_in_memory().await.unwrap();
        let clone = store.clone();

        assert!(clone.insert_if_absent(record("e-1", "u-1")).await.unwrap());
        let stored = store.get(ExpenseId::from_string("e-1")).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn operations_after_close_fail_with_connection_error() {
        let store = ExpenseStore::open_in_memory().await.unwrap();
        let survivor = store.clone();
        store.close().await.unwrap();

        let err = survivor.insert_if_absent(record("e-1", "u-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
