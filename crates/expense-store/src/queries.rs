//! Standalone query functions that work with any connection.
//!
//! Each function takes a `&Connection` as its first parameter so the async
//! executor in [`crate::ExpenseStore`] can run them on its dedicated
//! thread. The two write operations used by the apply worker,
//! [`insert_expense_if_absent`] and the `(expense_id, user_id)`-scoped
//! updates, return whether anything matched instead of erroring: the
//! no-match case is a legitimate outcome under at-least-once, unordered
//! delivery.

use crate::StoreResult;
use chrono::{DateTime, NaiveDate, Utc};
use expense_protocol_types::{EntryType, ExpenseId, ExpenseRecord, OwnerId, ValidatedExpense};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection};

/// Filters and pagination for list/count queries.
///
/// Soft-deleted rows are always excluded here; only a direct id lookup
/// ([`get_expense`]) can see them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    /// Case-insensitive substring match over title and description.
    pub search: Option<String>,
    /// Restrict to a single calendar day.
    pub date: Option<NaiveDate>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl Default for ExpenseQuery {
    fn default() -> Self {
        Self {
            search: None,
            date: None,
            page: 1,
            limit: 10,
        }
    }
}

/// Bucketing granularity for [`summarize_expenses`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl SummaryPeriod {
    fn strftime_format(self) -> &'static str {
        match self {
            Self::Weekly => "%Y-%W",
            Self::Monthly => "%Y-%m",
            Self::Yearly => "%Y",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// One summary bucket: total income and total expenses for a period.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryBucket {
    /// Period label, e.g. `2024`, `2024-03` or `2024-09` (week).
    pub bucket: String,
    pub total_income: f64,
    pub total_expenses: f64,
}

const EXPENSE_COLUMNS: &str = "expense_id, user_id, title, description, amount, date, \
     entry_type, is_deleted, created_on, updated_on";

fn parse_stored_date(idx: usize, s: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_stored_timestamp(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let entry_type_raw: String = row.get(6)?;
    let entry_type = EntryType::parse(&entry_type_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown entry type: {entry_type_raw}").into(),
        )
    })?;

    Ok(ExpenseRecord {
        expense_id: ExpenseId::from_string(row.get::<_, String>(0)?),
        user_id: OwnerId::from_string(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        date: parse_stored_date(5, row.get::<_, String>(5)?)?,
        entry_type,
        is_deleted: row.get(7)?,
        created_on: parse_stored_timestamp(8, row.get::<_, String>(8)?)?,
        updated_on: parse_stored_timestamp(9, row.get::<_, String>(9)?)?,
    })
}

/// Insert a record unless one with the same `expense_id` already exists.
///
/// Returns `true` if a row was inserted, `false` on the duplicate no-op.
pub fn insert_expense_if_absent(conn: &Connection, record: &ExpenseRecord) -> StoreResult<bool> {
    let inserted = conn.execute(
        "INSERT INTO expenses (expense_id, user_id, title, description, amount, date, entry_type, is_deleted, created_on, updated_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(expense_id) DO NOTHING",
        params![
            record.expense_id.as_str(),
            record.user_id.as_str(),
            record.title,
            record.description,
            record.amount,
            record.date.to_string(),
            record.entry_type.as_str(),
            record.is_deleted,
            record.created_on.to_rfc3339(),
            record.updated_on.to_rfc3339(),
        ],
    )?;
    Ok(inserted > 0)
}

/// Replace the mutable fields of a live record, scoped by identity and
/// owner.
///
/// Returns `false` when nothing matched: unknown id, foreign owner, or a
/// soft-deleted row.
pub fn update_expense_where(
    conn: &Connection,
    expense_id: &ExpenseId,
    owner: &OwnerId,
    fields: &ValidatedExpense,
    updated_on: DateTime<Utc>,
) -> StoreResult<bool> {
    let updated = conn.execute(
        "UPDATE expenses
         SET title = ?3, description = ?4, amount = ?5, date = ?6, entry_type = ?7, updated_on = ?8
         WHERE expense_id = ?1 AND user_id = ?2 AND is_deleted = 0",
        params![
            expense_id.as_str(),
            owner.as_str(),
            fields.title,
            fields.description,
            fields.amount,
            fields.date.to_string(),
            fields.entry_type.as_str(),
            updated_on.to_rfc3339(),
        ],
    )?;
    Ok(updated > 0)
}

/// Soft-delete a record, scoped by identity and owner.
///
/// Sets the tombstone flag and refreshes `updated_on`; the row stays.
/// Returns `false` when nothing matched (including an already-deleted row,
/// so redelivered tombstones are no-ops).
pub fn mark_expense_deleted(
    conn: &Connection,
    expense_id: &ExpenseId,
    owner: &OwnerId,
    updated_on: DateTime<Utc>,
) -> StoreResult<bool> {
    let updated = conn.execute(
        "UPDATE expenses
         SET is_deleted = 1, updated_on = ?3
         WHERE expense_id = ?1 AND user_id = ?2 AND is_deleted = 0",
        params![expense_id.as_str(), owner.as_str(), updated_on.to_rfc3339()],
    )?;
    Ok(updated > 0)
}

/// Direct lookup by public identity. Returns soft-deleted rows too.
pub fn get_expense(conn: &Connection, expense_id: &ExpenseId) -> StoreResult<Option<ExpenseRecord>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE expense_id = ?1"
    ))?;

    let result = stmt.query_row(params![expense_id.as_str()], row_to_expense);

    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn filter_clause(query: &ExpenseQuery, sql: &mut String, args: &mut Vec<Box<dyn ToSql>>) {
    if let Some(search) = &query.search {
        sql.push_str(" AND (title LIKE '%' || ? || '%' OR description LIKE '%' || ? || '%')");
        args.push(Box::new(search.clone()));
        args.push(Box::new(search.clone()));
    }
    if let Some(date) = &query.date {
        sql.push_str(" AND date = ?");
        args.push(Box::new(date.to_string()));
    }
}

/// List an owner's live expenses, filtered and paginated.
pub fn list_expenses(
    conn: &Connection,
    owner: &OwnerId,
    query: &ExpenseQuery,
) -> StoreResult<Vec<ExpenseRecord>> {
    let mut sql = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = ? AND is_deleted = 0"
    );
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(owner.as_str().to_string())];
    filter_clause(query, &mut sql, &mut args);

    sql.push_str(" ORDER BY date DESC, id DESC LIMIT ? OFFSET ?");
    let limit = i64::from(query.limit);
    let offset = i64::from(query.page.saturating_sub(1)) * limit;
    args.push(Box::new(limit));
    args.push(Box::new(offset));

    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(
            rusqlite::params_from_iter(args.iter().map(|a| &**a)),
            row_to_expense,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Count the rows [`list_expenses`] would paginate over.
pub fn count_expenses(conn: &Connection, owner: &OwnerId, query: &ExpenseQuery) -> StoreResult<i64> {
    let mut sql = "SELECT COUNT(*) FROM expenses WHERE user_id = ? AND is_deleted = 0".to_string();
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(owner.as_str().to_string())];
    filter_clause(query, &mut sql, &mut args);

    let mut stmt = conn.prepare(&sql)?;
    let count = stmt.query_row(
        rusqlite::params_from_iter(args.iter().map(|a| &**a)),
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Total income (credit) and expenses (debit) per period bucket for an
/// owner, oldest bucket first. Soft-deleted rows are excluded.
pub fn summarize_expenses(
    conn: &Connection,
    owner: &OwnerId,
    period: SummaryPeriod,
) -> StoreResult<Vec<SummaryBucket>> {
    let mut stmt = conn.prepare_cached(
        "SELECT strftime(?2, date) AS bucket,
                SUM(CASE WHEN entry_type = 'credit' THEN amount ELSE 0 END),
                SUM(CASE WHEN entry_type = 'debit' THEN amount ELSE 0 END)
         FROM expenses
         WHERE user_id = ?1 AND is_deleted = 0
         GROUP BY bucket
         ORDER BY bucket ASC",
    )?;

    let buckets = stmt
        .query_map(params![owner.as_str(), period.strftime_format()], |row| {
            Ok(SummaryBucket {
                bucket: row.get(0)?,
                total_income: row.get(1)?,
                total_expenses: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(buckets)
}
