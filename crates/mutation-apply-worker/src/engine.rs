//! Idempotent application of mutation intents to the store.

use chrono::Utc;
use expense_protocol_types::{ExpenseRecord, MutationIntent, ValidatedExpense};
use expense_store::{ExpenseStore, StoreResult};
use tracing::debug;

/// What applying an intent did to the store.
///
/// The no-match variants are successes, not errors: with at-least-once,
/// unordered delivery a redelivered create or an update that raced ahead
/// of its create are expected events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new row was inserted.
    Created,
    /// A row with this id already existed; insert skipped.
    DuplicateCreate,
    /// The row was updated in place.
    Updated,
    /// No live row matched `(expense_id, owner)`; update skipped.
    UpdateNoMatch,
    /// The row was tombstoned.
    Deleted,
    /// No live row matched `(expense_id, owner)`; delete skipped.
    DeleteNoMatch,
}

impl ApplyOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::DuplicateCreate => "duplicate-create",
            Self::Updated => "updated",
            Self::UpdateNoMatch => "update-no-match",
            Self::Deleted => "deleted",
            Self::DeleteNoMatch => "delete-no-match",
        }
    }

    /// True when the store was left untouched.
    pub fn is_no_op(self) -> bool {
        matches!(
            self,
            Self::DuplicateCreate | Self::UpdateNoMatch | Self::DeleteNoMatch
        )
    }
}

/// Applies decoded intents through the store's conditional writes.
#[derive(Clone)]
pub struct ApplyEngine {
    store: ExpenseStore,
}

impl ApplyEngine {
    pub fn new(store: ExpenseStore) -> Self {
        Self { store }
    }

    /// Apply one intent. Every mutation is a conditional match-then-set
    /// keyed on `(expense_id, owner)`, so concurrent or repeated
    /// application cannot corrupt state.
    ///
    /// Timestamps are stamped here, at apply time. Updates deliberately
    /// ignore the publish-side `updated_on`: resolution between racing
    /// updates is last-message-applied-wins.
    pub async fn apply(&self, intent: MutationIntent) -> StoreResult<ApplyOutcome> {
        let outcome = match intent {
            MutationIntent::Create(create) => {
                let now = Utc::now();
                let record = ExpenseRecord {
                    expense_id: create.expense_id,
                    user_id: create.user,
                    title: create.title,
                    description: create.description,
                    amount: create.amount,
                    date: create.date,
                    entry_type: create.entry_type,
                    is_deleted: false,
                    created_on: now,
                    updated_on: now,
                };
                if self.store.insert_if_absent(record).await? {
                    ApplyOutcome::Created
                } else {
                    ApplyOutcome::DuplicateCreate
                }
            }

            MutationIntent::Update(update) => {
                let fields = ValidatedExpense {
                    title: update.title,
                    description: update.description,
                    amount: update.amount,
                    date: update.date,
                    entry_type: update.entry_type,
                };
                if self
                    .store
                    .update_where(update.expense_id, update.user_id, fields, Utc::now())
                    .await?
                {
                    ApplyOutcome::Updated
                } else {
                    ApplyOutcome::UpdateNoMatch
                }
            }

            MutationIntent::Delete(delete) => {
                if self
                    .store
                    .mark_deleted(delete.expense_id, delete.user_id, Utc::now())
                    .await?
                {
                    ApplyOutcome::Deleted
                } else {
                    ApplyOutcome::DeleteNoMatch
                }
            }
        };

        debug!(outcome = outcome.as_str(), "Applied mutation intent");
        Ok(outcome)
    }
}
