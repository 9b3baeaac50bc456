//! Test harness for apply-worker scenario tests.
//!
//! Dispatches run against an in-memory store; the dead-letter sink
//! records instead of publishing. Retry delays are shrunk to keep the
//! suite fast.

use crate::dispatch::{
    DeadLetter, DeadLetterSink, DispatchOutcome, MutationDispatcher, RetryPolicy,
};
use crate::engine::ApplyEngine;
use chrono::NaiveDate;
use expense_protocol_types::{
    CreateExpense, DeleteExpense, EntryType, ExpenseId, ExpenseRecord, MutationIntent, OwnerId,
    UpdateExpense,
};
use expense_store::ExpenseStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Dead-letter sink that records entries for assertions.
pub(crate) struct RecordingDeadLetterSink {
    letters: Mutex<Vec<DeadLetter>>,
}

impl RecordingDeadLetterSink {
    pub fn new() -> Self {
        Self {
            letters: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.letters.lock().unwrap().len()
    }

    pub fn letters(&self) -> Vec<DeadLetter> {
        self.letters.lock().unwrap().clone()
    }
}

impl DeadLetterSink for RecordingDeadLetterSink {
    fn enqueue(&self, letter: DeadLetter) {
        self.letters.lock().unwrap().push(letter);
    }
}

/// Store + dispatcher + recording sink, wired the way the worker wires
/// them.
pub(crate) struct TestHarness {
    pub store: ExpenseStore,
    pub dispatcher: MutationDispatcher,
    pub dead_letters: Arc<RecordingDeadLetterSink>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_store(ExpenseStore::open_in_memory().await.unwrap())
    }

    pub fn with_store(store: ExpenseStore) -> Self {
        let dead_letters = Arc::new(RecordingDeadLetterSink::new());
        let retry = RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::from_millis(1),
            backoff_max: Duration::from_millis(2),
        };
        let dispatcher = MutationDispatcher::new(
            ApplyEngine::new(store.clone()),
            retry,
            dead_letters.clone(),
        );
        Self {
            store,
            dispatcher,
            dead_letters,
        }
    }

    /// Encode an intent and run it through dispatch, exactly as a bus
    /// message would arrive.
    pub async fn dispatch(&self, intent: &MutationIntent) -> DispatchOutcome {
        let payload = intent.encode().unwrap();
        self.dispatcher
            .dispatch(intent.channel().name(), &payload)
            .await
    }

    pub async fn dispatch_raw(&self, channel: &str, payload: &[u8]) -> DispatchOutcome {
        self.dispatcher.dispatch(channel, payload).await
    }

    pub async fn stored(&self, expense_id: &str) -> Option<ExpenseRecord> {
        self.store
            .get(ExpenseId::from_string(expense_id))
            .await
            .unwrap()
    }
}

pub(crate) fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

pub(crate) fn create_intent(
    expense_id: &str,
    owner: &str,
    title: &str,
    amount: f64,
) -> MutationIntent {
    MutationIntent::Create(CreateExpense {
        expense_id: ExpenseId::from_string(expense_id),
        title: title.to_string(),
        description: None,
        amount,
        date: test_date(),
        entry_type: EntryType::Debit,
        user: OwnerId::from_string(owner),
    })
}

pub(crate) fn update_intent(
    expense_id: &str,
    owner: &str,
    title: &str,
    amount: f64,
) -> MutationIntent {
    MutationIntent::Update(UpdateExpense {
        expense_id: ExpenseId::from_string(expense_id),
        user_id: OwnerId::from_string(owner),
        title: title.to_string(),
        description: None,
        amount,
        date: test_date(),
        entry_type: EntryType::Debit,
        updated_on: None,
    })
}

pub(crate) fn delete_intent(expense_id: &str, owner: &str) -> MutationIntent {
    MutationIntent::Delete(DeleteExpense {
        user_id: OwnerId::from_string(owner),
        expense_id: ExpenseId::from_string(expense_id),
    })
}
