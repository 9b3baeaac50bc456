//! Mutations are scoped to `(expense_id, owner)`; a foreign owner can
//! never touch a record, even with a colliding id.

use super::harness::{create_intent, delete_intent, update_intent, TestHarness};
use crate::dispatch::DispatchOutcome;
use crate::engine::ApplyOutcome;

#[tokio::test]
async fn foreign_owner_update_is_a_no_op() {
    let h = TestHarness::new().await;
    h.dispatch(&create_intent("e-1", "u-1", "Lunch", 12.5)).await;

    assert_eq!(
        h.dispatch(&update_intent("e-1", "u-2", "Hijacked", 0.0)).await,
        DispatchOutcome::Applied(ApplyOutcome::UpdateNoMatch)
    );

    let stored = h.stored("e-1").await.unwrap();
    assert_eq!(stored.title, "Lunch");
    assert_eq!(stored.amount, 12.5);
    assert_eq!(stored.user_id.as_str(), "u-1");
}

#[tokio::test]
async fn foreign_owner_delete_is_a_no_op() {
    let h = TestHarness::new().await;
    h.dispatch(&create_intent("e-1", "u-1", "Lunch", 12.5)).await;

    assert_eq!(
        h.dispatch(&delete_intent("e-1", "u-2")).await,
        DispatchOutcome::Applied(ApplyOutcome::DeleteNoMatch)
    );

    assert!(!h.stored("e-1").await.unwrap().is_deleted);
}

#[tokio::test]
async fn owners_with_identical_titles_stay_separate() {
    let h = TestHarness::new().await;
    h.dispatch(&create_intent("e-1", "u-1", "Lunch", 12.5)).await;
    h.dispatch(&create_intent("e-2", "u-2", "Lunch", 7.0)).await;

    h.dispatch(&delete_intent("e-1", "u-1")).await;

    assert!(h.stored("e-1").await.unwrap().is_deleted);
    assert!(!h.stored("e-2").await.unwrap().is_deleted);
}
