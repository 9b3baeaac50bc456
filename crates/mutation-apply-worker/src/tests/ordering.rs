//! Cross-channel reordering: intents for one id can arrive in any order.

use super::harness::{create_intent, delete_intent, update_intent, TestHarness};
use crate::dispatch::DispatchOutcome;
use crate::engine::ApplyOutcome;

#[tokio::test]
async fn delete_before_create_is_safe_and_leaves_no_phantom() {
    let h = TestHarness::new().await;

    // Tombstone arrives first due to bus timing.
    assert_eq!(
        h.dispatch(&delete_intent("e-1", "u-1")).await,
        DispatchOutcome::Applied(ApplyOutcome::DeleteNoMatch)
    );
    assert!(h.stored("e-1").await.is_none());

    // The create lands afterwards; the record exists, live.
    assert_eq!(
        h.dispatch(&create_intent("e-1", "u-1", "Lunch", 12.5)).await,
        DispatchOutcome::Applied(ApplyOutcome::Created)
    );
    let stored = h.stored("e-1").await.unwrap();
    assert!(!stored.is_deleted);
}

#[tokio::test]
async fn update_before_create_is_a_silent_no_op() {
    let h = TestHarness::new().await;

    assert_eq!(
        h.dispatch(&update_intent("e-1", "u-1", "Lunch", 15.0)).await,
        DispatchOutcome::Applied(ApplyOutcome::UpdateNoMatch)
    );
    assert!(h.stored("e-1").await.is_none());

    h.dispatch(&create_intent("e-1", "u-1", "Lunch", 12.5)).await;

    // The racing update was not buffered anywhere; the create's fields
    // stand.
    let stored = h.stored("e-1").await.unwrap();
    assert_eq!(stored.amount, 12.5);
}

#[tokio::test]
async fn update_after_delete_does_not_resurrect_the_record() {
    let h = TestHarness::new().await;
    h.dispatch(&create_intent("e-1", "u-1", "Lunch", 12.5)).await;
    h.dispatch(&delete_intent("e-1", "u-1")).await;

    assert_eq!(
        h.dispatch(&update_intent("e-1", "u-1", "Lunch", 99.0)).await,
        DispatchOutcome::Applied(ApplyOutcome::UpdateNoMatch)
    );

    let stored = h.stored("e-1").await.unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.amount, 12.5);
}

#[tokio::test]
async fn interleaved_ids_do_not_interfere() {
    let h = TestHarness::new().await;

    h.dispatch(&delete_intent("e-2", "u-1")).await;
    h.dispatch(&create_intent("e-1", "u-1", "Lunch", 12.5)).await;
    h.dispatch(&create_intent("e-2", "u-1", "Dinner", 30.0)).await;
    h.dispatch(&update_intent("e-1", "u-1", "Lunch", 15.0)).await;

    assert_eq!(h.stored("e-1").await.unwrap().amount, 15.0);
    let e2 = h.stored("e-2").await.unwrap();
    assert_eq!(e2.amount, 30.0);
    assert!(!e2.is_deleted);
}
