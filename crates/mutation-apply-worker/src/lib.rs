//! Apply worker: the subscribing half of the expense write path.
//!
//! The worker holds long-lived subscriptions to the three mutation
//! channels, decodes each message into a `MutationIntent`, and applies
//! it to the store through idempotent, owner-scoped operations.
//!
//! # Core Invariants
//!
//! 1. **Idempotent apply**: redelivered creates are no-ops on the existing
//!    row; update/delete with no matching `(expense_id, owner)` are silent
//!    no-ops, never errors.
//! 2. **Order-blind**: the bus gives no ordering across channels, so a
//!    delete or update may arrive before its create. Every not-found path
//!    is safe.
//! 3. **Poison containment**: undecodable messages are logged and dropped;
//!    store failures are retried with exponential backoff and then routed
//!    to the dead-letter channel. The worker process never dies on a bad
//!    message.
//!
//! # Consistency gap (accepted)
//!
//! The publishing tier answers its client as soon as the bus accepts a
//! message. If apply later fails for good (retries exhausted, message
//! dead-lettered) the client has already seen a success response for an
//! effect that never materialized. Operators watch the dead-letter channel
//! for exactly this case.
//!
//! ```text
//! create-expense ─┐
//! update-expense ─┼─> ApplyWorker ─> MutationDispatcher ─> ApplyEngine ─> store
//! delete-expense ─┘                        │
//!                                          └─> dead-letter-expense
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod worker;

#[cfg(test)]
mod tests;

pub use config::WorkerConfig;
pub use dispatch::{
    backoff_delay, DeadLetter, DeadLetterSink, DispatchOutcome, MutationDispatcher, RetryPolicy,
};
pub use engine::{ApplyEngine, ApplyOutcome};
pub use error::{WorkerError, WorkerResult};
pub use worker::{ApplyWorker, RedisDeadLetterSink};
