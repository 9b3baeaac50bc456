//! Scenario tests for the apply worker.
//!
//! Organized by the delivery guarantees the worker has to survive:
//!
//! - `harness.rs`          - In-memory store, recording dead-letter sink
//! - `idempotency.rs`      - Redelivered messages are no-ops
//! - `ordering.rs`         - Cross-channel reordering is safe
//! - `owner_isolation.rs`  - Mutations never cross owner boundaries
//! - `round_trip.rs`       - Publish-shaped payloads land as records
//! - `failure_handling.rs` - Malformed payloads and store failures

mod harness;

mod ordering;
mod owner_isolation;
