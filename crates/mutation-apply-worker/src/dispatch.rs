//! Decode-then-apply dispatch with bounded retry and dead-lettering.

use crate::engine::{ApplyEngine, ApplyOutcome};
use chrono::{DateTime, Utc};
use expense_protocol_types::MutationIntent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Retry behavior for store failures.
///
/// Delay follows binary exponential backoff: `base * 2^(attempt - 1)`,
/// capped at `backoff_max`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total apply attempts per message before dead-lettering. Treated as
    /// at least 1.
    pub max_attempts: u32,
    /// Initial retry delay.
    pub backoff_base: Duration,
    /// Cap on the exponential growth.
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::from_secs(2),
            backoff_max: Duration::from_secs(60),
        }
    }
}

/// Delay before retry number `attempt + 1`, given `attempt` failures so
/// far.
pub fn backoff_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let base_ms = policy.backoff_base.as_millis() as u64;
    let max_ms = policy.backoff_max.as_millis() as u64;
    let multiplier = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(multiplier).min(max_ms))
}

/// A message the worker gave up on: decoded fine, but the store rejected
/// it until retries ran out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadLetter {
    /// Channel the message originally arrived on.
    pub channel: String,
    /// Original payload, kept as text for operator inspection.
    pub payload: String,
    /// The last store error observed.
    pub error: String,
    /// How many apply attempts were made.
    pub attempts: u32,
    pub failed_at: DateTime<Utc>,
}

/// Destination for messages whose retries are exhausted.
///
/// Implementations handle delivery on their own time; enqueue never
/// blocks the dispatch path.
pub trait DeadLetterSink: Send + Sync {
    fn enqueue(&self, letter: DeadLetter);
}

/// What dispatch did with one bus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Decoded and applied (possibly as a no-op).
    Applied(ApplyOutcome),
    /// Undecodable payload or unknown channel; logged and dropped.
    DroppedMalformed,
    /// Store kept failing; routed to the dead-letter sink.
    DeadLettered,
}

/// The single decode-then-apply path every bus message goes through.
pub struct MutationDispatcher {
    engine: ApplyEngine,
    retry: RetryPolicy,
    dead_letter: Arc<dyn DeadLetterSink>,
}

impl MutationDispatcher {
    pub fn new(
        engine: ApplyEngine,
        retry: RetryPolicy,
        dead_letter: Arc<dyn DeadLetterSink>,
    ) -> Self {
        Self {
            engine,
            retry,
            dead_letter,
        }
    }

    /// Process one message from the bus.
    ///
    /// Never returns an error and never panics on message content: bad
    /// payloads are dropped, store failures end in the dead-letter sink.
    /// One message's fate never affects the next.
    pub async fn dispatch(&self, channel: &str, payload: &[u8]) -> DispatchOutcome {
        let intent = match MutationIntent::decode_named(channel, payload) {
            Ok(intent) => intent,
            Err(e) => {
                warn!(channel, error = %e, "Dropping undecodable message");
                return DispatchOutcome::DroppedMalformed;
            }
        };

        let expense_id = intent.expense_id().clone();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.engine.apply(intent.clone()).await {
                Ok(outcome) => {
                    debug!(
                        channel,
                        expense_id = %expense_id,
                        outcome = outcome.as_str(),
                        attempt,
                        "Dispatched mutation"
                    );
                    return DispatchOutcome::Applied(outcome);
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(
                        channel,
                        expense_id = %expense_id,
                        attempt,
                        max_attempts,
                        error = %last_error,
                        "Store rejected apply"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(backoff_delay(attempt, &self.retry)).await;
                    }
                }
            }
        }

        error!(
            channel,
            expense_id = %expense_id,
            attempts = max_attempts,
            "Retries exhausted, routing message to dead letter"
        );
        self.dead_letter.enqueue(DeadLetter {
            channel: channel.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            error: last_error,
            attempts: max_attempts,
            failed_at: Utc::now(),
        });
        DispatchOutcome::DeadLettered
    }
}
