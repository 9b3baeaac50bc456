//! Bus error types.

use std::time::Duration;
use thiserror::Error;

/// Bus error type.
#[derive(Error, Debug)]
pub enum BusError {
    /// Redis connection or operation error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A connect or publish exceeded its deadline
    #[error("bus {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;
