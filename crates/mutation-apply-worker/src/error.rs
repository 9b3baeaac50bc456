//! Error types for the apply worker.

use thiserror::Error;

/// Worker error type.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Bus connection or operation error
    #[error("Bus error: {0}")]
    Bus(#[from] channel_bus::BusError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] expense_store::StoreError),

    /// Payload decoding error
    #[error("Protocol error: {0}")]
    Protocol(#[from] expense_protocol_types::ProtocolError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;
