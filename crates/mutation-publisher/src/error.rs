//! Publisher error types.

use channel_bus::BusError;
use expense_protocol_types::{ProtocolError, ValidationError};
use thiserror::Error;

/// Why a mutation request did not make it onto the bus.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The draft failed a field rule; the 400-class path.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The intent could not be serialized.
    #[error("encoding failed: {0}")]
    Protocol(#[from] ProtocolError),

    /// The bus was unreachable or rejected the publish; the 500-class
    /// path. The intent is lost.
    #[error("publish failed: {0}")]
    Bus(#[from] BusError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_keeps_the_field_message() {
        let err = PublishError::from(ValidationError::MissingTitle);
        assert_eq!(format!("{}", err), "validation failed: title is required");
    }
}
