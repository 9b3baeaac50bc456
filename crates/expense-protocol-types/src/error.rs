//! Protocol error types.

use thiserror::Error;

/// Errors produced while encoding or decoding intents.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload is not the JSON shape the channel requires.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Message arrived on a channel outside the closed mutation set.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_channel_display() {
        let err = ProtocolError::UnknownChannel("archive-expense".to_string());
        assert_eq!(format!("{}", err), "unknown channel: archive-expense");
    }

    #[test]
    fn json_error_converts() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{{{").unwrap_err();
        let err: ProtocolError = serde_err.into();
        assert!(format!("{}", err).starts_with("JSON error:"));
    }
}
