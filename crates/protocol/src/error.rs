//! Error types for the protocol crate.

use thiserror::Error;

/// Failure modes of the bridge wire layer.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Failed to serialize a message.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Failed to deserialize a message.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A line exceeded the maximum accepted length.
    #[error("frame too large: more than {max} bytes without a line terminator")]
    FrameTooLarge {
        /// Maximum allowed line length.
        max: usize,
    },

    /// The peer closed the connection before a message arrived.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Operation timed out.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Any other I/O failure on the socket.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_eof() || err.is_syntax() {
            ProtocolError::Deserialization(err.to_string())
        } else {
            ProtocolError::Serialization(err.to_string())
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::TimedOut => ProtocolError::Timeout(err.to_string()),
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed(err.to_string()),
            ErrorKind::InvalidData => ProtocolError::Deserialization(err.to_string()),
            _ => ProtocolError::Io(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_too_large_error_display() {
        let err = ProtocolError::FrameTooLarge { max: 65536 };
        assert_eq!(
            err.to_string(),
            "frame too large: more than 65536 bytes without a line terminator"
        );
    }

    #[test]
    fn test_from_json_syntax_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ProtocolError = err.into();
        assert!(matches!(err, ProtocolError::Deserialization(_)));
    }

    #[test]
    fn test_from_io_error_kinds() {
        use std::io::{Error, ErrorKind};

        let err: ProtocolError = Error::new(ErrorKind::TimedOut, "slow").into();
        assert!(matches!(err, ProtocolError::Timeout(_)));

        let err: ProtocolError = Error::new(ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, ProtocolError::ConnectionClosed(_)));

        let err: ProtocolError = Error::new(ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, ProtocolError::Io(_)));
    }
}
