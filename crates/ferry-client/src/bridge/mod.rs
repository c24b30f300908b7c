//! Backend bridge.
//!
//! The native backend performs all network and filesystem work. The client
//! core reaches it only through [`BackendBridge`]; every operation reports
//! success or an opaque failure.
//!
//! - [`IpcBridge`]: production implementation over the backend's Unix socket

mod ipc;

pub use ipc::IpcBridge;

use std::future::Future;
use std::path::PathBuf;

use protocol::{BridgeResponse, ProtocolError};
use thiserror::Error;

/// Errors returned by bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The backend socket could not be reached.
    #[error("backend unavailable at {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend did not answer within the configured timeout.
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    /// The backend refused the operation.
    #[error("{operation} rejected by backend: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },

    /// The backend answered with a reply that does not fit the request.
    #[error("unexpected reply to {operation}: {response:?}")]
    UnexpectedResponse {
        operation: &'static str,
        response: BridgeResponse,
    },

    /// Wire-level failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// The operations exposed by the native backend.
///
/// Implementations must be safe to call concurrently; the client core does
/// not serialise calls coming from different forms.
pub trait BackendBridge: Send + Sync + 'static {
    /// Prepare a client session bound to `server_address`, with downloads
    /// landing in `local_path`.
    fn start_client(
        &self,
        server_address: &str,
        local_path: &str,
    ) -> impl Future<Output = BridgeResult<()>> + Send;

    /// Complete the handshake for the session prepared by `start_client`.
    fn connect(&self) -> impl Future<Output = BridgeResult<()>> + Send;

    /// Request transfer of `path_to_download` into the local destination.
    fn download(&self, path_to_download: &str) -> impl Future<Output = BridgeResult<()>> + Send;

    /// Request upload of `path_to_send` to the peer.
    fn send(&self, path_to_send: &str) -> impl Future<Output = BridgeResult<()>> + Send;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = BridgeError::Rejected {
            operation: "connect",
            message: "Server is none".to_string(),
        };
        assert_eq!(err.to_string(), "connect rejected by backend: Server is none");
    }

    #[test]
    fn test_unavailable_display() {
        let err = BridgeError::Unavailable {
            path: PathBuf::from("/run/ferry/backend.sock"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "backend unavailable at /run/ferry/backend.sock: no such file"
        );
    }

    #[test]
    fn test_protocol_error_is_transparent() {
        let err: BridgeError = ProtocolError::ConnectionClosed("eof".to_string()).into();
        assert_eq!(err.to_string(), "connection closed: eof");
    }
}
