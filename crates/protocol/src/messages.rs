//! Bridge message types.
//!
//! This module defines the requests the client core sends to the native
//! backend and the responses it gets back. The backend reports success or
//! failure only; no operation carries a payload beyond an error message.

use serde::{Deserialize, Serialize};

/// Operations the client core can ask the backend to perform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BridgeRequest {
    /// Liveness probe.
    Ping,
    /// Prepare a client session bound to a peer, and set the directory
    /// downloads land in.
    StartClient {
        /// IPv4 address of the peer.
        server_address: String,
        /// Local destination directory.
        local_path: String,
    },
    /// Complete the handshake for the session prepared by `StartClient`.
    Connect,
    /// Transfer a remote path into the session's local destination.
    Download {
        /// Remote path, in whatever addressing scheme the backend accepts.
        path_to_download: String,
    },
    /// Push a local path to the peer.
    Send {
        /// Local path to upload.
        path_to_send: String,
    },
}

impl BridgeRequest {
    /// Returns the backend command name of this request.
    pub fn operation(&self) -> &'static str {
        match self {
            BridgeRequest::Ping => "ping",
            BridgeRequest::StartClient { .. } => "start_client",
            BridgeRequest::Connect => "connect",
            BridgeRequest::Download { .. } => "download",
            BridgeRequest::Send { .. } => "send",
        }
    }
}

/// Replies from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BridgeResponse {
    /// Reply to `Ping`.
    Pong,
    /// The operation was accepted.
    Ok,
    /// The operation was rejected.
    Error {
        /// Human-readable reason given by the backend.
        message: String,
    },
}

impl BridgeResponse {
    /// Build an error response.
    pub fn error(message: impl Into<String>) -> Self {
        BridgeResponse::Error {
            message: message.into(),
        }
    }
}
