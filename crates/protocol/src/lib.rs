//! # Ferry Bridge Protocol
//!
//! This crate defines the wire contract between the Ferry client core and the
//! native backend process that performs the actual network and filesystem
//! work.
//!
//! ## Overview
//!
//! - **Messages**: the bridge operations (`start_client`, `connect`,
//!   `download`, `send`, `ping`) and their replies
//! - **Framing**: one JSON object per line, bounded in length
//! - **Socket Path**: where the backend listens by default
//! - **Listener**: the accepting half of the bridge, used by the backend
//!   process
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐                     ┌──────────────────────┐
//! │   Ferry client core  │   BridgeRequest ──▶ │   Native backend     │
//! │  (ferry-client)      │ ◀── BridgeResponse  │  (BridgeListener)    │
//! └──────────────────────┘   JSON lines / UDS  └──────────────────────┘
//! ```
//!
//! Each request travels on its own socket connection and receives exactly
//! one response line.
//!
//! ## Example
//!
//! ```rust
//! use protocol::{BridgeRequest, BridgeResponse};
//!
//! let request = BridgeRequest::Download {
//!     path_to_download: "/srv/share/report.pdf".to_string(),
//! };
//! assert_eq!(request.operation(), "download");
//!
//! let json = serde_json::to_string(&BridgeResponse::Ok).unwrap();
//! assert_eq!(json, r#""Ok""#);
//! ```
//!
//! ## Modules
//!
//! - [`messages`]: request and response types
//! - [`framing`]: newline-delimited JSON reader/writer
//! - [`listener`]: backend-side socket listener
//! - [`error`]: error types

pub mod error;
pub mod framing;
pub mod listener;
pub mod messages;

pub use error::{ProtocolError, Result};
pub use framing::{read_message, write_message, MAX_LINE_LENGTH};
pub use listener::{BridgeConnection, BridgeListener};
pub use messages::{BridgeRequest, BridgeResponse};

use std::path::PathBuf;

/// Directory name used under the runtime directory.
const SOCKET_DIR_NAME: &str = "ferry";

/// File name of the backend socket.
const SOCKET_FILE_NAME: &str = "backend.sock";

/// Get the default socket path of the backend bridge.
///
/// ## Path Resolution
///
/// 1. If `$XDG_RUNTIME_DIR` is set: `$XDG_RUNTIME_DIR/ferry/backend.sock`
/// 2. Otherwise: `/tmp/ferry-$UID/backend.sock`
#[cfg(unix)]
pub fn default_socket_path() -> PathBuf {
    use std::os::unix::fs::MetadataExt;

    if let Some(runtime_dir) = std::env::var_os("XDG_RUNTIME_DIR").filter(|v| !v.is_empty()) {
        PathBuf::from(runtime_dir)
            .join(SOCKET_DIR_NAME)
            .join(SOCKET_FILE_NAME)
    } else {
        // The owner of /proc/self is the current user.
        let uid = std::fs::metadata("/proc/self")
            .map(|m| m.uid())
            .unwrap_or(0);

        PathBuf::from(format!("/tmp/{}-{}", SOCKET_DIR_NAME, uid)).join(SOCKET_FILE_NAME)
    }
}

/// Unix domain sockets are the only supported bridge transport.
#[cfg(not(unix))]
pub fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/ferry-unsupported").join(SOCKET_FILE_NAME)
}
