//! # Ferry Client Core
//!
//! This crate is the orchestration core of the Ferry desktop client: it
//! connects to a file-transfer peer by IPv4 address and requests downloads
//! (and uploads) by path, delegating the actual network and filesystem work
//! to a native backend process reached over a command bridge.
//!
//! ## Overview
//!
//! - **Connection Manager**: validates the peer address, resolves the local
//!   destination and drives the `start_client` → `connect` handshake
//! - **Transfer Requester**: submits `download` / `send` requests against
//!   the active session
//! - **Backend Bridge**: the backend's operations behind a trait, with a
//!   Unix socket implementation
//! - **IPC Commands**: Tauri command handlers for the frontend forms
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Frontend forms (Connect / Download)                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                   Tauri IPC commands (AppState)                 │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐  SessionSlot  ┌──────────────────────┐  │
//! │  │ ConnectionManager  │ ────────────▶ │  TransferRequester   │  │
//! │  └────────────────────┘               └──────────────────────┘  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │              BackendBridge (IpcBridge, Unix socket)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage with Tauri
//!
//! ```rust,ignore
//! use ferry_client::{generate_handler, AppState, ClientConfig};
//!
//! fn main() {
//!     let config = ClientConfig::load_default().unwrap_or_default();
//!     tauri::Builder::default()
//!         .manage(AppState::from_config(&config))
//!         .invoke_handler(generate_handler!())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`connection`]: handshake orchestration and state machine
//! - [`transfer`]: download and upload requests
//! - [`bridge`]: backend bridge trait and socket implementation
//! - [`commands`]: Tauri IPC command handlers
//! - [`config`]: TOML configuration

pub mod address;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod connection;
pub mod destination;
pub mod form;
pub mod session;
pub mod transfer;

// Re-export protocol for convenience
pub use protocol;

pub use address::{AddressError, PeerAddress};
pub use bridge::{BackendBridge, BridgeError, BridgeResult, IpcBridge};
pub use commands::{AppState, CommandError, CommandResult};
pub use config::ClientConfig;
pub use connection::{
    ConnectError, ConnectOutcome, ConnectionEvent, ConnectionManager, ConnectionState,
};
pub use destination::{DesktopDirResolver, DestinationResolver, FixedDirResolver, LocalDestination};
pub use form::{FormState, FormStatus};
pub use session::{SessionHandle, SessionSlot};
pub use transfer::{TransferError, TransferKind, TransferOutcome, TransferRequester};

/// Generate the Tauri command handler with all registered commands.
///
/// The application must `manage` an [`AppState`] before the handler runs.
#[macro_export]
macro_rules! generate_handler {
    () => {
        tauri::generate_handler![
            $crate::commands::attempt_connect,
            $crate::commands::request_download,
            $crate::commands::request_upload,
            $crate::commands::get_connection_status,
        ]
    };
}

/// List of all Tauri command functions for use with `tauri::generate_handler![]`.
pub mod command_list {
    pub use crate::commands::{
        attempt_connect, get_connection_status, request_download, request_upload,
    };
}
