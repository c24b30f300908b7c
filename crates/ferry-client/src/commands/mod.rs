//! Tauri IPC commands for Ferry.
//!
//! This module exposes the orchestration core to the JavaScript frontend via
//! Tauri's IPC mechanism using `#[tauri::command]` attributes.
//!
//! Commands:
//! - `attempt_connect`: validate an address and run the two-phase handshake
//! - `request_download`: ask the backend to fetch a remote path
//! - `request_upload`: ask the backend to push a local path
//! - `get_connection_status`: current handshake state and session
//!
//! Backend failures never surface as command errors: they end up as the
//! form's error line in the returned [`FormState`]. The only command error
//! is `BUSY`, returned when the same form is already being submitted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};

use crate::bridge::{BackendBridge, IpcBridge};
use crate::config::ClientConfig;
use crate::connection::{ConnectionEvent, ConnectionManager, ConnectionState};
use crate::destination::{resolver_for, DestinationResolver};
use crate::form::FormState;
use crate::session::SessionSlot;
use crate::transfer::TransferRequester;

// ============================================================================
// Error Types
// ============================================================================

/// Unified error type for Tauri commands.
///
/// This error type is serializable so it can be returned to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl CommandError {
    /// The named form already has an attempt in flight.
    pub fn busy(form: &str) -> Self {
        Self {
            code: "BUSY".to_string(),
            message: format!("{} form is already being submitted", form),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CommandError {}

/// Result type for Tauri commands.
pub type CommandResult<T> = Result<T, CommandError>;

// ============================================================================
// Application State
// ============================================================================

/// Application state managed by Tauri.
///
/// Each form sits behind its own lock, held for the whole attempt. A second
/// submission of the same form while one is in flight is refused instead of
/// queued; different forms never block each other.
pub struct AppState<B: BackendBridge = IpcBridge> {
    connections: ConnectionManager<B>,
    transfers: TransferRequester<B>,
    connect_form: Mutex<FormState>,
    download_form: Mutex<FormState>,
    upload_form: Mutex<FormState>,
}

impl AppState<IpcBridge> {
    /// State wired to the backend socket and download directory of
    /// `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(Arc::new(IpcBridge::from_config(config)), resolver_for(config))
    }
}

impl<B: BackendBridge> AppState<B> {
    /// Create the state around `bridge`.
    pub fn new(bridge: Arc<B>, resolver: Arc<dyn DestinationResolver>) -> Self {
        let sessions = SessionSlot::new();

        Self {
            connections: ConnectionManager::new(Arc::clone(&bridge), resolver, sessions.clone()),
            transfers: TransferRequester::new(bridge, sessions),
            connect_form: Mutex::new(FormState::default()),
            download_form: Mutex::new(FormState::default()),
            upload_form: Mutex::new(FormState::default()),
        }
    }

    /// Subscribes to connection events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.connections.subscribe()
    }

    /// Submit the connect form with `server_address`.
    pub async fn connect(&self, server_address: String) -> CommandResult<ConnectResponse> {
        let mut form = self
            .connect_form
            .try_lock()
            .map_err(|_| CommandError::busy("connect"))?;
        form.set_value(server_address);

        let outcome = self.connections.attempt_connect(&mut form).await;

        Ok(ConnectResponse {
            connected: outcome.is_connected(),
            session_id: outcome.session().map(|s| s.id().to_string()),
            form: form.clone(),
        })
    }

    /// Submit the download form with `path_to_download`.
    pub async fn download(&self, path_to_download: String) -> CommandResult<TransferResponse> {
        let mut form = self
            .download_form
            .try_lock()
            .map_err(|_| CommandError::busy("download"))?;
        form.set_value(path_to_download);

        let outcome = self.transfers.request_download(&mut form).await;

        Ok(TransferResponse {
            submitted: outcome.is_submitted(),
            form: form.clone(),
        })
    }

    /// Submit the upload form with `path_to_send`.
    pub async fn upload(&self, path_to_send: String) -> CommandResult<TransferResponse> {
        let mut form = self
            .upload_form
            .try_lock()
            .map_err(|_| CommandError::busy("upload"))?;
        form.set_value(path_to_send);

        let outcome = self.transfers.request_upload(&mut form).await;

        Ok(TransferResponse {
            submitted: outcome.is_submitted(),
            form: form.clone(),
        })
    }

    /// Current handshake state and active session.
    pub async fn status(&self) -> ConnectionStatusResponse {
        let state = self.connections.state().await;
        let session = self.connections.sessions().current().await;

        ConnectionStatusResponse {
            state,
            session_id: session.as_ref().map(|s| s.id().to_string()),
            peer: session.as_ref().map(|s| s.peer().to_string()),
            local_destination: session.as_ref().map(|s| s.local_destination().to_string()),
        }
    }
}

// ============================================================================
// Connection Commands
// ============================================================================

/// Response from a connect submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectResponse {
    /// Whether both handshake phases succeeded.
    pub connected: bool,
    /// The new session's id, when connected.
    pub session_id: Option<String>,
    /// The connect form after the attempt.
    pub form: FormState,
}

/// Validate `server_address` and connect to the peer.
#[tauri::command]
pub async fn attempt_connect(
    state: tauri::State<'_, AppState>,
    server_address: String,
) -> CommandResult<ConnectResponse> {
    state.inner().connect(server_address).await
}

/// Response for connection status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatusResponse {
    /// Current handshake state.
    pub state: ConnectionState,
    /// Active session id, if connected.
    pub session_id: Option<String>,
    /// Connected peer address, if connected.
    pub peer: Option<String>,
    /// Directory downloads land in, if connected.
    pub local_destination: Option<String>,
}

/// Get the current connection status.
#[tauri::command]
pub async fn get_connection_status(
    state: tauri::State<'_, AppState>,
) -> CommandResult<ConnectionStatusResponse> {
    Ok(state.inner().status().await)
}

// ============================================================================
// Transfer Commands
// ============================================================================

/// Response from a transfer submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    /// Whether the backend accepted the request.
    pub submitted: bool,
    /// The form after the attempt.
    pub form: FormState,
}

/// Request download of `path_to_download` from the connected peer.
#[tauri::command]
pub async fn request_download(
    state: tauri::State<'_, AppState>,
    path_to_download: String,
) -> CommandResult<TransferResponse> {
    state.inner().download(path_to_download).await
}

/// Request upload of `path_to_send` to the connected peer.
#[tauri::command]
pub async fn request_upload(
    state: tauri::State<'_, AppState>,
    path_to_send: String,
) -> CommandResult<TransferResponse> {
    state.inner().upload(path_to_send).await
}

// ============================================================================
// Tests
// ============================================================================
