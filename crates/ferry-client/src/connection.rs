//! Connection orchestration.
//!
//! [`ConnectionManager`] turns the address typed into the connect form into
//! a backend session:
//!
//! ```text
//! validate ─▶ resolve destination ─▶ start_client ─▶ connect ─▶ SessionHandle
//!    │                                   │              │
//!    └─ Rejected(InvalidAddress)         └─ Failed      └─ Failed
//! ```
//!
//! The two backend phases are strictly ordered; `connect` is never issued
//! when `start_client` fails. Nothing is retried automatically and nothing
//! from a previous attempt is reused by the next one.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

use crate::address::{AddressError, PeerAddress};
use crate::bridge::{BackendBridge, BridgeError};
use crate::destination::DestinationResolver;
use crate::form::FormState;
use crate::session::{SessionHandle, SessionSlot};

/// Buffer size for the event broadcast channel.
const EVENT_BUFFER_SIZE: usize = 64;

/// Form message for a malformed address.
pub const INVALID_ADDRESS_MESSAGE: &str = "Invalid IP address format";

/// Form message when the backend refuses to start a client session.
pub const START_CLIENT_FAILED_MESSAGE: &str = "Could not start client session";

/// Form message when the handshake with the peer fails.
pub const CONNECT_FAILED_MESSAGE: &str = "Could not connect to server";

/// Handshake state of the connection manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No attempt made yet.
    #[default]
    Idle,
    /// `start_client` in flight.
    Starting,
    /// `connect` in flight.
    Connecting,
    /// Both phases succeeded; a session is active.
    Connected,
    /// The last attempt failed in one of the backend phases.
    Failed,
}

/// Events emitted by the connection manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ConnectionEvent {
    /// Connection state changed.
    StateChanged(ConnectionState),
    /// A handshake completed.
    SessionEstablished { session_id: String, peer: String },
    /// A backend phase failed.
    Error(String),
}

/// Why an attempt did not produce a session.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The address failed local validation; no backend call was made.
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// The resolved destination is not valid UTF-8; no backend call was
    /// made.
    #[error("local destination {} is not valid UTF-8", .0.display())]
    NonUtf8Destination(PathBuf),

    /// The backend rejected session setup.
    #[error("start_client failed: {0}")]
    StartClient(#[source] BridgeError),

    /// The backend rejected the handshake.
    #[error("connect failed: {0}")]
    Connect(#[source] BridgeError),
}

impl ConnectError {
    /// The single line shown under the connect form.
    pub fn user_message(&self) -> &'static str {
        match self {
            ConnectError::InvalidAddress(_) => INVALID_ADDRESS_MESSAGE,
            ConnectError::NonUtf8Destination(_) | ConnectError::StartClient(_) => {
                START_CLIENT_FAILED_MESSAGE
            }
            ConnectError::Connect(_) => CONNECT_FAILED_MESSAGE,
        }
    }
}

/// Result of one connect attempt.
#[derive(Debug)]
pub enum ConnectOutcome {
    /// Both phases succeeded.
    Connected(SessionHandle),
    /// Refused locally, before any backend call.
    Rejected(ConnectError),
    /// A backend phase failed.
    Failed(ConnectError),
}

impl ConnectOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectOutcome::Connected(_))
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        match self {
            ConnectOutcome::Connected(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Drives the `start_client` → `connect` handshake and owns connection
/// state.
pub struct ConnectionManager<B> {
    bridge: Arc<B>,
    resolver: Arc<dyn DestinationResolver>,
    sessions: SessionSlot,
    state: Arc<RwLock<ConnectionState>>,
    event_tx: broadcast::Sender<ConnectionEvent>,
}

impl<B: BackendBridge> ConnectionManager<B> {
    /// Create a manager publishing sessions into `sessions`.
    pub fn new(
        bridge: Arc<B>,
        resolver: Arc<dyn DestinationResolver>,
        sessions: SessionSlot,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER_SIZE);

        Self {
            bridge,
            resolver,
            sessions,
            state: Arc::new(RwLock::new(ConnectionState::Idle)),
            event_tx,
        }
    }

    /// Subscribes to connection events.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.event_tx.subscribe()
    }

    /// Returns the current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// The slot holding the active session.
    pub fn sessions(&self) -> &SessionSlot {
        &self.sessions
    }

    fn emit(&self, event: ConnectionEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    async fn set_state(&self, new_state: ConnectionState) {
        {
            let mut state = self.state.write().await;
            *state = new_state;
        }
        tracing::debug!("Connection state: {:?}", new_state);
        self.emit(ConnectionEvent::StateChanged(new_state));
    }

    /// Run one connect attempt for the address held by `form`.
    ///
    /// The form's error is cleared first and, on failure, replaced by
    /// exactly one message.
    pub async fn attempt_connect(&self, form: &mut FormState) -> ConnectOutcome {
        form.begin();

        let result = self.handshake(form.value()).await;
        match result {
            Ok(handle) => {
                form.succeed();
                ConnectOutcome::Connected(handle)
            }
            Err(err @ ConnectError::InvalidAddress(_)) => {
                tracing::debug!("Rejected connect attempt: {}", err);
                form.fail(err.user_message());
                ConnectOutcome::Rejected(err)
            }
            Err(err) => {
                tracing::warn!("Connect attempt failed: {}", err);
                form.fail(err.user_message());
                self.set_state(ConnectionState::Failed).await;
                self.emit(ConnectionEvent::Error(err.to_string()));
                ConnectOutcome::Failed(err)
            }
        }
    }

    async fn handshake(&self, input: &str) -> Result<SessionHandle, ConnectError> {
        let peer = PeerAddress::parse(input)?;

        // A new attempt supersedes whatever session the backend had.
        if let Some(previous) = self.sessions.clear().await {
            tracing::debug!("Dropping session {} for new attempt", previous.id());
        }

        let destination = self.resolver.resolve();
        let local_path = destination
            .to_str()
            .ok_or_else(|| {
                ConnectError::NonUtf8Destination(destination.as_path().to_path_buf())
            })?
            .to_string();

        self.set_state(ConnectionState::Starting).await;
        self.bridge
            .start_client(&peer.to_string(), &local_path)
            .await
            .map_err(ConnectError::StartClient)?;

        self.set_state(ConnectionState::Connecting).await;
        self.bridge
            .connect()
            .await
            .map_err(ConnectError::Connect)?;

        let handle = SessionHandle::new(peer, destination);
        self.sessions.publish(handle.clone()).await;
        self.set_state(ConnectionState::Connected).await;
        self.emit(ConnectionEvent::SessionEstablished {
            session_id: handle.id().to_string(),
            peer: peer.to_string(),
        });
        tracing::info!(
            "Connected to {} (session {}, downloads into {})",
            peer,
            handle.id(),
            handle.local_destination()
        );

        Ok(handle)
    }
}
