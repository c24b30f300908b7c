//! Client-side view of an established backend session.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::address::PeerAddress;
use crate::destination::LocalDestination;

/// Proof that a two-phase handshake completed.
///
/// The backend keeps the actual session; this handle is minted by the
/// client core when `start_client` and `connect` both succeed, and is only
/// valid while it is the one held by the [`SessionSlot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    id: Uuid,
    peer: PeerAddress,
    local_destination: LocalDestination,
    /// Unix timestamp (seconds) of the handshake.
    established_at: u64,
}

impl SessionHandle {
    pub(crate) fn new(peer: PeerAddress, local_destination: LocalDestination) -> Self {
        let established_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            id: Uuid::new_v4(),
            peer,
            local_destination,
            established_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn peer(&self) -> PeerAddress {
        self.peer
    }

    pub fn local_destination(&self) -> &LocalDestination {
        &self.local_destination
    }

    pub fn established_at(&self) -> u64 {
        self.established_at
    }
}

/// The single active session, shared by the connection manager (writer)
/// and the transfer requester (reader).
#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    inner: Arc<RwLock<Option<SessionHandle>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if a handshake has completed since the last
    /// attempt started.
    pub async fn current(&self) -> Option<SessionHandle> {
        self.inner.read().await.clone()
    }

    pub(crate) async fn publish(&self, handle: SessionHandle) {
        *self.inner.write().await = Some(handle);
    }

    pub(crate) async fn clear(&self) -> Option<SessionHandle> {
        self.inner.write().await.take()
    }
}
