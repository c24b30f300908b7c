//! Transfer requests against an established session.
//!
//! A request is a single backend call carrying the path exactly as typed.
//! The client only learns whether the backend accepted it; progress and
//! completion stay with the backend.

use std::sync::Arc;

use thiserror::Error;

use crate::bridge::{BackendBridge, BridgeError};
use crate::form::FormState;
use crate::session::SessionSlot;

/// Form message when no handshake has completed.
pub const NO_SESSION_MESSAGE: &str = "Not connected to a server";

/// Form message for any rejected download.
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Could not download file/s";

/// Form message for any rejected upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Could not send file/s";

/// Direction of a transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Remote path into the local destination (`download`).
    Download,
    /// Local path to the peer (`send`).
    Upload,
}

impl TransferKind {
    fn failure_message(self) -> &'static str {
        match self {
            TransferKind::Download => DOWNLOAD_FAILED_MESSAGE,
            TransferKind::Upload => UPLOAD_FAILED_MESSAGE,
        }
    }
}

/// Why a transfer request was not submitted.
#[derive(Debug, Error)]
pub enum TransferError {
    /// No session is active; nothing was sent to the backend.
    #[error("no active session")]
    NoSession,

    /// The backend refused the request.
    #[error("{kind:?} request failed: {source}")]
    Backend {
        kind: TransferKind,
        #[source]
        source: BridgeError,
    },
}

impl TransferError {
    /// The single line shown under the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            TransferError::NoSession => NO_SESSION_MESSAGE,
            TransferError::Backend { kind, .. } => kind.failure_message(),
        }
    }
}

/// Result of one transfer request.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The backend accepted the request.
    Submitted,
    /// Refused locally, before any backend call.
    Rejected(TransferError),
    /// The backend rejected the request.
    Failed(TransferError),
}

impl TransferOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, TransferOutcome::Submitted)
    }
}

/// Submits download and upload requests for the active session.
pub struct TransferRequester<B> {
    bridge: Arc<B>,
    sessions: SessionSlot,
}

impl<B: BackendBridge> TransferRequester<B> {
    /// Create a requester reading the active session from `sessions`.
    pub fn new(bridge: Arc<B>, sessions: SessionSlot) -> Self {
        Self { bridge, sessions }
    }

    /// Ask the backend to download the remote path held by `form`.
    pub async fn request_download(&self, form: &mut FormState) -> TransferOutcome {
        self.submit(TransferKind::Download, form).await
    }

    /// Ask the backend to upload the local path held by `form`.
    pub async fn request_upload(&self, form: &mut FormState) -> TransferOutcome {
        self.submit(TransferKind::Upload, form).await
    }

    async fn submit(&self, kind: TransferKind, form: &mut FormState) -> TransferOutcome {
        form.begin();

        let Some(session) = self.sessions.current().await else {
            let err = TransferError::NoSession;
            tracing::debug!("{:?} request refused: {}", kind, err);
            form.fail(err.user_message());
            return TransferOutcome::Rejected(err);
        };

        let path = form.value();
        let result = match kind {
            TransferKind::Download => self.bridge.download(path).await,
            TransferKind::Upload => self.bridge.send(path).await,
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    "{:?} request for {:?} accepted (session {})",
                    kind,
                    path,
                    session.id()
                );
                form.succeed();
                TransferOutcome::Submitted
            }
            Err(source) => {
                let err = TransferError::Backend { kind, source };
                tracing::warn!("{}", err);
                form.fail(err.user_message());
                TransferOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::PeerAddress;
    use crate::bridge::mock::RecordingBridge;
    use crate::destination::LocalDestination;
    use crate::form::FormStatus;
    use crate::session::SessionHandle;
    use protocol::BridgeRequest;

    async fn connected() -> (Arc<RecordingBridge>, TransferRequester<RecordingBridge>) {
        let bridge = Arc::new(RecordingBridge::new());
        let sessions = SessionSlot::new();
        sessions
            .publish(SessionHandle::new(
                PeerAddress::parse("192.168.1.10").unwrap(),
                LocalDestination::new("/home/ada/Desktop"),
            ))
            .await;
        let requester = TransferRequester::new(Arc::clone(&bridge), sessions);
        (bridge, requester)
    }

    #[tokio::test]
    async fn test_download_passes_path_verbatim() {
        let (bridge, requester) = connected().await;

        for path in ["", "/some/path", "relative/dir", "*.log", "  spaced  "] {
            let mut form = FormState::new(path);
            let outcome = requester.request_download(&mut form).await;
            assert!(outcome.is_submitted());
            assert_eq!(form.error(), None);
            assert_eq!(form.status(), FormStatus::Succeeded);
        }

        let paths: Vec<_> = bridge
            .calls()
            .into_iter()
            .map(|call| match call {
                BridgeRequest::Download { path_to_download } => path_to_download,
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert_eq!(paths, vec!["", "/some/path", "relative/dir", "*.log", "  spaced  "]);
    }

    #[tokio::test]
    async fn test_failed_download() {
        let (bridge, requester) = connected().await;
        bridge.fail("download");
        let mut form = FormState::new("/srv/missing");

        let outcome = requester.request_download(&mut form).await;

        assert!(matches!(
            outcome,
            TransferOutcome::Failed(TransferError::Backend {
                kind: TransferKind::Download,
                ..
            })
        ));
        assert_eq!(form.error(), Some(DOWNLOAD_FAILED_MESSAGE));
        assert_eq!(form.status(), FormStatus::Failed);
        assert_eq!(bridge.operations(), vec!["download"]);
    }

    #[tokio::test]
    async fn test_success_after_failure_clears_error() {
        let (bridge, requester) = connected().await;
        bridge.fail("download");
        let mut form = FormState::new("/srv/report.pdf");
        requester.request_download(&mut form).await;

        bridge.heal("download");
        let outcome = requester.request_download(&mut form).await;

        assert!(outcome.is_submitted());
        assert_eq!(form.error(), None);
    }

    #[tokio::test]
    async fn test_download_without_session() {
        let bridge = Arc::new(RecordingBridge::new());
        let requester = TransferRequester::new(Arc::clone(&bridge), SessionSlot::new());
        let mut form = FormState::new("/some/path");

        let outcome = requester.request_download(&mut form).await;

        assert!(matches!(
            outcome,
            TransferOutcome::Rejected(TransferError::NoSession)
        ));
        assert_eq!(form.error(), Some(NO_SESSION_MESSAGE));
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload() {
        let (bridge, requester) = connected().await;
        let mut form = FormState::new("/home/ada/notes.txt");

        let outcome = requester.request_upload(&mut form).await;

        assert!(outcome.is_submitted());
        assert_eq!(
            bridge.calls(),
            vec![BridgeRequest::Send {
                path_to_send: "/home/ada/notes.txt".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_upload_message() {
        let (bridge, requester) = connected().await;
        bridge.fail("send");
        let mut form = FormState::new("/home/ada/notes.txt");

        requester.request_upload(&mut form).await;

        assert_eq!(form.error(), Some(UPLOAD_FAILED_MESSAGE));
    }
}
