//! Bridge implementation over the backend's Unix domain socket.
//!
//! Every request opens its own connection, writes one JSON line and reads
//! one JSON line back. Calls from different forms therefore never share a
//! stream and cannot receive each other's replies.

use std::path::{Path, PathBuf};
use std::time::Duration;

use protocol::{read_message, write_message, BridgeRequest, BridgeResponse, ProtocolError};
use tokio::io::BufReader;
use tokio::net::UnixStream;

use super::{BackendBridge, BridgeError, BridgeResult};
use crate::config::ClientConfig;

/// Client half of the backend bridge.
#[derive(Debug, Clone)]
pub struct IpcBridge {
    socket_path: PathBuf,
    timeout: Option<Duration>,
}

impl IpcBridge {
    /// Bridge to the backend listening at `socket_path`, without timeout.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: None,
        }
    }

    /// Bridge configured from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            socket_path: config.socket_path.clone(),
            timeout: config.request_timeout(),
        }
    }

    /// Bound every request to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Check whether the backend is up and answering.
    pub async fn ping(&self) -> BridgeResult<bool> {
        let response = self.call(BridgeRequest::Ping).await?;
        Ok(matches!(response, BridgeResponse::Pong))
    }

    /// Send `request` and wait for the reply, honouring the timeout.
    async fn call(&self, request: BridgeRequest) -> BridgeResult<BridgeResponse> {
        let operation = request.operation();
        tracing::debug!("Bridge request: {:?}", request);

        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.exchange(&request))
                .await
                .map_err(|_| BridgeError::Timeout { operation })??,
            None => self.exchange(&request).await?,
        };

        tracing::debug!("Bridge response to {}: {:?}", operation, response);
        Ok(response)
    }

    async fn exchange(&self, request: &BridgeRequest) -> BridgeResult<BridgeResponse> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| BridgeError::Unavailable {
                path: self.socket_path.clone(),
                source,
            })?;
        let (read_half, mut write_half) = tokio::io::split(stream);

        write_message(&mut write_half, request).await?;

        let mut reader = BufReader::new(read_half);
        read_message(&mut reader).await?.ok_or_else(|| {
            BridgeError::Protocol(ProtocolError::ConnectionClosed(
                "backend closed connection without replying".to_string(),
            ))
        })
    }

    /// Send `request` and treat anything but `Ok` as failure.
    async fn expect_ok(&self, request: BridgeRequest) -> BridgeResult<()> {
        let operation = request.operation();
        match self.call(request).await? {
            BridgeResponse::Ok => Ok(()),
            BridgeResponse::Error { message } => Err(BridgeError::Rejected { operation, message }),
            response => Err(BridgeError::UnexpectedResponse {
                operation,
                response,
            }),
        }
    }
}

impl BackendBridge for IpcBridge {
    async fn start_client(&self, server_address: &str, local_path: &str) -> BridgeResult<()> {
        self.expect_ok(BridgeRequest::StartClient {
            server_address: server_address.to_string(),
            local_path: local_path.to_string(),
        })
        .await
    }

    async fn connect(&self) -> BridgeResult<()> {
        self.expect_ok(BridgeRequest::Connect).await
    }

    async fn download(&self, path_to_download: &str) -> BridgeResult<()> {
        self.expect_ok(BridgeRequest::Download {
            path_to_download: path_to_download.to_string(),
        })
        .await
    }

    async fn send(&self, path_to_send: &str) -> BridgeResult<()> {
        self.expect_ok(BridgeRequest::Send {
            path_to_send: path_to_send.to_string(),
        })
        .await
    }
}
