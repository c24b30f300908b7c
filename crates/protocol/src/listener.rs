//! Backend side of the bridge.
//!
//! The native backend binds a [`BridgeListener`] on a Unix domain socket and
//! answers each accepted [`BridgeConnection`] with one response per request.

use std::io;
use std::path::Path;

use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};

use crate::error::Result;
use crate::framing::{read_message, write_message};
use crate::messages::{BridgeRequest, BridgeResponse};

/// A listener accepting client core connections.
pub struct BridgeListener {
    listener: UnixListener,
}

impl BridgeListener {
    /// Bind the listener to the specified socket path.
    ///
    /// Parent directories are created when missing and a stale socket file
    /// at `path` is removed first.
    pub async fn bind(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if path.exists() {
            std::fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;
        tracing::debug!("Bridge listening on {}", path.display());

        Ok(Self { listener })
    }

    /// Wait for the next client connection.
    pub async fn accept(&self) -> io::Result<BridgeConnection> {
        let (stream, _addr) = self.listener.accept().await?;
        Ok(BridgeConnection::new(stream))
    }
}

/// One accepted client connection.
pub struct BridgeConnection {
    reader: BufReader<tokio::io::ReadHalf<UnixStream>>,
    writer: tokio::io::WriteHalf<UnixStream>,
}

impl BridgeConnection {
    fn new(stream: UnixStream) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    /// Read the next request. Returns `None` once the client hung up.
    pub async fn read_request(&mut self) -> Result<Option<BridgeRequest>> {
        read_message(&mut self.reader).await
    }

    /// Send a response to the client.
    pub async fn send_response(&mut self, response: &BridgeResponse) -> Result<()> {
        write_message(&mut self.writer, response).await
    }
}
