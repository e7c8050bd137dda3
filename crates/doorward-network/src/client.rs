//! TCP client for the remote-control channel.
//!
//! Used by the `doorward send` subcommand and by integration tests. Every
//! I/O step is bounded by the configured timeout.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, trace, warn};

use crate::{RemoteCommand, RemoteError, Result};

/// Configuration for the remote-control client
#[derive(Debug, Clone)]
pub struct RemoteClientConfig {
    /// Server address to connect to
    pub server_addr: SocketAddr,

    /// Timeout for all I/O operations (connect, send, recv)
    pub timeout: Duration,
}

impl Default for RemoteClientConfig {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 7300)),
            timeout: Duration::from_millis(3000),
        }
    }
}

/// Client that sends one command per line and reads one reply per line.
///
/// # Example
///
/// ```no_run
/// use doorward_network::{RemoteClient, RemoteClientConfig, RemoteCommand};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = RemoteClient::new(RemoteClientConfig::default());
/// client.connect().await?;
///
/// let reply = client.send(RemoteCommand::LampOn).await?;
/// assert_eq!(reply, "LED turned ON");
/// # Ok(())
/// # }
/// ```
pub struct RemoteClient {
    /// Server address to connect to
    server_addr: SocketAddr,

    /// Framed TCP stream (None if not connected)
    framed: Option<Framed<TcpStream, LinesCodec>>,

    /// Timeout for all I/O operations
    timeout: Duration,
}

impl RemoteClient {
    /// Create a new client; call [`connect`](Self::connect) before sending.
    pub fn new(config: RemoteClientConfig) -> Self {
        Self {
            server_addr: config.server_addr,
            framed: None,
            timeout: config.timeout,
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Connect to the controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is refused or times out.
    pub async fn connect(&mut self) -> Result<()> {
        info!(addr = %self.server_addr, "connecting to remote control");

        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout_ms()))??;

        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "failed to set TCP_NODELAY");
        }

        self.framed = Some(Framed::new(stream, LinesCodec::new()));
        debug!("remote control client connected");
        Ok(())
    }

    /// Send `command` and wait for the reply line.
    pub async fn send(&mut self, command: RemoteCommand) -> Result<String> {
        self.send_line(command.as_str()).await
    }

    /// Send a raw line and wait for the reply line.
    pub async fn send_line(&mut self, line: &str) -> Result<String> {
        let timeout = self.timeout;
        let timeout_ms = self.timeout_ms();
        let framed = self.framed.as_mut().ok_or(RemoteError::NotConnected)?;

        trace!(line, "sending remote line");
        tokio::time::timeout(timeout, framed.send(line))
            .await
            .map_err(|_| RemoteError::Timeout(timeout_ms))??;

        match tokio::time::timeout(timeout, framed.next()).await {
            Ok(Some(Ok(reply))) => {
                trace!(reply = %reply, "remote reply received");
                Ok(reply)
            }
            Ok(Some(Err(e))) => Err(e.into()),
            Ok(None) => Err(RemoteError::ConnectionLost(
                "Server closed connection".to_string(),
            )),
            Err(_) => Err(RemoteError::Timeout(timeout_ms)),
        }
    }

    /// Read a line the server sent without being asked (e.g. a rejection).
    pub async fn recv(&mut self) -> Result<Option<String>> {
        let timeout = self.timeout;
        let timeout_ms = self.timeout_ms();
        let framed = self.framed.as_mut().ok_or(RemoteError::NotConnected)?;

        match tokio::time::timeout(timeout, framed.next()).await {
            Ok(Some(line)) => Ok(Some(line?)),
            Ok(None) => Ok(None),
            Err(_) => Err(RemoteError::Timeout(timeout_ms)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.framed.is_some()
    }

    /// Drop the connection.
    pub fn close(&mut self) {
        if self.framed.take().is_some() {
            debug!("remote control client closed");
        }
    }
}
