//! TCP server for the remote-control channel.
//!
//! # Architecture
//!
//! ```text
//! operator ┐
//!          ├──> RemoteServer ──(CommandRequest)──> dispatcher ──> PeripheralFacade
//! operator ┘        │                                  │
//!                   └──< reply line <──(oneshot)───────┘
//! ```
//!
//! Each connection runs on its own task. A command is answered only after
//! the dispatcher has applied it, so the acknowledgement reflects the real
//! output state. Lines that do not parse are answered with `ERR <reason>`
//! and never reach the dispatcher.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info, trace, warn};

use crate::{RemoteCommand, RemoteError, Result};

/// Configuration for the remote-control server
///
/// # Example
///
/// ```
/// use doorward_network::RemoteServerConfig;
///
/// let config = RemoteServerConfig {
///     bind_addr: "127.0.0.1:7300".parse().unwrap(),
///     max_connections: 4,
///     ..RemoteServerConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RemoteServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Maximum number of simultaneous connections
    pub max_connections: usize,

    /// Longest accepted command line, in bytes
    pub max_line_length: usize,
}

impl Default for RemoteServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 7300)),
            max_connections: 8,
            max_line_length: 256,
        }
    }
}

/// A parsed command waiting for the dispatcher's reply.
#[derive(Debug)]
pub struct CommandRequest {
    command: RemoteCommand,
    peer: SocketAddr,
    reply: oneshot::Sender<String>,
}

impl CommandRequest {
    /// Create a request and the receiver its reply will arrive on.
    pub fn new(command: RemoteCommand, peer: SocketAddr) -> (Self, oneshot::Receiver<String>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                command,
                peer,
                reply,
            },
            rx,
        )
    }

    pub fn command(&self) -> RemoteCommand {
        self.command
    }

    /// Address of the client that sent the command.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Send the reply line. A client that has already gone away is ignored.
    pub fn respond(self, text: impl Into<String>) {
        if self.reply.send(text.into()).is_err() {
            debug!(peer = %self.peer, "client left before reply");
        }
    }
}

/// Decrements the live connection count when a connection task ends.
struct ConnectionSlot {
    active: Arc<AtomicUsize>,
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Line-oriented TCP server forwarding commands to a dispatcher.
pub struct RemoteServer {
    /// TCP listener for accepting new connections
    listener: TcpListener,

    /// Server configuration
    config: RemoteServerConfig,

    /// Queue towards the dispatcher
    requests: mpsc::Sender<CommandRequest>,

    /// Live connection count
    active: Arc<AtomicUsize>,
}

impl RemoteServer {
    /// Bind the server to the configured address.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::BindFailed` if the address is in use or not
    /// permitted.
    pub async fn bind(
        config: RemoteServerConfig,
        requests: mpsc::Sender<CommandRequest>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| RemoteError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        info!(
            addr = %listener.local_addr()?,
            max_connections = config.max_connections,
            "remote control listening"
        );

        Ok(Self {
            listener,
            config,
            requests,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of connections currently being served.
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Accept connections until `shutdown` flips to `true` or its sender is
    /// dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("remote control stopped");
                        return Ok(());
                    }
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.admit(stream, addr, shutdown.clone()),
                        Err(e) => warn!(error = %e, "accept failed"),
                    }
                }
            }
        }
    }

    fn admit(&self, stream: TcpStream, addr: SocketAddr, shutdown: watch::Receiver<bool>) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(peer = %addr, error = %e, "failed to set TCP_NODELAY");
        }

        let mut framed = Framed::new(
            stream,
            LinesCodec::new_with_max_length(self.config.max_line_length),
        );

        let current = self.active.fetch_add(1, Ordering::SeqCst);
        let slot = ConnectionSlot {
            active: Arc::clone(&self.active),
        };

        if current >= self.config.max_connections {
            error!(
                peer = %addr,
                max_connections = self.config.max_connections,
                "connection rejected: maximum connections reached"
            );
            tokio::spawn(async move {
                let _slot = slot;
                let _ = framed.send("ERR too many connections").await;
            });
            return;
        }

        debug!(peer = %addr, "remote client connected");
        let requests = self.requests.clone();
        tokio::spawn(async move {
            let _slot = slot;
            if let Err(e) = serve_connection(&mut framed, addr, &requests, shutdown).await {
                warn!(peer = %addr, error = %e, "remote connection closed with error");
            } else {
                debug!(peer = %addr, "remote client disconnected");
            }
        });
    }
}

async fn serve_connection(
    framed: &mut Framed<TcpStream, LinesCodec>,
    addr: SocketAddr,
    requests: &mpsc::Sender<CommandRequest>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    loop {
        let line = tokio::select! {
            line = framed.next() => line,
            _ = shutdown.changed() => return Ok(()),
        };

        let line = match line {
            None => return Ok(()),
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                let _ = framed.send(format!("ERR {e}")).await;
                return Err(e.into());
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        trace!(peer = %addr, line = %line, "remote line received");

        let reply = match line.parse::<RemoteCommand>() {
            Ok(command) => forward(requests, command, addr).await,
            Err(e) => {
                warn!(peer = %addr, error = %e, "rejected remote command");
                format!("ERR {e}")
            }
        };

        framed.send(reply).await?;
    }
}

async fn forward(
    requests: &mpsc::Sender<CommandRequest>,
    command: RemoteCommand,
    addr: SocketAddr,
) -> String {
    let (request, reply) = CommandRequest::new(command, addr);

    if requests.send(request).await.is_err() {
        return format!("ERR {}", RemoteError::DispatcherClosed);
    }

    reply
        .await
        .unwrap_or_else(|_| format!("ERR {}", RemoteError::DispatcherClosed))
}
