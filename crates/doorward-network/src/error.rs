//! Errors raised by the remote-control transport.

use std::net::SocketAddr;

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Result type alias for remote-control operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur in the remote-control server or client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Line did not name a known command
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Line was blank
    #[error("empty command")]
    EmptyCommand,

    /// Command dispatcher is no longer running
    #[error("dispatcher unavailable")]
    DispatcherClosed,

    /// Client is not connected to server
    #[error("Not connected to server")]
    NotConnected,

    /// I/O operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Connection was lost during operation
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Line framing error
    #[error("Codec error: {0}")]
    Codec(#[from] LinesCodecError),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
