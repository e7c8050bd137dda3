//! Remote control transport for Doorward.
//!
//! This crate carries the narrow remote-control surface of the door
//! controller: a line-oriented TCP protocol in which every inbound line is
//! one command (`led_on`, `led_off`, `fan_on`, `fan_off`) and every reply is
//! one line of acknowledgement text or `ERR <reason>`.
//!
//! # Components
//!
//! - **RemoteCommand**: parsed command and its acknowledgement text
//! - **RemoteServer**: accepts connections and forwards commands to a
//!   dispatcher over an mpsc channel, relaying the dispatcher's reply
//! - **RemoteClient**: sends commands and waits for the reply
//!
//! The server never touches peripherals itself; the dispatcher that owns
//! the peripheral facade answers each [`CommandRequest`].
//!
//! # Example
//!
//! ```no_run
//! use doorward_network::{RemoteServer, RemoteServerConfig};
//! use tokio::sync::{mpsc, watch};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (requests_tx, mut requests_rx) = mpsc::channel(16);
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//! let server = RemoteServer::bind(RemoteServerConfig::default(), requests_tx).await?;
//! tokio::spawn(server.run(shutdown_rx));
//!
//! while let Some(request) = requests_rx.recv().await {
//!     let ack = request.command().ack();
//!     request.respond(ack);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod command;
mod error;
mod server;

pub use client::{RemoteClient, RemoteClientConfig};
pub use command::RemoteCommand;
pub use error::{RemoteError, Result};
pub use server::{CommandRequest, RemoteServer, RemoteServerConfig};
