//! Transport layer for crumbcheck.
//!
//! Plain HTTP/1.1 requests and WebSocket upgrades share one TCP port, so
//! this crate is split in three pieces:
//!
//! - [`HttpTransport`] — the TCP listener implementing [`Transport`].
//! - [`upgrade`] — recognises upgrade requests, answers with
//!   `101 Switching Protocols`, and hands back a [`PendingUpgrade`].
//! - [`WebSocketConnection`] — the upgraded stream, behind the
//!   [`Connection`] trait.
//!
//! ```text
//! TcpStream ──hyper──→ Request ──upgrade()──→ 101 + PendingUpgrade
//!                                                   │
//!                                                   ▼ finish()
//!                                            WebSocketConnection
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod listener;
mod upgrade;
mod websocket;

pub use error::TransportError;
pub use listener::HttpTransport;
pub use upgrade::{PendingUpgrade, is_upgrade_request, upgrade};
pub use websocket::WebSocketConnection;

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming byte streams.
pub trait Transport: Send + Sync + 'static {
    /// The stream type produced by this transport.
    type Stream: Send + 'static;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming stream.
    async fn accept(
        &mut self,
    ) -> Result<(Self::Stream, SocketAddr), Self::Error>;

    /// Returns the address the transport is bound to.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// A single persistent connection that exchanges text frames.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends a text frame to the remote peer.
    async fn send(&self, text: &str) -> Result<(), Self::Error>;

    /// Receives the payload of the next data frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. A close
    /// initiated by the peer is answered before `None` is returned.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection with an explicit status code and reason, so
    /// the peer can tell a rejection apart from a dropped socket.
    async fn close_with(
        &self,
        code: u16,
        reason: &str,
    ) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
