//! TCP listener that feeds raw streams to the HTTP layer.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};

use crate::{Transport, TransportError};

/// A [`Transport`] that accepts TCP streams carrying HTTP/1.1.
///
/// The transport does not parse HTTP itself; the server hands each stream
/// to hyper, which in turn may upgrade it to a WebSocket.
pub struct HttpTransport {
    listener: TcpListener,
}

impl HttpTransport {
    /// Binds a new transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "HTTP transport listening");
        Ok(Self { listener })
    }
}

impl Transport for HttpTransport {
    type Stream = TcpStream;
    type Error = TransportError;

    async fn accept(
        &mut self,
    ) -> Result<(Self::Stream, SocketAddr), Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::debug!(%addr, "accepted TCP stream");
        Ok((stream, addr))
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port_reports_local_addr() {
        let transport = HttpTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");

        let addr = transport.local_addr().expect("should have addr");

        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0, "OS should assign a real port");
    }

    #[tokio::test]
    async fn test_bind_invalid_address_returns_accept_failed() {
        let result = HttpTransport::bind("not-an-address").await;

        assert!(matches!(result, Err(TransportError::AcceptFailed(_))));
    }
}
