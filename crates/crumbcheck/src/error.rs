//! Unified error type for crumbcheck.

use crumbcheck_protocol::ProtocolError;
use crumbcheck_session::SessionError;
use crumbcheck_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CrumbError {
    /// A transport-level error (bind, accept, upgrade, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A handshake was refused (stale or unknown credential).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// hyper failed while serving an HTTP connection.
    #[error("http: {0}")]
    Http(#[from] hyper::Error),
}
