//! Error types for the session layer.

use crumbcheck_protocol::{CloseReason, SessionId};

/// Reasons a handshake is refused.
///
/// Both variants are terminal for the connection attempt. Neither is
/// retried, and each maps to its own close reason so a client can tell
/// them apart.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The presented credential still names an active session. The client
    /// resent a cookie it should already have discarded.
    #[error("stale credential: session {0} is still active")]
    StaleCredential(SessionId),

    /// The presented credential names no active session: it was never
    /// issued, or it was already invalidated.
    #[error("unknown credential: {0}")]
    UnknownCredential(SessionId),
}

impl SessionError {
    /// The WebSocket close code and reason this rejection is reported with.
    pub fn close_reason(&self) -> CloseReason {
        match self {
            Self::StaleCredential(_) => CloseReason::stale_session(),
            Self::UnknownCredential(_) => CloseReason::unknown_session(),
        }
    }

    /// The credential that was rejected.
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::StaleCredential(id) | Self::UnknownCredential(id) => id,
        }
    }
}
