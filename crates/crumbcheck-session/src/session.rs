//! Session types: the server's record of an issued credential, and the
//! state of a connection that owns one.

use std::time::SystemTime;

use crumbcheck_protocol::SessionId;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single active session.
///
/// A record exists from issuance (HTTP or clean handshake) until an
/// explicit invalidation. There is no expiry.
#[derive(Debug, Clone)]
pub struct Session {
    /// The identifier handed to the client as the cookie value.
    pub id: SessionId,

    /// Wall-clock creation time.
    pub created_at: SystemTime,
}

impl Session {
    pub(crate) fn new(id: SessionId) -> Self {
        Self {
            id,
            created_at: SystemTime::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelState
// ---------------------------------------------------------------------------

/// Where an open connection's session stands.
///
/// ```text
///   Open ──(clear_cookie)──→ Cleared
///                              │
///                              └──(clear_cookie)──→ Cleared
/// ```
///
/// Only the connection that created a session can move it to `Cleared`;
/// after that the identifier is absent from the store, so presenting it
/// at a later handshake is "unknown", not "stale".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// The session created by the handshake is still active.
    Open,

    /// The session was invalidated from inside this connection.
    Cleared,
}
