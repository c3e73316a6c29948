//! Types exchanged over the persistent (WebSocket) connection.
//!
//! Client frames and server frames are both internally tagged JSON objects
//! with a snake_case `type` field, e.g. `{"type":"clear_cookie"}`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An opaque session identifier, carried in the `test-session-id` cookie.
///
/// Serialized as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as it appears in a cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Messages a client may send once its connection is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "The server would set the credential now." No state change.
    SetCookie,

    /// "Discard this session." Invalidates the connection's session.
    ClearCookie,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Messages the server sends on an open connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent right after a clean handshake created a session.
    Connected {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        message: String,
    },

    /// Reply to [`ClientMessage::SetCookie`].
    CookieSet {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        message: String,
    },

    /// Reply to [`ClientMessage::ClearCookie`].
    CookieCleared { message: String },
}

impl ServerMessage {
    /// Greeting for a handshake that presented no credential.
    pub fn connected(session_id: SessionId) -> Self {
        Self::Connected {
            session_id,
            message: "Connected successfully - no stale cookie detected"
                .into(),
        }
    }

    pub fn cookie_set(session_id: SessionId) -> Self {
        Self::CookieSet {
            session_id,
            message: "Cookie would be set via HTTP response".into(),
        }
    }

    pub fn cookie_cleared() -> Self {
        Self::CookieCleared {
            message: "Cookie cleared with Max-Age=0 (browser should delete it)"
                .into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Close reasons
// ---------------------------------------------------------------------------

/// WebSocket close code 1008, "policy violation".
pub const POLICY_VIOLATION: u16 = 1008;

/// The code and reason a rejected handshake is closed with.
///
/// Both rejection kinds share [`POLICY_VIOLATION`]; the reason text is
/// what tells a stale credential apart from an unknown one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    pub code: u16,
    pub reason: String,
}

impl CloseReason {
    /// The presented credential still belongs to an active session.
    pub fn stale_session() -> Self {
        Self {
            code: POLICY_VIOLATION,
            reason: "Session already used - cookie should have been cleared"
                .into(),
        }
    }

    /// The presented credential matches no active session.
    pub fn unknown_session() -> Self {
        Self {
            code: POLICY_VIOLATION,
            reason: "Unknown session".into(),
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser page parses these shapes directly, so the tests pin the
    //! exact JSON field names.

    use super::*;

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionId::new("session-x1")).unwrap();
        assert_eq!(json, "\"session-x1\"");
    }

    #[test]
    fn test_session_id_display_is_raw_value() {
        assert_eq!(SessionId::from("session-abc").to_string(), "session-abc");
    }

    #[test]
    fn test_client_message_decodes_snake_case_tags() {
        let set: ClientMessage =
            serde_json::from_str(r#"{"type":"set_cookie"}"#).unwrap();
        let clear: ClientMessage =
            serde_json::from_str(r#"{"type":"clear_cookie"}"#).unwrap();

        assert_eq!(set, ClientMessage::SetCookie);
        assert_eq!(clear, ClientMessage::ClearCookie);
    }

    #[test]
    fn test_client_message_unknown_type_returns_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"reset_everything"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_connected_json_format() {
        let msg = ServerMessage::connected(SessionId::new("session-abc"));
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "connected");
        assert_eq!(json["sessionId"], "session-abc");
        assert_eq!(
            json["message"],
            "Connected successfully - no stale cookie detected"
        );
    }

    #[test]
    fn test_server_message_cookie_set_json_format() {
        let msg = ServerMessage::cookie_set(SessionId::new("session-abc"));
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "cookie_set");
        assert_eq!(json["sessionId"], "session-abc");
    }

    #[test]
    fn test_server_message_cookie_cleared_has_no_session_id() {
        let json: serde_json::Value =
            serde_json::to_value(ServerMessage::cookie_cleared()).unwrap();

        assert_eq!(json["type"], "cookie_cleared");
        assert!(json.get("sessionId").is_none());
    }

    #[test]
    fn test_close_reasons_share_code_but_differ_in_text() {
        let stale = CloseReason::stale_session();
        let unknown = CloseReason::unknown_session();

        assert_eq!(stale.code, POLICY_VIOLATION);
        assert_eq!(unknown.code, POLICY_VIOLATION);
        assert_ne!(stale.reason, unknown.reason);
        assert_eq!(unknown.to_string(), "1008 Unknown session");
    }
}
