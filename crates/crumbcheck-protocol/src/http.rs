//! JSON bodies returned by the HTTP endpoints.
//!
//! Field names are camelCase on the wire (`sessionId`, `receivedCookie`).

use serde::{Deserialize, Serialize};

use crate::SessionId;

/// `GET /set-cookie` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub success: bool,
    pub session_id: SessionId,
    pub message: String,
}

impl IssueResponse {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            success: true,
            session_id,
            message: "Cookie set successfully".into(),
        }
    }
}

/// `GET /clear-cookie` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self {
            success: true,
            message: "Cookie cleared with Max-Age=0 - browser should delete it"
                .into(),
        }
    }
}

/// `GET /status` response: a read-only diagnostic snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// The `test-session-id` value the request carried, or `null`.
    pub received_cookie: Option<SessionId>,
    /// Every identifier currently active in the store.
    pub active_sessions: Vec<SessionId>,
    /// The raw `Cookie` header, or an empty string.
    pub all_cookies: String,
}

/// Body for requests no route matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub path: String,
}
