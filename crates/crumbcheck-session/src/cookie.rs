//! Reading `Cookie` headers and writing `Set-Cookie` headers.
//!
//! The same cookie travels three ways: set by `GET /set-cookie`, expired
//! by `GET /clear-cookie`, and read back from the WebSocket handshake
//! request. Whether the client honours the expiry before its next
//! handshake is exactly what this tool observes.

use std::collections::HashMap;
use std::fmt;

use crumbcheck_protocol::SessionId;

/// Name of the cookie that carries the session identifier.
pub const SESSION_COOKIE_NAME: &str = "test-session-id";

/// Parses a raw `Cookie` header into a name → value map.
///
/// Pairs are separated by `;`. Each pair is split on its first `=`, so
/// values may themselves contain `=`. Pairs without `=` or with an empty
/// name are skipped. When a name repeats, the first occurrence wins.
/// Values are taken verbatim (no unquoting or percent-decoding).
pub fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for pair in raw.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        cookies
            .entry(name.to_string())
            .or_insert_with(|| value.trim().to_string());
    }
    cookies
}

/// Extracts the session cookie from an optional raw `Cookie` header.
///
/// An empty value (`test-session-id=`) counts as no credential: that is
/// what a client sends back if it kept the cleared cookie's empty value.
pub fn session_cookie(raw: Option<&str>) -> Option<SessionId> {
    let mut cookies = parse_cookie_header(raw?);
    cookies
        .remove(SESSION_COOKIE_NAME)
        .filter(|value| !value.is_empty())
        .map(SessionId::new)
}

/// Decides the `Domain` attribute from the request's `Host` header.
///
/// The port is stripped. Only `localhost` gets an explicit domain;
/// deployed hosts leave the attribute off and let the browser scope the
/// cookie to the exact host.
pub fn cookie_domain(host: Option<&str>) -> Option<String> {
    let host = host?;
    let bare = host.split(':').next().unwrap_or(host);
    (bare == "localhost").then(|| bare.to_string())
}

/// A `Set-Cookie` header value.
///
/// Never `HttpOnly`: the diagnostic page reads the cookie from script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: String,
    /// `None` makes a session cookie; `Some(0)` tells the client to delete
    /// it immediately.
    pub max_age: Option<u64>,
}

impl SetCookie {
    /// The cookie handed out by issuance: no expiry, root path.
    pub fn issue(session_id: &SessionId, domain: Option<String>) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            value: session_id.as_str().to_string(),
            domain,
            path: "/".to_string(),
            max_age: None,
        }
    }

    /// The clearing directive: empty value, `Max-Age=0`.
    pub fn expire(domain: Option<String>) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            value: String::new(),
            domain,
            path: "/".to_string(),
            max_age: Some(0),
        }
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }
        write!(f, "; Path={}", self.path)
    }
}
