//! HTTP → WebSocket upgrade on top of hyper.
//!
//! hyper owns the HTTP side of the handshake: we validate the request
//! headers, return a `101 Switching Protocols` response, and once hyper
//! releases the raw stream we wrap it with `tokio-tungstenite` in server
//! role. The `Cookie` header stays on the original request, so the caller
//! can read it before calling [`upgrade`].

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    CONNECTION, HeaderMap, HeaderName, SEC_WEBSOCKET_ACCEPT, SEC_WEBSOCKET_KEY,
    SEC_WEBSOCKET_VERSION, UPGRADE,
};
use hyper::upgrade::OnUpgrade;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::handshake::derive_accept_key;
use tokio_tungstenite::tungstenite::protocol::Role;

use crate::{Connection, TransportError, WebSocketConnection};

/// The only WebSocket protocol version defined by RFC 6455.
const WEBSOCKET_VERSION: &[u8] = b"13";

/// Returns `true` if the request asks to switch to the WebSocket protocol.
///
/// Both `Connection` and `Upgrade` are token lists, so `Connection:
/// keep-alive, Upgrade` qualifies.
pub fn is_upgrade_request<B>(req: &Request<B>) -> bool {
    header_has_token(req.headers(), CONNECTION, "upgrade")
        && header_has_token(req.headers(), UPGRADE, "websocket")
}

fn header_has_token(
    headers: &HeaderMap,
    name: HeaderName,
    token: &str,
) -> bool {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|t| t.trim().eq_ignore_ascii_case(token))
}

/// Accepts a WebSocket upgrade request.
///
/// Returns the `101` response that must be sent back through hyper, and a
/// [`PendingUpgrade`] that resolves to the connection once hyper has
/// flushed that response.
///
/// # Errors
/// [`TransportError::BadUpgrade`] if the key is missing or the client
/// speaks an unsupported protocol version.
pub fn upgrade<B>(
    req: &mut Request<B>,
) -> Result<(Response<Full<Bytes>>, PendingUpgrade), TransportError> {
    let key = req
        .headers()
        .get(SEC_WEBSOCKET_KEY)
        .ok_or_else(|| {
            TransportError::BadUpgrade("missing Sec-WebSocket-Key".into())
        })?;

    let version = req.headers().get(SEC_WEBSOCKET_VERSION);
    if version.map(|v| v.as_bytes()) != Some(WEBSOCKET_VERSION) {
        return Err(TransportError::BadUpgrade(format!(
            "unsupported Sec-WebSocket-Version: {version:?}"
        )));
    }

    let accept = derive_accept_key(key.as_bytes());
    let on_upgrade = hyper::upgrade::on(req);

    let response = Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .header(CONNECTION, "upgrade")
        .header(UPGRADE, "websocket")
        .header(SEC_WEBSOCKET_ACCEPT, accept)
        .body(Full::new(Bytes::new()))
        .map_err(|e| TransportError::BadUpgrade(e.to_string()))?;

    Ok((response, PendingUpgrade { on_upgrade }))
}

/// An upgrade that has been answered but not yet handed over by hyper.
pub struct PendingUpgrade {
    on_upgrade: OnUpgrade,
}

impl PendingUpgrade {
    /// Waits for hyper to release the stream and wraps it as a WebSocket.
    pub async fn finish(self) -> Result<WebSocketConnection, TransportError> {
        let upgraded = self.on_upgrade.await.map_err(|e| {
            TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                e,
            ))
        })?;

        let ws = WebSocketStream::from_raw_socket(
            TokioIo::new(upgraded),
            Role::Server,
            None,
        )
        .await;

        let conn = WebSocketConnection::new(ws);
        tracing::debug!(conn_id = %conn.id(), "WebSocket upgrade complete");
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).expect("valid request")
    }

    fn websocket_request(key: Option<&str>, version: &str) -> Request<()> {
        let mut headers = vec![
            ("connection", "Upgrade"),
            ("upgrade", "websocket"),
            ("sec-websocket-version", version),
        ];
        if let Some(key) = key {
            headers.push(("sec-websocket-key", key));
        }
        request(&headers)
    }

    #[test]
    fn test_is_upgrade_request_plain_get_returns_false() {
        let req = request(&[("host", "localhost:3000")]);
        assert!(!is_upgrade_request(&req));
    }

    #[test]
    fn test_is_upgrade_request_token_list_returns_true() {
        // Browsers commonly send `Connection: keep-alive, Upgrade`.
        let req = request(&[
            ("connection", "keep-alive, Upgrade"),
            ("upgrade", "WebSocket"),
        ]);
        assert!(is_upgrade_request(&req));
    }

    #[test]
    fn test_is_upgrade_request_other_protocol_returns_false() {
        let req = request(&[("connection", "upgrade"), ("upgrade", "h2c")]);
        assert!(!is_upgrade_request(&req));
    }

    #[test]
    fn test_upgrade_derives_rfc6455_accept_key() {
        // Sample handshake from RFC 6455 section 1.3.
        let mut req =
            websocket_request(Some("dGhlIHNhbXBsZSBub25jZQ=="), "13");

        let (response, _pending) = upgrade(&mut req).expect("should upgrade");

        assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
        assert_eq!(
            response.headers()[SEC_WEBSOCKET_ACCEPT],
            "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        );
        assert_eq!(response.headers()[UPGRADE], "websocket");
    }

    #[test]
    fn test_upgrade_missing_key_returns_bad_upgrade() {
        let mut req = websocket_request(None, "13");

        let result = upgrade(&mut req);

        assert!(matches!(result, Err(TransportError::BadUpgrade(_))));
    }

    #[test]
    fn test_upgrade_wrong_version_returns_bad_upgrade() {
        let mut req =
            websocket_request(Some("dGhlIHNhbXBsZSBub25jZQ=="), "8");

        let result = upgrade(&mut req);

        assert!(matches!(result, Err(TransportError::BadUpgrade(msg)) if msg.contains("Version")));
    }
}
