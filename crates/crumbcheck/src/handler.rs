//! Per-connection handler: credential check, then message routing.
//!
//! Each upgraded connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Classify the cookie captured from the upgrade request
//!   2. Stale or unknown → close with 1008 and stop
//!   3. Otherwise send `connected` → the channel is open
//!   4. Loop: receive frames → apply `set_cookie` / `clear_cookie`

use std::sync::Arc;

use crumbcheck_protocol::{ClientMessage, Codec, ServerMessage};
use crumbcheck_session::cookie::session_cookie;
use crumbcheck_session::{SessionChannel, validate_handshake};
use crumbcheck_transport::{Connection, TransportError};

use crate::CrumbError;
use crate::server::ServerState;

/// Handles a single upgraded connection from handshake to close.
///
/// A refused handshake closes the connection with its [`CloseReason`]
/// and is returned as [`CrumbError::Session`].
///
/// [`CloseReason`]: crumbcheck_protocol::CloseReason
pub(crate) async fn handle_connection<T, C>(
    conn: T,
    cookie_header: Option<String>,
    state: Arc<ServerState<C>>,
) -> Result<(), CrumbError>
where
    T: Connection<Error = TransportError>,
    C: Codec,
{
    let conn_id = conn.id();
    let presented = session_cookie(cookie_header.as_deref());
    tracing::info!(
        %conn_id,
        cookies = cookie_header.as_deref().unwrap_or(""),
        ?presented,
        "WebSocket connection attempt"
    );

    // --- Step 1: Handshake ---
    let verdict = {
        let mut sessions = state.sessions.lock().await;
        validate_handshake(&mut sessions, presented.as_ref())
    };
    let session_id = match verdict {
        Ok(id) => id,
        Err(e) => {
            let reason = e.close_reason();
            tracing::debug!(
                %conn_id,
                session_id = %e.session_id(),
                %reason,
                "closing rejected connection"
            );
            conn.close_with(reason.code, &reason.reason).await?;
            return Err(e.into());
        }
    };

    let connected = ServerMessage::connected(session_id.clone());
    send_message(&conn, &state.codec, &connected).await?;
    tracing::info!(%conn_id, %session_id, "connection open");

    // --- Step 2: Message loop ---
    let mut channel = SessionChannel::open(session_id);

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(
                    %conn_id,
                    session_id = %channel.session_id(),
                    "connection closed"
                );
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    %conn_id, error = %e, "ignoring undecodable frame"
                );
                continue;
            }
        };

        let reply = {
            let mut sessions = state.sessions.lock().await;
            channel.apply(&mut sessions, msg)
        };
        send_message(&conn, &state.codec, &reply).await?;
    }

    Ok(())
}

async fn send_message<T, C>(
    conn: &T,
    codec: &C,
    msg: &ServerMessage,
) -> Result<(), CrumbError>
where
    T: Connection<Error = TransportError>,
    C: Codec,
{
    let text = codec.encode(msg)?;
    conn.send(&text).await?;
    Ok(())
}
