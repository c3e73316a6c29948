//! WebSocket connection over an upgraded hyper stream, using
//! `tokio-tungstenite`.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use hyper::upgrade::Upgraded;
use hyper_util::rt::TokioIo;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TokioIo<Upgraded>>;

/// A single WebSocket connection.
///
/// The stream sits behind a mutex because the [`Connection`] methods take
/// `&self`. A `recv` holds the lock until a frame arrives, so callers
/// drive send and receive from the same task.
pub struct WebSocketConnection {
    id: ConnectionId,
    ws: Mutex<WsStream>,
}

impl WebSocketConnection {
    pub(crate) fn new(ws: WsStream) -> Self {
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        Self {
            id,
            ws: Mutex::new(ws),
        }
    }
}

fn broken_pipe(e: tokio_tungstenite::tungstenite::Error) -> TransportError {
    TransportError::SendFailed(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        e,
    ))
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), Self::Error> {
        let msg = Message::Text(text.to_string().into());
        self.ws.lock().await.send(msg).await.map_err(broken_pipe)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut ws = self.ws.lock().await;
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Close(_))) => {
                    // tungstenite queues the close reply while reading;
                    // it only reaches the peer on the next flush. The
                    // flush reports the now-closed stream as an error.
                    let _ = ws.flush().await;
                    return Ok(None);
                }
                None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close_with(
        &self,
        code: u16,
        reason: &str,
    ) -> Result<(), Self::Error> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        self.ws
            .lock()
            .await
            .close(Some(frame))
            .await
            .map_err(broken_pipe)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
