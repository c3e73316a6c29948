//! Integration tests for the HTTP listener and WebSocket upgrade.
//!
//! These tests run a real hyper server on an ephemeral port and connect a
//! `tokio-tungstenite` client to it, so the upgrade path and the close
//! frames are exercised over an actual socket.

use std::convert::Infallible;
use std::net::SocketAddr;

use crumbcheck_transport::{
    Connection, HttpTransport, Transport, WebSocketConnection, upgrade,
};
use futures_util::{SinkExt, StreamExt};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Serves one TCP stream, upgrading every request and forwarding the
/// resulting server-side connection through the returned channel.
async fn start_upgrade_server(
) -> (SocketAddr, mpsc::UnboundedReceiver<WebSocketConnection>) {
    let mut transport = HttpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("should have addr");
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = transport.accept().await.expect("should accept");
        let service = service_fn(move |mut req: Request<Incoming>| {
            let tx = tx.clone();
            async move {
                let (response, pending) =
                    upgrade(&mut req).expect("client sends a valid upgrade");
                tokio::spawn(async move {
                    let conn = pending.finish().await.expect("should upgrade");
                    let _ = tx.send(conn);
                });
                Ok::<_, Infallible>(response)
            }
        });
        let _ = http1::Builder::new()
            .serve_connection(TokioIo::new(stream), service)
            .with_upgrades()
            .await;
    });

    (addr, rx)
}

async fn connect_client(addr: SocketAddr) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/"))
        .await
        .expect("client should connect");
    ws
}

#[tokio::test]
async fn test_upgrade_send_and_receive_text() {
    let (addr, mut conns) = start_upgrade_server().await;
    let mut client = connect_client(addr).await;
    let server_conn = conns.recv().await.expect("server connection");

    assert!(server_conn.id().into_inner() > 0);

    // --- Server sends, client receives a text frame ---
    server_conn
        .send(r#"{"type":"connected"}"#)
        .await
        .expect("send should succeed");
    let msg = client.next().await.unwrap().unwrap();
    assert!(msg.is_text(), "server frames must be text for browsers");
    assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"connected"}"#);

    // --- Client sends, server receives ---
    client
        .send(Message::Text(r#"{"type":"set_cookie"}"#.to_string().into()))
        .await
        .unwrap();
    let received = server_conn
        .recv()
        .await
        .expect("recv should succeed")
        .expect("should have data");
    assert_eq!(received, br#"{"type":"set_cookie"}"#);
}

#[tokio::test]
async fn test_close_with_delivers_code_and_reason() {
    let (addr, mut conns) = start_upgrade_server().await;
    let mut client = connect_client(addr).await;
    let server_conn = conns.recv().await.expect("server connection");

    server_conn
        .close_with(1008, "Unknown session")
        .await
        .expect("close should succeed");

    match client.next().await {
        Some(Ok(Message::Close(Some(frame)))) => {
            assert_eq!(u16::from(frame.code), 1008);
            assert_eq!(frame.reason.as_str(), "Unknown session");
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_recv_returns_none_on_client_close() {
    let (addr, mut conns) = start_upgrade_server().await;
    let mut client = connect_client(addr).await;
    let server_conn = conns.recv().await.expect("server connection");

    client.send(Message::Close(None)).await.unwrap();

    let result = server_conn.recv().await.expect("recv should not error");
    assert!(result.is_none(), "should return None on client close");

    // The close handshake completes: the client sees the echoed close
    // frame or a clean end of stream, never a reset.
    match client.next().await {
        Some(Ok(Message::Close(_))) | None => {}
        other => panic!("expected clean close, got {other:?}"),
    }
}
