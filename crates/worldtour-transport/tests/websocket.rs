//! Integration tests for the WebSocket transport against a raw
//! `tokio-tungstenite` client.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use worldtour_transport::{Connection, Transport, WebSocketTransport};

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn bind() -> (WebSocketTransport, String) {
    let transport = WebSocketTransport::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = transport.local_addr().unwrap().to_string();
    (transport, addr)
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client connect");
    ws
}

#[tokio::test]
async fn test_accept_assigns_distinct_connection_ids() {
    let (mut transport, addr) = bind().await;

    let (_c1, _c2) = tokio::join!(
        async {
            let a = connect(&addr).await;
            let b = connect(&addr).await;
            (a, b)
        },
        async {
            let first = transport.accept().await.unwrap();
            let second = transport.accept().await.unwrap();
            assert_ne!(first.id(), second.id());
        }
    );
}

#[tokio::test]
async fn test_recv_returns_client_text_frames() {
    let (mut transport, addr) = bind().await;

    let server = tokio::spawn(async move {
        let conn = transport.accept().await.unwrap();
        conn.recv().await.unwrap()
    });

    let mut client = connect(&addr).await;
    client
        .send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .unwrap();

    let received = server.await.unwrap();
    assert_eq!(received.as_deref(), Some(br#"{"type":"ping"}"#.as_ref()));
}

#[tokio::test]
async fn test_send_delivers_text_frames_to_client() {
    let (mut transport, addr) = bind().await;

    let server = tokio::spawn(async move {
        let conn = transport.accept().await.unwrap();
        conn.send(br#"{"type":"pong"}"#).await.unwrap();
        conn
    });

    let mut client = connect(&addr).await;
    let frame = client.next().await.unwrap().unwrap();
    match frame {
        Message::Text(text) => {
            assert_eq!(text.as_str(), r#"{"type":"pong"}"#)
        }
        other => panic!("expected text frame, got {other:?}"),
    }
    drop(server);
}

#[tokio::test]
async fn test_recv_none_on_client_close() {
    let (mut transport, addr) = bind().await;

    let server = tokio::spawn(async move {
        let conn = transport.accept().await.unwrap();
        conn.recv().await.unwrap()
    });

    let mut client = connect(&addr).await;
    client.close(None).await.unwrap();

    assert_eq!(server.await.unwrap(), None);
}

#[tokio::test]
async fn test_send_while_recv_pending_does_not_deadlock() {
    // The split-halves design exists for exactly this: the handler is
    // parked in recv while a broadcast pushes a frame out.
    let (mut transport, addr) = bind().await;

    let server = tokio::spawn(async move {
        let conn = transport.accept().await.unwrap();
        let conn = std::sync::Arc::new(conn);

        let reader = {
            let conn = std::sync::Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await.unwrap() })
        };
        // Reader is parked; a send must still go through.
        conn.send(br#"{"type":"game-paused"}"#).await.unwrap();
        reader
    });

    let mut client = connect(&addr).await;
    let frame = client.next().await.unwrap().unwrap();
    assert!(matches!(frame, Message::Text(_)));

    // Unblock the reader and let the tasks finish.
    client
        .send(Message::Text(r#"{"type":"ping"}"#.into()))
        .await
        .unwrap();
    let reader = server.await.unwrap();
    assert!(reader.await.unwrap().is_some());
}
