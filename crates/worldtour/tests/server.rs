//! Integration tests for the full connection flow: WebSocket client →
//! hello handshake → session channel → game engine and back.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use worldtour::prelude::*;

// =========================================================================
// Test fixtures
// =========================================================================

/// Accepts any numeric token as a PlayerId.
struct TestAuth;

impl Authenticator for TestAuth {
    async fn authenticate(
        &self,
        token: &str,
    ) -> Result<PlayerId, GameError> {
        let id: u64 = token
            .parse()
            .map_err(|_| GameError::AuthFailed("not a number".into()))?;
        Ok(PlayerId(id))
    }
}

const HOST_TOKEN: &str = "1";
const PLAYER_TOKEN: &str = "2";

fn catalog(n: u64) -> Arc<StaticCatalog> {
    Arc::new(StaticCatalog::new(
        (1..=n)
            .map(|id| Destination {
                id: DestinationId(id),
                name: format!("Destination {id}"),
            })
            .collect(),
    ))
}

/// A board holding destinations 1..=24 in slot order.
fn board_slots() -> Vec<Option<DestinationId>> {
    let mut slots = vec![None; BOARD_SIZE];
    let mut next = 1;
    for (i, slot) in slots.iter_mut().enumerate() {
        if i != FREE_INDEX {
            *slot = Some(DestinationId(next));
            next += 1;
        }
    }
    slots
}

fn board() -> BoardLayout {
    BoardLayout::try_from(board_slots()).unwrap()
}

fn marks(indices: &[usize]) -> [bool; BOARD_SIZE] {
    let mut out = [false; BOARD_SIZE];
    for &i in indices {
        out[i] = true;
    }
    out
}

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server with one WAITING session and returns (addr, code).
/// The reveal interval is long, so nothing fires automatically during a
/// test.
async fn start_server(catalog_size: u64) -> (String, String) {
    let server = WorldTourServer::<TestAuth, StaticCatalog>::builder()
        .bind("127.0.0.1:0")
        .build(TestAuth, catalog(catalog_size))
        .await
        .expect("server should build");

    let addr = server.local_addr().unwrap().to_string();
    let handle = server
        .create_session(
            PlayerId(1),
            SessionConfig {
                reveal_interval: Duration::from_secs(600),
                max_reveals: None,
            },
        )
        .await
        .expect("session should be created");
    let code = handle.code().to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, code)
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn encode(cmd: &ClientCommand) -> Message {
    Message::Text(serde_json::to_string(cmd).expect("encode").into())
}

async fn recv_event(ws: &mut ClientWs) -> ServerEvent {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("websocket error");
    match msg {
        Message::Text(text) => {
            serde_json::from_str(text.as_str()).expect("decode event")
        }
        Message::Binary(data) => {
            serde_json::from_slice(&data).expect("decode event")
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

/// Receives events until `predicate` matches, returning that event.
async fn recv_until(
    ws: &mut ClientWs,
    predicate: impl Fn(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = recv_event(ws).await;
        if predicate(&event) {
            return event;
        }
    }
}

/// Asserts nothing arrives on `ws` for a short window.
async fn assert_silent(ws: &mut ClientWs) {
    let result =
        tokio::time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(result.is_err(), "expected silence, got {:?}", result.unwrap());
}

/// Connects, says hello with the given token, and consumes the
/// `connected` snapshot.
async fn join_channel(addr: &str, code: &str, token: &str) -> ClientWs {
    let mut ws = connect(addr).await;
    ws.send(encode(&ClientCommand::Hello {
        code: code.into(),
        token: Some(token.into()),
    }))
    .await
    .expect("send hello");

    match recv_event(&mut ws).await {
        ServerEvent::Connected { .. } => ws,
        other => panic!("expected connected snapshot, got {other:?}"),
    }
}

// =========================================================================
// Hello handshake
// =========================================================================

#[tokio::test]
async fn test_hello_receives_waiting_snapshot() {
    let (addr, code) = start_server(30).await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientCommand::Hello {
        code: code.clone(),
        token: Some(HOST_TOKEN.into()),
    }))
    .await
    .unwrap();

    match recv_event(&mut ws).await {
        ServerEvent::Connected {
            status,
            revealed_locations,
        } => {
            assert_eq!(status, SessionStatus::Waiting);
            assert!(revealed_locations.is_empty());
        }
        other => panic!("expected connected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hello_malformed_code_is_rejected() {
    let (addr, _code) = start_server(30).await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientCommand::Hello {
        code: "bad!".into(),
        token: Some(HOST_TOKEN.into()),
    }))
    .await
    .unwrap();

    match recv_event(&mut ws).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("invalid session code"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hello_unknown_code_is_rejected() {
    let (addr, _code) = start_server(30).await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientCommand::Hello {
        code: "ZZZZ99".into(),
        token: Some(HOST_TOKEN.into()),
    }))
    .await
    .unwrap();

    match recv_event(&mut ws).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not found"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_hello_bad_token_is_rejected() {
    let (addr, code) = start_server(30).await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientCommand::Hello {
        code,
        token: Some("not-a-number".into()),
    }))
    .await
    .unwrap();

    match recv_event(&mut ws).await {
        ServerEvent::Error { message } => {
            assert_eq!(message, "unauthorized");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_first_message_must_be_hello() {
    let (addr, _code) = start_server(30).await;
    let mut ws = connect(&addr).await;

    ws.send(encode(&ClientCommand::Ping)).await.unwrap();

    match recv_event(&mut ws).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("expected hello"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

// =========================================================================
// Channel basics
// =========================================================================

#[tokio::test]
async fn test_ping_pong() {
    let (addr, code) = start_server(30).await;
    let mut ws = join_channel(&addr, &code, PLAYER_TOKEN).await;

    ws.send(encode(&ClientCommand::Ping)).await.unwrap();
    assert_eq!(recv_event(&mut ws).await, ServerEvent::Pong);
}

#[tokio::test]
async fn test_join_is_acknowledged_to_sender() {
    let (addr, code) = start_server(30).await;
    let mut ws = join_channel(&addr, &code, PLAYER_TOKEN).await;

    ws.send(encode(&ClientCommand::Join {
        board_layout: board(),
    }))
    .await
    .unwrap();

    assert_eq!(recv_event(&mut ws).await, ServerEvent::BoardAccepted);
}

// =========================================================================
// Host control over the channel
// =========================================================================

#[tokio::test]
async fn test_non_host_control_is_rejected_privately() {
    let (addr, code) = start_server(30).await;
    let mut host = join_channel(&addr, &code, HOST_TOKEN).await;
    let mut player = join_channel(&addr, &code, PLAYER_TOKEN).await;

    player.send(encode(&ClientCommand::Start)).await.unwrap();

    match recv_event(&mut player).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("not the host"));
        }
        other => panic!("expected error, got {other:?}"),
    }
    // The rejection never reaches anyone else.
    assert_silent(&mut host).await;
}

#[tokio::test]
async fn test_start_without_boards_reports_error_to_host() {
    let (addr, code) = start_server(30).await;
    let mut host = join_channel(&addr, &code, HOST_TOKEN).await;

    host.send(encode(&ClientCommand::Start)).await.unwrap();

    match recv_event(&mut host).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("no player boards"));
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_manual_reveal_reaches_every_participant() {
    let (addr, code) = start_server(30).await;
    let mut host = join_channel(&addr, &code, HOST_TOKEN).await;
    let mut player = join_channel(&addr, &code, PLAYER_TOKEN).await;

    player
        .send(encode(&ClientCommand::Join {
            board_layout: board(),
        }))
        .await
        .unwrap();
    assert_eq!(recv_event(&mut player).await, ServerEvent::BoardAccepted);

    host.send(encode(&ClientCommand::Start)).await.unwrap();
    host.send(encode(&ClientCommand::ManualReveal)).await.unwrap();

    for ws in [&mut host, &mut player] {
        match recv_event(ws).await {
            ServerEvent::LocationRevealed { reveal_index, .. } => {
                assert_eq!(reveal_index, 1);
            }
            other => panic!("expected location-revealed, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_pause_and_end_are_broadcast() {
    let (addr, code) = start_server(30).await;
    let mut host = join_channel(&addr, &code, HOST_TOKEN).await;
    let mut player = join_channel(&addr, &code, PLAYER_TOKEN).await;

    player
        .send(encode(&ClientCommand::Join {
            board_layout: board(),
        }))
        .await
        .unwrap();
    assert_eq!(recv_event(&mut player).await, ServerEvent::BoardAccepted);

    host.send(encode(&ClientCommand::Start)).await.unwrap();
    host.send(encode(&ClientCommand::Pause)).await.unwrap();
    for ws in [&mut host, &mut player] {
        assert_eq!(recv_event(ws).await, ServerEvent::GamePaused);
    }

    host.send(encode(&ClientCommand::End)).await.unwrap();
    for ws in [&mut host, &mut player] {
        assert_eq!(recv_event(ws).await, ServerEvent::GameEnded);
    }
}

// =========================================================================
// Claims end to end
// =========================================================================

/// Drives a full game on a catalog exactly covering the board, so every
/// tile ends up revealed.
async fn fully_revealed_game() -> (ClientWs, ClientWs) {
    let (addr, code) = start_server(24).await;
    let mut host = join_channel(&addr, &code, HOST_TOKEN).await;
    let mut player = join_channel(&addr, &code, PLAYER_TOKEN).await;

    player
        .send(encode(&ClientCommand::Join {
            board_layout: board(),
        }))
        .await
        .unwrap();
    assert_eq!(recv_event(&mut player).await, ServerEvent::BoardAccepted);

    host.send(encode(&ClientCommand::Start)).await.unwrap();
    for _ in 0..24 {
        host.send(encode(&ClientCommand::ManualReveal)).await.unwrap();
    }
    // Drain the reveal events on both connections.
    for ws in [&mut host, &mut player] {
        let last = recv_until(ws, |e| {
            matches!(
                e,
                ServerEvent::LocationRevealed { reveal_index: 24, .. }
            )
        })
        .await;
        assert!(matches!(last, ServerEvent::LocationRevealed { .. }));
    }
    (host, player)
}

#[tokio::test]
async fn test_valid_claim_broadcasts_winner_found() {
    let (mut host, mut player) = fully_revealed_game().await;

    player
        .send(encode(&ClientCommand::ClaimBingo {
            winning_pattern: WinPattern::Row0,
            selected_tiles: marks(&[0, 1, 2, 3, 4]),
        }))
        .await
        .unwrap();

    for ws in [&mut host, &mut player] {
        assert_eq!(
            recv_event(ws).await,
            ServerEvent::WinnerFound {
                player_id: PlayerId(2),
                place: 1,
            }
        );
    }
}

#[tokio::test]
async fn test_false_claim_is_rejected_to_claimant_only() {
    let (mut host, mut player) = fully_revealed_game().await;

    // Every tile is revealed, but the claimant only marked row 0 and
    // claims row 2 — a pattern that is not complete for them.
    player
        .send(encode(&ClientCommand::ClaimBingo {
            winning_pattern: WinPattern::Row2,
            selected_tiles: marks(&[0, 1, 2, 3, 4]),
        }))
        .await
        .unwrap();

    match recv_event(&mut player).await {
        ServerEvent::Error { message } => {
            assert!(message.contains("invalid bingo"));
        }
        other => panic!("expected error, got {other:?}"),
    }
    assert_silent(&mut host).await;
}

#[tokio::test]
async fn test_late_joiner_resyncs_from_snapshot() {
    let (addr, code) = start_server(30).await;
    let mut host = join_channel(&addr, &code, HOST_TOKEN).await;

    host.send(encode(&ClientCommand::Join {
        board_layout: board(),
    }))
    .await
    .unwrap();
    assert_eq!(recv_event(&mut host).await, ServerEvent::BoardAccepted);

    host.send(encode(&ClientCommand::Start)).await.unwrap();
    for _ in 0..3 {
        host.send(encode(&ClientCommand::ManualReveal)).await.unwrap();
    }
    recv_until(&mut host, |e| {
        matches!(e, ServerEvent::LocationRevealed { reveal_index: 3, .. })
    })
    .await;

    // A participant connecting now gets the whole history at once.
    let mut late = connect(&addr).await;
    late.send(encode(&ClientCommand::Hello {
        code,
        token: Some("9".into()),
    }))
    .await
    .unwrap();

    match recv_event(&mut late).await {
        ServerEvent::Connected {
            status,
            revealed_locations,
        } => {
            assert_eq!(status, SessionStatus::Active);
            let indices: Vec<u32> = revealed_locations
                .iter()
                .map(|r| r.reveal_index)
                .collect();
            assert_eq!(indices, vec![1, 2, 3]);
        }
        other => panic!("expected connected snapshot, got {other:?}"),
    }
}
