//! Per-connection handler: hello handshake, auth, and the channel pump.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive `hello` → validate the session code format
//!   2. Authenticate the token → get a `PlayerId`
//!   3. Look the session up and attach → snapshot arrives as `connected`
//!   4. Loop: pump actor events out, dispatch client commands in
//!
//! Every rejection goes back to this connection only; broadcasts reach
//! this connection through the attached event channel like everyone
//! else's.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use worldtour_protocol::{
    ClientCommand, Codec, JsonCodec, PlayerId, ProtocolError, ServerEvent,
    SessionCode,
};
use worldtour_session::{
    Authenticator, Catalog, ControlCommand, ParticipantId, SessionHandle,
};
use worldtour_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::WorldTourError;

/// How long a fresh connection gets to say hello.
const HELLO_TIMEOUT: Duration = Duration::from_secs(5);

/// Idle cutoff for established connections. The client pings well inside
/// this window; a connection silent for this long is presumed dead.
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Drop guard that detaches the participant when the handler exits,
/// including on panic. `Drop` is synchronous, so the async detach runs
/// in a fire-and-forget task.
struct DetachGuard {
    handle: SessionHandle,
    participant: ParticipantId,
}

impl Drop for DetachGuard {
    fn drop(&mut self) {
        let handle = self.handle.clone();
        let participant = self.participant;
        tokio::spawn(async move {
            handle.detach(participant).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<A, C>>,
) -> Result<(), WorldTourError>
where
    A: Authenticator,
    C: Catalog,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (player, session) = perform_hello(&conn, &state).await?;
    tracing::info!(
        %conn_id,
        %player,
        session = %session.code(),
        "participant authenticated"
    );

    // Attach to the session channel. The actor pushes the connect
    // snapshot into this channel before anything else, so the pump below
    // delivers `connected` as the first frame.
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let participant = session.attach(player, outbound_tx).await?;
    let _guard = DetachGuard {
        handle: session.clone(),
        participant,
    };

    loop {
        tokio::select! {
            event = outbound_rx.recv() => {
                let Some(event) = event else {
                    // Actor gone: session was destroyed.
                    tracing::info!(%player, "session channel closed");
                    break;
                };
                let bytes = state.codec.encode(&event)?;
                if conn.send(&bytes).await.is_err() {
                    tracing::debug!(%player, "send failed, dropping connection");
                    break;
                }
            }

            inbound = tokio::time::timeout(IDLE_TIMEOUT, conn.recv()) => {
                let data = match inbound {
                    Ok(Ok(Some(data))) => data,
                    Ok(Ok(None)) => {
                        tracing::info!(%player, "connection closed cleanly");
                        break;
                    }
                    Ok(Err(e)) => {
                        tracing::debug!(%player, error = %e, "recv error");
                        break;
                    }
                    Err(_) => {
                        tracing::info!(%player, "connection idle, closing");
                        break;
                    }
                };

                let command: ClientCommand = match state.codec.decode(&data) {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        tracing::debug!(%player, error = %e, "undecodable command");
                        send_error(&conn, &state.codec, &format!("invalid message: {e}"))
                            .await?;
                        continue;
                    }
                };

                dispatch(&conn, &state.codec, &session, player, command).await?;
            }
        }
    }

    // _guard drops here → detach fires.
    Ok(())
}

/// Receives and validates the `hello`, resolving the caller and session.
async fn perform_hello<A, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<A, C>>,
) -> Result<(PlayerId, SessionHandle), WorldTourError>
where
    A: Authenticator,
    C: Catalog,
{
    let data = match tokio::time::timeout(HELLO_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before hello".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage(
                "hello timed out".into(),
            )
            .into());
        }
    };

    let (raw_code, token) = match state.codec.decode(&data) {
        Ok(ClientCommand::Hello { code, token }) => (code, token),
        Ok(_) => {
            send_error(conn, &state.codec, "expected hello").await?;
            return Err(ProtocolError::InvalidMessage(
                "first message must be hello".into(),
            )
            .into());
        }
        Err(e) => {
            send_error(conn, &state.codec, &format!("invalid hello: {e}"))
                .await?;
            return Err(e.into());
        }
    };

    // Format check before any lookup — junk never reaches the registry.
    let code: SessionCode = match raw_code.parse() {
        Ok(code) => code,
        Err(e) => {
            send_error(conn, &state.codec, "invalid session code").await?;
            return Err(WorldTourError::Protocol(e));
        }
    };

    let player = match state
        .auth
        .authenticate(token.as_deref().unwrap_or(""))
        .await
    {
        Ok(player) => player,
        Err(e) => {
            send_error(conn, &state.codec, "unauthorized").await?;
            return Err(e.into());
        }
    };

    let session = {
        let registry = state.registry.lock().await;
        registry.lookup(&code)
    };
    match session {
        Ok(session) => Ok((player, session)),
        Err(e) => {
            send_error(conn, &state.codec, &e.to_string()).await?;
            Err(e.into())
        }
    }
}

/// Routes one decoded command to the session engine, reporting any
/// rejection to this connection only.
async fn dispatch(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    session: &SessionHandle,
    player: PlayerId,
    command: ClientCommand,
) -> Result<(), WorldTourError> {
    match command {
        ClientCommand::Hello { .. } => {
            tracing::debug!(%player, "ignoring repeated hello");
        }

        ClientCommand::Ping => {
            send_event(conn, codec, &ServerEvent::Pong).await?;
        }

        ClientCommand::Join { board_layout } => {
            match session.join(player, board_layout).await {
                Ok(()) => {
                    send_event(conn, codec, &ServerEvent::BoardAccepted)
                        .await?;
                }
                Err(e) => {
                    send_error(conn, codec, &e.to_string()).await?;
                }
            }
        }

        ClientCommand::Start
        | ClientCommand::Pause
        | ClientCommand::Resume
        | ClientCommand::End
        | ClientCommand::ManualReveal => {
            let control = match command {
                ClientCommand::Start => ControlCommand::Start,
                ClientCommand::Pause => ControlCommand::Pause,
                ClientCommand::Resume => ControlCommand::Resume,
                ClientCommand::End => ControlCommand::End,
                _ => ControlCommand::ManualReveal,
            };
            if let Err(e) = session.control(player, control).await {
                send_error(conn, codec, &e.to_string()).await?;
            }
            // Success needs no direct reply: the effects arrive as
            // broadcasts on the event channel.
        }

        ClientCommand::ClaimBingo {
            winning_pattern,
            selected_tiles,
        } => {
            match session.claim(player, winning_pattern, selected_tiles).await
            {
                // The winner-found broadcast covers the claimant too.
                Ok(_) => {}
                Err(e) => {
                    send_error(conn, codec, &e.to_string()).await?;
                }
            }
        }
    }

    Ok(())
}

async fn send_event(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    event: &ServerEvent,
) -> Result<(), WorldTourError> {
    let bytes = codec.encode(event)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends a `ServerEvent::Error` to this connection only.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    message: &str,
) -> Result<(), WorldTourError> {
    send_event(
        conn,
        codec,
        &ServerEvent::Error {
            message: message.to_string(),
        },
    )
    .await
}
