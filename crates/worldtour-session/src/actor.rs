//! Session actor: an isolated Tokio task that owns one game session.
//!
//! Each session runs in its own task, communicating with the outside
//! world through an mpsc channel. Host commands, board joins, win claims,
//! and the automatic reveal timer all funnel through one `select!` loop,
//! so every read-modify-write of session state is serialized: two
//! concurrent manual reveals cannot double-book a reveal index, two
//! simultaneous claims cannot take the same place, and a pause cannot
//! interleave with a reveal mid-flight.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use worldtour_game::{BoardLayout, WinPattern, BOARD_SIZE};
use worldtour_protocol::{PlayerId, ServerEvent, SessionCode, SessionStatus};
use worldtour_reveal::RevealTimer;

use crate::adjudicate::adjudicate;
use crate::transition::{self, ControlCommand};
use crate::{
    Catalog, GameError, GameSession, SessionInfo, SessionStore, Winner,
};

/// Counter for tagging channel participants across all sessions.
static NEXT_PARTICIPANT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one attached connection on a session's channel. A player
/// with two tabs open holds two of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantId(u64);

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c-{}", self.0)
    }
}

/// Channel sender for delivering events to one participant's connection
/// handler. Unbounded on purpose: a slow consumer can never stall the
/// actor; if its receiver is gone the send is dropped silently and the
/// client resyncs from the connect snapshot next time.
pub type ParticipantSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a session actor through its channel. Variants with a
/// `oneshot::Sender` are request/response; the rest are fire-and-forget.
pub(crate) enum SessionCommand {
    /// Register a connection; the snapshot event is sent before the reply.
    Attach {
        player: PlayerId,
        sender: ParticipantSender,
        reply: oneshot::Sender<ParticipantId>,
    },

    /// Unregister a connection. No session-state change — the game
    /// continues regardless of who is watching.
    Detach { participant: ParticipantId },

    /// Create (or, while WAITING, replace) the player's board.
    Join {
        player: PlayerId,
        layout: BoardLayout,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// A host control command: start/pause/resume/end/manual-reveal.
    Control {
        caller: PlayerId,
        command: ControlCommand,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// A win claim.
    Claim {
        caller: PlayerId,
        pattern: WinPattern,
        selected: Box<[bool; BOARD_SIZE]>,
        reply: oneshot::Sender<Result<Winner, GameError>>,
    },

    /// Accepted winners in place order.
    Winners {
        reply: oneshot::Sender<Vec<Winner>>,
    },

    /// Session metadata snapshot.
    GetInfo { reply: oneshot::Sender<SessionInfo> },

    /// Tear the actor down (registry destroy).
    Shutdown,
}

/// Handle to a running session actor. Cheap to clone — an
/// `mpsc::Sender` wrapper plus the session code.
#[derive(Clone)]
pub struct SessionHandle {
    code: SessionCode,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// The session's human-entry code.
    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    fn unavailable(&self) -> GameError {
        GameError::Unavailable(self.code.clone())
    }

    /// Attaches a connection to the session channel. The connect-time
    /// snapshot ([`ServerEvent::Connected`]) arrives on `sender` before
    /// any subsequent broadcast.
    pub async fn attach(
        &self,
        player: PlayerId,
        sender: ParticipantSender,
    ) -> Result<ParticipantId, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Attach {
                player,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Detaches a connection (fire-and-forget).
    pub async fn detach(&self, participant: ParticipantId) {
        let _ = self
            .sender
            .send(SessionCommand::Detach { participant })
            .await;
    }

    /// Joins the session with a completed board layout.
    pub async fn join(
        &self,
        player: PlayerId,
        layout: BoardLayout,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Join {
                player,
                layout,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Issues a host control command.
    pub async fn control(
        &self,
        caller: PlayerId,
        command: ControlCommand,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Control {
                caller,
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Submits a win claim.
    pub async fn claim(
        &self,
        caller: PlayerId,
        pattern: WinPattern,
        selected: [bool; BOARD_SIZE],
    ) -> Result<Winner, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Claim {
                caller,
                pattern,
                selected: Box::new(selected),
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Accepted winners so far, in place order.
    pub async fn winners(&self) -> Result<Vec<Winner>, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Winners { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Requests a metadata snapshot.
    pub async fn info(&self) -> Result<SessionInfo, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the session actor to shut down.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

struct Participant {
    player: PlayerId,
    sender: ParticipantSender,
}

/// The internal actor state. Runs inside a Tokio task.
struct SessionActor<C: Catalog> {
    session: GameSession,
    store: SessionStore,
    timer: RevealTimer,
    catalog: Arc<C>,
    participants: HashMap<ParticipantId, Participant>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<C: Catalog> SessionActor<C> {
    /// Runs the actor loop until shutdown.
    async fn run(mut self) {
        tracing::info!(
            session = %self.session.code,
            host = %self.session.host,
            "session actor started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if self.handle_command(cmd).await {
                        break;
                    }
                }
                _ = self.timer.wait() => {
                    self.automatic_reveal().await;
                }
            }
        }

        tracing::info!(session = %self.session.code, "session actor stopped");
    }

    /// Processes one command. Returns `true` when the actor should stop.
    async fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Attach {
                player,
                sender,
                reply,
            } => {
                let id = ParticipantId(
                    NEXT_PARTICIPANT_ID.fetch_add(1, Ordering::Relaxed),
                );
                // Snapshot first, so `connected` is the first event this
                // participant ever sees and later broadcasts can only
                // extend it.
                let _ = sender.send(ServerEvent::Connected {
                    status: self.session.status,
                    revealed_locations: self.store.revealed().to_vec(),
                });
                self.participants.insert(id, Participant { player, sender });
                tracing::info!(
                    session = %self.session.code,
                    %player,
                    participant = %id,
                    connections = self.participants.len(),
                    "participant attached"
                );
                let _ = reply.send(id);
            }

            SessionCommand::Detach { participant } => {
                if let Some(p) = self.participants.remove(&participant) {
                    tracing::info!(
                        session = %self.session.code,
                        player = %p.player,
                        participant = %participant,
                        connections = self.participants.len(),
                        "participant detached"
                    );
                }
            }

            SessionCommand::Join {
                player,
                layout,
                reply,
            } => {
                let _ = reply.send(self.handle_join(player, layout));
            }

            SessionCommand::Control {
                caller,
                command,
                reply,
            } => {
                let result = self.handle_control(caller, command).await;
                if let Err(e) = &result {
                    tracing::debug!(
                        session = %self.session.code,
                        %caller,
                        %command,
                        error = %e,
                        "control command rejected"
                    );
                }
                let _ = reply.send(result);
            }

            SessionCommand::Claim {
                caller,
                pattern,
                selected,
                reply,
            } => {
                let _ = reply.send(self.handle_claim(caller, pattern, &selected));
            }

            SessionCommand::Winners { reply } => {
                let _ = reply.send(self.store.winners().to_vec());
            }

            SessionCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }

            SessionCommand::Shutdown => {
                tracing::info!(
                    session = %self.session.code,
                    "session shutting down"
                );
                return true;
            }
        }
        false
    }

    fn handle_join(
        &mut self,
        player: PlayerId,
        layout: BoardLayout,
    ) -> Result<(), GameError> {
        if !self.session.status.is_joinable() {
            return Err(GameError::NotJoinable(self.session.status));
        }
        let replaced = self.store.put_board(player, layout);
        tracing::info!(
            session = %self.session.code,
            %player,
            replaced,
            boards = self.store.board_count(),
            "board accepted"
        );
        Ok(())
    }

    /// Authorization, then the transition table, then per-command
    /// preconditions and effects — in that order.
    async fn handle_control(
        &mut self,
        caller: PlayerId,
        command: ControlCommand,
    ) -> Result<(), GameError> {
        if caller != self.session.host {
            return Err(GameError::Unauthorized(caller));
        }

        let next = transition::apply(self.session.status, command)?;

        match command {
            ControlCommand::Start => {
                if self.store.board_count() == 0 {
                    return Err(GameError::NoBoards);
                }
                self.session.status = next;
                self.session.started_at = Some(Utc::now());
                self.timer.start();
                tracing::info!(
                    session = %self.session.code,
                    boards = self.store.board_count(),
                    interval_s = self.session.reveal_interval.as_secs(),
                    max_reveals = self.session.max_reveals,
                    "session started"
                );
            }

            ControlCommand::Pause => {
                self.session.status = next;
                self.timer.pause();
                tracing::info!(session = %self.session.code, "session paused");
                self.broadcast(ServerEvent::GamePaused);
            }

            ControlCommand::Resume => {
                self.session.status = next;
                self.timer.resume();
                tracing::info!(session = %self.session.code, "session resumed");
                self.broadcast(ServerEvent::GameResumed);
            }

            ControlCommand::End => {
                self.session.status = next;
                self.session.ended_at = Some(Utc::now());
                self.timer.stop();
                tracing::info!(
                    session = %self.session.code,
                    reveals = self.session.current_reveal_index,
                    winners = self.store.winners().len(),
                    "session ended"
                );
                self.broadcast(ServerEvent::GameEnded);
            }

            ControlCommand::ManualReveal => {
                // Self-edge on ACTIVE; the reveal itself may still fail
                // on budget or catalog exhaustion.
                self.perform_reveal().await?;
            }
        }

        Ok(())
    }

    fn handle_claim(
        &mut self,
        caller: PlayerId,
        pattern: WinPattern,
        selected: &[bool; BOARD_SIZE],
    ) -> Result<Winner, GameError> {
        let accepted = adjudicate(
            self.session.status,
            &self.store,
            caller,
            pattern,
            selected,
        )?;

        // Count-then-insert runs inside this single actor turn, so
        // places are gapless however claims raced on the way in.
        let winner = self.store.record_winner(caller, accepted);
        tracing::info!(
            session = %self.session.code,
            %caller,
            pattern = %accepted,
            place = winner.place,
            "bingo accepted"
        );
        self.broadcast(ServerEvent::WinnerFound {
            player_id: caller,
            place: winner.place,
        });
        Ok(winner)
    }

    /// Selects one unrevealed destination uniformly at random and
    /// announces it. The budget check, the history append, and the index
    /// increment happen in this one synchronous stretch — there is no
    /// partially-applied reveal.
    async fn perform_reveal(&mut self) -> Result<(), GameError> {
        if !self.session.reveals_remaining() {
            self.timer.stop();
            return Err(GameError::MaxRevealsReached(self.session.max_reveals));
        }

        let catalog = self.catalog.destinations().await?;
        let remaining: Vec<_> = catalog
            .iter()
            .filter(|d| !self.store.is_revealed(d.id))
            .collect();

        // Uniform choice keeps upcoming reveals unpredictable even to
        // the host. No seed: reproducibility is a non-requirement.
        use rand::seq::IndexedRandom;
        let Some(destination) = remaining.choose(&mut rand::rng()) else {
            self.timer.stop();
            return Err(GameError::NoLocationsRemaining);
        };

        let index = self.session.current_reveal_index + 1;
        self.store.record_reveal(destination, index);
        self.session.current_reveal_index = index;

        if !self.session.reveals_remaining() {
            // Budget spent: no further automatic ticks, but the session
            // stays ACTIVE until the host ends it.
            self.timer.stop();
        }

        tracing::info!(
            session = %self.session.code,
            destination = %destination.id,
            name = %destination.name,
            reveal_index = index,
            "destination revealed"
        );
        self.broadcast(ServerEvent::LocationRevealed {
            destination_id: destination.id,
            destination_name: destination.name.clone(),
            reveal_index: index,
        });
        Ok(())
    }

    /// One automatic tick. A tick that lost a race with pause/end is a
    /// no-op; a failed catalog read leaves the timer armed so the next
    /// tick retries.
    async fn automatic_reveal(&mut self) {
        if self.session.status != SessionStatus::Active {
            tracing::debug!(
                session = %self.session.code,
                status = %self.session.status,
                "reveal tick on non-active session ignored"
            );
            return;
        }

        match self.perform_reveal().await {
            Ok(()) => {}
            Err(GameError::Catalog(e)) => {
                tracing::warn!(
                    session = %self.session.code,
                    error = %e,
                    "reveal tick failed, retrying next tick"
                );
            }
            Err(
                GameError::MaxRevealsReached(_)
                | GameError::NoLocationsRemaining,
            ) => {
                tracing::info!(
                    session = %self.session.code,
                    "reveal schedule exhausted"
                );
            }
            Err(e) => {
                tracing::warn!(
                    session = %self.session.code,
                    error = %e,
                    "reveal tick failed"
                );
            }
        }
    }

    /// Fans an event out to every connected participant. Sends to closed
    /// receivers are dropped silently; per-participant channels are FIFO,
    /// so each connection sees reveals in reveal order.
    fn broadcast(&self, event: ServerEvent) {
        for participant in self.participants.values() {
            let _ = participant.sender.send(event.clone());
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.session.id,
            code: self.session.code.clone(),
            host: self.session.host,
            status: self.session.status,
            reveal_interval: self.session.reveal_interval,
            max_reveals: self.session.max_reveals,
            current_reveal_index: self.session.current_reveal_index,
            player_count: self.store.board_count(),
            connection_count: self.participants.len(),
            created_at: self.session.created_at,
            started_at: self.session.started_at,
            ended_at: self.session.ended_at,
        }
    }
}

/// Spawns a session actor task and returns a handle to it.
pub(crate) fn spawn_session<C: Catalog>(
    session: GameSession,
    catalog: Arc<C>,
    channel_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = session.code.clone();
    let timer = RevealTimer::new(session.reveal_interval);

    let actor = SessionActor {
        session,
        store: SessionStore::new(),
        timer,
        catalog,
        participants: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle { code, sender: tx }
}
