//! Room actor: an isolated Tokio task that owns one round of the game.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. This is the "actor model": no shared mutable
//! room state, just message passing. Because the actor handles one
//! command at a time, two players guessing at once can never interleave:
//! a winning guess is broadcast and the room torn down before the next
//! command is even looked at.

use std::sync::Arc;

use scramble_protocol::{Recipient, RoomId, ServerMessage, SessionId};
use scramble_session::{Session, SessionRegistry};
use scramble_words::{WordPair, WordProvider};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError, RoomState};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a "reply channel": the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RoomCommand {
    /// Add a session to the room.
    Join {
        session: Arc<Session>,
        reply: oneshot::Sender<Result<JoinOutcome, RoomError>>,
    },

    /// Evaluate a guess from a member.
    Guess { session_id: SessionId, text: String },

    /// Drop a member without evaluating anything (plain disconnect).
    /// `announce` controls the "Client disconnected!" broadcast.
    Leave {
        session_id: SessionId,
        announce: bool,
        reply: oneshot::Sender<bool>,
    },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Remove every member and stop.
    Destroy,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    /// The room's unique ID.
    pub room_id: RoomId,
    /// Current lifecycle state.
    pub state: RoomState,
    /// Number of members right now.
    pub member_count: usize,
    /// Members needed to start the round.
    pub capacity: usize,
}

/// What a successful join did.
///
/// The reply is sent only after the room has finished reacting to the
/// join, so when `started` is `true` the word announcement is already
/// queued for every member. This is the round-start acknowledgment: no
/// guess routed after it can overtake the announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Room the session landed in.
    pub room_id: RoomId,
    /// Members after the join.
    pub member_count: usize,
    /// `true` if this join filled the room and started the round.
    pub started: bool,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it wraps an `mpsc::Sender`.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's unique ID.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Asks the room to take a new member.
    pub async fn join(
        &self,
        session: Arc<Session>,
    ) -> Result<JoinOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                session,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Submits a guess (fire-and-forget).
    pub async fn submit_guess(
        &self,
        session_id: SessionId,
        text: String,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Guess { session_id, text })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Removes a member without evaluating a guess.
    ///
    /// Returns whether the session was still a member.
    pub async fn leave(
        &self,
        session_id: SessionId,
        announce: bool,
    ) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                session_id,
                announce,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Tells the room to remove its members and stop.
    pub async fn destroy(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Destroy)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    state: RoomState,
    capacity: usize,
    /// Members in join order.
    members: Vec<Arc<Session>>,
    /// Set exactly once, when the room fills.
    word: Option<WordPair>,
    words: Arc<dyn WordProvider>,
    sessions: Arc<SessionRegistry>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until the room finishes.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join { session, reply } => {
                    let result = self.handle_join(session);
                    let _ = reply.send(result);
                }
                RoomCommand::Guess { session_id, text } => {
                    self.handle_guess(session_id, text);
                }
                RoomCommand::Leave {
                    session_id,
                    announce,
                    reply,
                } => {
                    let was_member = self.handle_leave(session_id, announce);
                    let _ = reply.send(was_member);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Destroy => {
                    tracing::info!(room_id = %self.room_id, "room destroy requested");
                    self.destroy();
                }
            }

            if self.state == RoomState::Finished {
                break;
            }
        }

        // Every handle dropped while players were still seated: don't
        // leave them connected to a room that no longer exists.
        if !self.members.is_empty() {
            self.destroy();
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        session: Arc<Session>,
    ) -> Result<JoinOutcome, RoomError> {
        if !self.state.is_joinable() {
            return Err(RoomError::InvalidState(format!(
                "cannot join room in state {}",
                self.state
            )));
        }
        if self.position(session.id()).is_some() {
            return Err(RoomError::AlreadyInRoom(session.id(), self.room_id));
        }
        if self.members.len() >= self.capacity {
            return Err(RoomError::RoomFull(self.room_id));
        }

        session.bind_room(self.room_id)?;
        let label = session.label().to_owned();
        tracing::info!(
            room_id = %self.room_id,
            session_id = %session.id(),
            members = self.members.len() + 1,
            "player joined"
        );
        self.members.push(session);
        self.broadcast(ServerMessage::UserJoined { label }, Recipient::All);

        let mut started = false;
        if self.state == RoomState::Active {
            // A seat opened mid-round. The word stays; only the newcomer
            // needs to hear it.
            if let (Some(word), Some(joiner)) = (&self.word, self.members.last()) {
                self.send_to(
                    joiner,
                    ServerMessage::WordToUnscramble {
                        scrambled: word.scrambled.clone(),
                    },
                );
            }
        } else if self.members.len() == self.capacity {
            self.start_round();
            started = true;
        }

        Ok(JoinOutcome {
            room_id: self.room_id,
            member_count: self.members.len(),
            started,
        })
    }

    fn start_round(&mut self) {
        let pair = self.words.next_pair();
        let scrambled = pair.scrambled.clone();
        tracing::debug!(room_id = %self.room_id, word = %pair.plain, "word assigned");
        self.word = Some(pair);
        self.transition(RoomState::Active);
        tracing::info!(
            room_id = %self.room_id,
            players = self.members.len(),
            "round started"
        );
        self.broadcast(
            ServerMessage::WordToUnscramble { scrambled },
            Recipient::All,
        );
    }

    fn handle_guess(&mut self, session_id: SessionId, text: String) {
        if !self.state.accepts_guesses() {
            tracing::debug!(
                room_id = %self.room_id,
                %session_id,
                state = %self.state,
                "guess outside an active round, ignoring"
            );
            return;
        }
        let Some(index) = self.position(session_id) else {
            tracing::warn!(
                room_id = %self.room_id,
                %session_id,
                "guess from non-member, ignoring"
            );
            return;
        };
        let correct = self
            .word
            .as_ref()
            .is_some_and(|word| word.plain == text);
        let guesser = Arc::clone(&self.members[index]);
        let label = guesser.label().to_owned();

        if correct {
            tracing::info!(room_id = %self.room_id, %session_id, "word guessed");
            self.broadcast(
                ServerMessage::PlayerWins { label, word: text },
                Recipient::All,
            );
            // The winner goes too: the round is over for everyone.
            self.destroy();
            return;
        }

        self.broadcast(
            ServerMessage::MissedGuess {
                label: label.clone(),
                guess: text,
            },
            Recipient::AllExcept(session_id),
        );
        self.send_to(&guesser, ServerMessage::WrongGuess);
        let remaining = guesser.consume_guess();
        self.send_to(&guesser, ServerMessage::RemainingGuesses(remaining));

        if remaining > 0 {
            return;
        }

        self.send_to(&guesser, ServerMessage::AttemptsEnded);
        self.members.remove(index);
        guesser.clear_room();
        tracing::info!(room_id = %self.room_id, %session_id, "guess budget exhausted");

        if self.members.is_empty() {
            self.finish("no guessers left");
        }
        if self.sessions.remove(session_id) {
            self.broadcast(
                ServerMessage::ClientDisconnected { label },
                Recipient::All,
            );
        }
    }

    fn handle_leave(&mut self, session_id: SessionId, announce: bool) -> bool {
        let Some(index) = self.position(session_id) else {
            return false;
        };
        let session = self.members.remove(index);
        session.clear_room();
        tracing::info!(
            room_id = %self.room_id,
            %session_id,
            members = self.members.len(),
            "player left"
        );

        if announce {
            self.broadcast(
                ServerMessage::ClientDisconnected {
                    label: session.label().to_owned(),
                },
                Recipient::All,
            );
        }
        if self.members.is_empty() {
            self.finish("room empty");
        }
        true
    }

    /// Removes every member from the registry and finishes the room.
    ///
    /// No "Client disconnected!" broadcast here: everyone is leaving.
    fn destroy(&mut self) {
        self.finish("destroyed");
        for member in self.members.drain(..) {
            member.clear_room();
            self.sessions.remove(member.id());
        }
    }

    /// Enters the terminal state and closes the command channel.
    ///
    /// Every [`RoomHandle::is_closed`] reports `true` from here on, before
    /// any member hears the room is gone.
    fn finish(&mut self, reason: &str) {
        if self.state == RoomState::Finished {
            return;
        }
        self.transition(RoomState::Finished);
        self.receiver.close();
        tracing::info!(room_id = %self.room_id, reason, "room finished");
    }

    fn transition(&mut self, to: RoomState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "illegal room transition {} -> {}",
            self.state,
            to
        );
        self.state = to;
    }

    /// Delivers `msg` to every member `recipient` covers.
    ///
    /// A failed delivery is logged and skipped; the remaining members
    /// still get the message.
    fn broadcast(&self, msg: ServerMessage, recipient: Recipient) {
        for member in &self.members {
            if recipient.includes(member.id()) {
                self.send_to(member, msg.clone());
            }
        }
    }

    fn send_to(&self, session: &Session, msg: ServerMessage) {
        if let Err(e) = session.send(msg) {
            tracing::warn!(
                room_id = %self.room_id,
                session_id = %session.id(),
                error = %e,
                "delivery failed"
            );
        }
    }

    fn position(&self, session_id: SessionId) -> Option<usize> {
        self.members.iter().position(|m| m.id() == session_id)
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            state: self.state,
            member_count: self.members.len(),
            capacity: self.capacity,
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: &RoomConfig,
    words: Arc<dyn WordProvider>,
    sessions: Arc<SessionRegistry>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));

    let actor = RoomActor {
        room_id,
        state: RoomState::Filling,
        capacity: config.capacity.max(1),
        members: Vec::with_capacity(config.capacity),
        word: None,
        words,
        sessions,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
