//! Session types: the server's record of one connected player.
//!
//! A session tracks:
//! - WHO the player is (`SessionId` plus a printable label)
//! - WHERE their lines go (an outbound channel drained by the connection's
//!   writer task)
//! - HOW MANY guesses they have left
//! - WHICH room they play in (by id only; the room owns nothing here)

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use scramble_protocol::{RoomId, ServerMessage, SessionId};
use tokio::sync::{mpsc, watch};

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wrong guesses a player may make before being removed.
    ///
    /// Default: 5.
    pub guess_budget: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { guess_budget: 5 }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// An item on a session's outbound channel.
///
/// `Close` travels through the same FIFO as the messages, so everything
/// queued before it (the goodbye line in particular) is written before the
/// connection is shut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A line for the player.
    Message(ServerMessage),
    /// Flush and close the connection.
    Close,
}

/// Receiving end of a session's outbound channel, owned by whoever writes
/// to the socket.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single connected player.
///
/// Sessions are created only by [`SessionRegistry::admit`](crate::SessionRegistry::admit)
/// and shared as `Arc<Session>` between the registry, the player's room,
/// and the connection task. All mutation goes through interior
/// mutability, so every method takes `&self`.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    label: String,
    outbound: mpsc::UnboundedSender<Outbound>,
    remaining_guesses: AtomicU32,
    /// Routing key for guesses. Never used to keep a room alive.
    room: Mutex<Option<RoomId>>,
    /// Flips to `true` once, when the session is torn down.
    closed: watch::Sender<bool>,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        label: String,
        config: &SessionConfig,
    ) -> (Self, OutboundReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        let session = Self {
            id,
            label,
            outbound: tx,
            remaining_guesses: AtomicU32::new(config.guess_budget),
            room: Mutex::new(None),
            closed,
        };
        (session, rx)
    }

    /// The session's registry key.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Printable name used in messages to other players.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Queues a line for the player.
    ///
    /// # Errors
    /// Returns [`SessionError::SinkClosed`] once the session is closed or
    /// the writer has gone away.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::SinkClosed(self.id));
        }
        self.outbound
            .send(Outbound::Message(msg))
            .map_err(|_| SessionError::SinkClosed(self.id))
    }

    /// Guesses left before the budget runs out.
    pub fn remaining_guesses(&self) -> u32 {
        self.remaining_guesses.load(Ordering::SeqCst)
    }

    /// Spends one guess and returns how many are left.
    ///
    /// Only the room the session plays in calls this. The counter
    /// saturates at zero.
    pub fn consume_guess(&self) -> u32 {
        match self.remaining_guesses.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |n| n.checked_sub(1),
        ) {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }

    /// The room this session was placed in, if any.
    pub fn room(&self) -> Option<RoomId> {
        *self.room.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the room this session was placed in.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyInRoom`] if a room is already set:
    /// a session plays in one room per game.
    pub fn bind_room(&self, room_id: RoomId) -> Result<(), SessionError> {
        let mut room = self.room.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = *room {
            return Err(SessionError::AlreadyInRoom(self.id, existing));
        }
        *room = Some(room_id);
        Ok(())
    }

    /// Forgets the room, returning the one that was set.
    pub fn clear_room(&self) -> Option<RoomId> {
        self.room
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Closes the outbound sink. Returns `true` only for the call that
    /// actually closed it.
    pub fn close(&self) -> bool {
        let was_closed = self.closed.send_replace(true);
        if !was_closed {
            // The writer may already be gone; nothing left to tell it then.
            let _ = self.outbound.send(Outbound::Close);
        }
        !was_closed
    }

    /// Returns `true` once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves when the session is closed. Resolves immediately if it
    /// already is.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}
