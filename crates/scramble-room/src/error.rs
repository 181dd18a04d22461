//! Error types for the room layer.

use scramble_protocol::{RoomId, SessionId};
use scramble_session::SessionError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Every room slot is taken; the player can't be placed.
    #[error("the server is full ({max_rooms} rooms open)")]
    CapacityExceeded { max_rooms: usize },

    /// The room does not exist (or was already destroyed).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room already holds its full complement of players.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The session is already a member of this room.
    #[error("session {0} already in room {1}")]
    AlreadyInRoom(SessionId, RoomId),

    /// The room is in a state that doesn't allow this operation,
    /// e.g. joining a room whose round has started.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is closed; its actor has stopped.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// A session-level failure while placing a player.
    #[error(transparent)]
    Session(#[from] SessionError),
}
