//! Error types for the session layer.

use scramble_protocol::{RoomId, SessionId};

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// A session with this id is already registered.
    /// Connection ids are never reused, so this points at a caller bug.
    #[error("session {0} is already registered")]
    AlreadyRegistered(SessionId),

    /// The session was already placed in a room this game.
    #[error("session {0} is already in room {1}")]
    AlreadyInRoom(SessionId, RoomId),

    /// The session's outbound sink is closed; the line was dropped.
    #[error("outbound sink for session {0} is closed")]
    SinkClosed(SessionId),

    /// The registry is shutting down and admits no one.
    #[error("server is shutting down")]
    ShuttingDown,
}
