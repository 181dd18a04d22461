//! Core protocol types: identities, recipients, and the message catalogue.

use std::fmt;

use scramble_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player session.
///
/// Newtype over the raw connection number so a session key can never be
/// confused with a [`RoomId`], even though both are `u64` underneath.
/// One accepted connection maps to exactly one session, so the value is
/// taken straight from the transport's [`ConnectionId`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl From<ConnectionId> for SessionId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// A unique identifier for a room (one round of the game).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive a message?
// ---------------------------------------------------------------------------

/// Specifies which room members receive a message.
///
/// A broadcast with an exclusion (`AllExcept`) is how a wrong guess is
/// shown to everyone but the player who made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every current member.
    All,
    /// A single member.
    Player(SessionId),
    /// Every current member except this one.
    AllExcept(SessionId),
}

impl Recipient {
    /// Builds a broadcast recipient from an optional exclusion.
    pub fn excluding(excluded: Option<SessionId>) -> Self {
        match excluded {
            Some(id) => Self::AllExcept(id),
            None => Self::All,
        }
    }

    /// Returns `true` if `id` should receive a message sent to `self`.
    pub fn includes(&self, id: SessionId) -> bool {
        match self {
            Self::All => true,
            Self::Player(target) => *target == id,
            Self::AllExcept(excluded) => *excluded != id,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage: everything the server can say
// ---------------------------------------------------------------------------

/// A line the server sends to a player.
///
/// `Display` renders the exact text that goes on the wire, so the
/// catalogue lives in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Sent once, right after admission.
    Connected,
    /// Someone joined the room while it was filling.
    UserJoined { label: String },
    /// The round started; carries the scrambled form.
    WordToUnscramble { scrambled: String },
    /// A player guessed the word.
    PlayerWins { label: String, word: String },
    /// Another player guessed wrong.
    MissedGuess { label: String, guess: String },
    /// Private: your guess was wrong.
    WrongGuess,
    /// Private: how many guesses you have left.
    RemainingGuesses(u32),
    /// Private: your guess budget is used up.
    AttemptsEnded,
    /// Private: last line before the connection is closed.
    Disconnected,
    /// Another member left the room.
    ClientDisconnected { label: String },
    /// Admission was rejected because no room could be created.
    ServerFull,
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "You're now connected to the server"),
            Self::UserJoined { label } => {
                write!(f, "New user connected! {label}")
            }
            Self::WordToUnscramble { scrambled } => {
                write!(f, "Word to unscramble: \"{scrambled}\"")
            }
            Self::PlayerWins { label, word } => {
                write!(f, "Player {label} wins: {word}")
            }
            Self::MissedGuess { label, guess } => {
                write!(f, "Client {label} missed the guess: {guess}")
            }
            Self::WrongGuess => write!(f, "Wrong! Try again..."),
            Self::RemainingGuesses(n) => write!(f, "Remaining guesses: {n}"),
            Self::AttemptsEnded => write!(f, "Your attempts have ended!"),
            Self::Disconnected => write!(
                f,
                "You're now disconnected to the server! Press Ctrl-D to exit..."
            ),
            Self::ClientDisconnected { label } => {
                write!(f, "Client disconnected! {label}")
            }
            Self::ServerFull => write!(f, "The server is full!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(msg: ServerMessage) -> String {
        msg.to_string()
    }

    #[test]
    fn test_catalogue_renders_literal_lines() {
        assert_eq!(text(ServerMessage::Connected), "You're now connected to the server");
        assert_eq!(
            text(ServerMessage::UserJoined { label: "a".into() }),
            "New user connected! a"
        );
        assert_eq!(
            text(ServerMessage::WordToUnscramble { scrambled: "nohtyp".into() }),
            "Word to unscramble: \"nohtyp\""
        );
        assert_eq!(
            text(ServerMessage::PlayerWins {
                label: "a".into(),
                word: "python".into()
            }),
            "Player a wins: python"
        );
        assert_eq!(
            text(ServerMessage::MissedGuess {
                label: "b".into(),
                guess: "pyhton".into()
            }),
            "Client b missed the guess: pyhton"
        );
        assert_eq!(text(ServerMessage::WrongGuess), "Wrong! Try again...");
        assert_eq!(text(ServerMessage::RemainingGuesses(3)), "Remaining guesses: 3");
        assert_eq!(text(ServerMessage::AttemptsEnded), "Your attempts have ended!");
        assert_eq!(
            text(ServerMessage::Disconnected),
            "You're now disconnected to the server! Press Ctrl-D to exit..."
        );
        assert_eq!(
            text(ServerMessage::ClientDisconnected { label: "b".into() }),
            "Client disconnected! b"
        );
        assert_eq!(text(ServerMessage::ServerFull), "The server is full!");
    }

    #[test]
    fn test_recipient_excluding_none_is_all() {
        assert_eq!(Recipient::excluding(None), Recipient::All);
        assert_eq!(
            Recipient::excluding(Some(SessionId(3))),
            Recipient::AllExcept(SessionId(3))
        );
    }

    #[test]
    fn test_recipient_includes() {
        let a = SessionId(1);
        let b = SessionId(2);
        assert!(Recipient::All.includes(a));
        assert!(Recipient::Player(a).includes(a));
        assert!(!Recipient::Player(a).includes(b));
        assert!(!Recipient::AllExcept(a).includes(a));
        assert!(Recipient::AllExcept(a).includes(b));
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(SessionId(4).to_string(), "S-4");
        assert_eq!(RoomId(9).to_string(), "R-9");
        assert_eq!(SessionId::from(ConnectionId::new(12)), SessionId(12));
    }
}
