//! Room configuration and state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room the directory creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Players per room. The round starts the moment this many have joined.
    pub capacity: usize,

    /// Rooms that may exist at the same time. The next player who would
    /// need one more is turned away.
    pub max_rooms: usize,

    /// Bounded size of each room actor's command channel.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: 2,
            max_rooms: 100,
            command_buffer: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions only move forward:
///
/// ```text
/// Filling → Active → Finished
/// ```
///
/// - **Filling**: fewer than `capacity` members, no word yet. Accepting joins.
/// - **Active**: the word is set and announced. Accepting guesses, and
///   joins into a seat a departed player left open.
/// - **Finished**: the word was guessed, or nobody is left to guess.
///   The actor tears the room down right after entering this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Filling,
    Active,
    Finished,
}

impl RoomState {
    /// Returns `true` if the room takes new players while it has a free
    /// seat.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Filling | Self::Active)
    }

    /// Returns `true` if guesses are evaluated in this state.
    pub fn accepts_guesses(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns the next state, or `None` from the terminal state.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Filling => Some(Self::Active),
            Self::Active => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    ///
    /// Besides the strict successor, a room may finish straight from
    /// `Filling` when its last member leaves before the round starts.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
            || (self == Self::Filling && target == Self::Finished)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filling => write!(f, "Filling"),
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_state_next_follows_strict_order() {
        assert_eq!(RoomState::Filling.next(), Some(RoomState::Active));
        assert_eq!(RoomState::Active.next(), Some(RoomState::Finished));
        assert_eq!(RoomState::Finished.next(), None);
    }

    #[test]
    fn test_room_state_can_transition_to() {
        assert!(RoomState::Filling.can_transition_to(RoomState::Active));
        assert!(RoomState::Filling.can_transition_to(RoomState::Finished));
        assert!(RoomState::Active.can_transition_to(RoomState::Finished));
        assert!(!RoomState::Active.can_transition_to(RoomState::Filling));
        assert!(!RoomState::Finished.can_transition_to(RoomState::Active));
    }

    #[test]
    fn test_room_state_predicates() {
        assert!(RoomState::Filling.is_joinable());
        assert!(RoomState::Active.is_joinable());
        assert!(!RoomState::Finished.is_joinable());

        assert!(!RoomState::Filling.accepts_guesses());
        assert!(RoomState::Active.accepts_guesses());
        assert!(!RoomState::Finished.accepts_guesses());
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::Filling.to_string(), "Filling");
        assert_eq!(RoomState::Active.to_string(), "Active");
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.capacity, 2);
        assert_eq!(config.max_rooms, 100);
        assert_eq!(config.command_buffer, 64);
    }
}
