//! Room lifecycle management for Scramble.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! member list, its word, and the guess state machine. Everything that
//! touches a room (a join, a guess, a departure) arrives as a command on
//! the room's channel and is handled one at a time.
//!
//! # Key types
//!
//! - [`RoomDirectory`]: allocates players to rooms, routes guesses,
//!   destroys rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: `Filling → Active → Finished`
//! - [`RoomConfig`]: capacity, room limit, channel size

mod config;
mod directory;
mod error;
mod room;

pub use config::{RoomConfig, RoomState};
pub use directory::RoomDirectory;
pub use error::RoomError;
pub use room::{JoinOutcome, RoomHandle, RoomInfo};
