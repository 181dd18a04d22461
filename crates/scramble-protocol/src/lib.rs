//! Wire protocol for Scramble.
//!
//! This crate defines the "language" the server speaks to players:
//!
//! - **Types** ([`SessionId`], [`RoomId`], [`Recipient`],
//!   [`ServerMessage`]): who is talking and what can be said.
//! - **Codec** ([`Codec`] trait, [`LineCodec`]): how those messages turn
//!   into the bytes of a single line, and how an inbound line becomes a
//!   [`Guess`].
//!
//! # Architecture
//!
//! ```text
//! Transport (lines of bytes) → Protocol (Guess / ServerMessage) → Session
//! ```
//!
//! The protocol layer doesn't know about sockets or rooms. It only knows
//! the exact text of every message in the game.

mod codec;
mod types;

pub use codec::{Codec, Guess, LineCodec};
pub use types::{Recipient, RoomId, ServerMessage, SessionId};
