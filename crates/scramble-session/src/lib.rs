//! Player session management for Scramble.
//!
//! This crate handles the lifecycle of player connections:
//!
//! 1. **Admission**: a new connection becomes a [`Session`] in the
//!    [`SessionRegistry`]
//! 2. **Guess budget**: each session carries its own remaining-guess
//!    counter, spent by the room it plays in
//! 3. **Teardown**: idempotent removal that sends the goodbye line and
//!    closes the outbound sink exactly once
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)  ← evaluates guesses, removes losers and winners
//!     ↕
//! Session Layer (this crate)  ← who is connected, where their lines go
//!     ↕
//! Protocol Layer (below)  ← provides SessionId, RoomId, ServerMessage
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::SessionRegistry;
pub use session::{Outbound, OutboundReceiver, Session, SessionConfig};
