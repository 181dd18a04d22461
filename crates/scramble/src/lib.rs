//! # Scramble
//!
//! A multiplayer word-unscrambling game served over plain TCP.
//!
//! Players connect, are grouped into small rooms, and race to type the
//! original form of a scrambled word. The first exact match wins the
//! round for the whole room; a player who runs out of guesses is sent
//! home early.
//!
//! The crate wires the layers together: transport → protocol → session
//! → room. Each layer lives in its own crate and is re-exported here.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scramble::prelude::*;
//!
//! # async fn start() -> Result<(), ScrambleError> {
//! let server = ScrambleServer::builder()
//!     .bind("0.0.0.0:5000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ScrambleError;
pub use server::{ScrambleServer, ScrambleServerBuilder, ShutdownHandle};

pub use scramble_protocol as protocol;
pub use scramble_room as room;
pub use scramble_session as session;
pub use scramble_transport as transport;
pub use scramble_words as words;

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{ScrambleError, ScrambleServer, ScrambleServerBuilder, ShutdownHandle};
    pub use scramble_protocol::{RoomId, ServerMessage, SessionId};
    pub use scramble_room::RoomConfig;
    pub use scramble_session::SessionConfig;
    pub use scramble_transport::DEFAULT_MAX_LINE_LEN;
    pub use scramble_words::{DEFAULT_WORDS, WordList, WordPair, WordProvider};
}
