//! Transport abstraction layer for Scramble.
//!
//! Defines the [`Transport`] and [`Connection`] traits that hide how
//! lines reach the server, plus the one implementation the game ships
//! with: plain TCP with newline framing ([`TcpLineTransport`]).
//!
//! The layers above never see sockets. They see a connection that can
//! send one line, receive one line, and be closed.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{DEFAULT_MAX_LINE_LEN, TcpLineConnection, TcpLineTransport};

use std::fmt;

/// Process-unique id of an accepted socket.
///
/// Assigned by the transport on accept and never reused within a process,
/// so the session layer can use it as its registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a raw counter value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Unwraps the raw counter value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that hands out line connections.
pub trait Transport: Send + Sync + 'static {
    /// What [`accept`](Self::accept) yields.
    type Connection: Connection;
    /// Listener failure.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Stops accepting new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that exchanges newline-delimited text.
pub trait Connection: Send + Sync + 'static {
    /// Socket failure.
    type Error: std::error::Error + Send + Sync;

    /// Sends one line to the remote peer. The line terminator is added
    /// by the transport; `line` must not contain one.
    async fn send_line(&self, line: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next line from the remote peer, without its
    /// terminator.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly.
    async fn recv_line(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the sending side of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// The id assigned on accept.
    fn id(&self) -> ConnectionId;

    /// A human-readable label for the peer (its socket address).
    fn peer_label(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_round_trips_raw_value() {
        assert_eq!(ConnectionId::new(42).into_inner(), 42);
    }

    #[test]
    fn test_connection_id_displays_with_prefix() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_usable_as_set_key() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ConnectionId::new(1));
        set.insert(ConnectionId::new(1));
        set.insert(ConnectionId::new(2));
        assert_eq!(set.len(), 2);
    }
}
