//! `ScrambleServer` builder and server loop.
//!
//! This is the entry point for running a Scramble server. It ties
//! together all the layers: transport → protocol → session → room.

use std::net::SocketAddr;
use std::sync::Arc;

use scramble_protocol::{Codec, LineCodec};
use scramble_room::{RoomConfig, RoomDirectory};
use scramble_session::{SessionConfig, SessionRegistry};
use scramble_transport::{DEFAULT_MAX_LINE_LEN, TcpLineTransport, Transport};
use scramble_words::{WordList, WordProvider};
use tokio::sync::watch;

use crate::ScrambleError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry and the directory do their own locking.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Arc<SessionRegistry>,
    pub(crate) rooms: RoomDirectory,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Scramble server.
///
/// # Example
///
/// ```rust,ignore
/// use scramble::prelude::*;
///
/// let server = ScrambleServer::builder()
///     .bind("127.0.0.1:5000")
///     .room_config(RoomConfig { max_rooms: 10, ..RoomConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ScrambleServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    room_config: RoomConfig,
    max_line_len: usize,
    words: Option<Arc<dyn WordProvider>>,
}

impl ScrambleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            session_config: SessionConfig::default(),
            room_config: RoomConfig::default(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            words: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the session configuration (guess budget).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the room configuration (capacity, room limit).
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the longest inbound line a client may send.
    pub fn max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Sets where words come from. Defaults to the built-in [`WordList`].
    pub fn words(mut self, words: impl WordProvider) -> Self {
        self.words = Some(Arc::new(words));
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// # Errors
    /// Returns [`ScrambleError::Transport`] if the address can't be bound.
    pub async fn build(self) -> Result<ScrambleServer, ScrambleError> {
        let transport = TcpLineTransport::bind(&self.bind_addr)
            .await?
            .with_max_line_len(self.max_line_len);

        let words = self
            .words
            .unwrap_or_else(|| Arc::new(WordList::default()));
        let sessions = Arc::new(SessionRegistry::new(self.session_config));
        let rooms = RoomDirectory::new(self.room_config, words, Arc::clone(&sessions));

        let state = Arc::new(ServerState {
            sessions,
            rooms,
            codec: LineCodec,
        });
        let (shutdown, _) = watch::channel(false);

        Ok(ScrambleServer {
            transport,
            state,
            shutdown: Arc::new(shutdown),
        })
    }
}

impl Default for ScrambleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stops a running server from anywhere: another task, a signal
/// handler, or a plain thread.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Asks the server to stop. Calling it again is a no-op.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// A bound Scramble server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScrambleServer {
    transport: TcpLineTransport,
    state: Arc<ServerState<LineCodec>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ScrambleServer {
    /// Creates a new builder.
    pub fn builder() -> ScrambleServerBuilder {
        ScrambleServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle that stops [`run()`](Self::run).
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown),
        }
    }

    /// Runs the accept loop until shutdown is triggered.
    ///
    /// Each accepted connection gets its own handler task. On shutdown
    /// every session receives the goodbye line and is closed, then every
    /// room is destroyed.
    pub async fn run(mut self) -> Result<(), ScrambleError> {
        let mut stop = self.shutdown.subscribe();
        tracing::info!(addr = ?self.local_addr().ok(), "Scramble server running");

        loop {
            tokio::select! {
                _ = stop.wait_for(|stop| *stop) => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        tracing::info!("shutting down");
        let sessions = self.state.sessions.shutdown();
        let rooms = self.state.rooms.shutdown().await;
        self.transport.shutdown().await?;
        tracing::info!(sessions, rooms, "Scramble server stopped");
        Ok(())
    }
}
