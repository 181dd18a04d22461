//! The session registry: the process-wide set of live sessions.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Admitting new connections as sessions
//! - Removing sessions exactly once, whoever asks first
//! - Draining everything on shutdown
//!
//! # Concurrency note
//!
//! Unlike a single-owner manager, the registry is touched from every
//! connection task and from every room actor (rooms remove the players
//! they knock out). The map therefore sits behind a `std::sync::Mutex`.
//! No lock is ever held across an `.await`: every operation here is a
//! short, synchronous critical section, and the side effects (goodbye
//! line, closing the sink) are plain channel sends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use scramble_protocol::{ServerMessage, SessionId};

use crate::{OutboundReceiver, Session, SessionConfig, SessionError};

/// The set of live sessions, keyed by connection id.
///
/// ## Lifecycle
///
/// ```text
/// admit() ──→ [registered] ──→ remove() ──→ [gone]
///                  │
///                  └──── shutdown() ──→ [gone], admissions refused
/// ```
#[derive(Debug)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
    config: SessionConfig,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionId, Arc<Session>>,
    shutting_down: bool,
}

impl SessionRegistry {
    /// Creates a new, empty registry with the given config.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            config,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the map itself intact,
        // so keep serving rather than cascading the panic.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits a new connection.
    ///
    /// Creates the session with a fresh guess budget, registers it, and
    /// queues the welcome line. The returned receiver carries everything
    /// the session is sent; hand it to the connection's writer.
    ///
    /// # Errors
    /// - [`SessionError::ShuttingDown`] after [`shutdown`](Self::shutdown)
    /// - [`SessionError::AlreadyRegistered`] if `id` is already live
    pub fn admit(
        &self,
        id: SessionId,
        label: impl Into<String>,
    ) -> Result<(Arc<Session>, OutboundReceiver), SessionError> {
        let mut inner = self.lock();
        if inner.shutting_down {
            return Err(SessionError::ShuttingDown);
        }
        if inner.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyRegistered(id));
        }

        let (session, rx) = Session::new(id, label.into(), &self.config);
        let session = Arc::new(session);
        inner.sessions.insert(id, Arc::clone(&session));
        let live = inner.sessions.len();
        drop(inner);

        // The receiver is in hand, so this can't fail.
        let _ = session.send(ServerMessage::Connected);
        tracing::info!(session_id = %id, label = session.label(), live, "session admitted");

        Ok((session, rx))
    }

    /// Removes a session, if it is still registered.
    ///
    /// Sends the disconnect notice, closes the sink, and returns `true`,
    /// but only for the first caller. Every later call for the same id
    /// returns `false` and does nothing, so callers can use the result to
    /// decide whether they are the one who should announce the departure.
    pub fn remove(&self, id: SessionId) -> bool {
        let removed = self.lock().sessions.remove(&id);
        match removed {
            Some(session) => {
                teardown(&session);
                tracing::info!(session_id = %id, "session removed");
                true
            }
            None => false,
        }
    }

    /// Removes every session and refuses further admissions.
    ///
    /// Returns how many sessions were torn down.
    pub fn shutdown(&self) -> usize {
        let drained: Vec<Arc<Session>> = {
            let mut inner = self.lock();
            inner.shutting_down = true;
            inner.sessions.drain().map(|(_, s)| s).collect()
        };
        for session in &drained {
            teardown(session);
        }
        tracing::info!(removed = drained.len(), "session registry shut down");
        drained.len()
    }

    /// Looks up a live session.
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.lock().sessions.get(&id).cloned()
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: SessionId) -> bool {
        self.lock().sessions.contains_key(&id)
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Returns `true` if there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Goodbye line, then close. The writer drains in order, so the line
/// reaches the socket before it shuts.
fn teardown(session: &Session) {
    if let Err(e) = session.send(ServerMessage::Disconnected) {
        tracing::debug!(session_id = %session.id(), error = %e, "goodbye not delivered");
    }
    session.close();
}

// =========================================================================
// Tests
// =========================================================================
