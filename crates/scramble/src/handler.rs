//! Per-connection handler: admission, room placement, and guess routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Admit the session → "You're now connected to the server"
//!   2. Spawn the writer task that drains the session's outbound queue
//!   3. Place the session in a room, or turn it away if none is free
//!   4. Loop: receive lines → route each one to the room as a guess

use std::sync::Arc;

use scramble_protocol::{Codec, ServerMessage, SessionId};
use scramble_room::RoomError;
use scramble_session::{Outbound, OutboundReceiver, Session};
use scramble_transport::{Connection, TcpLineConnection};

use crate::ScrambleError;
use crate::server::ServerState;

/// Drop guard that disconnects a player's session when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the room leave.
struct SessionGuard<C: Codec> {
    session: Arc<Session>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            disconnect(&state, &session).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: TcpLineConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ScrambleError>
where
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let session_id = SessionId::from(conn_id);
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: Admission ---
    let (session, outbound) = state.sessions.admit(session_id, conn.peer_label())?;
    tokio::spawn(write_loop(
        Arc::clone(&conn),
        Arc::clone(&session),
        outbound,
        state.codec.clone(),
    ));

    // --- Step 2: Room placement ---
    match state.rooms.allocate(Arc::clone(&session)).await {
        Ok(outcome) => {
            tracing::info!(
                %session_id,
                room_id = %outcome.room_id,
                started = outcome.started,
                "player placed"
            );
        }
        Err(RoomError::CapacityExceeded { max_rooms }) => {
            tracing::warn!(%session_id, max_rooms, "server full, turning player away");
            // Close first so the rejection is the last line the player sees.
            let _ = session.send(ServerMessage::ServerFull);
            session.close();
            state.sessions.remove(session_id);
            return Ok(());
        }
        Err(e) => {
            state.sessions.remove(session_id);
            return Err(e.into());
        }
    }
    let _guard = SessionGuard {
        session: Arc::clone(&session),
        state: Arc::clone(&state),
    };

    // --- Step 3: Guess loop ---
    loop {
        let received = tokio::select! {
            _ = session.closed() => {
                tracing::debug!(%session_id, "session closed by server");
                break;
            }
            received = conn.recv_line() => received,
        };

        let line = match received {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!(%session_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%session_id, error = %e, "recv error");
                break;
            }
        };

        let guess = state.codec.decode(&line);
        let Some(room_id) = session.room() else {
            tracing::debug!(%session_id, "guess from player without a room, ignoring");
            continue;
        };
        if let Err(e) = state
            .rooms
            .route_guess(room_id, session_id, guess.into_inner())
            .await
        {
            tracing::debug!(%session_id, %room_id, error = %e, "guess not routed");
        }
    }

    // _guard drops here → session disconnect fires.
    Ok(())
}

/// Drains a session's outbound queue onto the socket.
///
/// Stops at [`Outbound::Close`] or on the first write failure, then
/// closes both the session and the connection.
async fn write_loop<C: Codec>(
    conn: Arc<TcpLineConnection>,
    session: Arc<Session>,
    mut outbound: OutboundReceiver,
    codec: C,
) {
    while let Some(item) = outbound.recv().await {
        match item {
            Outbound::Message(msg) => {
                if let Err(e) = conn.send_line(&codec.encode(&msg)).await {
                    tracing::debug!(
                        session_id = %session.id(),
                        error = %e,
                        "write failed"
                    );
                    break;
                }
            }
            Outbound::Close => break,
        }
    }

    session.close();
    if let Err(e) = conn.close().await {
        tracing::debug!(session_id = %session.id(), error = %e, "close failed");
    }
}

/// Takes a departed player out of the registry and their room.
///
/// Runs whether the player hung up or the server closed the session.
/// Only the caller that actually removes the session announces the
/// departure to the room.
async fn disconnect<C: Codec>(state: &ServerState<C>, session: &Session) {
    let session_id = session.id();
    let room = session.room();
    let removed = state.sessions.remove(session_id);

    let Some(room_id) = room else {
        return;
    };
    match state.rooms.leave(room_id, session_id, removed).await {
        Ok(_) => {}
        // The room finished first and took the session with it.
        Err(RoomError::NotFound(_) | RoomError::Unavailable(_)) => {}
        Err(e) => {
            tracing::debug!(%session_id, %room_id, error = %e, "leave failed");
        }
    }
}
