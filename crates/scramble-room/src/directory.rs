//! Room directory: creates rooms, places players, routes guesses.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use scramble_protocol::{RoomId, SessionId};
use scramble_session::{Session, SessionRegistry};
use scramble_words::WordProvider;
use tokio::sync::Mutex;

use crate::room::spawn_room;
use crate::{JoinOutcome, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// The ordered list of open rooms, oldest first.
///
/// This is the entry point for room operations from the connection
/// handler. The list sits behind an async mutex that [`allocate`] holds
/// for the whole "pick a room, join it" sequence, so two players
/// arriving at once can never both take the last seat.
///
/// Room actors never lock the directory. A finished room closes its
/// command channel, its handle reports [`is_closed`](RoomHandle::is_closed),
/// and the next directory operation prunes it.
///
/// [`allocate`]: Self::allocate
pub struct RoomDirectory {
    rooms: Mutex<Vec<RoomHandle>>,
    config: RoomConfig,
    words: Arc<dyn WordProvider>,
    sessions: Arc<SessionRegistry>,
}

impl RoomDirectory {
    /// Creates an empty directory.
    ///
    /// Rooms it creates draw words from `words` and remove the players
    /// they knock out from `sessions`.
    pub fn new(
        config: RoomConfig,
        words: Arc<dyn WordProvider>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            rooms: Mutex::new(Vec::new()),
            config,
            words,
            sessions,
        }
    }

    /// The configuration every room is created with.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Places a session in a room.
    ///
    /// Joins the most recently created room unless it already holds
    /// `capacity` members, in which case a new one is opened. Only the
    /// newest room is considered: an older room that lost a member
    /// mid-round is never back-filled. A newest room that lost a member
    /// mid-round takes the newcomer into the round already in play.
    ///
    /// If this join fills the room, the round has started and the word
    /// announcement is queued for every member by the time this returns.
    ///
    /// Finished rooms are pruned lazily, but a room closes its handle the
    /// moment it finishes, so it never counts toward `max_rooms` after
    /// that.
    ///
    /// # Errors
    /// [`RoomError::CapacityExceeded`] if a new room is needed and
    /// `max_rooms` rooms already exist.
    pub async fn allocate(
        &self,
        session: Arc<Session>,
    ) -> Result<JoinOutcome, RoomError> {
        let mut rooms = self.rooms.lock().await;
        rooms.retain(|room| !room.is_closed());

        if let Some(newest) = rooms.last().cloned() {
            let joinable = matches!(
                newest.get_info().await,
                Ok(info) if info.state.is_joinable() && info.member_count < info.capacity
            );
            if joinable {
                match newest.join(Arc::clone(&session)).await {
                    Ok(outcome) => return Ok(outcome),
                    Err(RoomError::Unavailable(room_id)) => {
                        // Emptied and stopped between the two calls.
                        tracing::debug!(%room_id, "newest room stopped during join");
                    }
                    Err(e) => return Err(e),
                }
            }
            rooms.retain(|room| !room.is_closed());
        }

        if rooms.len() >= self.config.max_rooms {
            tracing::warn!(
                session_id = %session.id(),
                max_rooms = self.config.max_rooms,
                "room limit reached, rejecting player"
            );
            return Err(RoomError::CapacityExceeded {
                max_rooms: self.config.max_rooms,
            });
        }

        let handle = self.create_room();
        rooms.push(handle.clone());
        handle.join(session).await
    }

    fn create_room(&self) -> RoomHandle {
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_room(
            room_id,
            &self.config,
            Arc::clone(&self.words),
            Arc::clone(&self.sessions),
        );
        tracing::info!(%room_id, "room created");
        handle
    }

    /// Looks up a live room.
    async fn handle(&self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .lock()
            .await
            .iter()
            .find(|room| room.room_id() == room_id && !room.is_closed())
            .cloned()
            .ok_or(RoomError::NotFound(room_id))
    }

    /// Routes a guess to the room the session plays in.
    pub async fn route_guess(
        &self,
        room_id: RoomId,
        session_id: SessionId,
        text: String,
    ) -> Result<(), RoomError> {
        // Clone the handle and release the lock before sending, so a full
        // room channel never stalls allocation.
        let handle = self.handle(room_id).await?;
        handle.submit_guess(session_id, text).await
    }

    /// Removes a session from its room without a guess (plain disconnect).
    ///
    /// With `announce` set, the remaining members are told who left.
    /// Returns whether the session was still a member.
    pub async fn leave(
        &self,
        room_id: RoomId,
        session_id: SessionId,
        announce: bool,
    ) -> Result<bool, RoomError> {
        let handle = self.handle(room_id).await?;
        handle.leave(session_id, announce).await
    }

    /// Returns info about a specific room.
    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self.handle(room_id).await?;
        handle.get_info().await
    }

    /// Lists every open room, oldest first.
    ///
    /// Rooms that stop while being queried are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let handles: Vec<RoomHandle> = self.rooms.lock().await.clone();
        let mut infos = Vec::with_capacity(handles.len());
        for handle in &handles {
            if let Ok(info) = handle.get_info().await {
                infos.push(info);
            }
        }
        infos
    }

    /// Removes a room from the directory and tears it down.
    ///
    /// Its remaining members are removed from the session registry
    /// without a "Client disconnected!" broadcast.
    pub async fn destroy_room(&self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = {
            let mut rooms = self.rooms.lock().await;
            let index = rooms
                .iter()
                .position(|room| room.room_id() == room_id)
                .ok_or(RoomError::NotFound(room_id))?;
            rooms.remove(index)
        };

        match handle.destroy().await {
            // Already stopped on its own; nothing left to tear down.
            Ok(()) | Err(RoomError::Unavailable(_)) => {}
            Err(e) => return Err(e),
        }
        tracing::info!(%room_id, "room removed from directory");
        Ok(())
    }

    /// Destroys every room. Returns how many were still open.
    pub async fn shutdown(&self) -> usize {
        let handles: Vec<RoomHandle> = self.rooms.lock().await.drain(..).collect();
        let mut destroyed = 0;
        for handle in handles {
            if handle.destroy().await.is_ok() {
                destroyed += 1;
            }
        }
        tracing::info!(destroyed, "room directory shut down");
        destroyed
    }

    /// Returns the number of open rooms.
    pub async fn room_count(&self) -> usize {
        let mut rooms = self.rooms.lock().await;
        rooms.retain(|room| !room.is_closed());
        rooms.len()
    }

    /// Lists the IDs of all open rooms, oldest first.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.rooms
            .lock()
            .await
            .iter()
            .filter(|room| !room.is_closed())
            .map(RoomHandle::room_id)
            .collect()
    }
}
