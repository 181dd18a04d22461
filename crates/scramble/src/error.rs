//! Unified error type for the Scramble server.

use scramble_room::RoomError;
use scramble_session::SessionError;
use scramble_transport::TransportError;
use scramble_words::WordsError;

/// Top-level error that wraps every layer's error.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ScrambleError {
    /// Binding, accepting, or socket I/O failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A session could not be admitted or reached.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room operation failed, including "server full".
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The word list could not be loaded.
    #[error(transparent)]
    Words(#[from] WordsError),
}
