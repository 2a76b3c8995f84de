use thiserror::Error;

/// Errors recorded by the watchlist store.
///
/// The store never propagates these to callers: operations return a success
/// flag and the last failure stays readable via `last_error()` until a later
/// operation succeeds. Remote rejection messages are kept verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("user not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    RemoteWrite(String),

    #[error("{0}")]
    RemoteRead(String),
}
