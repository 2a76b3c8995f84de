use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use watchdeck_models::{MediaKey, MediaType, Session, UserId, WatchlistEntry};
use watchdeck_remote::WatchlistTable;

use crate::error::WatchlistError;

#[cfg(test)]
mod tests;

/// Where the store is in its per-session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No session: empty set, no remote calls attempted.
    Unauthenticated,
    /// Initial full fetch for a freshly authenticated session is in flight.
    Loading,
    /// Mirror of the last successful fetch plus confirmed optimistic
    /// mutations, reconciled against change-feed events.
    Ready,
    /// Initial load failed. The store stays here (no automatic retry) until
    /// the next session transition or a change-feed-driven refresh succeeds.
    Error,
}

/// Locally-readable, eventually-consistent mirror of the signed-in user's
/// saved-media set.
///
/// Mutations are optimistic-on-confirmation: local state changes only after
/// the remote write succeeds, so a failed write never leaves a phantom entry.
/// Reconciliation is wholesale: any change-feed event triggers one full
/// re-fetch that replaces local state, which keeps the mirror convergent even
/// when events are missed or arrive out of order.
///
/// Overlapping mutations are not serialized; the remote store is
/// last-writer-wins and the next re-fetch reconciles.
pub struct WatchlistStore {
    table: Arc<dyn WatchlistTable>,
    session: Option<Session>,
    phase: SyncPhase,
    entries: Vec<WatchlistEntry>,
    // Membership index over (media_id, media_type); the list can grow
    // unbounded per user so lookups must not scan.
    index: HashSet<MediaKey>,
    error: Option<WatchlistError>,
}

impl WatchlistStore {
    pub fn new(table: Arc<dyn WatchlistTable>) -> Self {
        Self {
            table,
            session: None,
            phase: SyncPhase::Unauthenticated,
            entries: Vec::new(),
            index: HashSet::new(),
            error: None,
        }
    }

    /// Enter an authenticated session and load its watchlist.
    ///
    /// On fetch failure the watchlist stays empty, the error is recorded, and
    /// the store parks in `Error` without retrying.
    pub async fn begin_session(&mut self, session: Session) {
        let user_id = session.user_id.clone();
        info!(user = %user_id, "Session started, loading watchlist");

        self.session = Some(session);
        self.phase = SyncPhase::Loading;
        self.entries.clear();
        self.index.clear();
        self.error = None;

        match self.table.fetch_entries(&user_id).await {
            Ok(rows) => {
                self.replace_entries(rows);
                self.phase = SyncPhase::Ready;
                info!(user = %user_id, count = self.entries.len(), "Watchlist loaded");
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Initial watchlist load failed");
                self.error = Some(WatchlistError::RemoteRead(e.to_string()));
                self.phase = SyncPhase::Error;
            }
        }
    }

    /// Replace the held session without reloading. Used when the provider
    /// refreshes the token for the same user.
    pub fn update_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Leave the session: the whole set is cleared and remote calls stop.
    pub fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = %session.user_id, "Session ended, clearing watchlist");
        }
        self.phase = SyncPhase::Unauthenticated;
        self.entries.clear();
        self.index.clear();
        self.error = None;
    }

    /// Save an entry. Returns false (with the error recorded) instead of
    /// propagating failures.
    ///
    /// Adding a key that is already present is a successful no-op with no
    /// remote write. Otherwise the remote insert runs first and local state
    /// is only touched once it succeeds.
    pub async fn add_to_watchlist(
        &mut self,
        media_id: &str,
        media_type: MediaType,
        title: &str,
        poster_path: Option<&str>,
    ) -> bool {
        let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone()) else {
            self.error = Some(WatchlistError::Unauthenticated);
            return false;
        };

        let key = MediaKey::new(media_id, media_type);
        if self.index.contains(&key) {
            debug!(%key, "Entry already in watchlist");
            self.error = None;
            return true;
        }

        let entry = WatchlistEntry::new(media_id, media_type, title, poster_path.map(str::to_string));
        match self.table.insert_entry(&user_id, &entry).await {
            Ok(()) => {
                debug!(%key, "Added to watchlist");
                self.index.insert(key);
                self.entries.push(entry);
                self.error = None;
                true
            }
            Err(e) => {
                warn!(%key, error = %e, "Failed to add to watchlist");
                self.error = Some(WatchlistError::RemoteWrite(e.to_string()));
                false
            }
        }
    }

    /// Remove an entry. Same failure contract as `add_to_watchlist`.
    ///
    /// The remote delete always runs, even when the key is not present
    /// locally, so a stale mirror cannot block a removal.
    pub async fn remove_from_watchlist(&mut self, media_id: &str, media_type: MediaType) -> bool {
        let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone()) else {
            self.error = Some(WatchlistError::Unauthenticated);
            return false;
        };

        let key = MediaKey::new(media_id, media_type);
        match self.table.delete_entry(&user_id, &key).await {
            Ok(()) => {
                debug!(%key, "Removed from watchlist");
                if self.index.remove(&key) {
                    self.entries.retain(|e| e.key() != key);
                }
                self.error = None;
                true
            }
            Err(e) => {
                warn!(%key, error = %e, "Failed to remove from watchlist");
                self.error = Some(WatchlistError::RemoteWrite(e.to_string()));
                false
            }
        }
    }

    /// Pure local membership test, no remote call.
    pub fn is_in_watchlist(&self, media_id: &str, media_type: MediaType) -> bool {
        self.index.contains(&MediaKey::new(media_id, media_type))
    }

    /// One full re-fetch replacing local state wholesale. Driven by
    /// change-feed events.
    ///
    /// On failure the entries keep their last-known value and the error is
    /// recorded.
    pub async fn refresh(&mut self) -> bool {
        let Some(user_id) = self.session.as_ref().map(|s| s.user_id.clone()) else {
            return false;
        };

        match self.table.fetch_entries(&user_id).await {
            Ok(rows) => {
                self.replace_entries(rows);
                self.phase = SyncPhase::Ready;
                self.error = None;
                debug!(user = %user_id, count = self.entries.len(), "Watchlist reconciled");
                true
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Watchlist refresh failed, keeping last-known entries");
                self.error = Some(WatchlistError::RemoteRead(e.to_string()));
                false
            }
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Entries in display order (newest first, as fetched).
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.session.as_ref().map(|s| &s.user_id)
    }

    /// The sticky error from the most recent failed operation, cleared by the
    /// next successful one.
    pub fn last_error(&self) -> Option<&WatchlistError> {
        self.error.as_ref()
    }

    fn replace_entries(&mut self, rows: Vec<WatchlistEntry>) {
        self.entries.clear();
        self.index.clear();
        for entry in rows {
            // First row wins if the remote ever serves a duplicate key
            if self.index.insert(entry.key()) {
                self.entries.push(entry);
            }
        }
    }
}
