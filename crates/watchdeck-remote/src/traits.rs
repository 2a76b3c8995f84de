use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use watchdeck_models::{MediaKey, Session, UserId, WatchlistEntry};
use crate::error::RemoteError;

/// Identity/session provider.
///
/// `current_session` is a one-shot fetch; `subscribe` yields an auth-state
/// channel that receives the new session (or None) on every sign-in,
/// sign-out, and token refresh.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError>;

    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}

/// The remote watchlist relation, one row per saved entry per user.
#[async_trait]
pub trait WatchlistTable: Send + Sync {
    /// All rows for the user, ordered by creation time descending.
    async fn fetch_entries(&self, user_id: &UserId) -> Result<Vec<WatchlistEntry>, RemoteError>;

    async fn insert_entry(
        &self,
        user_id: &UserId,
        entry: &WatchlistEntry,
    ) -> Result<(), RemoteError>;

    async fn delete_entry(&self, user_id: &UserId, key: &MediaKey) -> Result<(), RemoteError>;
}

/// Row-level change notification. Carries no payload: consumers are expected
/// to re-fetch rather than patch incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChange;

/// A live change-feed subscription for one user's watchlist rows.
///
/// Dropping the subscription (or calling `unsubscribe`) stops the underlying
/// watcher task, so a subscription cannot outlive a sign-in/sign-out cycle.
pub struct ChangeSubscription {
    events: mpsc::Receiver<TableChange>,
    task: Option<JoinHandle<()>>,
}

impl ChangeSubscription {
    pub fn new(events: mpsc::Receiver<TableChange>, task: Option<JoinHandle<()>>) -> Self {
        Self { events, task }
    }

    /// Next change event; None once the feed is closed.
    pub async fn next_change(&mut self) -> Option<TableChange> {
        self.events.recv().await
    }

    pub fn unsubscribe(self) {
        // Drop tears the watcher down
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Realtime change feed over the watchlist relation, scoped per user.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn subscribe_changes(&self, user_id: &UserId) -> Result<ChangeSubscription, RemoteError>;
}
