//! Hand-rolled async mocks shared by the store and service tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use watchdeck_models::{MediaKey, MediaType, Session, UserId, WatchlistEntry};
use watchdeck_remote::{
    ChangeFeed, ChangeSubscription, RemoteError, SessionProvider, TableChange, WatchlistTable,
};

pub(crate) fn session(user: &str) -> Session {
    Session {
        user_id: UserId::new(user),
        email: Some(format!("{}@example.com", user)),
        access_token: format!("token-{}", user),
        expires_at: chrono::DateTime::from_timestamp(4_102_444_800, 0).unwrap(),
    }
}

pub(crate) fn entry(media_id: &str, media_type: MediaType, title: &str) -> WatchlistEntry {
    WatchlistEntry::new(media_id, media_type, title, None)
}

/// In-memory watchlist relation with switchable failure modes and call
/// counters.
pub(crate) struct MockTable {
    rows: Mutex<Vec<WatchlistEntry>>,
    fail_fetches: AtomicBool,
    fail_writes: AtomicBool,
    fetch_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MockTable {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_rows(Vec::new())
    }

    pub(crate) fn with_rows(rows: Vec<WatchlistEntry>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            fail_fetches: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fetch_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn set_rows(&self, rows: Vec<WatchlistEntry>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub(crate) fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WatchlistTable for MockTable {
    async fn fetch_entries(&self, _user_id: &UserId) -> Result<Vec<WatchlistEntry>, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(RemoteError::Api {
                status: 500,
                message: "fetch failed".to_string(),
            });
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn insert_entry(
        &self,
        _user_id: &UserId,
        entry: &WatchlistEntry,
    ) -> Result<(), RemoteError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Api {
                status: 403,
                message: "insert rejected".to_string(),
            });
        }
        self.rows.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, _user_id: &UserId, key: &MediaKey) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Api {
                status: 403,
                message: "delete rejected".to_string(),
            });
        }
        self.rows.lock().unwrap().retain(|e| e.key() != *key);
        Ok(())
    }
}

/// Scriptable identity provider broadcasting auth-state changes.
pub(crate) struct MockProvider {
    current: Mutex<Option<Session>>,
    sessions: watch::Sender<Option<Session>>,
}

impl MockProvider {
    pub(crate) fn new() -> Arc<Self> {
        let (sessions, _) = watch::channel(None);
        Arc::new(Self {
            current: Mutex::new(None),
            sessions,
        })
    }

    pub(crate) fn sign_in(&self, session: Session) {
        *self.current.lock().unwrap() = Some(session.clone());
        self.sessions.send_replace(Some(session));
    }

    pub(crate) fn sign_out(&self) {
        *self.current.lock().unwrap() = None;
        self.sessions.send_replace(None);
    }
}

#[async_trait]
impl SessionProvider for MockProvider {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
        Ok(self.current.lock().unwrap().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

/// Change feed driven by the test instead of a watcher task.
pub(crate) struct MockFeed {
    sender: Mutex<Option<mpsc::Sender<TableChange>>>,
    subscribe_calls: AtomicUsize,
}

impl MockFeed {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            sender: Mutex::new(None),
            subscribe_calls: AtomicUsize::new(0),
        })
    }

    /// Emit one change event; false when no live subscription exists.
    pub(crate) async fn emit(&self) -> bool {
        let sender = self.sender.lock().unwrap().clone();
        match sender {
            Some(tx) => tx.send(TableChange).await.is_ok(),
            None => false,
        }
    }

    pub(crate) fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeFeed for MockFeed {
    async fn subscribe_changes(&self, _user_id: &UserId) -> Result<ChangeSubscription, RemoteError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(16);
        *self.sender.lock().unwrap() = Some(tx);
        Ok(ChangeSubscription::new(rx, None))
    }
}
