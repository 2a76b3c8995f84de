use futures::future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use watchdeck_models::{Session, UserId};
use watchdeck_remote::{
    ChangeFeed, ChangeSubscription, RemoteError, SessionProvider, TableChange, WatchlistTable,
};

use crate::session::SessionStore;
use crate::store::WatchlistStore;


/// What `SyncService::next` observed and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    /// A user signed in (or a different user replaced the previous one); the
    /// store went through its load.
    SessionStarted(UserId),
    /// The provider refreshed the token for the already-active user.
    SessionRefreshed,
    /// The user signed out; watchlist cleared, feed subscription dropped.
    SessionEnded,
    /// A change-feed event triggered the reconciliation re-fetch.
    WatchlistRefreshed,
    /// The auth-state channel closed; no further events will arrive.
    Closed,
}

enum Wake {
    Auth(bool),
    Feed(Option<TableChange>),
}

/// Lifecycle driver wiring the identity provider, the watchlist store, and
/// the change feed together.
///
/// Constructed explicitly with its collaborators and owned by whoever drives
/// the event loop; there is no ambient global state. The feed subscription is
/// scoped to the active session: it is created on sign-in, torn down on
/// sign-out or user switch, and dropped with the service.
pub struct SyncService {
    provider: Arc<dyn SessionProvider>,
    feed: Arc<dyn ChangeFeed>,
    sessions: SessionStore,
    store: WatchlistStore,
    auth_events: tokio::sync::watch::Receiver<Option<Session>>,
    subscription: Option<ChangeSubscription>,
}

impl SyncService {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        table: Arc<dyn WatchlistTable>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        let auth_events = provider.subscribe();
        Self {
            provider,
            feed,
            sessions: SessionStore::new(),
            store: WatchlistStore::new(table),
            auth_events,
            subscription: None,
        }
    }

    pub fn store(&self) -> &WatchlistStore {
        &self.store
    }

    /// Mutable access for explicit user actions (add/remove) issued through
    /// the service.
    pub fn store_mut(&mut self) -> &mut WatchlistStore {
        &mut self.store
    }

    /// One-shot session resolution at startup: if a session already exists,
    /// drive the store through its load and subscribe the change feed.
    pub async fn bootstrap(&mut self) -> Result<(), RemoteError> {
        let session = self.provider.current_session().await?;
        match session {
            Some(session) => self.start_session(session).await,
            None => debug!("No active session at bootstrap"),
        }
        Ok(())
    }

    /// Await the next session or change-feed event and apply it.
    pub async fn next(&mut self) -> ServiceEvent {
        loop {
            let wake = {
                let auth = self.auth_events.changed();
                let feed = next_feed_change(&mut self.subscription);
                tokio::pin!(auth);
                tokio::pin!(feed);
                tokio::select! {
                    changed = &mut auth => Wake::Auth(changed.is_ok()),
                    change = &mut feed => Wake::Feed(change),
                }
            };

            match wake {
                Wake::Auth(false) => return ServiceEvent::Closed,
                Wake::Auth(true) => {
                    let next = self.auth_events.borrow_and_update().clone();
                    match next {
                        Some(session) => {
                            if self.sessions.user_id() == Some(&session.user_id) {
                                debug!(user = %session.user_id, "Session token refreshed");
                                self.sessions.apply(Some(session.clone()));
                                self.store.update_session(session);
                                return ServiceEvent::SessionRefreshed;
                            }
                            let user_id = session.user_id.clone();
                            self.start_session(session).await;
                            return ServiceEvent::SessionStarted(user_id);
                        }
                        None => {
                            if self.sessions.is_authenticated() {
                                self.stop_session();
                                return ServiceEvent::SessionEnded;
                            }
                            // Already signed out, nothing to apply
                            continue;
                        }
                    }
                }
                Wake::Feed(Some(_)) => {
                    self.store.refresh().await;
                    return ServiceEvent::WatchlistRefreshed;
                }
                Wake::Feed(None) => {
                    info!("Change feed closed, dropping subscription");
                    self.subscription = None;
                    continue;
                }
            }
        }
    }

    async fn start_session(&mut self, session: Session) {
        // Tear down any subscription left from a previous session first
        self.subscription = None;

        let user_id = session.user_id.clone();
        self.sessions.apply(Some(session.clone()));
        self.store.begin_session(session).await;

        match self.feed.subscribe_changes(&user_id).await {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(e) => {
                warn!(user = %user_id, error = %e, "Change-feed subscription failed; remote edits will not be reconciled");
            }
        }
    }

    fn stop_session(&mut self) {
        self.subscription = None;
        self.sessions.apply(None);
        self.store.end_session();
    }
}

async fn next_feed_change(subscription: &mut Option<ChangeSubscription>) -> Option<TableChange> {
    match subscription {
        Some(subscription) => subscription.next_change().await,
        None => future::pending().await,
    }
}
