use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use watchdeck_models::UserId;

use crate::error::RemoteError;
use crate::traits::{ChangeFeed, ChangeSubscription, TableChange, WatchlistTable};

/// Change feed over the watchlist relation, implemented as an interval
/// watcher: the relation is snapshotted on subscribe and re-polled on a fixed
/// interval; any difference emits one opaque `TableChange`.
///
/// Consumers re-fetch wholesale on every event, so the protocol they observe
/// is identical to a push feed. Poll failures keep the last snapshot and try
/// again next tick.
pub struct PollingChangeFeed {
    table: Arc<dyn WatchlistTable>,
    interval: Duration,
}

impl PollingChangeFeed {
    pub fn new(table: Arc<dyn WatchlistTable>, interval: Duration) -> Self {
        Self { table, interval }
    }
}

#[async_trait]
impl ChangeFeed for PollingChangeFeed {
    async fn subscribe_changes(&self, user_id: &UserId) -> Result<ChangeSubscription, RemoteError> {
        let baseline = self.table.fetch_entries(user_id).await?;

        let (tx, rx) = mpsc::channel(16);
        let table = Arc::clone(&self.table);
        let user_id = user_id.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut last = baseline;
            loop {
                tokio::time::sleep(interval).await;
                match table.fetch_entries(&user_id).await {
                    Ok(snapshot) => {
                        if snapshot != last {
                            last = snapshot;
                            if tx.send(TableChange).await.is_err() {
                                // Subscriber dropped, stop watching
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        debug!(user = %user_id, error = %e, "Change-feed poll failed, keeping last snapshot");
                    }
                }
            }
        });

        Ok(ChangeSubscription::new(rx, Some(task)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use watchdeck_models::{MediaKey, MediaType, WatchlistEntry};

    struct ScriptedTable {
        snapshots: Mutex<Vec<Vec<WatchlistEntry>>>,
    }

    impl ScriptedTable {
        fn new(snapshots: Vec<Vec<WatchlistEntry>>) -> Self {
            Self {
                snapshots: Mutex::new(snapshots),
            }
        }
    }

    #[async_trait]
    impl WatchlistTable for ScriptedTable {
        async fn fetch_entries(
            &self,
            _user_id: &UserId,
        ) -> Result<Vec<WatchlistEntry>, RemoteError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            if snapshots.len() > 1 {
                Ok(snapshots.remove(0))
            } else {
                Ok(snapshots[0].clone())
            }
        }

        async fn insert_entry(
            &self,
            _user_id: &UserId,
            _entry: &WatchlistEntry,
        ) -> Result<(), RemoteError> {
            Ok(())
        }

        async fn delete_entry(&self, _user_id: &UserId, _key: &MediaKey) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    fn entry(id: &str) -> WatchlistEntry {
        WatchlistEntry::new(id, MediaType::Movie, format!("Movie {}", id), None)
    }

    #[tokio::test]
    async fn test_emits_change_when_snapshot_differs() {
        let table = Arc::new(ScriptedTable::new(vec![
            vec![entry("1")],
            vec![entry("1"), entry("2")],
        ]));
        let feed = PollingChangeFeed::new(table, Duration::from_millis(5));

        let mut subscription = feed
            .subscribe_changes(&UserId::new("user-1"))
            .await
            .unwrap();

        let change = tokio::time::timeout(Duration::from_secs(1), subscription.next_change())
            .await
            .expect("expected a change event");
        assert_eq!(change, Some(TableChange));
    }

    #[tokio::test]
    async fn test_silent_while_snapshot_unchanged() {
        let table = Arc::new(ScriptedTable::new(vec![vec![entry("1")]]));
        let feed = PollingChangeFeed::new(table, Duration::from_millis(5));

        let mut subscription = feed
            .subscribe_changes(&UserId::new("user-1"))
            .await
            .unwrap();

        let result =
            tokio::time::timeout(Duration::from_millis(50), subscription.next_change()).await;
        assert!(result.is_err(), "no event should fire without a change");
    }

    #[tokio::test]
    async fn test_subscribe_fails_when_baseline_fetch_fails() {
        struct FailingTable;

        #[async_trait]
        impl WatchlistTable for FailingTable {
            async fn fetch_entries(
                &self,
                _user_id: &UserId,
            ) -> Result<Vec<WatchlistEntry>, RemoteError> {
                Err(RemoteError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            }

            async fn insert_entry(
                &self,
                _user_id: &UserId,
                _entry: &WatchlistEntry,
            ) -> Result<(), RemoteError> {
                Ok(())
            }

            async fn delete_entry(
                &self,
                _user_id: &UserId,
                _key: &MediaKey,
            ) -> Result<(), RemoteError> {
                Ok(())
            }
        }

        let feed = PollingChangeFeed::new(Arc::new(FailingTable), Duration::from_millis(5));
        assert!(feed
            .subscribe_changes(&UserId::new("user-1"))
            .await
            .is_err());
    }
}
