use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use watchdeck_config::BackendConfig;
use watchdeck_models::{MediaKey, MediaType, UserId, WatchlistEntry};

use crate::error::RemoteError;
use crate::supabase::{api_rejection, SupabaseAuth};
use crate::traits::WatchlistTable;

const SELECT_COLUMNS: &str = "media_id,media_type,poster_path,title";

#[derive(Debug, Deserialize)]
struct WatchlistRow {
    media_id: String,
    media_type: MediaType,
    title: String,
    poster_path: Option<String>,
}

impl From<WatchlistRow> for WatchlistEntry {
    fn from(row: WatchlistRow) -> Self {
        WatchlistEntry {
            media_id: row.media_id,
            media_type: row.media_type,
            title: row.title,
            poster_path: row.poster_path,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    user_id: &'a str,
    media_id: &'a str,
    media_type: MediaType,
    title: &'a str,
    poster_path: Option<&'a str>,
}

/// PostgREST-style client for the `watchlist` relation.
///
/// Every call carries the project anon key plus the signed-in user's bearer
/// token; row-level security scopes reads and writes to that user.
pub struct SupabaseWatchlistTable {
    client: Client,
    base_url: String,
    anon_key: String,
    auth: Arc<SupabaseAuth>,
}

impl SupabaseWatchlistTable {
    pub fn new(config: &BackendConfig, auth: Arc<SupabaseAuth>) -> Result<Self, RemoteError> {
        if config.url.is_empty() || config.anon_key.is_empty() {
            return Err(RemoteError::NotConfigured(
                "backend URL and anon key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            auth,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/watchlist", self.base_url)
    }
}

#[async_trait]
impl WatchlistTable for SupabaseWatchlistTable {
    async fn fetch_entries(&self, user_id: &UserId) -> Result<Vec<WatchlistEntry>, RemoteError> {
        let token = self.auth.access_token().await?;
        let user_filter = format!("eq.{}", user_id.as_str());

        debug!(user = %user_id, "Fetching watchlist rows");

        let response = self
            .client
            .get(self.table_url())
            .query(&[
                ("select", SELECT_COLUMNS),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(RemoteError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(api_rejection(response).await);
        }

        let rows: Vec<WatchlistRow> = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse watchlist rows: {}", e)))?;

        Ok(rows.into_iter().map(WatchlistEntry::from).collect())
    }

    async fn insert_entry(
        &self,
        user_id: &UserId,
        entry: &WatchlistEntry,
    ) -> Result<(), RemoteError> {
        let token = self.auth.access_token().await?;
        let rows = [InsertRow {
            user_id: user_id.as_str(),
            media_id: &entry.media_id,
            media_type: entry.media_type,
            title: &entry.title,
            poster_path: entry.poster_path.as_deref(),
        }];

        debug!(user = %user_id, key = %entry.key(), "Inserting watchlist row");

        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(RemoteError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(api_rejection(response).await);
        }
        Ok(())
    }

    async fn delete_entry(&self, user_id: &UserId, key: &MediaKey) -> Result<(), RemoteError> {
        let token = self.auth.access_token().await?;
        let user_filter = format!("eq.{}", user_id.as_str());
        let media_filter = format!("eq.{}", key.media_id);
        let type_filter = format!("eq.{}", key.media_type);

        debug!(user = %user_id, key = %key, "Deleting watchlist row");

        let response = self
            .client
            .delete(self.table_url())
            .query(&[
                ("user_id", user_filter.as_str()),
                ("media_id", media_filter.as_str()),
                ("media_type", type_filter.as_str()),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(RemoteError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(api_rejection(response).await);
        }
        Ok(())
    }
}
