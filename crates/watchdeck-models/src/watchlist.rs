use serde::{Deserialize, Serialize};
use crate::media::{MediaKey, MediaType};

/// One saved entry in a user's watchlist.
///
/// The composite (media_id, media_type) key is unique per user; the store
/// enforces that no two local entries share it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub media_id: String,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
}

impl WatchlistEntry {
    pub fn new(
        media_id: impl Into<String>,
        media_type: MediaType,
        title: impl Into<String>,
        poster_path: Option<String>,
    ) -> Self {
        Self {
            media_id: media_id.into(),
            media_type,
            title: title.into(),
            poster_path,
        }
    }

    pub fn key(&self) -> MediaKey {
        MediaKey::new(self.media_id.clone(), self.media_type)
    }
}
