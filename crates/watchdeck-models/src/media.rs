use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two media kinds the catalog and the watchlist relation distinguish.
/// Serialized as `"movie"` / `"tv"`, the wire form both backends use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(format!("Invalid media type: {}. Use 'movie' or 'tv'", other)),
        }
    }
}

/// Composite identity of a media entry: (media_id, media_type).
///
/// `media_id` is kept string-normalized because the catalog API mixes numeric
/// and string identifier forms depending on the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaKey {
    pub media_id: String,
    pub media_type: MediaType,
}

impl MediaKey {
    pub fn new(media_id: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            media_id: media_id.into(),
            media_type,
        }
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.media_type, self.media_id)
    }
}
