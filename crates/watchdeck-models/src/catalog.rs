use serde::{Deserialize, Serialize};
use crate::media::{MediaKey, MediaType};

/// A movie row as returned by catalog list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f32>,
}

/// A TV-show row as returned by catalog list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvSummary {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f32>,
}

/// A row from a mixed catalog feed (trending, multi search), resolved into a
/// tagged variant at the ingestion boundary. Rows with an unknown
/// discriminator (e.g. `person`) are dropped during parsing and never reach
/// this type.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum CatalogItem {
    Movie(MovieSummary),
    Tv(TvSummary),
}

impl CatalogItem {
    pub fn media_type(&self) -> MediaType {
        match self {
            CatalogItem::Movie(_) => MediaType::Movie,
            CatalogItem::Tv(_) => MediaType::Tv,
        }
    }

    /// String-normalized catalog identifier.
    pub fn media_id(&self) -> String {
        match self {
            CatalogItem::Movie(m) => m.id.to_string(),
            CatalogItem::Tv(t) => t.id.to_string(),
        }
    }

    pub fn key(&self) -> MediaKey {
        MediaKey::new(self.media_id(), self.media_type())
    }

    pub fn title(&self) -> &str {
        match self {
            CatalogItem::Movie(m) => &m.title,
            CatalogItem::Tv(t) => &t.name,
        }
    }

    pub fn poster_path(&self) -> Option<&str> {
        match self {
            CatalogItem::Movie(m) => m.poster_path.as_deref(),
            CatalogItem::Tv(t) => t.poster_path.as_deref(),
        }
    }

    pub fn vote_average(&self) -> Option<f32> {
        match self {
            CatalogItem::Movie(m) => m.vote_average,
            CatalogItem::Tv(t) => t.vote_average,
        }
    }

    /// Release year if the date field is present and well-formed.
    pub fn year(&self) -> Option<u32> {
        let date = match self {
            CatalogItem::Movie(m) => m.release_date.as_deref(),
            CatalogItem::Tv(t) => t.first_air_date.as_deref(),
        };
        date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full movie detail payload for the detail pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
    pub vote_average: Option<f32>,
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonSummary {
    pub season_number: u32,
    pub name: Option<String>,
    pub episode_count: Option<u32>,
    pub air_date: Option<String>,
}

/// Full TV-show detail payload for the detail pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvDetails {
    pub id: u64,
    pub name: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub seasons: Vec<SeasonSummary>,
    pub genres: Vec<Genre>,
    pub vote_average: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            overview: None,
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            release_date: Some("2010-07-16".to_string()),
            vote_average: Some(8.4),
        }
    }

    #[test]
    fn test_catalog_item_key_is_string_normalized() {
        let item = CatalogItem::Movie(movie(27205, "Inception"));
        let key = item.key();
        assert_eq!(key.media_id, "27205");
        assert_eq!(key.media_type, MediaType::Movie);
    }

    #[test]
    fn test_catalog_item_year() {
        let item = CatalogItem::Movie(movie(27205, "Inception"));
        assert_eq!(item.year(), Some(2010));

        let undated = CatalogItem::Movie(MovieSummary {
            release_date: None,
            ..movie(1, "x")
        });
        assert_eq!(undated.year(), None);
    }

    #[test]
    fn test_catalog_item_serializes_with_discriminator() {
        let item = CatalogItem::Movie(movie(27205, "Inception"));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["media_type"], "movie");
        assert_eq!(json["title"], "Inception");
    }
}
