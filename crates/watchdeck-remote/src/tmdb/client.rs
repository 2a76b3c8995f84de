//! TMDB (The Movie Database) API client.
//!
//! Supplies the browse rails (trending, top-rated, animation), multi search,
//! and the movie/TV detail payloads. Requires an API key.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use watchdeck_config::CatalogConfig;
use watchdeck_models::{
    CatalogItem, Genre, MovieDetails, MovieSummary, SeasonSummary, TvDetails, TvSummary,
};

use crate::error::RemoteError;

const ANIMATION_GENRE_ID: u32 = 16;

pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
    image_base_url: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, RemoteError> {
        if config.api_key.is_empty() {
            return Err(RemoteError::NotConfigured(
                "catalog API key is required".to_string(),
            ));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());

        let image_base_url = config
            .image_base_url
            .clone()
            .unwrap_or_else(|| "https://image.tmdb.org/t/p".to_string());

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            image_base_url,
        })
    }

    /// Absolute URL for a relative poster/backdrop path.
    pub fn image_url(&self, path: &str) -> String {
        format!("{}/w500{}", self.image_base_url, path)
    }

    /// Mixed movie/TV feed of the day's trending titles.
    pub async fn trending(&self) -> Result<Vec<CatalogItem>, RemoteError> {
        let url = format!("{}/trending/all/day", self.base_url);

        debug!("Catalog trending fetch");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;
        let response = check_common(response).await?;

        let feed: MixedResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse trending response: {}", e)))?;

        Ok(resolve_mixed(feed.results))
    }

    /// Multi search across movies and TV shows. Person hits and other
    /// non-media kinds are dropped at the parse boundary.
    pub async fn search(&self, query: &str) -> Result<Vec<CatalogItem>, RemoteError> {
        let url = format!("{}/search/multi", self.base_url);

        debug!("Catalog search: query='{}'", query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("include_adult", "false"),
            ])
            .send()
            .await?;
        let response = check_common(response).await?;

        let feed: MixedResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse search response: {}", e)))?;

        Ok(resolve_mixed(feed.results))
    }

    pub async fn top_rated_movies(&self) -> Result<Vec<MovieSummary>, RemoteError> {
        let url = format!("{}/movie/top_rated", self.base_url);

        debug!("Catalog top-rated movies fetch");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;
        let response = check_common(response).await?;

        let page: ListResponse<RawMovie> = response.json().await.map_err(|e| {
            RemoteError::Parse(format!("Failed to parse top-rated movies: {}", e))
        })?;

        Ok(page.results.into_iter().map(MovieSummary::from).collect())
    }

    pub async fn top_rated_tv(&self) -> Result<Vec<TvSummary>, RemoteError> {
        let url = format!("{}/tv/top_rated", self.base_url);

        debug!("Catalog top-rated TV fetch");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;
        let response = check_common(response).await?;

        let page: ListResponse<RawTv> = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse top-rated TV: {}", e)))?;

        Ok(page.results.into_iter().map(TvSummary::from).collect())
    }

    /// Top animated movies, via discover filtered by the animation genre.
    pub async fn top_animation(&self) -> Result<Vec<MovieSummary>, RemoteError> {
        let url = format!("{}/discover/movie", self.base_url);
        let genre = ANIMATION_GENRE_ID.to_string();

        debug!("Catalog top animation fetch");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("with_genres", genre.as_str()),
                ("sort_by", "popularity.desc"),
            ])
            .send()
            .await?;
        let response = check_common(response).await?;

        let page: ListResponse<RawMovie> = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse animation feed: {}", e)))?;

        Ok(page.results.into_iter().map(MovieSummary::from).collect())
    }

    pub async fn movie_details(&self, id: u64) -> Result<MovieDetails, RemoteError> {
        let url = format!("{}/movie/{}", self.base_url, id);

        debug!("Catalog movie details: id={}", id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(RemoteError::NotFound(format!("movie {}", id)));
        }
        let response = check_common(response).await?;

        let details: RawMovieDetails = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse movie details: {}", e)))?;

        Ok(details.into())
    }

    pub async fn tv_details(&self, id: u64) -> Result<TvDetails, RemoteError> {
        let url = format!("{}/tv/{}", self.base_url, id);

        debug!("Catalog TV details: id={}", id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(RemoteError::NotFound(format!("tv {}", id)));
        }
        let response = check_common(response).await?;

        let details: RawTvDetails = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse TV details: {}", e)))?;

        Ok(details.into())
    }
}

/// Map the status codes every catalog endpoint can produce.
async fn check_common(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.as_u16() == 401 {
        return Err(RemoteError::NotConfigured(
            "Invalid catalog API key".to_string(),
        ));
    }
    if status.as_u16() == 429 {
        return Err(RemoteError::RateLimited);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

/// Resolve a mixed feed into tagged variants, dropping rows whose
/// discriminator is not a browsable media kind.
fn resolve_mixed(values: Vec<serde_json::Value>) -> Vec<CatalogItem> {
    values
        .into_iter()
        .filter_map(|value| match value.get("media_type").and_then(|v| v.as_str()) {
            Some("movie") => serde_json::from_value::<RawMovie>(value)
                .ok()
                .map(|m| CatalogItem::Movie(m.into())),
            Some("tv") => serde_json::from_value::<RawTv>(value)
                .ok()
                .map(|t| CatalogItem::Tv(t.into())),
            _ => None,
        })
        .collect()
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct MixedResponse {
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawMovie {
    id: u64,
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawTv {
    id: u64,
    name: String,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawGenre {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawMovieDetails {
    id: u64,
    title: String,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<RawGenre>,
    vote_average: Option<f32>,
    tagline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSeason {
    season_number: u32,
    name: Option<String>,
    episode_count: Option<u32>,
    air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTvDetails {
    id: u64,
    name: String,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    first_air_date: Option<String>,
    number_of_seasons: Option<u32>,
    number_of_episodes: Option<u32>,
    #[serde(default)]
    seasons: Vec<RawSeason>,
    #[serde(default)]
    genres: Vec<RawGenre>,
    vote_average: Option<f32>,
}

// ============================================================================
// Conversions
// ============================================================================

impl From<RawMovie> for MovieSummary {
    fn from(r: RawMovie) -> Self {
        Self {
            id: r.id,
            title: r.title,
            overview: r.overview,
            poster_path: r.poster_path,
            backdrop_path: r.backdrop_path,
            release_date: r.release_date,
            vote_average: r.vote_average,
        }
    }
}

impl From<RawTv> for TvSummary {
    fn from(r: RawTv) -> Self {
        Self {
            id: r.id,
            name: r.name,
            overview: r.overview,
            poster_path: r.poster_path,
            backdrop_path: r.backdrop_path,
            first_air_date: r.first_air_date,
            vote_average: r.vote_average,
        }
    }
}

impl From<RawGenre> for Genre {
    fn from(g: RawGenre) -> Self {
        Self {
            id: g.id,
            name: g.name,
        }
    }
}

impl From<RawMovieDetails> for MovieDetails {
    fn from(d: RawMovieDetails) -> Self {
        Self {
            id: d.id,
            title: d.title,
            overview: d.overview,
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            release_date: d.release_date,
            runtime: d.runtime,
            genres: d.genres.into_iter().map(Genre::from).collect(),
            vote_average: d.vote_average,
            tagline: d.tagline,
        }
    }
}

impl From<RawSeason> for SeasonSummary {
    fn from(s: RawSeason) -> Self {
        Self {
            season_number: s.season_number,
            name: s.name,
            episode_count: s.episode_count,
            air_date: s.air_date,
        }
    }
}

impl From<RawTvDetails> for TvDetails {
    fn from(d: RawTvDetails) -> Self {
        Self {
            id: d.id,
            name: d.name,
            overview: d.overview,
            poster_path: d.poster_path,
            backdrop_path: d.backdrop_path,
            first_air_date: d.first_air_date,
            number_of_seasons: d.number_of_seasons,
            number_of_episodes: d.number_of_episodes,
            seasons: d.seasons.into_iter().map(SeasonSummary::from).collect(),
            genres: d.genres.into_iter().map(Genre::from).collect(),
            vote_average: d.vote_average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_mixed_keeps_movies_and_tv() {
        let values = vec![
            json!({
                "media_type": "movie",
                "id": 27205,
                "title": "Inception",
                "poster_path": "/poster.jpg",
                "release_date": "2010-07-16",
                "vote_average": 8.4
            }),
            json!({
                "media_type": "tv",
                "id": 1399,
                "name": "Game of Thrones",
                "first_air_date": "2011-04-17"
            }),
        ];

        let items = resolve_mixed(values);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].media_id(), "27205");
        assert_eq!(items[0].title(), "Inception");
        assert_eq!(items[1].media_id(), "1399");
        assert_eq!(items[1].title(), "Game of Thrones");
    }

    #[test]
    fn test_resolve_mixed_drops_unknown_kinds() {
        let values = vec![
            json!({
                "media_type": "person",
                "id": 6193,
                "name": "Leonardo DiCaprio"
            }),
            json!({
                "media_type": "movie",
                "id": 27205,
                "title": "Inception"
            }),
            json!({ "id": 42 }),
        ];

        let items = resolve_mixed(values);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title(), "Inception");
    }

    #[test]
    fn test_movie_details_conversion() {
        let details = RawMovieDetails {
            id: 27205,
            title: "Inception".to_string(),
            overview: Some("A thief who steals corporate secrets...".to_string()),
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            release_date: Some("2010-07-16".to_string()),
            runtime: Some(148),
            genres: vec![RawGenre {
                id: 878,
                name: "Science Fiction".to_string(),
            }],
            vote_average: Some(8.4),
            tagline: Some("Your mind is the scene of the crime.".to_string()),
        };

        let movie: MovieDetails = details.into();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.runtime, Some(148));
        assert_eq!(movie.genres[0].name, "Science Fiction");
    }

    #[test]
    fn test_tv_details_conversion() {
        let details = RawTvDetails {
            id: 1399,
            name: "Game of Thrones".to_string(),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            first_air_date: Some("2011-04-17".to_string()),
            number_of_seasons: Some(8),
            number_of_episodes: Some(73),
            seasons: vec![RawSeason {
                season_number: 1,
                name: Some("Season 1".to_string()),
                episode_count: Some(10),
                air_date: Some("2011-04-17".to_string()),
            }],
            genres: vec![],
            vote_average: Some(8.4),
        };

        let show: TvDetails = details.into();
        assert_eq!(show.number_of_seasons, Some(8));
        assert_eq!(show.seasons.len(), 1);
        assert_eq!(show.seasons[0].episode_count, Some(10));
    }

    #[test]
    fn test_rejects_missing_api_key() {
        let config = CatalogConfig {
            api_key: String::new(),
            base_url: None,
            image_base_url: None,
        };
        assert!(CatalogClient::new(&config).is_err());
    }
}
