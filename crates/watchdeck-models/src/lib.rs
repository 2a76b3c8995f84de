pub mod catalog;
pub mod media;
pub mod session;
pub mod watchlist;

pub use catalog::{CatalogItem, Genre, MovieDetails, MovieSummary, SeasonSummary, TvDetails, TvSummary};
pub use media::{MediaKey, MediaType};
pub use session::{Session, UserId};
pub use watchlist::WatchlistEntry;
