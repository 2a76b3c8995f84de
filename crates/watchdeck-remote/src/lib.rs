pub mod error;
pub mod supabase;
pub mod tmdb;
pub mod traits;

pub use error::RemoteError;
pub use supabase::{PollingChangeFeed, SupabaseAuth, SupabaseWatchlistTable};
pub use tmdb::CatalogClient;
pub use traits::{ChangeFeed, ChangeSubscription, SessionProvider, TableChange, WatchlistTable};
