pub mod error;
pub mod fetch;
pub mod service;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::WatchlistError;
pub use fetch::{FetchSlice, FetchStatus};
pub use service::{ServiceEvent, SyncService};
pub use session::SessionStore;
pub use store::{SyncPhase, WatchlistStore};
