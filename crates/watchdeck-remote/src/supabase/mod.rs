pub mod auth;
pub mod feed;
pub mod table;

pub use auth::SupabaseAuth;
pub use feed::PollingChangeFeed;
pub use table::SupabaseWatchlistTable;

use crate::error::RemoteError;

/// Convert a non-success REST response into an API error, keeping the
/// rejection body verbatim. Empty bodies fall back to the status line.
pub(crate) async fn api_rejection(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    let message = if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        message
    };
    RemoteError::Api {
        status: status.as_u16(),
        message,
    }
}
