use thiserror::Error;

/// Failures surfaced by the remote collaborators (identity provider, row
/// store, catalog). Rejection bodies are carried verbatim so the UI layer can
/// show exactly what the backend said.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    NotConfigured(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Parse(String),
}
