use std::future::Future;
use watchdeck_remote::RemoteError;

/// Request lifecycle of a remote data fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Status-tracking wrapper around one remote fetch result.
///
/// Mirrors the display-side data slices: a status enum, the last successful
/// payload, and the last failure message. A failed reload keeps the stale
/// payload so the display layer can keep rendering it alongside the error.
#[derive(Debug)]
pub struct FetchSlice<T> {
    status: FetchStatus,
    data: Option<T>,
    error: Option<String>,
}

impl<T> FetchSlice<T> {
    pub fn new() -> Self {
        Self {
            status: FetchStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Drive one fetch to completion, returning whether it succeeded.
    pub async fn load<F>(&mut self, fut: F) -> bool
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        self.status = FetchStatus::Pending;
        self.error = None;

        match fut.await {
            Ok(data) => {
                self.data = Some(data);
                self.status = FetchStatus::Succeeded;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.status = FetchStatus::Failed;
                false
            }
        }
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<T> Default for FetchSlice<T> {
    fn default() -> Self {
        Self::new()
    }
}
